use std::path::PathBuf;

use crate::format::ConfigFormat;

/// Errors surfaced by [`Parser`](crate::Parser).
///
/// Every variant carries the file path it was raised for. Accessors never
/// produce these; only parsing and watch registration can fail.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error reading config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config file {path:?} as {format}: {message}")]
    Parse {
        path: PathBuf,
        format: ConfigFormat,
        message: String,
    },

    #[error("unsupported config type {extension:?} for {path:?}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("error watching config file {path:?}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

impl ConfigError {
    /// The config file the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::UnsupportedFormat { path, .. }
            | Self::Watch { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
