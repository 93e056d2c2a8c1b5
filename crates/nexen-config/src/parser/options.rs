//! Construction options for [`Parser`](super::Parser).

use crate::format::ConfigFormat;
use crate::store::Store;

/// A setting applied to a freshly built parser, after the defaults.
///
/// Options are applied in the order given, so a later option overrides an
/// earlier one touching the same setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserOption {
    /// Prefix for environment variable names (default `nexen`).
    EnvPrefix(String),
    /// Format for config files that have no extension.
    ConfigType(ConfigFormat),
    /// Key fragment replacement when building env var names (default `.` → `_`).
    EnvKeyReplacer { from: String, to: String },
    /// Whether keys are looked up in the environment at all (default on).
    AutomaticEnv(bool),
}

impl ParserOption {
    pub fn env_prefix(prefix: impl Into<String>) -> Self {
        Self::EnvPrefix(prefix.into())
    }

    pub fn config_type(format: ConfigFormat) -> Self {
        Self::ConfigType(format)
    }

    pub fn env_key_replacer(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::EnvKeyReplacer {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn automatic_env(enabled: bool) -> Self {
        Self::AutomaticEnv(enabled)
    }

    pub(crate) fn apply(self, store: &mut Store) {
        match self {
            Self::EnvPrefix(prefix) => store.env_mut().set_prefix(prefix),
            Self::ConfigType(format) => store.set_config_type(Some(format)),
            Self::EnvKeyReplacer { from, to } => store.env_mut().set_key_replacer(from, to),
            Self::AutomaticEnv(enabled) => store.env_mut().set_automatic(enabled),
        }
    }
}
