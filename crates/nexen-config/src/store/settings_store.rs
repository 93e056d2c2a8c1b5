//! Core settings store: file reading, key resolution, env overrides.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::env::EnvBinding;
use crate::error::{ConfigError, Result};
use crate::format::ConfigFormat;

/// Decoded settings plus the rules for resolving keys against them.
///
/// Keys are stored lowercased and every lookup is case-insensitive.
/// Environment variables bound through [`EnvBinding`] take precedence over
/// values read from the file.
#[derive(Debug, Default)]
pub struct Store {
    config_file: Option<PathBuf>,
    config_type: Option<ConfigFormat>,
    env: EnvBinding,
    settings: Map<String, Value>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn env(&self) -> &EnvBinding {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut EnvBinding {
        &mut self.env
    }

    /// The file most recently loaded by [`read_in_config`](Self::read_in_config).
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    pub fn config_type(&self) -> Option<ConfigFormat> {
        self.config_type
    }

    /// Format used for files without an extension.
    pub fn set_config_type(&mut self, format: Option<ConfigFormat>) {
        self.config_type = format;
    }

    /// Pick the format for `path`: its extension when present, otherwise the
    /// explicitly configured type.
    pub fn resolve_format(&self, path: &Path) -> Result<ConfigFormat> {
        match ConfigFormat::extension_of(path) {
            Some(ext) => {
                ConfigFormat::from_extension(ext).ok_or_else(|| ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension: ext.to_string(),
                })
            }
            None => self
                .config_type
                .ok_or_else(|| ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension: String::new(),
                }),
        }
    }

    /// Read and decode `path` without touching the current settings.
    pub fn read_file(&self, path: &Path) -> Result<Map<String, Value>> {
        let format = self.resolve_format(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = format
            .decode(&content)
            .map_err(|message| ConfigError::Parse {
                path: path.to_path_buf(),
                format,
                message,
            })?;
        debug!(path = %path.display(), %format, keys = settings.len(), "decoded config file");
        Ok(lowercase_keys(settings))
    }

    /// Load `path` and make it the config file. On failure both the previous
    /// settings and the previous config file are left in place.
    pub fn read_in_config(&mut self, path: &Path) -> Result<()> {
        let settings = self.read_file(path)?;
        self.settings = settings;
        self.config_file = Some(path.to_path_buf());
        info!("loaded config from {}", path.display());
        Ok(())
    }

    /// Swap in new settings, reporting whether anything changed.
    pub fn replace_settings(&mut self, settings: Map<String, Value>) -> bool {
        let settings = lowercase_keys(settings);
        if settings == self.settings {
            return false;
        }
        self.settings = settings;
        true
    }

    /// Settings as read from the file, without environment overrides.
    pub fn file_settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    /// Resolve a dot-notation key. The environment wins over the file.
    pub fn get(&self, key: &str) -> Option<Value> {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        if let Some(value) = self.env.lookup(&key) {
            return Some(Value::String(value));
        }
        lookup_path(&self.settings, &key).cloned()
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Every leaf key in the file settings, dot-joined.
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.settings, "", &mut keys);
        keys
    }

    /// The full settings tree with environment overrides applied to every
    /// key the file defines.
    pub fn all_settings(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for key in self.all_keys() {
            if let Some(value) = self.get(&key) {
                let parts: Vec<&str> = key.split('.').collect();
                insert_path(&mut out, &parts, value);
            }
        }
        out
    }
}

/// Walk `key` through nested maps.
pub(crate) fn lookup_path<'a>(settings: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = settings.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn lowercase_keys(settings: Map<String, Value>) -> Map<String, Value> {
    settings
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), lowercase_value(v)))
        .collect()
}

fn lowercase_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(lowercase_keys(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_value).collect()),
        other => other,
    }
}

fn collect_keys(map: &Map<String, Value>, prefix: &str, keys: &mut Vec<String>) {
    for (k, v) in map {
        let full = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        match v {
            Value::Object(nested) if !nested.is_empty() => collect_keys(nested, &full, keys),
            _ => keys.push(full),
        }
    }
}

fn insert_path(map: &mut Map<String, Value>, path: &[&str], value: Value) {
    match path {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [first, rest @ ..] => {
            let entry = map
                .entry((*first).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(nested) = entry {
                insert_path(nested, rest, value);
            }
        }
    }
}
