//! Environment variable binding for settings keys.

use tracing::trace;

/// Default prefix for environment variable lookups.
pub const DEFAULT_ENV_PREFIX: &str = "nexen";

/// Maps settings keys to environment variable names and reads them.
///
/// With the defaults, `server.port` is looked up as `NEXEN_SERVER_PORT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBinding {
    prefix: String,
    automatic: bool,
    replacer: Option<(String, String)>,
}

impl Default for EnvBinding {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_ENV_PREFIX.to_string(),
            automatic: true,
            replacer: Some((".".to_string(), "_".to_string())),
        }
    }
}

impl EnvBinding {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn is_automatic(&self) -> bool {
        self.automatic
    }

    pub fn set_automatic(&mut self, automatic: bool) {
        self.automatic = automatic;
    }

    /// Replace every `from` in a key with `to` before building the variable
    /// name. An empty `from` disables replacement.
    pub fn set_key_replacer(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        self.replacer = if from.is_empty() {
            None
        } else {
            Some((from, to.into()))
        };
    }

    /// The environment variable name bound to `key`.
    pub fn var_name(&self, key: &str) -> String {
        let key = match &self.replacer {
            Some((from, to)) => key.replace(from.as_str(), to),
            None => key.to_string(),
        };
        if self.prefix.is_empty() {
            key.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, key).to_uppercase()
        }
    }

    /// Look up `key` in the environment. Unset, empty and non-UTF-8 values
    /// all count as absent, as does everything when automatic lookup is off.
    pub fn lookup(&self, key: &str) -> Option<String> {
        if !self.automatic {
            return None;
        }
        let name = self.var_name(key);
        let value = std::env::var(&name).ok().filter(|v| !v.is_empty())?;
        trace!(var = %name, "settings key bound from environment");
        Some(value)
    }
}
