//! Core parser implementation.
//!
//! Contains the [`Parser`] handle and the reload path run from the notify
//! thread when a watched file changes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{Config, ParserOption};
use crate::coerce;
use crate::error::Result;
use crate::store::Store;
use crate::watcher::{watch_file, WatchHandle};

struct State {
    store: Store,
    watches: HashMap<PathBuf, WatchHandle>,
}

/// Synchronized wrapper around a settings [`Store`].
///
/// Accessors take the read lock, while parsing and watch registration take
/// the write lock, each only for the duration of the call. Clones share the
/// same store; dropping the last clone ends every watch.
#[derive(Clone)]
pub struct Parser {
    shared: Arc<RwLock<State>>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// A parser with the default settings: env prefix `nexen`, automatic
    /// environment lookup, and `.` → `_` in env var names.
    pub fn new() -> Self {
        Self::with_options(std::iter::empty())
    }

    /// Build a parser from the defaults, then apply `options` in order.
    pub fn with_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ParserOption>,
    {
        let mut store = Store::new();
        for option in options {
            option.apply(&mut store);
        }
        Self {
            shared: Arc::new(RwLock::new(State {
                store,
                watches: HashMap::new(),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.shared.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.shared.write().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // PARSING & WATCHING
    // =========================================================================

    /// Read `path` and return a snapshot of every resolved setting.
    ///
    /// The format comes from the file extension, falling back to the
    /// [`ParserOption::ConfigType`] given at construction.
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let raw = {
            let mut state = self.write();
            state.store.read_in_config(path)?;
            state.store.all_settings()
        };
        Ok(Config::new(raw, self.clone()))
    }

    /// Watch `path` and invoke `callback` after each change to its settings.
    ///
    /// Once a change notification has settled (see
    /// [`SETTLE_DELAY`](crate::watcher::SETTLE_DELAY)) the file is re-read
    /// into the store; the callback runs only when the resolved settings
    /// actually differ, and never while the lock is held. A file that fails to parse mid-edit is
    /// logged and the previous settings are kept.
    ///
    /// Any existing watch on the same path is stopped first.
    pub fn watch<F>(&self, path: impl AsRef<Path>, callback: F) -> Result<()>
    where
        F: Fn() + Send + 'static,
    {
        let path = path.as_ref().to_path_buf();
        self.stop_watch(&path);

        let weak = Arc::downgrade(&self.shared);
        let watched = path.clone();
        let handle = watch_file(&path, move |signal| {
            if reload(&weak, &watched) && !signal.is_stopped() {
                callback();
            }
        })?;

        let replaced = self.write().watches.insert(path, handle);
        // a concurrent watch() on the same path lost the race
        if let Some(old) = replaced {
            old.stop();
        }
        Ok(())
    }

    /// Stop watching `path`. Does nothing if it is not watched.
    pub fn stop_watch(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let removed = self.write().watches.remove(path);
        // dropped outside the lock: a handler may be waiting on it
        if let Some(handle) = removed {
            handle.stop();
        }
    }

    pub fn is_watching(&self, path: impl AsRef<Path>) -> bool {
        self.read().watches.contains_key(path.as_ref())
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Resolve a dot-notation key, or `None` when it is unset.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().store.get(key)
    }

    pub fn get_string(&self, key: &str) -> String {
        self.get(key).map(|v| coerce::to_string(&v)).unwrap_or_default()
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.get(key).map(|v| coerce::to_int(&v)).unwrap_or_default()
    }

    pub fn get_float(&self, key: &str) -> f64 {
        self.get(key).map(|v| coerce::to_float(&v)).unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).map(|v| coerce::to_bool(&v)).unwrap_or_default()
    }

    pub fn get_string_map(&self, key: &str) -> Map<String, Value> {
        self.get(key)
            .map(|v| coerce::to_string_map(&v))
            .unwrap_or_default()
    }

    pub fn get_string_slice(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| coerce::to_string_slice(&v))
            .unwrap_or_default()
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.read().store.is_set(key)
    }

    /// The current settings tree with environment overrides applied.
    pub fn all_settings(&self) -> Map<String, Value> {
        self.read().store.all_settings()
    }

    pub fn all_keys(&self) -> Vec<String> {
        self.read().store.all_keys()
    }

    pub fn env_prefix(&self) -> String {
        self.read().store.env().prefix().to_string()
    }

    /// The file most recently loaded by a successful [`parse`](Self::parse).
    pub fn config_file(&self) -> Option<PathBuf> {
        self.read().store.config_file().map(Path::to_path_buf)
    }

    /// Run `f` against the underlying store under the read lock.
    pub fn with_store<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(&self.read().store)
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (config_file, env_prefix, watching) = {
            let state = self.read();
            let watching: Vec<PathBuf> = state.watches.keys().cloned().collect();
            (
                state.store.config_file().map(Path::to_path_buf),
                state.store.env().prefix().to_string(),
                watching,
            )
        };
        f.debug_struct("Parser")
            .field("config_file", &config_file)
            .field("env_prefix", &env_prefix)
            .field("watching", &watching)
            .finish()
    }
}

/// Re-read `path` into the store behind `shared`. Returns whether the
/// resolved settings changed.
fn reload(shared: &Weak<RwLock<State>>, path: &Path) -> bool {
    let Some(shared) = shared.upgrade() else {
        return false;
    };
    let mut state = shared.write().unwrap_or_else(PoisonError::into_inner);
    let settings = match state.store.read_file(path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("config reload failed, keeping current settings: {e}");
            return false;
        }
    };
    let changed = state.store.replace_settings(settings);
    if changed {
        info!("reloaded config from {}", path.display());
    } else {
        debug!("config file touched without changes: {}", path.display());
    }
    changed
}
