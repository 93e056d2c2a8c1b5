//! Core file watcher implementation.
//!
//! [`watch_file`] registers a `notify` watcher on the parent directory of a
//! config file and forwards Modify/Create events for that file to a handler.
//! Watching the directory rather than the file keeps the watch alive across
//! editors that save by writing a temp file and renaming it over the original.
//!
//! A single save shows up as several events (truncate, write, rename). Before
//! a change is reported the file must read back identically across a
//! [`SETTLE_DELAY`], so the handler never sees a half-written file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info};

use crate::error::{ConfigError, Result};

/// Quiet period a file must hold still for before its change is reported.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Upper bound on settle rounds for a file that keeps changing.
const MAX_SETTLE_ROUNDS: usize = 20;

/// Shared flag telling a running handler whether its watch was torn down.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// An active watch. Dropping it (or calling [`stop`](Self::stop)) ends the
/// watch; no handler invocation starts after that.
pub struct WatchHandle {
    path: PathBuf,
    signal: StopSignal,
    // notify watchers are Send but not guaranteed Sync
    _watcher: Mutex<RecommendedWatcher>,
}

impl WatchHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_active(&self) -> bool {
        !self.signal.is_stopped()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.signal.stop();
        debug!("stopped watching {}", self.path.display());
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("path", &self.path)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// Watch `path` and call `on_change` from the notify thread whenever the file
/// is modified or (re)created.
///
/// The file itself need not exist yet, but its directory must.
pub fn watch_file<F>(path: &Path, on_change: F) -> Result<WatchHandle>
where
    F: Fn(&StopSignal) + Send + 'static,
{
    let path = path.to_path_buf();
    let watch_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();

    let signal = StopSignal::default();
    let handler_signal = signal.clone();
    let path_for_event = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |result: std::result::Result<Event, notify::Error>| match result {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                let is_our_file = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().is_some_and(|n| n == file_name));
                if !is_our_file || handler_signal.is_stopped() {
                    return;
                }
                debug!(kind = ?event.kind, "config file change detected");
                wait_until_settled(&path_for_event);
                if handler_signal.is_stopped() {
                    return;
                }
                on_change(&handler_signal);
            }
            Err(e) => {
                error!("file watcher error: {e}");
            }
        },
        notify::Config::default(),
    )
    .map_err(|source| ConfigError::Watch {
        path: path.clone(),
        source,
    })?;

    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|source| ConfigError::Watch {
            path: path.clone(),
            source,
        })?;

    info!("started watching {}", path.display());

    Ok(WatchHandle {
        path,
        signal,
        _watcher: Mutex::new(watcher),
    })
}

/// Block until two reads of `path` one [`SETTLE_DELAY`] apart agree.
///
/// A missing file counts as a stable state of its own.
pub(crate) fn wait_until_settled(path: &Path) {
    let mut previous = std::fs::read(path).ok();
    for _ in 0..MAX_SETTLE_ROUNDS {
        std::thread::sleep(SETTLE_DELAY);
        let current = std::fs::read(path).ok();
        if current == previous {
            return;
        }
        previous = current;
    }
    debug!("{} still changing after settle window", path.display());
}
