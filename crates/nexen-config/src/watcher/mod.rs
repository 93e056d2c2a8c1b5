//! File watching for live config reload.
//!
//! Uses the `notify` crate to watch a config file's directory and report
//! changes to that one file.

mod file_watcher;

#[cfg(test)]
mod tests;

pub use file_watcher::{watch_file, StopSignal, WatchHandle, SETTLE_DELAY};
