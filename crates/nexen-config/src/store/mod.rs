//! The settings store wrapped by [`Parser`](crate::Parser).
//!
//! Holds the decoded file settings together with the environment binding
//! and resolves dot-notation keys against both.

mod settings_store;


pub(crate) use settings_store::lookup_path;
pub use settings_store::Store;
