//! The [`Parser`] wrapper: synchronized access to a settings [`Store`],
//! plus per-file watch registration.
//!
//! [`Store`]: crate::store::Store

mod config;
mod manager;
mod options;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use manager::Parser;
pub use options::ParserOption;
