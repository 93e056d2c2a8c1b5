//! Parsed configuration snapshots.

use serde::Serialize;
use serde_json::{Map, Value};

use super::Parser;
use crate::store::lookup_path;

/// The settings resolved by one [`Parser::parse`] call.
///
/// A snapshot: later parses or file reloads produce new values in the parser
/// but never change an existing `Config`.
#[derive(Clone, Serialize)]
pub struct Config {
    /// Every resolved setting, with environment overrides applied.
    pub raw: Map<String, Value>,
    #[serde(skip)]
    parser: Parser,
}

impl Config {
    pub(crate) fn new(raw: Map<String, Value>, parser: Parser) -> Self {
        Self { raw, parser }
    }

    /// Look up a dot-notation key in this snapshot.
    pub fn get(&self, key: &str) -> Option<&Value> {
        lookup_path(&self.raw, &key.trim().to_lowercase())
    }

    /// The parser that produced this snapshot, for live access.
    pub fn parser(&self) -> &Parser {
        &self.parser
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config").field("raw", &self.raw).finish_non_exhaustive()
    }
}
