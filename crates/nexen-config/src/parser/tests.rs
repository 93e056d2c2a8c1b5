//! Tests for parser construction, parsing and typed accessors.

use super::*;
use crate::format::ConfigFormat;
use crate::ConfigError;
use serde_json::json;

fn write_config(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn default_env_prefix() {
    assert_eq!(Parser::new().env_prefix(), "nexen");
    assert_eq!(Parser::default().env_prefix(), crate::DEFAULT_ENV_PREFIX);
}

#[test]
fn options_apply_in_order() {
    let parser = Parser::with_options([
        ParserOption::env_prefix("first"),
        ParserOption::env_prefix("custom"),
    ]);
    assert_eq!(parser.env_prefix(), "custom");
}

#[test]
fn config_type_option_covers_extensionless_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "settings", "name = \"nexen\"\n");

    let err = Parser::new().parse(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));

    let parser = Parser::with_options([ParserOption::config_type(ConfigFormat::Toml)]);
    let config = parser.parse(&path).unwrap();
    assert_eq!(config.raw["name"], json!("nexen"));
}

#[test]
fn automatic_env_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "config.json", r#"{"mode": "file"}"#);
    std::env::set_var("NEXEN_PARSERTEST_NOENV_MODE", "env");

    let parser = Parser::with_options([
        ParserOption::env_prefix("nexen_parsertest_noenv"),
        ParserOption::automatic_env(false),
    ]);
    parser.parse(&path).unwrap();
    assert_eq!(parser.get_string("mode"), "file");
}

#[test]
fn env_key_replacer_option() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "config.yaml", "db:\n  host: localhost\n");
    std::env::set_var("NEXEN_PARSERTEST_REPL_DB__HOST", "db.internal");

    let parser = Parser::with_options([
        ParserOption::env_prefix("nexen_parsertest_repl"),
        ParserOption::env_key_replacer(".", "__"),
    ]);
    let config = parser.parse(&path).unwrap();
    assert_eq!(config.raw["db"]["host"], json!("db.internal"));
    assert_eq!(parser.get_string("db.host"), "db.internal");
}

#[test]
fn env_values_are_coerced() {
    std::env::set_var("NEXEN_PARSERTEST_COERCE_WORKERS", "8");
    std::env::set_var("NEXEN_PARSERTEST_COERCE_DEBUG", "true");
    std::env::set_var("NEXEN_PARSERTEST_COERCE_HOSTS", "a b c");

    let parser = Parser::with_options([ParserOption::env_prefix("nexen_parsertest_coerce")]);
    assert_eq!(parser.get_int("workers"), 8);
    assert!(parser.get_bool("debug"));
    assert_eq!(parser.get_string_slice("hosts"), vec!["a", "b", "c"]);
}

#[test]
fn missing_keys_yield_zero_values() {
    let parser = Parser::with_options([ParserOption::env_prefix("nexen_parsertest_missing")]);
    assert_eq!(parser.get("nope"), None);
    assert_eq!(parser.get_string("nope"), "");
    assert_eq!(parser.get_int("nope"), 0);
    assert_eq!(parser.get_float("nope"), 0.0);
    assert!(!parser.get_bool("nope"));
    assert!(parser.get_string_map("nope").is_empty());
    assert!(parser.get_string_slice("nope").is_empty());
    assert!(!parser.is_set("nope"));
}

#[test]
fn snapshot_is_not_mutated_by_later_parse() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_config(&dir, "a.json", r#"{"key": "a"}"#);
    let second = write_config(&dir, "b.json", r#"{"key": "b"}"#);

    let parser = Parser::new();
    let a = parser.parse(&first).unwrap();
    let b = parser.parse(&second).unwrap();

    assert_eq!(a.get("key"), Some(&json!("a")));
    assert_eq!(b.get("key"), Some(&json!("b")));
    assert_eq!(a.parser().get_string("key"), "b");
    assert_eq!(parser.config_file(), Some(second));
}

#[test]
fn failed_parse_keeps_previous_settings() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_config(&dir, "good.json", r#"{"key": "value"}"#);
    let bad = write_config(&dir, "bad.json", "{invalid");

    let parser = Parser::new();
    parser.parse(&good).unwrap();
    let err = parser.parse(&bad).unwrap_err();

    assert_eq!(err.path(), bad.as_path());
    assert_eq!(parser.get_string("key"), "value");
    assert_eq!(parser.config_file(), Some(good));
}

#[test]
fn whole_floats_read_back_without_fraction() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "config.toml", "ratio = 1.0\nscale = 2.5\n");

    let parser = Parser::with_options([ParserOption::env_prefix("nexen_parsertest_floats")]);
    parser.parse(&path).unwrap();
    assert_eq!(parser.get_string("ratio"), "1");
    assert_eq!(parser.get_string("scale"), "2.5");
    assert_eq!(parser.get_float("ratio"), 1.0);
}

#[test]
fn all_settings_and_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "config.toml", "[server]\nport = 8080\nhost = \"::\"\n");

    let parser = Parser::with_options([ParserOption::env_prefix("nexen_parsertest_all")]);
    parser.parse(&path).unwrap();

    assert_eq!(parser.all_settings()["server"]["port"], json!(8080));
    assert_eq!(parser.all_keys(), vec!["server.host", "server.port"]);
    assert_eq!(parser.with_store(|s| s.file_settings().len()), 1);
}

#[test]
fn config_serializes_raw_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "config.json", r#"{"a": {"b": [1, 2]}}"#);

    let config = Parser::with_options([ParserOption::env_prefix("nexen_parsertest_ser")])
        .parse(&path)
        .unwrap();
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json, json!({"raw": {"a": {"b": [1, 2]}}}));
    assert_eq!(config.get("A.B"), Some(&json!([1, 2])));
}

#[test]
fn stop_watch_on_unwatched_path_is_noop() {
    let parser = Parser::new();
    parser.stop_watch("/tmp/nexen_never_watched.json");
    assert!(!parser.is_watching("/tmp/nexen_never_watched.json"));
}

#[test]
fn debug_output_lists_watches() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "config.json", "{}");

    let parser = Parser::new();
    parser.watch(&path, || {}).unwrap();
    let debug = format!("{parser:?}");
    assert!(debug.contains("config.json"), "{debug}");
    assert!(debug.contains("nexen"), "{debug}");
}
