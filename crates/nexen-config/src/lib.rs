//! Nexen configuration parsing.
//!
//! A narrow wrapper over the serde format crates and `notify`: parse a JSON,
//! YAML or TOML file, read values by dot-notation key with environment
//! overrides, and get called back when the file changes on disk.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nexen_config::{Parser, ParserOption};
//!
//! let parser = Parser::with_options([ParserOption::env_prefix("myapp")]);
//! let config = parser.parse("config.yaml").expect("failed to parse config");
//! println!("{:?}", config.raw);
//!
//! // MYAPP_SERVER_PORT overrides server.port from the file
//! let port = parser.get_int("server.port");
//!
//! parser
//!     .watch("config.yaml", || println!("config changed"))
//!     .expect("failed to watch config");
//! # let _ = port;
//! ```

mod coerce;
pub mod env;
pub mod error;
pub mod format;
pub mod parser;
pub mod store;
pub mod watcher;

pub use env::{EnvBinding, DEFAULT_ENV_PREFIX};
pub use error::{ConfigError, Result};
pub use format::ConfigFormat;
pub use parser::{Config, Parser, ParserOption};
pub use store::Store;
