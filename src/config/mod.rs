//! Configuration
//!
//! Layered settings: built-in defaults, `config/default.toml`,
//! `config/{environment}.toml`, then `APP__`-prefixed environment variables.

mod settings;

pub use settings::*;
