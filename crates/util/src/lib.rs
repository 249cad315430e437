//! Utility functions and configuration shared by the chatform crates.

pub mod config;
pub mod path_processing;

pub use config::{CONFIG_PATH_ENV, ConfigError, InputConfig, config_home};
pub use path_processing::expand_tilde;
