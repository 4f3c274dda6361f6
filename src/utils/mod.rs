//! Configuration utilities.

pub mod toml_config;

pub use toml_config::{ConfigError, GroundworkConfig, DEFAULT_CONFIG_FILE};
