//! CLI module containing argument parsing and configuration loading

pub mod args;
pub mod config;

pub use args::{Args, NumberFilter};
pub use config::{default_config_path, AppConfig, ConfigError, LoggingConfig};
