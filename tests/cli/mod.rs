//! CLI Integration Test Modules

pub mod argument_parsing;
pub mod summing;
pub mod toml_config;
