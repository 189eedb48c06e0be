//! Application runtime support: layered configuration and logging bootstrap.

pub mod config;
pub mod logging;

pub use config::{default_logging_config, AppConfig, DatabaseConfig, LoggingConfig, Section};
