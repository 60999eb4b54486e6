//! Infrastructure: configuration and other process-level concerns.

pub mod config;

pub use config::{ConfigError, ConfigLoader};
