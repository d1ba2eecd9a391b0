//! Shared utilities for the market forum workspace
//!
//! This crate provides logging setup and application-level configuration
//! used by the engine and the command-line front end.

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
