//! # grange-common
//!
//! Shared utilities: application configuration, the application error type,
//! and telemetry setup (tracing subscriber + the default event publisher).

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{AppConfig, ConfigError, Environment};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{init_tracing, try_init_tracing, LogEventPublisher, TracingConfig};
