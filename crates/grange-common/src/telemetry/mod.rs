//! Telemetry - tracing setup and the logging event publisher

mod event_log;
mod tracing_setup;

pub use event_log::LogEventPublisher;
pub use tracing_setup::{init_tracing, try_init_tracing, TracingConfig, TracingError};
