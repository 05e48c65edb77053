//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber: JSON or pretty
//! stdout formatting, optional daily/hourly/never file rotation.

mod config;
mod logger;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerInit;
