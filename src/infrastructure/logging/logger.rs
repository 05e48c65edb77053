//! Global `tracing` subscriber initialization (SPEC_FULL §B).

use super::config::{LogConfig, LogFormat, RotationPolicy};
use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initializes the process-wide `tracing` subscriber and owns the
/// non-blocking file-appender guard, if any, for its lifetime.
pub struct LoggerInit {
    _guard: Option<WorkerGuard>,
}

impl LoggerInit {
    /// Initialize the logger from the given configuration. JSON or pretty
    /// stdout formatting, optional daily/hourly/never file rotation, and an
    /// `EnvFilter` seeded from `RUST_LOG` with `config.level` as the default
    /// directive when unset.
    pub fn init(config: &LogConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let env_filter =
            EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

        let guard = if let Some(ref log_dir) = config.log_dir {
            let file_appender = match config.rotation {
                RotationPolicy::Daily => rolling::daily(log_dir, "taskwing.log"),
                RotationPolicy::Hourly => rolling::hourly(log_dir, "taskwing.log"),
                RotationPolicy::Never => rolling::never(log_dir, "taskwing.log"),
            };
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter.clone());

            if config.enable_stdout {
                match config.format {
                    LogFormat::Json => {
                        let stdout_layer = tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(io::stdout)
                            .with_target(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_filter(env_filter);
                        tracing_subscriber::registry().with(file_layer).with(stdout_layer).init();
                    }
                    LogFormat::Pretty => {
                        let stdout_layer = tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(io::stdout)
                            .with_target(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_span_events(FmtSpan::CLOSE)
                            .with_filter(env_filter);
                        tracing_subscriber::registry().with(file_layer).with(stdout_layer).init();
                    }
                }
            } else {
                tracing_subscriber::registry().with(file_layer).init();
            }

            Some(guard)
        } else {
            match config.format {
                LogFormat::Json => {
                    let stdout_layer = tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(io::stdout)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_filter(env_filter);
                    tracing_subscriber::registry().with(stdout_layer).init();
                }
                LogFormat::Pretty => {
                    let stdout_layer = tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(io::stdout)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_filter(env_filter);
                    tracing_subscriber::registry().with(stdout_layer).init();
                }
            }
            None
        };

        tracing::info!(
            level = %config.level,
            format = ?config.format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("invalid log level: {level}"),
    }
}

pub use tracing::{debug, error, info, instrument, trace, warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_log_level_accepts_known_levels_case_insensitively() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("DEBUG"), Ok(Level::DEBUG)));
        assert!(matches!(parse_log_level("Info"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("warn"), Ok(Level::WARN)));
        assert!(matches!(parse_log_level("error"), Ok(Level::ERROR)));
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn init_stdout_only_succeeds() {
        let config = LogConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::Never,
            retention_days: 30,
        };
        // Initializes a process-global subscriber; safe to call once per
        // test binary. Further init attempts in the same process are
        // expected to fail, which is why this is the crate's only such test.
        let _ = LoggerInit::init(&config);
    }
}
