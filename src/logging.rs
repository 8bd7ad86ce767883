//! Structured logging with rotation and run correlation.
//!
//! Console output plus a daily-rotating file through a non-blocking writer,
//! with a UUID run id for correlating a batch run across both sinks.
//!
//! Environment variables:
//! - LOG_FORMAT=pretty|json (default: pretty)
//! - LOG_DIR=/path/to/logs (default: ./logs)
//! - RUN_ID=<uuid> (default: auto-generated)
//! - RUST_LOG=level (default: info)

use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

/// Logging format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub log_dir: String,
    pub run_id: Uuid,
    pub filter: String,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            format: LogFormat::from_env(),
            log_dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
            run_id: run_id_from_env(),
            filter: std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "info,cfb_penalty_pipeline=info,hyper=warn,reqwest=warn".to_string()
            }),
        }
    }
}

/// Initialize logging with file rotation and run correlation.
///
/// Returns a WorkerGuard that must be kept alive for the program lifetime so
/// the non-blocking writer flushes before exit.
pub fn init_logging() -> WorkerGuard {
    let config = LogConfig::from_env();

    if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
        eprintln!("Failed to create log directory: {}", e);
    }

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "penalty_pipeline.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match config.format {
        LogFormat::Pretty => {
            // Readable console, compact file with full targets for grepping.
            let console_layer = fmt::layer()
                .with_writer(io::stdout)
                .with_target(false)
                .with_ansi(true)
                .with_filter(env_filter.clone());
            let file_layer = fmt::layer()
                .with_writer(non_blocking_file)
                .with_target(true)
                .with_ansi(false)
                .compact()
                .with_filter(env_filter);
            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .init();
        }
        LogFormat::Json => {
            let console_layer = fmt::layer()
                .with_writer(io::stdout)
                .with_ansi(false)
                .json()
                .flatten_event(true)
                .with_filter(env_filter.clone());
            let file_layer = fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .json()
                .flatten_event(true)
                .with_filter(env_filter);
            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .init();
        }
    }

    tracing::info!(
        run_id = %config.run_id,
        log_format = ?config.format,
        log_dir = %config.log_dir,
        "Logging initialized"
    );

    guard
}

/// Run id from RUN_ID, or a fresh UUID. Used for the root span.
pub fn run_id_from_env() -> Uuid {
    std::env::var("RUN_ID")
        .ok()
        .and_then(|s| Uuid::parse_str(&s).ok())
        .unwrap_or_else(Uuid::new_v4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_default_is_pretty() {
        std::env::remove_var("LOG_FORMAT");
        assert_eq!(LogFormat::from_env(), LogFormat::Pretty);
    }

    #[test]
    fn test_run_id_roundtrip() {
        let fixed = Uuid::new_v4();
        std::env::set_var("RUN_ID", fixed.to_string());
        assert_eq!(run_id_from_env(), fixed);
        std::env::remove_var("RUN_ID");

        // Without RUN_ID each call generates a fresh id.
        assert_ne!(run_id_from_env(), run_id_from_env());
    }
}
