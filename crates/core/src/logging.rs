//! Logging infrastructure for pdfqa.
//!
//! Logs go to stderr; stdout carries answers and JSON output only.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Initialize the tracing subscriber with stderr output.
///
/// `log_level` accepts any `EnvFilter` directive (e.g. "debug" or
/// "pdfqa_knowledge=trace,info"). When absent, `RUST_LOG` is used, then "info".
///
/// # Example
/// ```no_run
/// use pdfqa_core::logging::init_logging;
///
/// init_logging(Some("debug"), true).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, no_color: bool) -> AppResult<()> {
    let env_filter = build_filter(log_level)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(!no_color && supports_color());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}

fn build_filter(log_level: Option<&str>) -> AppResult<EnvFilter> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_str = log_level.unwrap_or(&default_level);

    EnvFilter::try_new(filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {}", filter_str, e)))
}

fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        assert!(build_filter(Some("debug")).is_ok());
        assert!(build_filter(Some("pdfqa_knowledge=trace,info")).is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let err = build_filter(Some("pdfqa=notalevel")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_init_logging() {
        // Only the first call per process installs the subscriber
        let result = init_logging(Some("warn"), true);
        assert!(result.is_ok() || result.is_err());
    }
}
