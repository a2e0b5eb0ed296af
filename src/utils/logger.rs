//! Logging Infrastructure
//!
//! Structured logging setup for development and production environments.
//! With a log directory configured, output goes to stdout and to a daily
//! rolling file; otherwise stdout only.

use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let registry = tracing_subscriber::registry().with(filter).with(console);

    // Add file output alongside the console if log_dir exists
    if let Some(dir) = log_dir
        && Path::new(dir).exists()
    {
        let file_appender = tracing_appender::rolling::daily(dir, "swaad-server");
        let file = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(file_appender);
        let _ = registry.with(file).try_init();
        return;
    }

    let _ = registry.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_keeps_console_layer() {
        let dir = tempfile::tempdir().expect("tempdir");
        init_logger_with_file(Some("info"), dir.path().to_str());

        tracing::info!("logger smoke test");

        // a rolling file was created next to the console output
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read log dir")
            .collect();
        assert!(!entries.is_empty());
    }
}
