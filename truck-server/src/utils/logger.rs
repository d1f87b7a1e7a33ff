//! Logging setup
//!
//! `RUST_LOG` wins when set; otherwise `LOG_LEVEL` (or `info`) applies to
//! this crate and to HTTP request tracing.

use std::path::Path;
use tracing_subscriber::EnvFilter;

fn env_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = log_level.unwrap_or("info");
        EnvFilter::new(format!("truck_server={level},tower_http={level}"))
    })
}

/// Initialize the logger, writing to a daily rolling file when `log_dir` exists
pub fn init_logger(log_level: Option<&str>, log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level))
        .with_file(false)
        .with_line_number(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "truck-server");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stdout");
    }

    subscriber.init();
}
