//! Logging setup
//!
//! One rolling log file per process plus, in text mode, an ANSI stdout
//! stream. JSON mode writes the file only, with targets kept for queries.

use crate::config::AppConfig;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Connection-level chatter from the HTTP stack stays out of the logs
const QUIET_TARGETS: &str = "hyper=warn,hyper_util=warn,reqwest=warn";

/// Install the global subscriber. Keep the guard alive for the life of the
/// process or buffered lines are lost on exit.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let (writer, guard) = file_writer(config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let json_file = config.use_json.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer.clone())
            .with_ansi(false)
    });
    let text_file = (!config.use_json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(writer.clone())
            .with_ansi(false)
    });
    let stdout = (!config.use_json).then(|| fmt::layer().with_target(false).with_ansi(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_file)
        .with(text_file)
        .with(stdout)
        .init();

    guard
}

fn file_writer(config: &AppConfig) -> (NonBlocking, WorkerGuard) {
    let appender = RollingFileAppender::new(
        rotation(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    tracing_appender::non_blocking(appender)
}

/// `hourly`, `daily`, anything else never rotates
fn rotation(name: &str) -> Rotation {
    match name.trim().to_ascii_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

fn filter_directives(config: &AppConfig) -> String {
    format!("{},{}", config.log_level, QUIET_TARGETS)
}
