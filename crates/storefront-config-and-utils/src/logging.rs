//! Logging initialization for the storefront client.
//!
//! Thin wrapper over the observability crate: every process writes structured
//! JSONL to `~/.storefront/logs/client.jsonl`, optionally mirrored to stderr.

use crate::Paths;
pub use observability::LogConfig;

/// Initialize the logging system.
///
/// * `service_name` - included in every log line (e.g. "cli")
/// * `level` - default filter when `RUST_LOG` is unset
/// * `also_stderr` - mirror human-readable lines to stderr
///
/// ```ignore
/// init_logging("cli", "info", &paths, false);
/// tracing::info!("ready");
/// ```
pub fn init_logging(service_name: &str, level: &str, paths: &Paths, also_stderr: bool) {
    observability::init_with_config(LogConfig {
        service_name: service_name.into(),
        default_level: parse_level(level).to_string().to_lowercase(),
        log_path: Some(paths.log_file()),
        also_stderr,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
