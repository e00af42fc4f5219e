//! Structured console logging with per-module debug control
//!
//! Standard levels (Error/Warning/Info/Debug) with colored output. Debug
//! messages are hidden unless enabled globally with `--debug` or per
//! subsystem with `--debug-<module>` (e.g. `--debug-coordinator`).
//!
//! Call [`init`] once at startup, before any logging occurs.

mod format;
mod levels;
mod tags;

pub use levels::LogLevel;
pub use tags::LogTag;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
struct LoggerConfig {
    debug_all: bool,
    debug_tags: HashSet<String>,
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> = Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Initialize the logger from command-line arguments.
///
/// Scans for `--debug` and `--debug-<module>` flags and configures the
/// per-tag debug gates accordingly.
pub fn init() {
    init_from_args(std::env::args().collect::<Vec<_>>());
}

fn init_from_args(args: Vec<String>) {
    let mut config = LoggerConfig::default();
    for arg in &args {
        if arg == "--debug" {
            config.debug_all = true;
        } else if let Some(module) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(module.to_string());
        }
    }
    *LOGGER_CONFIG.write() = config;
}

fn should_log(tag: LogTag, level: LogLevel) -> bool {
    if level != LogLevel::Debug {
        return true;
    }
    let config = LOGGER_CONFIG.read();
    config.debug_all || config.debug_tags.contains(tag.to_debug_key())
}

fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if should_log(tag, level) {
        format::format_and_log(tag, level, message);
    }
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (degraded but recoverable conditions)
pub fn warning(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operational messages)
pub fn info(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (only shown with --debug or --debug-<module>)
pub fn debug(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Debug, message);
}
