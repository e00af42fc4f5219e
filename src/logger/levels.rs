/// Severity of a console log line.
///
/// The discriminants order levels so a simple comparison can act as a
/// threshold. Everything up to Info always prints; Debug stays hidden
/// until a `--debug` flag opens it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Critical failures, never filtered
    Error = 0,
    /// Degraded but recoverable conditions
    Warning = 1,
    /// Normal operational messages
    Info = 2,
    /// Diagnostic detail, gated by --debug / --debug-<module>
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
