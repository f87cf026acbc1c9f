//! Engine log routing
//!
//! Every engine message goes through a single global [`Logger`] held by
//! [`Engine`](crate::lumen::Engine). The default sink prints colored lines to
//! stdout; applications and tests install their own sink to capture or
//! redirect output. ERROR entries carry the `file:line` of the call site.

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use std::fmt;
use std::time::SystemTime;

/// Destination for engine log entries
///
/// ```no_run
/// use lumen_engine::lumen::log::{LogEntry, Logger};
///
/// struct Stderr;
///
/// impl Logger for Stderr {
///     fn log(&self, entry: &LogEntry) {
///         eprintln!("{}", entry);
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One emitted message
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Emitting component, e.g. "lumen::Buffer" or "lumen::opengl"
    pub source: String,
    pub message: String,
    /// Call site, filled for ERROR entries only
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

impl LogEntry {
    /// `file:line` of the call site when known
    pub fn location(&self) -> Option<String> {
        match (self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        }
    }
}

impl fmt::Display for LogEntry {
    /// Uncolored `[SEVERITY] [source] message (file:line)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] {}", self.severity.label(), self.source, self.message)?;
        if let Some(location) = self.location() {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}

/// Ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    /// Slow paths and recoverable anomalies (e.g. a fence that keeps the CPU waiting)
    Warn,
    /// Failures; logged with the call site
    Error,
}

impl LogSeverity {
    /// Fixed-width tag used in console output
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    fn painted(self) -> ColoredString {
        let label = self.label();
        match self {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        }
    }
}

/// Console sink installed until [`Engine::set_logger`](crate::lumen::Engine::set_logger) replaces it
///
/// Lines look like `[2026-01-01 12:00:00.000] [WARN ] [lumen::Buffer] message`,
/// with ` (file:line)` appended to errors.
pub struct DefaultLogger;

impl DefaultLogger {
    fn stamp(timestamp: SystemTime) -> String {
        let local: DateTime<Local> = timestamp.into();
        local.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let mut line = format!(
            "[{}] [{}] [{}] {}",
            Self::stamp(entry.timestamp),
            entry.severity.painted(),
            entry.source.bright_blue(),
            entry.message,
        );
        if let Some(location) = entry.location() {
            line.push_str(&format!(" ({})", location));
        }
        println!("{}", line);
    }
}

// ===== LOGGING MACROS =====

/// Shared body of the severity macros; not part of the public surface
#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::lumen::Engine::log(
            $crate::lumen::log::LogSeverity::$severity,
            $source,
            format!($($arg)*),
        )
    };
}

#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Trace, $source, $($arg)*) };
}

/// ```no_run
/// lumen_engine::engine_debug!("lumen::Buffer", "Allocated {} slots", 3);
/// ```
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Debug, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Info, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Warn, $source, $($arg)*) };
}

/// ERROR entry tagged with the caller's `file!()`/`line!()`
///
/// ```no_run
/// lumen_engine::engine_error!("lumen::opengl", "glFenceSync failed: {}", "out of memory");
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::lumen::Engine::log_detailed(
            $crate::lumen::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!(),
        )
    };
}

/// Logs like [`engine_error!`] and evaluates to `Error::BackendError` with the same text
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::lumen::Error::BackendError(message)
    }};
}

/// `return Err(engine_err!(..))`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
