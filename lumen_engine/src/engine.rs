/// Lumen engine - process-wide services
///
/// Rendering state lives in an explicit `RenderContext` owned by the
/// application loop. The only global here is the log sink, which every
/// subsystem (backend crates included) reaches through the `engine_*!` macros.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};

type SharedLogger = RwLock<Box<dyn Logger>>;

static LOGGER: OnceLock<SharedLogger> = OnceLock::new();

fn sink() -> &'static SharedLogger {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

/// Engine-wide services
///
/// ```no_run
/// use lumen_engine::lumen::{Engine, log::{LogEntry, Logger}};
///
/// struct Quiet;
/// impl Logger for Quiet {
///     fn log(&self, _entry: &LogEntry) {}
/// }
///
/// Engine::set_logger(Quiet);
/// ```
pub struct Engine;

impl Engine {
    /// Route all further log entries to `logger`
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        Self::install(Box::new(logger));
    }

    /// Go back to the colored console logger
    pub fn reset_logger() {
        Self::install(Box::new(DefaultLogger));
    }

    /// Emit an entry without a call site (TRACE..WARN macros)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::emit(severity, source, message, None);
    }

    /// Emit an entry tagged with `file:line` (ERROR macros)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::emit(severity, source, message, Some((file, line)));
    }

    fn install(logger: Box<dyn Logger>) {
        // A poisoned lock keeps the previous sink
        if let Ok(mut current) = sink().write() {
            *current = logger;
        }
    }

    fn emit(severity: LogSeverity, source: &str, message: String, site: Option<(&'static str, u32)>) {
        let entry = LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_owned(),
            message,
            file: site.map(|(file, _)| file),
            line: site.map(|(_, line)| line),
        };
        if let Ok(logger) = sink().read() {
            logger.log(&entry);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
