//! Diagnostic logging capability of the driver.
//!
//! The driver only talks to a `Logger`; which backend ends up printing the
//! records is the embedding application's choice. The default
//! [`FacadeLogger`] hands records to the `log` crate, so any `log` backend
//! (e.g. `pretty_env_logger`) picks them up.
use std::fmt;

/// Severity of a record. Ordered from most to least severe, so a filter
/// set to `Info` lets `Fatal..=Info` through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Level {
    fn as_log(self) -> log::Level {
        match self {
            Level::Fatal | Level::Error => log::Level::Error,
            Level::Warn => log::Level::Warn,
            Level::Info => log::Level::Info,
            Level::Debug => log::Level::Debug,
            Level::Trace => log::Level::Trace,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        f.pad(s)
    }
}

/// A leveled sink for diagnostic records.
///
/// Only `log` has to be implemented. Records never abort the process, not
/// even at `Fatal`.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    fn fatal(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Fatal, args)
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args)
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args)
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args)
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args)
    }

    fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, args)
    }
}

/// Forwards records up to `max` to the `log` facade under target `jsondb`.
pub struct FacadeLogger {
    max: Level,
}

impl FacadeLogger {
    pub fn new(max: Level) -> Self {
        FacadeLogger { max }
    }

    #[cfg(test)]
    fn max_level(&self) -> Level {
        self.max
    }

    fn enabled(&self, level: Level) -> bool {
        level <= self.max
    }
}

impl Default for FacadeLogger {
    fn default() -> Self {
        FacadeLogger::new(Level::Info)
    }
}

impl Logger for FacadeLogger {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        if level == Level::Fatal {
            log::log!(target: "jsondb", level.as_log(), "[fatal] {}", args);
        } else {
            log::log!(target: "jsondb", level.as_log(), "{}", args);
        }
    }
}
