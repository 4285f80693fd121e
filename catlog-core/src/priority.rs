use std::{fmt, str::FromStr};

use log::{Level, LevelFilter};

use crate::error::Error;

/// Severity of a log event.
///
/// Numeric values follow the classic ladder where a lower value is more severe.
/// The derived ordering follows the numeric value, so `Fatal < Alert < ... < Trace < NotSet`,
/// and a category accepts an event when its chained priority is `>=` the event priority.
///
/// `NotSet` is not a severity: on a category it means "inherit from the parent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum Priority {
    Fatal = 0,
    Alert = 100,
    Crit = 200,
    Error = 300,
    Warn = 400,
    Notice = 500,
    Info = 600,
    Debug = 700,
    Trace = 800,
    NotSet = 900,
}

impl Priority {
    /// Every priority from the most to the least severe, `NotSet` last.
    pub const ALL: [Priority; 10] = [
        Priority::Fatal,
        Priority::Alert,
        Priority::Crit,
        Priority::Error,
        Priority::Warn,
        Priority::Notice,
        Priority::Info,
        Priority::Debug,
        Priority::Trace,
        Priority::NotSet,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Fatal => "FATAL",
            Priority::Alert => "ALERT",
            Priority::Crit => "CRIT",
            Priority::Error => "ERROR",
            Priority::Warn => "WARN",
            Priority::Notice => "NOTICE",
            Priority::Info => "INFO",
            Priority::Debug => "DEBUG",
            Priority::Trace => "TRACE",
            Priority::NotSet => "NOTSET",
        }
    }

    pub const fn value(self) -> u16 {
        self as u16
    }

    /// Maps a raw value back to a priority.
    /// Values are rounded down to the hundred; anything past `NotSet` is `NotSet`.
    pub const fn from_value(value: u16) -> Self {
        match value / 100 {
            0 => Priority::Fatal,
            1 => Priority::Alert,
            2 => Priority::Crit,
            3 => Priority::Error,
            4 => Priority::Warn,
            5 => Priority::Notice,
            6 => Priority::Info,
            7 => Priority::Debug,
            8 => Priority::Trace,
            _ => Priority::NotSet,
        }
    }

    pub const fn is_set(self) -> bool {
        !matches!(self, Priority::NotSet)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownPriority(s.to_string()))
    }
}

impl From<Level> for Priority {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => Priority::Error,
            Level::Warn => Priority::Warn,
            Level::Info => Priority::Info,
            Level::Debug => Priority::Debug,
            Level::Trace => Priority::Trace,
        }
    }
}

impl From<Priority> for LevelFilter {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Fatal | Priority::Alert | Priority::Crit | Priority::Error => {
                LevelFilter::Error
            }
            Priority::Warn => LevelFilter::Warn,
            Priority::Notice | Priority::Info => LevelFilter::Info,
            Priority::Debug => LevelFilter::Debug,
            Priority::Trace | Priority::NotSet => LevelFilter::Trace,
        }
    }
}
