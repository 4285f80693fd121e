use std::{borrow::Cow, sync::Arc};

use chrono::{DateTime, Utc};

use crate::priority::Priority;

/// Source location of a logging statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationInfo {
    pub file: Cow<'static, str>,
    pub line: u32,
    pub module_path: Cow<'static, str>,
}

impl LocationInfo {
    pub const fn new(file: &'static str, line: u32, module_path: &'static str) -> Self {
        Self {
            file: Cow::Borrowed(file),
            line,
            module_path: Cow::Borrowed(module_path),
        }
    }
}

/// Event record handed to layouts and appenders once a category accepted it.
#[derive(Debug, Clone)]
pub struct LoggingEvent {
    pub timestamp: DateTime<Utc>,
    pub category: Arc<str>,
    pub priority: Priority,
    pub message: String,
    pub location: Option<LocationInfo>,
}

impl LoggingEvent {
    /// Builds an event stamped with the current UTC time.
    pub fn new(category: Arc<str>, priority: Priority, message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            category,
            priority,
            message,
            location: None,
        }
    }

    pub fn with_location(self, location: Option<LocationInfo>) -> Self {
        Self { location, ..self }
    }
}
