use colored::Colorize;

use crate::{event::LoggingEvent, priority::Priority};

/// Renders an event into a single line of text, trailing newline included.
pub trait Layout: Send + Sync {
    fn name(&self) -> &str;
    fn format(&self, event: &LoggingEvent) -> String;
}

impl<L: Layout + ?Sized> Layout for Box<L> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn format(&self, event: &LoggingEvent) -> String {
        (**self).format(event)
    }
}

/// `WARN     app.db - disk full`
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicLayout;

impl Layout for BasicLayout {
    fn name(&self) -> &str {
        "basic"
    }

    fn format(&self, event: &LoggingEvent) -> String {
        format!(
            "{:<8} {} - {}\n",
            event.priority, event.category, event.message
        )
    }
}

/// `20030501 12:00:01.250 WARN     app.db - disk full`
///
/// Time is UTC; the sub-second part is truncated to milliseconds.
/// Downstream tooling parses this exact shape, keep it stable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DatedLayout;

impl Layout for DatedLayout {
    fn name(&self) -> &str {
        "dated"
    }

    fn format(&self, event: &LoggingEvent) -> String {
        let time = event.timestamp.format("%Y%m%d %H:%M:%S%.3f");
        format!(
            "{time} {:<8} {} - {}\n",
            event.priority, event.category, event.message
        )
    }
}

/// Dated layout with the source location of the statement, when one was captured:
/// `20030501 12:00:01.250 WARN     app.db [src/db.rs:42] - disk full`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocatedLayout;

impl Layout for LocatedLayout {
    fn name(&self) -> &str {
        "located"
    }

    fn format(&self, event: &LoggingEvent) -> String {
        let Some(location) = &event.location else {
            return DatedLayout.format(event);
        };
        let time = event.timestamp.format("%Y%m%d %H:%M:%S%.3f");
        format!(
            "{time} {:<8} {} [{}:{}] - {}\n",
            event.priority, event.category, location.file, location.line, event.message
        )
    }
}

/// Terminal layout with the priority colored by severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColoredLayout;

impl Layout for ColoredLayout {
    fn name(&self) -> &str {
        "colored"
    }

    fn format(&self, event: &LoggingEvent) -> String {
        let time = event.timestamp.format("%Y-%m-%dT%H:%M:%S%.3f");
        let label = event.priority.as_str();
        let priority = match event.priority {
            Priority::Fatal | Priority::Alert => label.red().bold(),
            Priority::Crit | Priority::Error => label.red(),
            Priority::Warn => label.yellow(),
            Priority::Notice => label.cyan(),
            Priority::Info => label.green(),
            Priority::Debug => label.blue(),
            Priority::Trace | Priority::NotSet => label.purple(),
        };
        format!(
            "[{time} {} {priority}] {}\n",
            event.category, event.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LocationInfo;
    use chrono::{TimeZone, Utc};

    fn disk_full() -> LoggingEvent {
        let mut event = LoggingEvent::new("app.db".into(), Priority::Warn, "disk full".into());
        event.timestamp = Utc.with_ymd_and_hms(2003, 5, 1, 12, 0, 1).unwrap()
            + chrono::Duration::microseconds(250_999);
        event
    }

    #[test]
    fn test_dated_layout() {
        assert_eq!(
            DatedLayout.format(&disk_full()),
            "20030501 12:00:01.250 WARN     app.db - disk full\n"
        );
    }

    #[test]
    fn test_dated_layout_long_priority_name() {
        let mut event = disk_full();
        event.priority = Priority::Notice;
        event.timestamp = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(
            DatedLayout.format(&event),
            "19991231 23:59:59.000 NOTICE   app.db - disk full\n"
        );
    }

    #[test]
    fn test_located_layout() {
        let event = disk_full().with_location(Some(LocationInfo::new("src/db.rs", 42, "app::db")));
        assert_eq!(
            LocatedLayout.format(&event),
            "20030501 12:00:01.250 WARN     app.db [src/db.rs:42] - disk full\n"
        );
        // without a location it falls back to the dated shape
        assert_eq!(
            LocatedLayout.format(&disk_full()),
            DatedLayout.format(&disk_full())
        );
    }

    #[test]
    fn test_basic_layout() {
        assert_eq!(
            BasicLayout.format(&disk_full()),
            "WARN     app.db - disk full\n"
        );
    }

    #[test]
    fn test_colored_layout() {
        let line = ColoredLayout.format(&disk_full());
        assert!(line.starts_with("[2003-05-01T12:00:01.250 app.db "));
        assert!(line.contains("WARN"));
        assert!(line.ends_with("] disk full\n"));
    }
}
