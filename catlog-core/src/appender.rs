use std::{
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    event::LoggingEvent,
    layout::{BasicLayout, DatedLayout, Layout},
    log_writer::{LogFile, LogStderr, LogStdout, LogWriter},
};

/// Output sink attached to categories.
///
/// Dispatch renders the event with [`Appender::layout`] and then calls [`Appender::append`]
/// with the finished line and the raw event.
pub trait Appender: Send + Sync {
    fn name(&self) -> &str;
    fn layout(&self) -> &dyn Layout;
    fn append(&self, line: &str, event: &LoggingEvent);
    fn flush(&self) {}

    /// Renders `event` with this appender's layout and appends the line.
    fn handle(&self, event: &LoggingEvent) {
        self.append(&self.layout().format(event), event);
    }
}

/// Appender writing synchronously on the calling thread.
pub struct WriterAppender<W> {
    name: String,
    layout: Box<dyn Layout>,
    writer: Mutex<W>,
}

impl<W: LogWriter + Send> WriterAppender<W> {
    pub fn new(name: impl Into<String>, writer: W, layout: impl Layout + 'static) -> Self {
        Self {
            name: name.into(),
            layout: Box::new(layout),
            writer: Mutex::new(writer),
        }
    }
}

impl WriterAppender<LogStdout> {
    pub fn stdout() -> Self {
        Self::new("stdout", LogStdout, DatedLayout)
    }
}

impl WriterAppender<LogStderr> {
    pub fn stderr() -> Self {
        Self::new("stderr", LogStderr, DatedLayout)
    }
}

impl WriterAppender<LogFile> {
    /// File appender named after the path, with the dated layout.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let name = path.as_ref().display().to_string();
        Ok(Self::new(name, LogFile::new(path)?, DatedLayout))
    }
}

impl<W: LogWriter + Send> Appender for WriterAppender<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn layout(&self) -> &dyn Layout {
        self.layout.as_ref()
    }

    fn append(&self, line: &str, _: &LoggingEvent) {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_line(line);
    }

    fn flush(&self) {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush();
    }
}

/// Forwards every event to several appenders, each rendering with its own layout.
pub struct FanoutAppender {
    name: String,
    appenders: Vec<Arc<dyn Appender>>,
}

impl FanoutAppender {
    pub fn new(name: impl Into<String>, appenders: Vec<Arc<dyn Appender>>) -> Self {
        Self {
            name: name.into(),
            appenders,
        }
    }

    pub fn appenders(&self) -> &[Arc<dyn Appender>] {
        &self.appenders
    }
}

impl Appender for FanoutAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn layout(&self) -> &dyn Layout {
        &BasicLayout
    }

    /// Pushes an already rendered line to every member as is.
    fn append(&self, line: &str, event: &LoggingEvent) {
        for appender in &self.appenders {
            appender.append(line, event);
        }
    }

    fn flush(&self) {
        for appender in &self.appenders {
            appender.flush();
        }
    }

    fn handle(&self, event: &LoggingEvent) {
        for appender in &self.appenders {
            appender.handle(event);
        }
    }
}


#[test]
fn test_file_appender_uses_dated_layout() {
    let path = "/tmp/catlog_test_file_appender.log";
    std::fs::remove_file(path).ok();
    let appender = WriterAppender::file(path).unwrap();
    assert_eq!(appender.name(), path);
    assert_eq!(appender.layout().name(), "dated");

    let event = LoggingEvent::new("app".into(), crate::Priority::Info, "started".into());
    let line = appender.layout().format(&event);
    appender.append(&line, &event);
    appender.flush();
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.ends_with(" INFO     app - started\n"));
}

#[test]
fn test_fanout_renders_per_member() {
    let dated = "/tmp/catlog_test_fanout_dated.log";
    let basic = "/tmp/catlog_test_fanout_basic.log";
    std::fs::remove_file(dated).ok();
    std::fs::remove_file(basic).ok();
    let fanout = FanoutAppender::new(
        "both",
        vec![
            Arc::new(WriterAppender::file(dated).unwrap()) as Arc<dyn Appender>,
            Arc::new(WriterAppender::new(
                "basic",
                LogFile::new(basic).unwrap(),
                BasicLayout,
            )),
        ],
    );
    assert_eq!(fanout.appenders().len(), 2);

    let event = LoggingEvent::new("app.db".into(), crate::Priority::Error, "boom".into());
    fanout.handle(&event);
    fanout.flush();
    assert_eq!(
        std::fs::read_to_string(basic).unwrap(),
        "ERROR    app.db - boom\n"
    );
    let dated_line = std::fs::read_to_string(dated).unwrap();
    assert!(dated_line.ends_with(" ERROR    app.db - boom\n"));
    assert_ne!(dated_line.len(), "ERROR    app.db - boom\n".len());
}
