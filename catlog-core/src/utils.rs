use std::{
    sync::{Arc, Mutex, PoisonError},
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crossbeam_channel::{RecvTimeoutError, Sender, unbounded};

use crate::{
    appender::Appender,
    category::Category,
    config::CATLOG_CONFIG,
    event::LoggingEvent,
    layout::Layout,
    log_writer::LogWriter,
};

/// Guard that ensures threaded appenders are drained and joined when dropped.
/// Hold this guard for the lifetime of your logging session.
///
/// Appenders registered with [`LoggerGuard::detach_on_drop`] are removed from their
/// category first, so nothing keeps logging into a stopped writer thread.
#[derive(Default)]
pub struct LoggerGuard {
    appenders: Vec<Arc<ThreadedAppender>>,
    installed: Vec<(Arc<Category>, Arc<dyn Appender>)>,
}

impl LoggerGuard {
    pub fn new(appenders: Vec<Arc<ThreadedAppender>>) -> Self {
        Self {
            appenders,
            installed: Vec::new(),
        }
    }

    pub fn push(&mut self, appender: Arc<ThreadedAppender>) {
        self.appenders.push(appender);
    }

    /// Removes `appender` from `category` on drop, unless it was replaced meanwhile.
    pub fn detach_on_drop(&mut self, category: Arc<Category>, appender: Arc<dyn Appender>) {
        self.installed.push((category, appender));
    }
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        for (category, appender) in self.installed.drain(..) {
            category.remove_appender(&appender);
        }
        for appender in &self.appenders {
            appender.shutdown();
        }
    }
}

enum WriterMessage {
    Line(String),
    Flush,
    Shutdown,
}

/// Appender whose writer lives on a dedicated thread.
///
/// Lines are queued on an unbounded channel, written in batches and flushed
/// every `CATLOG_FLUSH_INTERVAL_MS`.
pub struct ThreadedAppender {
    name: String,
    layout: Box<dyn Layout>,
    sender: Sender<WriterMessage>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadedAppender {
    pub fn shutdown(&self) {
        let mut guard = self.handler.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = guard.take() {
            // the writer thread may already be gone, ignore a closed channel
            let _ = self.sender.send(WriterMessage::Shutdown);
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Drop for ThreadedAppender {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Appender for ThreadedAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn layout(&self) -> &dyn Layout {
        self.layout.as_ref()
    }

    fn append(&self, line: &str, _: &LoggingEvent) {
        let _ = self.sender.send(WriterMessage::Line(line.to_string()));
    }

    fn flush(&self) {
        let _ = self.sender.send(WriterMessage::Flush);
    }
}

/// Spawns the writer thread for `writer` and returns the appender feeding it.
pub fn spawn_log_thread<W: LogWriter + Send + 'static>(
    name: impl Into<String>,
    mut writer: W,
    layout: impl Layout + 'static,
) -> ThreadedAppender {
    let (sender, receiver) = unbounded::<WriterMessage>();
    let flush_interval = CATLOG_CONFIG.flush_interval.max(Duration::from_millis(1));
    let handler = std::thread::spawn(move || {
        let mut batch = Vec::with_capacity(32);
        let mut last_flush = Instant::now();
        loop {
            let timeout = flush_interval.saturating_sub(last_flush.elapsed());

            match receiver.recv_timeout(timeout.max(Duration::from_millis(1))) {
                Ok(msg) => {
                    batch.push(msg);
                    while let Ok(msg) = receiver.try_recv() {
                        batch.push(msg);
                        if batch.len() >= 32 {
                            break;
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if last_flush.elapsed() >= flush_interval {
                        writer.flush();
                        last_flush = Instant::now();
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    writer.flush();
                    break;
                }
            }

            let mut should_flush = false;
            let mut should_shutdown = false;
            for message in batch.drain(..) {
                match message {
                    WriterMessage::Line(line) => writer.write_line(&line),
                    WriterMessage::Flush => should_flush = true,
                    WriterMessage::Shutdown => {
                        should_shutdown = true;
                        break;
                    }
                }
            }

            if should_flush || should_shutdown || last_flush.elapsed() >= flush_interval {
                writer.flush();
                last_flush = Instant::now();
            }

            if should_shutdown {
                break;
            }
        }
    });
    ThreadedAppender {
        name: name.into(),
        layout: Box::new(layout),
        sender,
        handler: Mutex::new(Some(handler)),
    }
}
