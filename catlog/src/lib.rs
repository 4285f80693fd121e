//! # catlog
//! Hierarchical category logger with priority inheritance.
//!
//! Categories are named with dotted paths (`app`, `app.db`, `app.db.pool`).
//! A category without an explicit priority uses the priority of its nearest
//! ancestor, and the `root` category always has one.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! catlog = "0.1.0"
//! ```
//!
//! ```rust
//! use catlog::{Priority, logger_config};
//!
//! let _guard = logger_config()
//!     .with_root_priority(Priority::Info)
//!     .with_priority("app.db", Priority::Debug)
//!     .init_global();
//!
//! let db = catlog::category("app.db");
//! db.debug(|| "connection pool ready");
//! catlog::catlog!(db, Priority::Notice, "{} connections", 8);
//! // guard ensures logs are flushed when dropped
//! ```
//!
//! ## `log` crate integration
//! Once initialized, `log` records are routed to the category named after their
//! target, with `::` replaced by `.`.
//!
//! ```rust
//! use catlog::{Priority, logger_config};
//!
//! let _guard = logger_config()
//!     .with_root_priority(Priority::Warn)
//!     .with_priority("app.db", Priority::Trace)
//!     .init_global();
//!
//! log::info!(target: "app::net", "dropped, app.net inherits WARN from root");
//! log::trace!(target: "app::db", "kept, app.db is at TRACE");
//! ```
//!
//! ## Logging to files
//! The log file is created if it does not exist and appended to if it does.
//! File lines use the dated layout: `20030501 12:00:01.250 WARN     app.db - disk full`.
//!
//! ```rust
//! use catlog::logger_config;
//!
//! let _guard = logger_config()
//!     .with_log_file("/tmp/catlog_app.log")
//!     .expect("Unable to create log file")
//!     .no_stdout() // disable stdout logging if needed
//!     .init_global();
//!
//! catlog::category("app").warn(|| "Hello, world!");
//! drop(_guard); // ensure logs are flushed
//! assert!(std::fs::read_to_string("/tmp/catlog_app.log").unwrap().ends_with("app - Hello, world!\n"));
//! ```
//!
//! ## Explicit registries
//! [`ConfigBuilder::build`] returns a registry without touching global state.
//!
//! ```rust
//! use catlog::{Priority, logger_config};
//!
//! let (registry, _guard) = logger_config()
//!     .no_stdout()
//!     .with_root_priority(Priority::Error)
//!     .build();
//! assert!(!registry.get_or_create("app").is_warn_enabled());
//! ```

use std::{
    borrow::Cow,
    path::Path,
    sync::{Arc, LazyLock},
};

use log::{LevelFilter, Log};

pub use catlog_core::{
    Appender, BasicLayout, CATLOG_CONFIG, Category, ColoredLayout, DatedLayout, DefaultAppender,
    Error, FanoutAppender, Layout, LocatedLayout, LocationInfo, LogFile, LogStderr, LogStdout, LogWriter,
    LoggerGuard, LoggingEvent, Priority, Registry, Result, ThreadedAppender, WriterAppender,
    catlog, spawn_log_thread,
};

/// Registry used by the `log` bridge and the global helpers.
/// It lives for the whole process; [`ConfigBuilder::init_global`] configures it in place.
static GLOBAL_REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    // another logger may already be installed, categories still work standalone
    let _ = log::set_boxed_logger(Box::new(CatLogger));
    log::set_max_level(LevelFilter::Trace);
    let registry = Registry::new();
    let console: Option<Arc<dyn Appender>> = match CATLOG_CONFIG.appender {
        DefaultAppender::Stdout => Some(Arc::new(WriterAppender::new(
            "stdout",
            LogStdout,
            ColoredLayout,
        ))),
        DefaultAppender::Stderr => Some(Arc::new(WriterAppender::new(
            "stderr",
            LogStderr,
            ColoredLayout,
        ))),
        DefaultAppender::None => None,
    };
    if let Some(console) = console {
        registry.root().set_appender(console);
    }
    registry
});

/// The process-global registry.
pub fn registry() -> Registry {
    GLOBAL_REGISTRY.clone()
}

/// Category `name` of the process-global registry.
pub fn category(name: &str) -> Arc<Category> {
    registry().get_or_create(name)
}

/// Category name for a `log` target: `my_crate::db` becomes `my_crate.db`.
fn category_name(target: &str) -> Cow<'_, str> {
    if target.contains("::") {
        Cow::Owned(target.replace("::", "."))
    } else {
        Cow::Borrowed(target)
    }
}

/// Bridge from the `log` facade to the global registry.
struct CatLogger;

impl Log for CatLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        category(&category_name(metadata.target())).is_priority_enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let category = category(&category_name(record.target()));
        let priority = Priority::from(record.level());
        if !category.is_priority_enabled(priority) {
            return;
        }
        let location = record.line().map(|line| LocationInfo {
            file: record
                .file_static()
                .map(Cow::Borrowed)
                .or_else(|| record.file().map(|f| Cow::Owned(f.to_string())))
                .unwrap_or_default(),
            line,
            module_path: record
                .module_path_static()
                .map(Cow::Borrowed)
                .or_else(|| record.module_path().map(|m| Cow::Owned(m.to_string())))
                .unwrap_or_default(),
        });
        category.log_args(priority, *record.args(), location);
    }

    fn flush(&self) {
        for category in registry().categories() {
            if let Some(appender) = category.appender() {
                appender.flush();
            }
        }
    }
}

/// Builder for configuring and initializing the logger.
pub struct ConfigBuilder {
    log_file: Option<(String, LogFile)>,
    console: DefaultAppender,
    console_layout: Box<dyn Layout>,
    file_layout: Box<dyn Layout>,
    root_priority: Priority,
    priorities: Vec<(String, Priority)>,
    additivity: Vec<(String, bool)>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            log_file: None,
            console: CATLOG_CONFIG.appender,
            console_layout: Box::new(ColoredLayout),
            file_layout: Box::new(DatedLayout),
            root_priority: CATLOG_CONFIG.root_priority,
            priorities: Vec::new(),
            additivity: Vec::new(),
        }
    }
}

impl ConfigBuilder {
    /// Builds a standalone registry. The guard drains the writer threads when dropped.
    pub fn build(self) -> (Registry, LoggerGuard) {
        let registry = Registry::with_root_priority(self.root_priority);
        let guard = self.apply(&registry);
        (registry, guard)
    }

    /// Configures an existing registry in place, so handles taken earlier see the change.
    ///
    /// The root gets the configured priority and sinks (or no appender when every sink
    /// is disabled), then the per-category overrides are applied. Dropping the guard
    /// removes the sinks from the root again and drains their writer threads.
    pub fn apply(self, registry: &Registry) -> LoggerGuard {
        let Self {
            log_file,
            console,
            console_layout,
            file_layout,
            root_priority,
            priorities,
            additivity,
        } = self;
        let mut guard = LoggerGuard::default();
        let mut sinks: Vec<Arc<dyn Appender>> = Vec::new();
        let console = match console {
            DefaultAppender::Stdout => Some(spawn_log_thread("stdout", LogStdout, console_layout)),
            DefaultAppender::Stderr => Some(spawn_log_thread("stderr", LogStderr, console_layout)),
            DefaultAppender::None => None,
        };
        if let Some(console) = console {
            let console = Arc::new(console);
            guard.push(console.clone());
            sinks.push(console);
        }
        if let Some((name, file)) = log_file {
            let file = Arc::new(spawn_log_thread(name, file, file_layout));
            guard.push(file.clone());
            sinks.push(file);
        }
        let root = registry.root();
        root.set_priority(root_priority);
        let installed: Option<Arc<dyn Appender>> = if sinks.len() > 1 {
            Some(Arc::new(FanoutAppender::new("console+file", sinks)))
        } else {
            sinks.pop()
        };
        match installed {
            Some(appender) => {
                root.set_appender(appender.clone());
                guard.detach_on_drop(root, appender);
            }
            None => {
                root.clear_appender();
            }
        }
        for (name, priority) in priorities {
            registry.get_or_create(&name).set_priority(priority);
        }
        for (name, flag) in additivity {
            registry.get_or_create(&name).set_additivity(flag);
        }
        guard
    }

    /// Sets the root priority. `NotSet` is ignored.
    pub fn with_root_priority(self, priority: Priority) -> Self {
        if !priority.is_set() {
            return self;
        }
        Self {
            root_priority: priority,
            ..self
        }
    }
    /// Sets the priority of a category.
    pub fn with_priority(mut self, name: &str, priority: Priority) -> Self {
        self.priorities.push((name.into(), priority));
        self
    }
    /// Sets the additivity of a category.
    pub fn with_additivity(mut self, name: &str, additivity: bool) -> Self {
        self.additivity.push((name.into(), additivity));
        self
    }
    /// Sets a log file.
    pub fn with_log_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let name = path.as_ref().display().to_string();
        Ok(Self {
            log_file: Some((name, LogFile::new(path)?)),
            ..self
        })
    }
    /// Maybe sets a log file.
    pub fn maybe_with_log_file<P: AsRef<Path>>(self, path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => self.with_log_file(path),
            None => Ok(Self {
                log_file: None,
                ..self
            }),
        }
    }
    /// Layout of the log file, dated by default.
    pub fn with_layout(self, layout: impl Layout + 'static) -> Self {
        Self {
            file_layout: Box::new(layout),
            ..self
        }
    }
    /// Layout of the console, colored by default.
    pub fn with_console_layout(self, layout: impl Layout + 'static) -> Self {
        Self {
            console_layout: Box::new(layout),
            ..self
        }
    }
    /// Ignore console logging
    pub fn no_stdout(self) -> Self {
        Self {
            console: DefaultAppender::None,
            ..self
        }
    }
    /// Dynamically set the stdout flag.
    pub fn with_stdout(self, yes: bool) -> Self {
        Self {
            console: if yes {
                DefaultAppender::Stdout
            } else {
                DefaultAppender::None
            },
            ..self
        }
    }
    /// Log to stderr instead of stdout
    pub fn with_stderr(self) -> Self {
        Self {
            console: DefaultAppender::Stderr,
            ..self
        }
    }
    /// Initialize the logger globally.
    /// Returns a guard that will flush and shutdown the writer threads when dropped.
    /// Once the guard is dropped the global root has no appender until the next call.
    #[must_use = "LoggerGuard must be kept alive to ensure logging works. Do \"let _guard = logger_config().init_global();\""]
    pub fn init_global(self) -> LoggerGuard {
        self.apply(&GLOBAL_REGISTRY)
    }
}

/// Returns a default ConfigBuilder for configuring the logger.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}
