use std::{
    fmt,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicBool, AtomicU16, Ordering},
    },
};

use crate::{
    appender::Appender,
    event::{LocationInfo, LoggingEvent},
    priority::Priority,
};

pub const ROOT_NAME: &str = "root";

/// A named node of the category tree.
///
/// Categories are only created through [`crate::Registry::get_or_create`], which
/// guarantees one instance per name and a parent chain that ends at the root.
pub struct Category {
    name: Arc<str>,
    parent: Option<Arc<Category>>,
    priority: AtomicU16,
    additivity: AtomicBool,
    appender: RwLock<Option<Arc<dyn Appender>>>,
}

/// Generates the per-priority `is_*_enabled` checks and logging wrappers.
macro_rules! priority_helpers {
    ($($priority:ident => $is_enabled:ident, $log:ident;)*) => {
        impl Category {
            $(
                #[inline]
                pub fn $is_enabled(&self) -> bool {
                    self.is_priority_enabled(Priority::$priority)
                }

                #[inline]
                pub fn $log<F, M>(&self, message: F)
                where
                    F: FnOnce() -> M,
                    M: fmt::Display,
                {
                    self.log(Priority::$priority, message)
                }
            )*
        }
    };
}

priority_helpers! {
    Fatal => is_fatal_enabled, fatal;
    Alert => is_alert_enabled, alert;
    Crit => is_crit_enabled, crit;
    Error => is_error_enabled, error;
    Warn => is_warn_enabled, warn;
    Notice => is_notice_enabled, notice;
    Info => is_info_enabled, info;
    Debug => is_debug_enabled, debug;
    Trace => is_trace_enabled, trace;
}

impl Category {
    pub(crate) fn root(priority: Priority) -> Self {
        let priority = if priority.is_set() {
            priority
        } else {
            Priority::Notice
        };
        Self::new(ROOT_NAME.into(), None, priority)
    }

    pub(crate) fn child(name: Arc<str>, parent: Arc<Category>) -> Self {
        Self::new(name, Some(parent), Priority::NotSet)
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    fn new(name: Arc<str>, parent: Option<Arc<Category>>, priority: Priority) -> Self {
        Self {
            name,
            parent,
            priority: AtomicU16::new(priority.value()),
            additivity: AtomicBool::new(true),
            appender: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<Category>> {
        self.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The explicitly assigned priority, `NotSet` when inherited.
    pub fn priority(&self) -> Priority {
        Priority::from_value(self.priority.load(Ordering::Relaxed))
    }

    /// Sets the priority and returns the previous one.
    /// `NotSet` makes the category inherit again; the root ignores it.
    pub fn set_priority(&self, priority: Priority) -> Priority {
        if self.is_root() && !priority.is_set() {
            return self.priority();
        }
        Priority::from_value(self.priority.swap(priority.value(), Ordering::Relaxed))
    }

    /// The priority of the nearest category, starting with this one, that has one set.
    pub fn chained_priority(&self) -> Priority {
        let mut category = self;
        loop {
            let priority = Priority::from_value(category.priority.load(Ordering::Relaxed));
            match (priority.is_set(), &category.parent) {
                (true, _) => return priority,
                (false, Some(parent)) => category = parent.as_ref(),
                // unreachable through the registry, kept so a bare root still resolves
                (false, None) => return Priority::Notice,
            }
        }
    }

    #[inline]
    pub fn is_priority_enabled(&self, priority: Priority) -> bool {
        self.chained_priority() >= priority
    }

    pub fn appender(&self) -> Option<Arc<dyn Appender>> {
        self.appender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `appender` and returns the previous one.
    pub fn set_appender(&self, appender: Arc<dyn Appender>) -> Option<Arc<dyn Appender>> {
        self.appender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(appender)
    }

    pub fn clear_appender(&self) -> Option<Arc<dyn Appender>> {
        self.appender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Removes the appender only if it is still `appender`. Returns whether it was.
    pub fn remove_appender(&self, appender: &Arc<dyn Appender>) -> bool {
        let mut slot = self
            .appender
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let installed = slot
            .as_ref()
            .is_some_and(|current| std::ptr::addr_eq(Arc::as_ptr(current), Arc::as_ptr(appender)));
        if installed {
            *slot = None;
        }
        installed
    }

    pub fn additivity(&self) -> bool {
        self.additivity.load(Ordering::Relaxed)
    }

    /// Sets the additivity flag and returns the previous one.
    pub fn set_additivity(&self, additivity: bool) -> bool {
        self.additivity.swap(additivity, Ordering::Relaxed)
    }

    /// Logs the message produced by `message` if `priority` is enabled.
    /// The closure is not called otherwise.
    #[inline]
    pub fn log<F, M>(&self, priority: Priority, message: F)
    where
        F: FnOnce() -> M,
        M: fmt::Display,
    {
        if self.is_priority_enabled(priority) {
            self.dispatch(LoggingEvent::new(
                self.name.clone(),
                priority,
                message().to_string(),
            ));
        }
    }

    /// Entry point for the `catlog!` macro and the `log` bridge.
    pub fn log_args(
        &self,
        priority: Priority,
        args: fmt::Arguments<'_>,
        location: Option<LocationInfo>,
    ) {
        if self.is_priority_enabled(priority) {
            let event = LoggingEvent::new(self.name.clone(), priority, args.to_string());
            self.dispatch(event.with_location(location));
        }
    }

    /// Hands an accepted event to this category's appender and, while additivity
    /// holds, to the appenders of its ancestors.
    pub fn dispatch(&self, event: LoggingEvent) {
        let mut category = Some(self);
        while let Some(current) = category {
            if let Some(appender) = current.appender() {
                appender.handle(&event);
            }
            if !current.additivity() {
                break;
            }
            category = current.parent.as_deref();
        }
    }
}

impl Drop for Category {
    /// Unlinks the parent chain iteratively: dropping the last handle to a deep
    /// category must not recurse once per ancestor.
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(category) = parent {
            parent = match Arc::try_unwrap(category) {
                Ok(mut category) => category.parent.take(),
                Err(_) => None,
            };
        }
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("name", &self.name)
            .field("priority", &self.priority())
            .field("additivity", &self.additivity())
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let appender = self.appender();
        write!(
            f,
            "{{ name:'{}' priority:{} additivity:{} appender:'{}' parent:'{}' }}",
            self.name,
            self.priority(),
            u8::from(self.additivity()),
            appender.as_deref().map_or("(nil)", |a| a.name()),
            self.parent.as_ref().map_or("(nil)", |p| p.name()),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::appender::testing::CaptureAppender;

    fn chain() -> (Arc<Category>, Arc<Category>, Arc<Category>) {
        let root = Arc::new(Category::root(Priority::Info));
        let app = Arc::new(Category::child("app".into(), root.clone()));
        let db = Arc::new(Category::child("app.db".into(), app.clone()));
        (root, app, db)
    }

    #[test]
    fn test_chained_priority_inherits() {
        let (root, app, db) = chain();
        assert_eq!(db.priority(), Priority::NotSet);
        assert_eq!(db.chained_priority(), Priority::Info);

        assert_eq!(app.set_priority(Priority::Error), Priority::NotSet);
        assert_eq!(db.chained_priority(), Priority::Error);

        assert_eq!(db.set_priority(Priority::Trace), Priority::NotSet);
        assert_eq!(db.chained_priority(), Priority::Trace);

        assert_eq!(db.set_priority(Priority::NotSet), Priority::Trace);
        assert_eq!(db.chained_priority(), Priority::Error);

        app.set_priority(Priority::NotSet);
        root.set_priority(Priority::Crit);
        assert_eq!(db.chained_priority(), Priority::Crit);
    }

    #[test]
    fn test_root_ignores_notset() {
        let (root, _, db) = chain();
        assert_eq!(root.set_priority(Priority::NotSet), Priority::Info);
        assert_eq!(root.priority(), Priority::Info);
        assert_eq!(db.chained_priority(), Priority::Info);
        assert_eq!(Category::root(Priority::NotSet).priority(), Priority::Notice);
    }

    #[test]
    fn test_is_priority_enabled() {
        let (_, _, db) = chain();
        assert!(!db.is_priority_enabled(Priority::Debug));
        assert!(db.is_priority_enabled(Priority::Warn));
        assert!(db.is_priority_enabled(Priority::Info));
        assert!(!db.is_priority_enabled(Priority::NotSet));
        assert!(db.is_fatal_enabled());
        assert!(db.is_notice_enabled());
        assert!(!db.is_trace_enabled());

        db.set_priority(Priority::Debug);
        assert!(db.is_debug_enabled());
        assert!(!db.is_trace_enabled());
    }

    #[test]
    fn test_disabled_log_does_not_render() {
        let (root, _, db) = chain();
        let capture = CaptureAppender::named("capture");
        root.set_appender(capture.clone());
        let rendered = Cell::new(0);
        let expensive = || {
            rendered.set(rendered.get() + 1);
            "expensive"
        };

        db.debug(expensive);
        assert_eq!(rendered.get(), 0);
        assert!(capture.lines().is_empty());

        db.warn(expensive);
        assert_eq!(rendered.get(), 1);
        assert_eq!(capture.lines(), vec!["WARN     app.db - expensive\n"]);
    }

    #[test]
    fn test_dispatch_follows_additivity() {
        let (root, app, db) = chain();
        let to_root = CaptureAppender::named("root");
        let to_app = CaptureAppender::named("app");
        let to_db = CaptureAppender::named("db");
        root.set_appender(to_root.clone());
        app.set_appender(to_app.clone());
        db.set_appender(to_db.clone());

        db.info(|| "first");
        assert_eq!(to_db.lines().len(), 1);
        assert_eq!(to_app.lines().len(), 1);
        assert_eq!(to_root.lines().len(), 1);

        assert!(app.set_additivity(false));
        db.info(|| "second");
        assert_eq!(to_db.lines().len(), 2);
        assert_eq!(to_app.lines().len(), 2);
        assert_eq!(to_root.lines().len(), 1);

        db.set_additivity(false);
        db.error(|| format!("third {}", 3));
        assert_eq!(to_db.lines()[2], "ERROR    app.db - third 3\n");
        assert_eq!(to_app.lines().len(), 2);
    }

    #[test]
    fn test_appender_swap_returns_previous() {
        let (_, app, _) = chain();
        assert!(app.appender().is_none());
        let first = CaptureAppender::named("first");
        assert!(app.set_appender(first).is_none());
        let previous = app.set_appender(CaptureAppender::named("second")).unwrap();
        assert_eq!(previous.name(), "first");
        assert_eq!(app.clear_appender().unwrap().name(), "second");
        assert!(app.appender().is_none());
    }

    #[test]
    fn test_remove_appender_only_if_installed() {
        let (_, app, _) = chain();
        let first: Arc<dyn Appender> = CaptureAppender::named("first");
        let second: Arc<dyn Appender> = CaptureAppender::named("second");
        app.set_appender(first.clone());
        assert!(!app.remove_appender(&second));
        assert_eq!(app.appender().unwrap().name(), "first");
        assert!(app.remove_appender(&first));
        assert!(app.appender().is_none());
        assert!(!app.remove_appender(&first));
    }

    #[test]
    fn test_display() {
        let (_, app, db) = chain();
        app.set_appender(CaptureAppender::named("stdout"));
        assert_eq!(
            app.to_string(),
            "{ name:'app' priority:NOTSET additivity:1 appender:'stdout' parent:'root' }"
        );
        db.set_priority(Priority::Debug);
        db.set_additivity(false);
        assert_eq!(
            db.to_string(),
            "{ name:'app.db' priority:DEBUG additivity:0 appender:'(nil)' parent:'app' }"
        );
    }
}
