/// Logs a formatted message to a category.
///
/// The priority check runs first: when the category does not accept the
/// priority, the format arguments are not evaluated.
///
/// ```rust
/// use catlog_core::{Priority, Registry, catlog};
///
/// let registry = Registry::with_root_priority(Priority::Info);
/// let db = registry.get_or_create("app.db");
/// let mut evaluated = false;
/// catlog!(db, Priority::Debug, "{}", { evaluated = true; "never rendered" });
/// assert!(!evaluated);
/// catlog!(db, Priority::Warn, "disk {}% full", 97);
/// ```
#[macro_export]
macro_rules! catlog {
    ($category:expr, $priority:expr, $($arg:tt)+) => {{
        let category = &$category;
        let priority: $crate::Priority = $priority;
        if category.is_priority_enabled(priority) {
            category.log_args(
                priority,
                ::std::format_args!($($arg)+),
                ::std::option::Option::Some($crate::LocationInfo::new(
                    ::std::file!(),
                    ::std::line!(),
                    ::std::module_path!(),
                )),
            );
        }
    }};
}
