use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::{
    category::{Category, ROOT_NAME},
    config::CATLOG_CONFIG,
    priority::Priority,
};

struct Categories {
    root: Arc<Category>,
    by_name: HashMap<Arc<str>, Arc<Category>>,
}

impl Categories {
    fn new(root_priority: Priority) -> Self {
        let root = Arc::new(Category::root(root_priority));
        let mut by_name = HashMap::new();
        by_name.insert(Arc::from(ROOT_NAME), root.clone());
        Self { root, by_name }
    }

    /// Creates `name` and any missing ancestor. Caller holds the write lock.
    ///
    /// Walks up to the nearest registered ancestor, then creates the missing
    /// categories top-down, so the stack depth does not depend on the name.
    fn get_or_insert(&mut self, name: &str) -> Arc<Category> {
        if let Some(category) = self.by_name.get(name) {
            return category.clone();
        }
        let mut missing = vec![name];
        let mut parent = self.root.clone();
        let mut current = name;
        while let Some((prefix, _)) = current.rsplit_once('.') {
            if prefix.is_empty() {
                break;
            }
            if let Some(found) = self.by_name.get(prefix) {
                parent = found.clone();
                break;
            }
            missing.push(prefix);
            current = prefix;
        }
        for name in missing.into_iter().rev() {
            let category = Arc::new(Category::child(Arc::from(name), parent));
            self.by_name.insert(category.shared_name(), category.clone());
            parent = category;
        }
        parent
    }
}

/// Table of categories keyed by dotted name.
///
/// Cloning is cheap and clones share the same table. Names form a tree:
/// `a.b.c` is a child of `a.b`, `a` is a child of the root.
///
/// ```rust
/// use catlog_core::{Priority, Registry};
///
/// let registry = Registry::with_root_priority(Priority::Info);
/// let db = registry.get_or_create("app.db");
/// assert!(!db.is_priority_enabled(Priority::Debug));
/// assert!(db.is_priority_enabled(Priority::Warn));
///
/// registry.get_or_create("app").set_priority(Priority::Debug);
/// assert!(db.is_debug_enabled());
/// ```
#[derive(Clone)]
pub struct Registry {
    categories: Arc<RwLock<Categories>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// New registry whose root priority comes from `CATLOG_ROOT_PRIORITY`.
    pub fn new() -> Self {
        Self::with_root_priority(CATLOG_CONFIG.root_priority)
    }

    /// New registry with an explicit root priority. `NotSet` falls back to `Notice`.
    pub fn with_root_priority(priority: Priority) -> Self {
        Self {
            categories: Arc::new(RwLock::new(Categories::new(priority))),
        }
    }

    pub fn root(&self) -> Arc<Category> {
        self.categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .root
            .clone()
    }

    /// Returns the category called `name`, creating it and its ancestors if needed.
    /// `""` and `"root"` both name the root.
    pub fn get_or_create(&self, name: &str) -> Arc<Category> {
        if name.is_empty() {
            return self.root();
        }
        if let Some(category) = self.get(name) {
            return category;
        }
        self.categories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Category>> {
        let categories = self
            .categories
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if name.is_empty() {
            return Some(categories.root.clone());
        }
        categories.by_name.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every registered category, root included, sorted by name.
    pub fn categories(&self) -> Vec<Arc<Category>> {
        let mut categories: Vec<_> = self
            .categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_name
            .values()
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name().cmp(b.name()));
        categories
    }

    pub fn len(&self) -> usize {
        self.categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_name
            .len()
    }

    /// Always false, the root is never removed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tears the table down to a fresh root carrying the current root priority.
    /// Handles obtained before stay usable but are detached from the registry.
    pub fn clear(&self) {
        let mut categories = self
            .categories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let root_priority = categories.root.priority();
        *categories = Categories::new(root_priority);
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.categories()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let registry = Registry::with_root_priority(Priority::Info);
        let first = registry.get_or_create("app.db");
        let second = registry.get_or_create("app.db");
        let other = registry.get_or_create("app.net");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(first.name(), "app.db");
        assert_eq!(first.priority(), Priority::NotSet);
        assert!(first.additivity());
        assert!(first.appender().is_none());
    }

    #[test]
    fn test_ancestors_are_created() {
        let registry = Registry::with_root_priority(Priority::Info);
        let leaf = registry.get_or_create("a.b.c");
        let b = registry.get("a.b").unwrap();
        let a = registry.get("a").unwrap();
        assert!(Arc::ptr_eq(leaf.parent().unwrap(), &b));
        assert!(Arc::ptr_eq(b.parent().unwrap(), &a));
        assert!(Arc::ptr_eq(a.parent().unwrap(), &registry.root()));
        assert_eq!(
            registry
                .categories()
                .iter()
                .map(|c| c.name().to_string())
                .collect::<Vec<_>>(),
            vec!["a", "a.b", "a.b.c", "root"]
        );
    }

    #[test]
    fn test_root_names() {
        let registry = Registry::with_root_priority(Priority::Warn);
        let root = registry.root();
        assert!(root.is_root());
        assert_eq!(root.name(), "root");
        assert!(Arc::ptr_eq(&registry.get_or_create("root"), &root));
        assert!(Arc::ptr_eq(&registry.get_or_create(""), &root));
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_odd_names_still_reach_root() {
        let registry = Registry::with_root_priority(Priority::Error);
        for name in [".hidden", "trailing.", "a..b"] {
            let category = registry.get_or_create(name);
            assert_eq!(category.chained_priority(), Priority::Error);
        }
        assert!(registry.contains("a."));
        assert!(registry.contains("a"));
    }

    #[test]
    fn test_chained_priority_scenarios() {
        let registry = Registry::with_root_priority(Priority::Info);
        let db = registry.get_or_create("app.db");
        assert!(!db.is_priority_enabled(Priority::Debug));
        assert!(db.is_priority_enabled(Priority::Warn));

        db.set_priority(Priority::Debug);
        assert!(db.is_priority_enabled(Priority::Debug));
        assert_eq!(registry.root().priority(), Priority::Info);

        registry.get_or_create("app").set_priority(Priority::Error);
        db.set_priority(Priority::NotSet);
        assert_eq!(db.chained_priority(), Priority::Error);
    }

    #[test]
    fn test_concurrent_get_or_create() {
        let registry = Registry::with_root_priority(Priority::Info);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    (0..50)
                        .map(|i| registry.get_or_create(&format!("svc.{}.worker", i % 5)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let created: Vec<_> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        // root, svc, svc.{0..5}, svc.{0..5}.worker
        assert_eq!(registry.len(), 12);
        for category in created {
            let registered = registry.get(category.name()).unwrap();
            assert!(Arc::ptr_eq(&category, &registered));
        }
    }

    #[test]
    fn test_deep_names_do_not_exhaust_the_stack() {
        // a small stack makes any per-segment recursion overflow
        let handle = thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let registry = Registry::with_root_priority(Priority::Warn);
                let name = vec!["a"; 5_000].join(".");
                let leaf = registry.get_or_create(&name);
                assert_eq!(registry.len(), 5_001);
                assert_eq!(leaf.chained_priority(), Priority::Warn);
                registry.get_or_create("a.a").set_priority(Priority::Debug);
                assert!(leaf.is_debug_enabled());

                // a second deep name reuses the existing chain
                let sibling = registry.get_or_create(&format!("{name}.b"));
                assert!(Arc::ptr_eq(sibling.parent().unwrap(), &leaf));
                assert_eq!(registry.len(), 5_002);

                drop(sibling);
                drop(leaf);
                registry.clear();
                assert_eq!(registry.len(), 1);
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_clear_keeps_root_priority() {
        let registry = Registry::with_root_priority(Priority::Info);
        let db = registry.get_or_create("app.db");
        registry.root().set_priority(Priority::Debug);
        registry.clear();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.root().priority(), Priority::Debug);
        assert!(!registry.contains("app.db"));
        // detached handles still resolve through their old chain
        assert_eq!(db.chained_priority(), Priority::Debug);
        assert!(!Arc::ptr_eq(&db, &registry.get_or_create("app.db")));
    }
}
