//! Meta path hooks - the `sys.meta_path` chain.
//!
//! An [`ImportHook`] is a participant in module resolution: the resolver
//! asks each hook, front to back, whether it wants to load a name, and
//! notifies every hook after any module finishes loading.
//!
//! [`MetaPath`] keeps the hooks in order plus one optional sentinel slot
//! that always stays at the end. Hooks appended with [`MetaPath::push`]
//! land before the sentinel, so a catch-all hook installed as sentinel is
//! only tried once every more specific hook has declined.

use crate::error::{ImportError, ImportResult};
use crate::module_object::ModuleObject;
use crate::resolver::ImportResolver;
use std::any::Any;
use std::sync::Arc;

// =============================================================================
// ImportHook
// =============================================================================

/// A participant in the module resolution chain.
///
/// Implementors only decide *whether* to handle a name; actual loading is
/// delegated to the resolver's default loader by the provided
/// [`load_module`](ImportHook::load_module).
pub trait ImportHook: Send + Sync + 'static {
    /// Whether this hook will load `fullname`.
    fn find_module(&self, fullname: &str, resolver: &ImportResolver) -> bool;

    /// Load `fullname` and notify this hook.
    ///
    /// Errors from loading are returned unchanged and skip the notification.
    fn load_module(
        &self,
        fullname: &str,
        resolver: &ImportResolver,
    ) -> ImportResult<Arc<ModuleObject>> {
        let module = resolver.load_default(fullname)?;
        self.on_module_imported(fullname, &module, resolver)?;
        Ok(module)
    }

    /// Called once after any module finished loading successfully.
    fn on_module_imported(
        &self,
        _fullname: &str,
        _module: &Arc<ModuleObject>,
        _resolver: &ImportResolver,
    ) -> ImportResult<()> {
        Ok(())
    }

    /// Whether `fullname` would load as a package.
    fn is_package(&self, fullname: &str, resolver: &ImportResolver) -> ImportResult<bool> {
        resolver.locate(fullname).map(|(_, is_package)| is_package)
    }

    /// Source text of `fullname`, without executing it.
    fn get_source(&self, fullname: &str, resolver: &ImportResolver) -> ImportResult<String> {
        let (path, _) = resolver.locate(fullname)?;
        std::fs::read_to_string(&path).map_err(|source| ImportError::Io { path, source })
    }

    /// Human-readable hook name for diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Upcast for type queries on the chain.
    fn as_any(&self) -> &dyn Any;
}

/// Check whether `hook` is an instance of `T`.
#[inline]
pub fn hook_is<T: ImportHook>(hook: &dyn ImportHook) -> bool {
    hook.as_any().is::<T>()
}

// =============================================================================
// MetaPath
// =============================================================================

/// Ordered chain of import hooks with a trailing sentinel slot.
#[derive(Default)]
pub struct MetaPath {
    hooks: Vec<Arc<dyn ImportHook>>,
    sentinel: Option<Arc<dyn ImportHook>>,
}

impl MetaPath {
    /// Create an empty chain.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook, keeping the sentinel last.
    pub fn push(&mut self, hook: Arc<dyn ImportHook>) {
        self.hooks.push(hook);
    }

    /// Insert a hook at `index`, clamped so it never passes the sentinel.
    pub fn insert(&mut self, index: usize, hook: Arc<dyn ImportHook>) {
        let index = index.min(self.hooks.len());
        self.hooks.insert(index, hook);
    }

    /// The trailing sentinel hook, if any.
    #[inline]
    pub fn sentinel(&self) -> Option<&Arc<dyn ImportHook>> {
        self.sentinel.as_ref()
    }

    /// Make sure a hook of type `T` is the sentinel.
    ///
    /// - sentinel already a `T`: nothing changes
    /// - a `T` among the ordinary hooks: the first one becomes the sentinel
    ///   and any other `T` is dropped
    /// - no `T` anywhere: `make()` becomes the sentinel
    ///
    /// A sentinel of another type is demoted to the end of the ordinary
    /// hooks. Returns `true` if a new hook was created.
    pub fn ensure_sentinel<T, F>(&mut self, make: F) -> bool
    where
        T: ImportHook,
        F: FnOnce() -> Arc<dyn ImportHook>,
    {
        if self.sentinel.as_deref().is_some_and(|hook| hook_is::<T>(hook)) {
            self.hooks.retain(|hook| !hook_is::<T>(&**hook));
            return false;
        }

        let position = self.hooks.iter().position(|hook| hook_is::<T>(&**hook));
        let existing = position.map(|index| self.hooks.remove(index));
        self.hooks.retain(|hook| !hook_is::<T>(&**hook));

        let created = existing.is_none();
        let hook = existing.unwrap_or_else(make);
        if let Some(previous) = self.sentinel.replace(hook) {
            self.hooks.push(previous);
        }
        created
    }

    /// Remove every hook of type `T`, sentinel included.
    ///
    /// Returns the number of hooks removed.
    pub fn remove<T: ImportHook>(&mut self) -> usize {
        let before = self.len();
        self.hooks.retain(|hook| !hook_is::<T>(&**hook));
        if self.sentinel.as_deref().is_some_and(|hook| hook_is::<T>(hook)) {
            self.sentinel = None;
        }
        before - self.len()
    }

    /// Number of hooks of type `T` in the chain.
    pub fn count<T: ImportHook>(&self) -> usize {
        self.iter().filter(|hook| hook_is::<T>(&***hook)).count()
    }

    /// Whether any hook of type `T` is in the chain.
    #[inline]
    pub fn contains<T: ImportHook>(&self) -> bool {
        self.count::<T>() > 0
    }

    /// Position of the first hook of type `T`.
    pub fn position<T: ImportHook>(&self) -> Option<usize> {
        self.iter().position(|hook| hook_is::<T>(&**hook))
    }

    /// Hooks in the order they are consulted.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ImportHook>> + '_ {
        self.hooks.iter().chain(self.sentinel.iter())
    }

    /// Owned copy of the chain, so hooks can run without holding a lock.
    pub fn snapshot(&self) -> Vec<Arc<dyn ImportHook>> {
        self.iter().cloned().collect()
    }

    /// Total number of hooks, sentinel included.
    #[inline]
    pub fn len(&self) -> usize {
        self.hooks.len() + usize::from(self.sentinel.is_some())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MetaPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaPath")
            .field("hooks", &self.hooks.iter().map(|hook| hook.name()).collect::<Vec<_>>())
            .field("sentinel", &self.sentinel().map(|hook| hook.name()))
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Specific;
    struct CatchAll;

    impl ImportHook for Specific {
        fn find_module(&self, fullname: &str, _resolver: &ImportResolver) -> bool {
            fullname == "specific"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl ImportHook for CatchAll {
        fn find_module(&self, _fullname: &str, _resolver: &ImportResolver) -> bool {
            true
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn names(chain: &MetaPath) -> Vec<&'static str> {
        chain
            .iter()
            .map(|hook| if hook_is::<CatchAll>(&**hook) { "catch-all" } else { "specific" })
            .collect()
    }

    #[test]
    fn test_push_lands_before_sentinel() {
        let mut chain = MetaPath::new();
        chain.push(Arc::new(Specific));
        assert!(chain.ensure_sentinel::<CatchAll, _>(|| Arc::new(CatchAll)));
        chain.push(Arc::new(Specific));
        chain.insert(usize::MAX, Arc::new(Specific));

        assert_eq!(
            names(&chain),
            vec!["specific", "specific", "specific", "catch-all"]
        );
        assert_eq!(chain.position::<CatchAll>(), Some(3));
    }

    #[test]
    fn test_ensure_sentinel_is_idempotent() {
        let mut chain = MetaPath::new();
        assert!(chain.ensure_sentinel::<CatchAll, _>(|| Arc::new(CatchAll)));
        assert!(!chain.ensure_sentinel::<CatchAll, _>(|| Arc::new(CatchAll)));
        assert_eq!(chain.count::<CatchAll>(), 1);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_ensure_sentinel_promotes_pushed_instance() {
        let mut chain = MetaPath::new();
        let pushed: Arc<dyn ImportHook> = Arc::new(CatchAll);
        chain.push(pushed.clone());
        chain.push(Arc::new(Specific));
        chain.push(Arc::new(CatchAll));

        assert!(!chain.ensure_sentinel::<CatchAll, _>(|| Arc::new(CatchAll)));
        assert_eq!(chain.count::<CatchAll>(), 1);
        assert!(Arc::ptr_eq(chain.sentinel().unwrap(), &pushed));
        assert_eq!(names(&chain), vec!["specific", "catch-all"]);
    }

    #[test]
    fn test_ensure_sentinel_demotes_other_sentinel() {
        let mut chain = MetaPath::new();
        assert!(chain.ensure_sentinel::<Specific, _>(|| Arc::new(Specific)));
        assert!(chain.ensure_sentinel::<CatchAll, _>(|| Arc::new(CatchAll)));
        assert_eq!(names(&chain), vec!["specific", "catch-all"]);
    }

    #[test]
    fn test_remove() {
        let mut chain = MetaPath::new();
        chain.push(Arc::new(Specific));
        chain.ensure_sentinel::<CatchAll, _>(|| Arc::new(CatchAll));

        assert_eq!(chain.remove::<CatchAll>(), 1);
        assert!(chain.sentinel().is_none());
        assert!(!chain.contains::<CatchAll>());
        assert_eq!(chain.remove::<CatchAll>(), 0);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_count_spans_hooks_and_sentinel() {
        let mut chain = MetaPath::new();
        chain.push(Arc::new(CatchAll));
        chain.push(Arc::new(Specific));
        assert_eq!(chain.count::<CatchAll>(), 1);

        chain.ensure_sentinel::<Specific, _>(|| Arc::new(Specific));
        assert_eq!(chain.count::<Specific>(), 1);
        assert_eq!(chain.count::<CatchAll>(), 1);

        let debug = format!("{:?}", chain);
        assert!(debug.contains("sentinel: Some("));
    }

    #[test]
    fn test_default_name_is_type_name() {
        assert!(CatchAll.name().ends_with("CatchAll"));
    }
}
