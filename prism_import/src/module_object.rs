//! `ModuleObject` - runtime representation of a Python module.
//!
//! A module is a name, optional source metadata and a namespace that the
//! module body populates as it executes. Child modules of a package are
//! bound into the package namespace as `Value::Module` entries.

use crate::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// ModuleObject
// =============================================================================

/// A Python module object with attribute storage.
///
/// Stores:
/// - Module metadata (`__name__`, `__file__`, `__package__`, `__path__`)
/// - Module attributes bound by the module body or by imports
///
/// The namespace sits behind a `RwLock` so hooks can read and extend a
/// package namespace while other modules are being imported.
pub struct ModuleObject {
    /// Module name (e.g., "pkg", "pkg.sub")
    name: Arc<str>,

    /// Module attributes (__name__, __file__, constants, child modules)
    attrs: RwLock<FxHashMap<Arc<str>, Value>>,

    /// Source file the module was loaded from (None for synthetic modules)
    file: Option<PathBuf>,

    /// Package name (the module itself for packages, the parent otherwise)
    package: Option<Arc<str>>,

    /// Directory searched for submodules (packages only)
    search_dir: Option<PathBuf>,
}

impl ModuleObject {
    /// Create a new empty module with the given name.
    #[inline]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::with_metadata(name, None, None)
    }

    /// Create a new module with optional metadata.
    pub fn with_metadata(
        name: impl Into<Arc<str>>,
        file: Option<PathBuf>,
        package: Option<Arc<str>>,
    ) -> Self {
        let name = name.into();
        let mut attrs = FxHashMap::default();

        attrs.insert(Arc::from("__name__"), Value::Str(name.clone()));

        if let Some(ref path) = file {
            attrs.insert(
                Arc::from("__file__"),
                Value::string(path.to_string_lossy().into_owned()),
            );
        }

        if let Some(ref pkg) = package {
            attrs.insert(Arc::from("__package__"), Value::Str(pkg.clone()));
        }

        Self {
            name,
            attrs: RwLock::new(attrs),
            file,
            package,
            search_dir: None,
        }
    }

    /// Mark this module as a package whose submodules live in `dir`.
    ///
    /// Sets `__path__`.
    pub fn with_search_dir(mut self, dir: PathBuf) -> Self {
        self.attrs.get_mut().insert(
            Arc::from("__path__"),
            Value::string(dir.to_string_lossy().into_owned()),
        );
        self.search_dir = Some(dir);
        self
    }

    /// Get the module name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the source file path.
    #[inline]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Get the package name (`__package__`).
    #[inline]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Get the submodule search directory (`__path__`).
    #[inline]
    pub fn search_dir(&self) -> Option<&Path> {
        self.search_dir.as_deref()
    }

    /// Check if this module is a package.
    #[inline]
    pub fn is_package(&self) -> bool {
        self.search_dir.is_some()
    }

    /// Get an attribute from the module.
    ///
    /// Returns `None` if the attribute doesn't exist.
    #[inline]
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    /// Set an attribute on the module.
    #[inline]
    pub fn set_attr(&self, name: &str, value: Value) {
        self.attrs.write().insert(Arc::from(name), value);
    }

    /// Check if the module has an attribute.
    #[inline]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.read().contains_key(name)
    }

    /// Get a bound child module.
    pub fn get_submodule(&self, name: &str) -> Option<Arc<ModuleObject>> {
        match self.get_attr(name)? {
            Value::Module(module) => Some(module),
            _ => None,
        }
    }

    /// Get all attribute names, sorted.
    ///
    /// This is used for `dir(module)`.
    pub fn dir(&self) -> Vec<Arc<str>> {
        let mut names: Vec<Arc<str>> = self.attrs.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Get public attributes as (name, value) pairs, sorted by name.
    ///
    /// Public names are those not starting with an underscore; this is the
    /// set `from module import *` injects into the importing scope.
    pub fn public_attrs(&self) -> Vec<(Arc<str>, Value)> {
        let mut attrs: Vec<(Arc<str>, Value)> = self
            .attrs
            .read()
            .iter()
            .filter(|(k, _)| !k.starts_with('_'))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        attrs.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        attrs
    }

    /// Get the number of attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.attrs.read().len()
    }

    /// Check if the module has no attributes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attrs.read().is_empty()
    }
}

// Namespaces can reference other modules; print identity only.
impl fmt::Debug for ModuleObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleObject")
            .field("name", &self.name)
            .field("file", &self.file)
            .field("package", &self.package)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_new() {
        let module = ModuleObject::new("test_module");
        assert_eq!(module.name(), "test_module");
        assert!(module.has_attr("__name__"));
        assert!(!module.is_package());
        assert!(module.file().is_none());
    }

    #[test]
    fn test_module_get_set_attr() {
        let module = ModuleObject::new("test");
        module.set_attr("foo", Value::int(42));
        assert!(module.has_attr("foo"));
        assert_eq!(module.get_attr("foo").and_then(|v| v.as_int()), Some(42));
    }

    #[test]
    fn test_module_dir_is_sorted() {
        let module = ModuleObject::new("test");
        module.set_attr("beta", Value::int(2));
        module.set_attr("alpha", Value::int(1));

        let names: Vec<String> = module.dir().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["__name__", "alpha", "beta"]);
    }

    #[test]
    fn test_module_public_attrs() {
        let module = ModuleObject::new("test");
        module.set_attr("public_var", Value::int(1));
        module.set_attr("_hidden", Value::int(2));
        module.set_attr("__dunder__", Value::int(3));

        let public = module.public_attrs();
        let names: Vec<&str> = public.iter().map(|(k, _)| k.as_ref()).collect();
        assert_eq!(names, vec!["public_var"]);
    }

    #[test]
    fn test_module_with_metadata() {
        let module = ModuleObject::with_metadata(
            "mypackage.mymodule",
            Some(PathBuf::from("/path/to/mypackage/mymodule.py")),
            Some(Arc::from("mypackage")),
        );

        assert_eq!(module.package(), Some("mypackage"));
        assert_eq!(
            module.get_attr("__file__").as_ref().and_then(Value::as_str),
            Some("/path/to/mypackage/mymodule.py")
        );
        assert!(module.has_attr("__package__"));
        assert!(!module.has_attr("__path__"));
    }

    #[test]
    fn test_package_search_dir() {
        let module = ModuleObject::with_metadata(
            "pkg",
            Some(PathBuf::from("/src/pkg/__init__.py")),
            Some(Arc::from("pkg")),
        )
        .with_search_dir(PathBuf::from("/src/pkg"));

        assert!(module.is_package());
        assert_eq!(module.search_dir(), Some(Path::new("/src/pkg")));
        assert!(module.has_attr("__path__"));
    }

    #[test]
    fn test_get_submodule() {
        let parent = ModuleObject::new("pkg");
        let child = Arc::new(ModuleObject::new("pkg.child"));
        parent.set_attr("child", Value::module(child.clone()));
        parent.set_attr("CONST", Value::int(1));

        let bound = parent.get_submodule("child").unwrap();
        assert!(Arc::ptr_eq(&bound, &child));
        assert!(parent.get_submodule("CONST").is_none());
        assert!(parent.get_submodule("missing").is_none());
    }

    #[test]
    fn test_module_len_and_is_empty() {
        let module = ModuleObject::new("test");
        assert!(!module.is_empty());
        assert_eq!(module.len(), 1);
    }

    #[test]
    fn test_module_concurrent_access() {
        use std::thread;

        let module = Arc::new(ModuleObject::new("concurrent"));

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let m = Arc::clone(&module);
                thread::spawn(move || {
                    m.set_attr(&format!("attr_{}", i), Value::int(i));
                    m.get_attr(&format!("attr_{}", i))
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..10 {
            assert!(module.has_attr(&format!("attr_{}", i)));
        }
    }
}
