//! `ImportResolver` - the import entry point and module registry.
//!
//! # Import pipeline
//!
//! ```text
//! import_module("pkg.sub")
//!   ├── registry hit → return cached module
//!   ├── import parent "pkg" first
//!   ├── meta path: first hook whose find_module() claims the name loads it
//!   │     (no claim → load_default)
//!   ├── notify every other hook via on_module_imported()
//!   └── bind "sub" on the parent package
//! ```
//!
//! No lock is held while a module body executes or a hook runs, so hooks
//! may re-enter the resolver to import further modules.

use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};
use crate::meta_path::{ImportHook, MetaPath};
use crate::module_object::ModuleObject;
use crate::package::{
    DottedName, find_dotted_module_source, find_module_in, leaf_name, parent_package,
    resolve_relative_import,
};
use crate::source::execute_source;
use crate::value::Value;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::trace;

// =============================================================================
// Global Resolver Access
// =============================================================================

/// Process-wide resolver singleton.
static GLOBAL_RESOLVER: OnceLock<ImportResolver> = OnceLock::new();

// =============================================================================
// ImportResolver
// =============================================================================

/// Module registry (`sys.modules`), hook chain (`sys.meta_path`) and the
/// import entry point (`__import__`).
pub struct ImportResolver {
    /// Loaded modules by fully-qualified name.
    modules: RwLock<FxHashMap<Arc<str>, Arc<ModuleObject>>>,

    /// Hooks consulted for every registry miss.
    meta_path: RwLock<MetaPath>,

    /// Layout conventions and search path.
    config: RwLock<ImportConfig>,
}

impl ImportResolver {
    /// Create a resolver with the default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::with_config(ImportConfig::default())
    }

    /// Create a resolver with the given configuration.
    pub fn with_config(config: ImportConfig) -> Self {
        Self {
            modules: RwLock::new(FxHashMap::default()),
            meta_path: RwLock::new(MetaPath::new()),
            config: RwLock::new(config),
        }
    }

    /// The process-wide resolver, configured from the environment on
    /// first use.
    pub fn global() -> &'static ImportResolver {
        GLOBAL_RESOLVER.get_or_init(|| ImportResolver::with_config(ImportConfig::from_env()))
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Snapshot of the current configuration.
    pub fn config(&self) -> ImportConfig {
        self.config.read().clone()
    }

    /// Put `path` in front of the search path.
    pub fn add_search_path(&self, path: impl Into<PathBuf>) {
        self.config.write().search_paths.insert(0, path.into());
    }

    // =========================================================================
    // Meta Path
    // =========================================================================

    /// Read access to the hook chain.
    #[inline]
    pub fn meta_path(&self) -> RwLockReadGuard<'_, MetaPath> {
        self.meta_path.read()
    }

    /// Write access to the hook chain.
    ///
    /// The guard must not be held across an import.
    #[inline]
    pub fn meta_path_mut(&self) -> RwLockWriteGuard<'_, MetaPath> {
        self.meta_path.write()
    }

    /// Append a hook to the chain (before any sentinel).
    pub fn add_hook(&self, hook: Arc<dyn ImportHook>) {
        self.meta_path.write().push(hook);
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Register a module under `name`, replacing any previous entry.
    pub fn insert_module(&self, name: &str, module: Arc<ModuleObject>) {
        self.modules.write().insert(Arc::from(name), module);
    }

    /// Look up a loaded module.
    #[inline]
    pub fn get_module(&self, name: &str) -> Option<Arc<ModuleObject>> {
        self.modules.read().get(name).cloned()
    }

    /// Remove a module from the registry.
    pub fn remove_module(&self, name: &str) -> Option<Arc<ModuleObject>> {
        self.modules.write().remove(name)
    }

    /// Whether `name` is in the registry.
    #[inline]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }

    /// Names of all loaded modules, sorted.
    pub fn cached_modules(&self) -> Vec<Arc<str>> {
        let mut names: Vec<Arc<str>> = self.modules.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    // =========================================================================
    // Import Entry Points
    // =========================================================================

    /// Import a module by fully-qualified dotted name.
    ///
    /// Parents are imported first; a newly loaded child is bound as an
    /// attribute of its parent package.
    pub fn import_module(&self, name: &str) -> ImportResult<Arc<ModuleObject>> {
        let dotted = DottedName::parse(name).ok_or_else(|| ImportError::InvalidName {
            name: Arc::from(name),
        })?;

        if let Some(module) = self.get_module(name) {
            return Ok(module);
        }

        let parent = match parent_package(name) {
            Some(parent_name) => {
                let parent = self.import_module(parent_name)?;
                // Importing the parent may have loaded us already.
                if let Some(module) = self.get_module(name) {
                    return Ok(module);
                }
                Some(parent)
            }
            None => None,
        };

        let module = self.find_and_load(name)?;

        if let Some(parent) = parent {
            parent.set_attr(dotted.leaf(), Value::module(module.clone()));
        }

        Ok(module)
    }

    /// `__import__(name, globals, locals)`: import `name` on behalf of the
    /// module `context` and bind it in the context namespace.
    ///
    /// When `context` is a package and `name` exists inside it, the
    /// package-relative module wins over a top-level one. The first
    /// component of `name` is bound in `context`; the fully imported
    /// module is returned.
    pub fn import_into(
        &self,
        name: &str,
        context: &ModuleObject,
    ) -> ImportResult<Arc<ModuleObject>> {
        let dotted = DottedName::parse(name).ok_or_else(|| ImportError::InvalidName {
            name: Arc::from(name),
        })?;

        let (target, head) = match context.package() {
            Some(package) if context.is_package() => {
                let relative = resolve_relative_import(name, 1, package)?;
                let relative_head = resolve_relative_import(dotted.top_level(), 1, package)?;
                if self.is_loaded(&relative_head) || self.locate(&relative_head).is_ok() {
                    (relative, relative_head)
                } else {
                    (name.to_string(), dotted.top_level().to_string())
                }
            }
            _ => (name.to_string(), dotted.top_level().to_string()),
        };

        let module = self.import_module(&target)?;
        if let Some(bound) = self.get_module(&head) {
            context.set_attr(dotted.top_level(), Value::module(bound));
        }

        Ok(module)
    }

    /// `from module import attr`.
    ///
    /// Falls back to importing `module.attr` as a submodule when `module` is
    /// a package without such an attribute.
    pub fn import_from(&self, module: &ModuleObject, attr: &str) -> ImportResult<Value> {
        if let Some(value) = module.get_attr(attr) {
            return Ok(value);
        }

        if module.is_package() {
            let submodule = format!("{}.{}", module.name(), attr);
            if self.locate(&submodule).is_ok() {
                return self.import_module(&submodule).map(Value::module);
            }
        }

        Err(ImportError::AttributeNotFound {
            module: Arc::from(module.name()),
            attr: Arc::from(attr),
        })
    }

    /// `from module import *`: the public names of `module`.
    pub fn import_star(&self, module: &ModuleObject) -> ImportResult<Vec<(Arc<str>, Value)>> {
        Ok(module.public_attrs())
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Locate the source of `name` without loading it.
    ///
    /// Submodules of a loaded package are searched in its `__path__`;
    /// everything else walks the search path. Returns `(path, is_package)`.
    pub fn locate(&self, name: &str) -> ImportResult<(PathBuf, bool)> {
        let dotted = DottedName::parse(name).ok_or_else(|| ImportError::InvalidName {
            name: Arc::from(name),
        })?;
        let config = self.config();

        let parent_dir = parent_package(name)
            .and_then(|parent| self.get_module(parent))
            .and_then(|parent| parent.search_dir().map(|dir| dir.to_path_buf()));

        let found = match parent_dir {
            Some(dir) => find_module_in(&dir, leaf_name(name), &config),
            None => find_dotted_module_source(&dotted, &config.search_paths, &config),
        };

        found.ok_or_else(|| ImportError::ModuleNotFound {
            module: Arc::from(name),
        })
    }

    /// The built-in loader: locate, register, execute.
    ///
    /// The module is registered before its body runs and removed again if
    /// the body fails. Hooks are not consulted.
    pub fn load_default(&self, name: &str) -> ImportResult<Arc<ModuleObject>> {
        let (path, is_package) = self.locate(name)?;
        let source = std::fs::read_to_string(&path).map_err(|source| ImportError::Io {
            path: path.clone(),
            source,
        })?;

        let package: Option<Arc<str>> = if is_package {
            Some(Arc::from(name))
        } else {
            parent_package(name).map(Arc::from)
        };
        let search_dir = if is_package {
            path.parent().map(|dir| dir.to_path_buf())
        } else {
            None
        };

        let mut module = ModuleObject::with_metadata(name, Some(path.clone()), package);
        if let Some(dir) = search_dir {
            module = module.with_search_dir(dir);
        }
        let module = Arc::new(module);

        trace!(module = name, path = %path.display(), is_package, "loading module");

        self.insert_module(name, module.clone());
        if let Err(err) = execute_source(&module, &source, &path) {
            self.remove_module(name);
            return Err(err);
        }

        Ok(module)
    }

    /// Run the meta path for a registry miss.
    fn find_and_load(&self, name: &str) -> ImportResult<Arc<ModuleObject>> {
        let hooks = self.meta_path.read().snapshot();

        let mut loaded = None;
        for (index, hook) in hooks.iter().enumerate() {
            if hook.find_module(name, self) {
                trace!(module = name, hook = hook.name(), "meta path hook claimed module");
                let module = hook.load_module(name, self).inspect_err(|_| {
                    self.remove_module(name);
                })?;
                loaded = Some((index, module));
                break;
            }
        }

        let (loader_index, module) = match loaded {
            Some((index, module)) => (Some(index), module),
            None => (None, self.load_default(name)?),
        };

        if !self.is_loaded(name) {
            self.insert_module(name, module.clone());
        }

        for (index, hook) in hooks.iter().enumerate() {
            if Some(index) == loader_index {
                continue;
            }
            if let Err(err) = hook.on_module_imported(name, &module, self) {
                self.remove_module(name);
                return Err(err);
            }
        }

        Ok(module)
    }
}

impl Default for ImportResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ImportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportResolver")
            .field("modules", &self.modules.read().len())
            .field("meta_path", &*self.meta_path.read())
            .field("config", &*self.config.read())
            .finish()
    }
}
