//! Prism import system.
//!
//! Provides the machinery for locating, loading and caching Python modules,
//! plus the `sys.meta_path`-style hook chain that lets extensions observe
//! and take over module loading.
//!
//! # Architecture
//!
//! ```text
//! ImportResolver
//!   ├── sys.modules registry (RwLock<FxHashMap>)
//!   ├── MetaPath (ordered ImportHook chain, trailing sentinel slot)
//!   ├── PackageSystem (dotted names, __init__.py, relative imports)
//!   └── SourceLoader (module body execution)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let resolver = ImportResolver::with_config(ImportConfig::new().with_search_path("lib"));
//! let module = resolver.import_module("mypkg.util")?;
//! let value = resolver.import_from(&module, "VERSION")?;
//! ```

pub mod config;
pub mod error;
pub mod meta_path;
pub mod module_object;
pub mod package;
pub mod resolver;
pub mod source;
pub mod value;


pub use config::ImportConfig;
pub use error::{ImportError, ImportResult};
pub use meta_path::{ImportHook, MetaPath};
pub use module_object::ModuleObject;
pub use package::{DottedName, leaf_name, parent_package, resolve_relative_import};
pub use resolver::ImportResolver;
pub use value::Value;
