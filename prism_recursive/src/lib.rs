//! Recursive package imports for the Prism runtime.
//!
//! A package opts in by binding the recursion marker in its initializer:
//!
//! ```text
//! # mypkg/__init__.py
//! __recursive__ = True        # or 'all', 'modules', 'packages', '*'
//! ```
//!
//! Once the hook is installed, importing `mypkg` also imports the selected
//! subpackages and submodules and binds each of them on `mypkg`. A child
//! package carrying its own marker is expanded the same way, so the walk
//! reaches arbitrary depth.
//!
//! # Architecture
//!
//! ```text
//! install()
//!   └── MetaPath sentinel ← RecursiveImporter
//!
//! import_module("mypkg")
//!   └── RecursiveImporter::on_module_imported
//!         ├── RecursionMode::from_marker(__recursive__)
//!         ├── package_dir (initializer only)
//!         ├── select_children → list_subpackages + list_submodules
//!         └── import_module("mypkg.<child>") → re-enters the meta path
//! ```
//!
//! # Usage
//!
//! ```ignore
//! prism_recursive::install();
//! let pkg = ImportResolver::global().import_module("mypkg")?;
//! assert!(pkg.has_attr("submodule"));
//! ```

pub mod importer;
pub mod install;
pub mod policy;
pub mod scanner;


pub use importer::RecursiveImporter;
pub use install::{install, install_into, is_installed, uninstall, uninstall_from};
pub use policy::{RECURSIVE_MARKER, RecursionMode, package_dir, select_children};
pub use scanner::{list_submodules, list_subpackages};
