//! Package system: dotted names, `__init__.py` and relative imports.
//!
//! Provides the machinery for resolving:
//! - **Dotted imports**: `import pkg.sub` → locate `pkg`, then `sub` inside it
//! - **Package detection**: identify packages via their initializer file
//! - **Relative imports**: `from . import foo`, `from ..bar import baz`
//!
//! # Architecture
//!
//! ```text
//! find_dotted_module_source("pkg.sub", paths)
//!   ├── Walk "pkg" (must be a package directory)
//!   ├── Check pkg/sub/__init__.py (package)
//!   └── Check pkg/sub.py          (module)
//!
//! resolve_relative_import(level=2, name="bar", package="foo.baz.qux")
//!   ├── Trim package by level → "foo.baz"
//!   └── Append name → "foo.baz.bar"
//! ```

use crate::config::ImportConfig;
use crate::error::ImportError;
use smallvec::SmallVec;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// Dotted Name Resolution
// =============================================================================

/// Parsed dotted import name with pre-split components.
///
/// Most names have at most four components, which stay inline.
#[derive(Debug, Clone)]
pub struct DottedName {
    /// Pre-split components (e.g., ["pkg", "sub", "mod"]).
    parts: SmallVec<[Arc<str>; 4]>,
}

impl DottedName {
    /// Parse a dotted module name.
    ///
    /// Returns `None` for empty names and names with empty components.
    #[inline]
    pub fn parse(name: &str) -> Option<Self> {
        if name.is_empty() {
            return None;
        }

        let parts: SmallVec<[Arc<str>; 4]> = name.split('.').map(Arc::from).collect();

        // Reject ".pkg", "pkg." and "pkg..sub"
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }

        Some(Self { parts })
    }

    /// Get the parts of the dotted name.
    #[inline]
    pub fn parts(&self) -> &[Arc<str>] {
        &self.parts
    }

    /// Get the top-level module name.
    #[inline]
    pub fn top_level(&self) -> &str {
        &self.parts[0]
    }

    /// Get the last component.
    #[inline]
    pub fn leaf(&self) -> &str {
        &self.parts[self.parts.len() - 1]
    }
}

// =============================================================================
// Relative Import Resolution
// =============================================================================

/// Resolve a relative import to an absolute module name.
///
/// - `level`: number of leading dots (1 = current package, 2 = parent, etc.)
/// - `name`: optional name after the dots
/// - `package`: the `__package__` of the importing module
///
/// ```ignore
/// // In package "foo.bar.baz":
/// resolve_relative_import("", 1, "foo.bar.baz")    // → "foo.bar.baz"
/// resolve_relative_import("qux", 1, "foo.bar.baz") // → "foo.bar.baz.qux"
/// resolve_relative_import("qux", 2, "foo.bar.baz") // → "foo.bar.qux"
/// ```
pub fn resolve_relative_import(
    name: &str,
    level: u32,
    package: &str,
) -> Result<String, ImportError> {
    if level == 0 {
        return Ok(name.to_string());
    }

    if package.is_empty() {
        return Err(ImportError::BeyondTopLevel {
            name: Arc::from(name),
            package: Arc::from(package),
        });
    }

    let pkg_parts: Vec<&str> = package.split('.').collect();
    let level = level as usize;

    if level > pkg_parts.len() {
        return Err(ImportError::BeyondTopLevel {
            name: Arc::from(name),
            package: Arc::from(package),
        });
    }

    let base_depth = pkg_parts.len() - level + 1;
    let base = pkg_parts[..base_depth].join(".");

    if name.is_empty() {
        Ok(base)
    } else {
        Ok(format!("{}.{}", base, name))
    }
}

// =============================================================================
// Package Detection
// =============================================================================

/// Check if a directory is a package (contains the initializer file).
#[inline]
pub fn is_package(dir: &Path, config: &ImportConfig) -> bool {
    dir.is_dir() && dir.join(config.init_file_name()).is_file()
}

/// Find the initializer file of a package directory.
#[inline]
pub fn find_init_file(dir: &Path, config: &ImportConfig) -> Option<PathBuf> {
    let init = dir.join(config.init_file_name());
    if dir.is_dir() && init.is_file() { Some(init) } else { None }
}

/// Find a module named `name` directly inside `dir`.
///
/// A package (`name/__init__.py`) wins over a module (`name.py`).
/// Returns `(path, is_package)`.
pub fn find_module_in(dir: &Path, name: &str, config: &ImportConfig) -> Option<(PathBuf, bool)> {
    if let Some(init) = find_init_file(&dir.join(name), config) {
        return Some((init, true));
    }

    let module_file = dir.join(config.source_file_name(name));
    if module_file.is_file() {
        return Some((module_file, false));
    }

    None
}

/// Resolve a dotted module name to a filesystem path.
///
/// For `pkg.sub`, each search path is checked for:
/// 1. `<search_path>/pkg/sub/__init__.py` (package)
/// 2. `<search_path>/pkg/sub.py` (module)
///
/// Every intermediate component must itself be a package.
pub fn find_dotted_module_source(
    dotted_name: &DottedName,
    search_paths: &[PathBuf],
    config: &ImportConfig,
) -> Option<(PathBuf, bool)> {
    let (last, parents) = dotted_name.parts().split_last()?;

    'roots: for base in search_paths {
        let mut dir = base.clone();

        for part in parents {
            dir.push(&**part);
            if !is_package(&dir, config) {
                continue 'roots;
            }
        }

        if let Some(found) = find_module_in(&dir, last, config) {
            return Some(found);
        }
    }

    None
}

/// Get the parent package name from a dotted module name.
///
/// E.g., "os.path" → "os", "foo.bar.baz" → "foo.bar"
#[inline]
pub fn parent_package(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(parent, _)| parent)
}

/// Get the leaf module name from a dotted name.
///
/// E.g., "os.path" → "path", "foo.bar.baz" → "baz"
#[inline]
pub fn leaf_name(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, leaf)| leaf).unwrap_or(name)
}

// =============================================================================
// Tests
// =============================================================================
