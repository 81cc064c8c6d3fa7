//! Recursion policy: which children of a package get imported.

use crate::scanner::{list_submodules, list_subpackages};
use prism_import::{ImportConfig, ModuleObject, Value};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Package attribute that opts a package into recursive import.
pub const RECURSIVE_MARKER: &str = "__recursive__";

/// Parsed value of the recursion marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionMode {
    /// Subpackages and submodules (`True` or `'all'`).
    All,
    /// Submodules only.
    Modules,
    /// Subpackages only.
    Packages,
    /// Everything, plus each child's public names bound on the package
    /// (`from .child import *` for every child).
    Star,
}

impl RecursionMode {
    /// Interpret a marker value.
    ///
    /// Falsy values, unrecognized strings and any other value type are
    /// inert and yield `None`.
    pub fn from_marker(value: &Value) -> Option<Self> {
        if !value.is_truthy() {
            return None;
        }
        match value {
            Value::Bool(true) => Some(RecursionMode::All),
            Value::Str(s) => Self::parse(s),
            _ => None,
        }
    }

    /// Parse a marker string, ignoring ASCII case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(RecursionMode::All),
            "modules" => Some(RecursionMode::Modules),
            "packages" => Some(RecursionMode::Packages),
            "*" => Some(RecursionMode::Star),
            _ => None,
        }
    }

    #[inline]
    pub fn imports_packages(self) -> bool {
        matches!(
            self,
            RecursionMode::All | RecursionMode::Packages | RecursionMode::Star
        )
    }

    #[inline]
    pub fn imports_modules(self) -> bool {
        matches!(
            self,
            RecursionMode::All | RecursionMode::Modules | RecursionMode::Star
        )
    }

    #[inline]
    pub fn binds_public_names(self) -> bool {
        self == RecursionMode::Star
    }

    /// Canonical marker string.
    pub fn as_str(self) -> &'static str {
        match self {
            RecursionMode::All => "all",
            RecursionMode::Modules => "modules",
            RecursionMode::Packages => "packages",
            RecursionMode::Star => "*",
        }
    }
}

impl fmt::Display for RecursionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory of the package whose initializer `module` was loaded from.
///
/// `None` for modules without a source file and for any module that is
/// not an initializer.
pub fn package_dir(module: &ModuleObject, config: &ImportConfig) -> Option<PathBuf> {
    let file = module.file()?;
    let stem = file.file_stem()?.to_str()?;
    if !config.is_init_stem(stem) {
        return None;
    }
    file.parent().map(Path::to_path_buf)
}

/// Children of the package in `dir` selected by `mode`, subpackages first.
pub fn select_children(
    dir: &Path,
    mode: RecursionMode,
    config: &ImportConfig,
) -> io::Result<Vec<String>> {
    let mut children = Vec::new();

    if mode.imports_packages() {
        children.extend(list_subpackages(dir, config)?);
    }
    if mode.imports_modules() {
        // `x/` and `x.py` side by side import once, as the package.
        for name in list_submodules(dir, config)? {
            if !children.contains(&name) {
                children.push(name);
            }
        }
    }

    Ok(children)
}
