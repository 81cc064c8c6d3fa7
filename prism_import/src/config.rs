//! Import system configuration.
//!
//! Captures the package layout conventions and the module search path.
//! Resolved once when a resolver is created; only the search path can be
//! extended afterwards (the `sys.path.insert(0, ...)` idiom).

use std::path::PathBuf;
use std::sync::Arc;

/// File stem that marks a directory as a package.
pub const DEFAULT_INIT_STEM: &str = "__init__";

/// Extension of module source files (without the dot).
pub const DEFAULT_SOURCE_SUFFIX: &str = "py";

/// Environment variable holding extra search paths, `PYTHONPATH`-style.
pub const SEARCH_PATH_ENV: &str = "PRISMPATH";

/// Configuration for an [`ImportResolver`](crate::ImportResolver).
///
/// # Example
///
/// ```ignore
/// use prism_import::ImportConfig;
///
/// let config = ImportConfig::new()
///     .with_search_path("/opt/app/lib")
///     .with_search_path("vendor");
/// ```
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Directories searched for top-level modules, in order.
    ///
    /// Default: empty
    pub search_paths: Vec<PathBuf>,

    /// Stem of the package initializer file.
    ///
    /// Default: `__init__`
    pub init_stem: Arc<str>,

    /// Source file extension, without the leading dot.
    ///
    /// Default: `py`
    pub source_suffix: Arc<str>,
}

impl ImportConfig {
    /// Create a configuration with default layout and no search paths.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration extended with the paths listed in `PRISMPATH`.
    ///
    /// Empty path-list entries are skipped.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(paths) = std::env::var_os(SEARCH_PATH_ENV) {
            config.search_paths.extend(
                std::env::split_paths(&paths).filter(|path| !path.as_os_str().is_empty()),
            );
        }
        config
    }

    /// Append a directory to the search path.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Override the package initializer stem.
    pub fn with_init_stem(mut self, stem: impl Into<Arc<str>>) -> Self {
        self.init_stem = stem.into();
        self
    }

    /// Override the source file extension.
    pub fn with_source_suffix(mut self, suffix: impl Into<Arc<str>>) -> Self {
        self.source_suffix = suffix.into();
        self
    }

    /// File name of the package initializer (e.g. `__init__.py`).
    #[inline]
    pub fn init_file_name(&self) -> String {
        self.source_file_name(&self.init_stem)
    }

    /// File name of a module source file with the given stem.
    #[inline]
    pub fn source_file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.source_suffix)
    }

    /// Whether `stem` names the package initializer.
    #[inline]
    pub fn is_init_stem(&self, stem: &str) -> bool {
        stem == &*self.init_stem
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            init_stem: Arc::from(DEFAULT_INIT_STEM),
            source_suffix: Arc::from(DEFAULT_SOURCE_SUFFIX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = ImportConfig::default();
        assert!(config.search_paths.is_empty());
        assert_eq!(config.init_file_name(), "__init__.py");
        assert_eq!(config.source_file_name("util"), "util.py");
        assert!(config.is_init_stem("__init__"));
        assert!(!config.is_init_stem("__main__"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ImportConfig::new()
            .with_search_path("a")
            .with_search_path("b")
            .with_init_stem("_pkg")
            .with_source_suffix("pr");

        assert_eq!(config.search_paths, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(config.init_file_name(), "_pkg.pr");
    }
}
