//! Package directory scanning.
//!
//! Enumerates the importable children of a package directory. Entries that
//! are neither subpackages nor source files are skipped. Results are
//! sorted so import order does not depend on directory listing order.

use prism_import::ImportConfig;
use prism_import::package::is_package;
use std::fs;
use std::io;
use std::path::Path;

/// Names of the subpackages of `dir`: directories holding an initializer.
pub fn list_subpackages(dir: &Path, config: &ImportConfig) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !is_module_name(&name) {
            continue;
        }
        if is_package(&entry.path(), config) {
            names.push(name);
        }
    }

    names.sort_unstable();
    Ok(names)
}

/// Stems of the submodules of `dir`: source files other than the
/// initializer.
pub fn list_submodules(dir: &Path, config: &ImportConfig) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some(&*config.source_suffix) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if config.is_init_stem(stem) || !is_module_name(stem) {
            continue;
        }
        names.push(stem.to_string());
    }

    names.sort_unstable();
    Ok(names)
}

/// A dotted name component cannot be empty or contain a dot.
#[inline]
fn is_module_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('.')
}
