//! `RecursiveImporter` - the meta path hook that expands recursive
//! packages.
//!
//! The hook claims every name and loads it with the resolver's default
//! loader. After any module loads it checks the recursion marker and, for
//! a marked package initializer, imports the selected children through
//! the resolver. Each child import runs the meta path again, which is how
//! marked subpackages expand in turn.

use crate::policy::{RECURSIVE_MARKER, RecursionMode, package_dir, select_children};
use prism_import::{ImportError, ImportHook, ImportResolver, ImportResult, ModuleObject, Value};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, trace};

/// Catch-all import hook for recursive packages.
#[derive(Debug, Default)]
pub struct RecursiveImporter {
    _private: (),
}

impl RecursiveImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import and bind the children of `package` if it is a marked
    /// package initializer; otherwise do nothing.
    ///
    /// Each child is imported under its fully-qualified name and bound on
    /// `package`. Stops at the first child that fails to import and returns
    /// that child's error unchanged.
    ///
    /// In star mode the children's public names are copied in import order,
    /// so a later child overrides an earlier one. Names the package body
    /// bound itself are never overridden.
    pub fn expand(
        &self,
        fullname: &str,
        package: &Arc<ModuleObject>,
        resolver: &ImportResolver,
    ) -> ImportResult<()> {
        let Some(marker) = package
            .get_attr(RECURSIVE_MARKER)
            .filter(Value::is_truthy)
        else {
            return Ok(());
        };

        let config = resolver.config();
        let Some(dir) = package_dir(package, &config) else {
            trace!(module = fullname, "recursion marker outside a package initializer");
            return Ok(());
        };

        let Some(mode) = RecursionMode::from_marker(&marker) else {
            debug!(module = fullname, marker = %marker, "ignoring unrecognized recursion marker");
            return Ok(());
        };

        let children = select_children(&dir, mode, &config).map_err(|source| ImportError::Io {
            path: dir.clone(),
            source,
        })?;
        if children.is_empty() {
            return Ok(());
        }

        debug!(
            module = fullname,
            mode = %mode,
            children = children.len(),
            "importing package recursively"
        );

        // Sorted, for binary search.
        let body_names = if mode.binds_public_names() {
            package.dir()
        } else {
            Vec::new()
        };

        for child in &children {
            let qualified = format!("{}.{}", fullname, child);
            trace!(module = %qualified, "recursive child import");

            let module = resolver.import_module(&qualified)?;
            package.set_attr(child, Value::module(module.clone()));

            if mode.binds_public_names() {
                for (name, value) in resolver.import_star(&module)? {
                    if body_names.binary_search(&name).is_err() {
                        package.set_attr(&name, value);
                    }
                }
            }
        }

        Ok(())
    }
}

impl ImportHook for RecursiveImporter {
    fn find_module(&self, _fullname: &str, _resolver: &ImportResolver) -> bool {
        true
    }

    fn on_module_imported(
        &self,
        fullname: &str,
        module: &Arc<ModuleObject>,
        resolver: &ImportResolver,
    ) -> ImportResult<()> {
        self.expand(fullname, module, resolver)
    }

    fn name(&self) -> &str {
        "RecursiveImporter"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
