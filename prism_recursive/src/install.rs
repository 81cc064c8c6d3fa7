//! Installing the recursive hook into a resolver's meta path.
//!
//! The hook is a catch-all, so it lives in the meta path's sentinel slot:
//! it stays behind every hook appended later and is only asked once all
//! more specific hooks have declined. Installing is idempotent.

use crate::importer::RecursiveImporter;
use prism_import::ImportResolver;
use std::sync::Arc;
use tracing::{debug, trace};

/// Install the recursive hook into the process-wide resolver.
///
/// Call once during startup, before the first recursive package is
/// imported. Returns `true` if the hook was not installed before.
pub fn install() -> bool {
    install_into(ImportResolver::global())
}

/// Install the recursive hook into `resolver`.
///
/// At most one `RecursiveImporter` ends up in the chain, always as its
/// last element; one appended earlier as an ordinary hook is moved there.
pub fn install_into(resolver: &ImportResolver) -> bool {
    let created = resolver
        .meta_path_mut()
        .ensure_sentinel::<RecursiveImporter, _>(|| Arc::new(RecursiveImporter::new()));

    if created {
        debug!("recursive import hook installed");
    } else {
        trace!("recursive import hook already installed");
    }
    created
}

/// Remove the recursive hook from the process-wide resolver.
pub fn uninstall() -> bool {
    uninstall_from(ImportResolver::global())
}

/// Remove every recursive hook from `resolver`.
///
/// Returns `true` if anything was removed.
pub fn uninstall_from(resolver: &ImportResolver) -> bool {
    let removed = resolver.meta_path_mut().remove::<RecursiveImporter>();
    if removed > 0 {
        debug!("recursive import hook uninstalled");
    }
    removed > 0
}

/// Whether `resolver` has the recursive hook in its meta path.
pub fn is_installed(resolver: &ImportResolver) -> bool {
    resolver.meta_path().contains::<RecursiveImporter>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_import::{ImportHook, ModuleObject};
    use std::any::Any;

    struct Specific;

    impl ImportHook for Specific {
        fn find_module(&self, fullname: &str, _resolver: &ImportResolver) -> bool {
            fullname.starts_with("vendored")
        }

        fn load_module(
            &self,
            fullname: &str,
            _resolver: &ImportResolver,
        ) -> prism_import::ImportResult<Arc<ModuleObject>> {
            Ok(Arc::new(ModuleObject::new(fullname)))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn last_is_recursive(resolver: &ImportResolver) -> bool {
        let chain = resolver.meta_path();
        chain.position::<RecursiveImporter>() == Some(chain.len() - 1)
    }

    #[test]
    fn test_install_twice_leaves_one_hook() {
        let resolver = ImportResolver::new();
        assert!(install_into(&resolver));
        assert!(!install_into(&resolver));

        assert_eq!(resolver.meta_path().count::<RecursiveImporter>(), 1);
        assert!(is_installed(&resolver));
    }

    #[test]
    fn test_hooks_added_later_stay_in_front() {
        let resolver = ImportResolver::new();
        resolver.add_hook(Arc::new(Specific));
        install_into(&resolver);
        resolver.add_hook(Arc::new(Specific));
        resolver.meta_path_mut().insert(usize::MAX, Arc::new(Specific));

        assert_eq!(resolver.meta_path().len(), 4);
        assert!(last_is_recursive(&resolver));

        install_into(&resolver);
        assert!(last_is_recursive(&resolver));
        assert_eq!(resolver.meta_path().count::<RecursiveImporter>(), 1);
    }

    #[test]
    fn test_install_adopts_pushed_instance() {
        let resolver = ImportResolver::new();
        resolver.add_hook(Arc::new(RecursiveImporter::new()));
        resolver.add_hook(Arc::new(Specific));

        assert!(!install_into(&resolver));
        assert_eq!(resolver.meta_path().count::<RecursiveImporter>(), 1);
        assert!(last_is_recursive(&resolver));
    }

    #[test]
    fn test_specific_hook_is_tried_first() {
        let resolver = ImportResolver::new();
        install_into(&resolver);
        resolver.add_hook(Arc::new(Specific));

        // Only `Specific` can produce this module; nothing exists on disk.
        let module = resolver.import_module("vendored").unwrap();
        assert_eq!(module.name(), "vendored");
    }

    #[test]
    fn test_uninstall() {
        let resolver = ImportResolver::new();
        assert!(!uninstall_from(&resolver));

        install_into(&resolver);
        assert!(uninstall_from(&resolver));
        assert!(!is_installed(&resolver));
        assert!(resolver.meta_path().is_empty());

        assert!(install_into(&resolver));
    }
}
