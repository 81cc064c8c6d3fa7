//! The recursive hook installed into the process-wide resolver.

use prism_import::{ImportResolver, Value};
use prism_recursive::{RecursiveImporter, install, is_installed};
use std::fs;

#[test]
fn global_install_expands_recursive_packages() {
    let tmp = tempfile::tempdir().unwrap();
    let pkg = tmp.path().join("global_recursive_pkg");
    fs::create_dir_all(pkg.join("inner")).unwrap();
    fs::write(pkg.join("__init__.py"), "__recursive__ = True\n").unwrap();
    fs::write(pkg.join("first.py"), "VALUE = 1\n").unwrap();
    fs::write(pkg.join("inner").join("__init__.py"), "VALUE = 2\n").unwrap();

    let resolver = ImportResolver::global();
    resolver.add_search_path(tmp.path());

    install();
    install();
    assert!(is_installed(resolver));
    {
        let chain = resolver.meta_path();
        assert_eq!(chain.count::<RecursiveImporter>(), 1);
        assert_eq!(chain.position::<RecursiveImporter>(), Some(chain.len() - 1));
    }

    let module = resolver.import_module("global_recursive_pkg").unwrap();
    let first = module.get_submodule("first").unwrap();
    let inner = module.get_submodule("inner").unwrap();
    assert_eq!(first.get_attr("VALUE"), Some(Value::int(1)));
    assert_eq!(inner.get_attr("VALUE"), Some(Value::int(2)));
}
