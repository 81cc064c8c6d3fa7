//! Import errors.
//!
//! Messages follow CPython's wording so failures read the same as they
//! would from `import` statements.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Error raised while resolving or loading a module.
#[derive(Debug)]
pub enum ImportError {
    /// No search path entry contains the module.
    ModuleNotFound { module: Arc<str> },
    /// The requested name is not a valid dotted module name.
    InvalidName { name: Arc<str> },
    /// A relative import walked above the top-level package.
    BeyondTopLevel { name: Arc<str>, package: Arc<str> },
    /// `from module import name` where `name` does not exist.
    AttributeNotFound { module: Arc<str>, attr: Arc<str> },
    /// The module body could not be executed.
    Syntax {
        module: Arc<str>,
        path: PathBuf,
        line: usize,
        message: String,
    },
    /// Reading a source file or package directory failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ImportError {
    /// Name of the module the error concerns, if any.
    pub fn module(&self) -> Option<&str> {
        match self {
            ImportError::ModuleNotFound { module }
            | ImportError::AttributeNotFound { module, .. }
            | ImportError::Syntax { module, .. } => Some(&**module),
            ImportError::InvalidName { .. }
            | ImportError::BeyondTopLevel { .. }
            | ImportError::Io { .. } => None,
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::ModuleNotFound { module } => {
                write!(f, "No module named '{}'", module)
            }
            ImportError::InvalidName { name } => {
                write!(f, "invalid module name '{}'", name)
            }
            ImportError::BeyondTopLevel { name, package } => write!(
                f,
                "attempted relative import beyond top-level package ('{}' from '{}')",
                name, package
            ),
            ImportError::AttributeNotFound { module, attr } => {
                write!(f, "cannot import name '{}' from '{}'", attr, module)
            }
            ImportError::Syntax {
                path,
                line,
                message,
                ..
            } => write!(
                f,
                "File \"{}\", line {}: SyntaxError: {}",
                path.display(),
                line,
                message
            ),
            ImportError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
