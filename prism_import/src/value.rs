//! Values stored in module namespaces.

use crate::module_object::ModuleObject;
use std::fmt;
use std::sync::Arc;

/// A namespace value.
///
/// Covers what module bodies can bind: constants from the source loader
/// and references to other loaded modules.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
    Module(Arc<ModuleObject>),
}

impl Value {
    #[inline]
    pub fn none() -> Self {
        Value::None
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    #[inline]
    pub fn int(i: i64) -> Self {
        Value::Int(i)
    }

    #[inline]
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    #[inline]
    pub fn module(module: Arc<ModuleObject>) -> Self {
        Value::Module(module)
    }

    /// Python truthiness: `None`, `False`, `0` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Str(s) => !s.is_empty(),
            Value::Module(_) => true,
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_module(&self) -> Option<&Arc<ModuleObject>> {
        match self {
            Value::Module(m) => Some(m),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // Modules compare by identity.
            (Value::Module(a), Value::Module(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Module(m) => match m.file() {
                Some(file) => write!(f, "<module '{}' from '{}'>", m.name(), file.display()),
                None => write!(f, "<module '{}'>", m.name()),
            },
        }
    }
}
