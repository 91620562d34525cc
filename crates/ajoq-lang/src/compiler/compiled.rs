//! Compiled closure types.
//!
//! A filter compiles into a tree of [`CompiledPredicate`] closures and a sort
//! into a tree of [`CompiledComparator`] closures. Each node also keeps the
//! expression text it stands for, so the whole tree can be rendered for
//! diagnostics.

use crate::error::eval::EvalError;
use crate::value::Value;

/// A compiled filter node.
///
/// ## Example
///
/// ```rust,ignore
/// let compiled: CompiledPredicate = Box::new(|value| Ok(!value.is_nullish()));
///
/// assert_eq!(compiled(&Value::Null), Ok(false));
/// ```
pub type CompiledPredicate = Box<dyn Fn(&Value) -> Result<bool, EvalError> + Send + Sync>;

/// A compiled sort node returning a signed score: negative when `a` sorts
/// first, positive when `b` does, zero on a tie.
pub type CompiledComparator = Box<dyn Fn(&Value, &Value) -> f64 + Send + Sync>;

/// A predicate paired with the expression text it was compiled from.
pub struct CompiledExpr {
    pub source: String,
    pub eval: CompiledPredicate,
}

impl CompiledExpr {
    pub fn new(source: impl Into<String>, eval: CompiledPredicate) -> Self {
        Self {
            source: source.into(),
            eval,
        }
    }
}

/// A comparator paired with the expression text it was compiled from.
pub struct CompiledSort {
    pub source: String,
    pub eval: CompiledComparator,
}

impl CompiledSort {
    pub fn new(source: impl Into<String>, eval: CompiledComparator) -> Self {
        Self {
            source: source.into(),
            eval,
        }
    }
}
