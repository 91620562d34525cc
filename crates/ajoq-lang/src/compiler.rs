//! Closure-based compiler for filter and sort specifications.
//!
//! A specification is walked once and turned into a tree of closures, so the
//! cost of interpreting its shape is paid at construction and every call only
//! runs the conditions it names.
//!
//! ## Design
//!
//! Each node of the specification compiles to a closure that:
//! - Takes the value at the node's path (a record, or a field of it)
//! - Returns `Result<bool, EvalError>` for filters, or a signed score for sorts
//!
//! Alongside the closure every node renders the expression a dynamic host
//! would evaluate for it (`data?.["n"] === 42`). Values that cannot be written
//! as literal text are kept out of line by a per-compilation [`Context`], which
//! also builds repeated set operands only once.
//!
//! ## Example
//!
//! ```rust
//! use ajoq_lang::{Filter, Options, Value};
//!
//! let spec = Value::from(serde_json::json!({"n": {"$in": [1, 2, 3]}}));
//! let filter = Filter::new(&spec, &Options::default()).unwrap();
//!
//! assert_eq!(filter.source(), "const v$0 = new Set([1,2,3]);\nreturn v$0.has(data?.[\"n\"]);");
//! assert!(filter.matches(&Value::from(serde_json::json!({"n": 2}))).unwrap());
//! ```

pub(crate) mod compiled;
mod conditions;
mod context;
mod filter;
mod literal;
mod sort;
#[cfg(test)]
mod test_compiler;

pub use context::{Binding, Context};
pub use filter::Filter;
pub use literal::{Literal, literal_list, stringify};
pub use sort::Sort;

/// Maximum nesting of field descents and logic operands accepted by default.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Compilation settings shared by filters and sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
