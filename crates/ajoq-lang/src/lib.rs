//! `ajoq-lang` compiles MongoDB-style filter and sort specifications into
//! reusable predicates and comparators.
//!
//! ## Examples
//!
//! ```rust
//! use ajoq_lang::Value;
//! use serde_json::json;
//!
//! let records: Vec<Value> = vec![
//!     json!({"n": 42, "s": "Hello World!"}).into(),
//!     json!({"n": 24, "s": "Goodbye World!"}).into(),
//! ];
//!
//! let filter = ajoq_lang::create_filter(&json!({"n": {"$gt": 30}}).into()).unwrap();
//! let matched = filter.filter(&records).unwrap();
//! assert_eq!(matched, vec![&records[0]]);
//!
//! let sort = ajoq_lang::create_sort(Some(&json!({"n": 1}).into())).unwrap();
//! let mut sorted = records.clone();
//! sort.sort(&mut sorted);
//! assert_eq!(sorted[0], records[1]);
//! ```
mod compiler;
mod error;
mod number;
mod pattern;
mod query;
mod value;

pub use compiler::{Binding, Context, DEFAULT_MAX_DEPTH, Filter, Literal, Options, Sort, literal_list, stringify};
pub use error::compile::CompileError;
pub use error::eval::EvalError;
pub use error::{Error, InnerError};
pub use number::Number;
pub use pattern::Pattern;
pub use query::{Clause, Condition, Logic, Operator, OperatorKind, Query, from_json, parse};
pub use value::{Object, Value, ValueSet};

pub type AjoqResult<T> = Result<T, Error>;

/// Compiles a filter specification with the default [`Options`].
///
/// An `undefined` specification yields a filter that matches no record.
pub fn create_filter(spec: &Value) -> AjoqResult<Filter> {
    create_filter_with_options(spec, &Options::default())
}

pub fn create_filter_with_options(spec: &Value, options: &Options) -> AjoqResult<Filter> {
    Filter::new(spec, options).map_err(Error::from)
}

/// Compiles a sort specification with the default [`Options`].
///
/// Without a specification the comparator treats every pair as equal.
pub fn create_sort(spec: Option<&Value>) -> AjoqResult<Sort> {
    create_sort_with_options(spec, &Options::default())
}

pub fn create_sort_with_options(spec: Option<&Value>, options: &Options) -> AjoqResult<Sort> {
    Sort::new(spec, options).map_err(Error::from)
}
