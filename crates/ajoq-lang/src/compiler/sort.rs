use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use smol_str::SmolStr;

use super::Options;
use super::compiled::{CompiledComparator, CompiledSort};
use super::literal::quote;
use crate::error::compile::CompileError;
use crate::value::Value;

const ROOT: (&str, &str) = ("a", "b");

/// A compiled sort specification.
///
/// Text leaves compare case-insensitively by code point, lowercase first on
/// ties. This is not locale collation: accented letters sort after plain
/// ones, so `"é"` orders after `"f"`.
///
/// ## Example
///
/// ```rust
/// use ajoq_lang::{Sort, Options, Value};
///
/// let spec: Value = [("n", -1)].into_iter().collect();
/// let sort = Sort::new(Some(&spec), &Options::default()).unwrap();
///
/// let mut records: Vec<Value> = (1..=3).map(|n| [("n", n)].into_iter().collect::<Value>()).collect();
/// sort.sort(&mut records);
///
/// assert_eq!(records[0].get("n").into_owned(), Value::from(3));
/// ```
pub struct Sort {
    comparator: CompiledComparator,
    source: String,
}

impl Sort {
    /// Compiles `spec`. `None`, `undefined` and an empty object all produce a
    /// comparator that keeps the existing order.
    pub fn new(spec: Option<&Value>, options: &Options) -> Result<Self, CompileError> {
        let compiled = match spec {
            None | Some(Value::Undefined) => neutral(),
            Some(spec) => SortCompiler {
                max_depth: options.max_depth,
            }
            .node(spec, ROOT.0, ROOT.1, 0)?,
        };

        let source = format!("return {};", compiled.source);
        tracing::debug!("compiled sort\n{source}");

        Ok(Self {
            comparator: compiled.eval,
            source,
        })
    }

    /// The signed score of the pair: negative when `a` sorts first, positive
    /// when `b` does.
    pub fn score(&self, a: &Value, b: &Value) -> f64 {
        (self.comparator)(a, b)
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        self.score(a, b).partial_cmp(&0.0).unwrap_or(Ordering::Equal)
    }

    /// Sorts `values` in place. Ties keep their relative order.
    pub fn sort(&self, values: &mut [Value]) {
        values.sort_by(|a, b| self.compare(a, b));
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sort").field("source", &self.source).finish()
    }
}

struct SortCompiler {
    max_depth: usize,
}

impl SortCompiler {
    fn node(&self, spec: &Value, a: &str, b: &str, depth: usize) -> Result<CompiledSort, CompileError> {
        if depth > self.max_depth {
            return Err(CompileError::DepthLimitExceeded(self.max_depth));
        }

        let keys: Vec<(SmolStr, &Value)> = match spec {
            Value::Object(map) => map.iter().map(|(k, v)| (SmolStr::new(k), v)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (SmolStr::new(i.to_string()), v))
                .collect(),
            leaf => return Ok(direction(leaf, a, b)),
        };

        if keys.is_empty() {
            return Ok(neutral());
        }

        let mut sources = Vec::with_capacity(keys.len());
        let mut children = Vec::with_capacity(keys.len());
        for (key, child) in keys {
            let quoted = quote(&key);
            let compiled = self.node(
                child,
                &format!("{a}?.[{quoted}]"),
                &format!("{b}?.[{quoted}]"),
                depth + 1,
            )?;
            sources.push(compiled.source);
            children.push((key, compiled.eval));
        }

        // Siblings are tried in declaration order; the first decided one wins.
        Ok(CompiledSort::new(
            sources.join(" || "),
            Box::new(move |x: &Value, y: &Value| {
                children
                    .iter()
                    .map(|(key, cmp)| cmp(&x.get(key), &y.get(key)))
                    .find(|score| *score != 0.0)
                    .unwrap_or(0.0)
            }),
        ))
    }
}

fn neutral() -> CompiledSort {
    CompiledSort::new("0", Box::new(|_: &Value, _: &Value| 0.0))
}

/// Compiles a leaf: a direction token applied to the pair found at `a` and
/// `b`. Unknown tokens are neutral.
fn direction(token: &Value, a: &str, b: &str) -> CompiledSort {
    match token {
        Value::String(s) => match sign(s) {
            Some(sign) => CompiledSort::new(
                format!("({a}?.localeCompare({b}) * {sign})"),
                Box::new(move |x: &Value, y: &Value| {
                    if x.is_nullish() {
                        0.0
                    } else {
                        sign * ordering_score(locale_compare(&x.to_text(), &y.to_text()))
                    }
                }),
            ),
            None => neutral(),
        },
        Value::Number(n) if n.value().abs() == 1.0 => {
            let sign = n.value();
            CompiledSort::new(
                format!("(({a} - {b}) * {sign})"),
                Box::new(move |x: &Value, y: &Value| {
                    let diff = (x.to_number().value() - y.to_number().value()) * sign;
                    if diff.is_nan() { 0.0 } else { diff }
                }),
            )
        }
        Value::Bool(ascending) => {
            let sign = if *ascending { 1.0 } else { -1.0 };
            CompiledSort::new(
                format!("(({a} > {b} ? 1 : {a} < {b} ? -1 : 0) * {sign})"),
                Box::new(move |x: &Value, y: &Value| {
                    x.compare(y).map_or(0.0, |ordering| sign * ordering_score(ordering))
                }),
            )
        }
        _ => neutral(),
    }
}

fn sign(token: &str) -> Option<f64> {
    match token.to_ascii_lowercase().as_str() {
        "asc" | "1" => Some(1.0),
        "desc" | "-1" => Some(-1.0),
        _ => None,
    }
}

fn ordering_score(ordering: Ordering) -> f64 {
    f64::from(ordering as i8)
}

/// Compares text the way a root-locale collator does for common input:
/// case-insensitively first, then lowercase before uppercase.
fn locale_compare(a: &str, b: &str) -> Ordering {
    fn fold(s: &str) -> Cow<'_, str> {
        if s.chars().any(char::is_uppercase) {
            Cow::Owned(s.to_lowercase())
        } else {
            Cow::Borrowed(s)
        }
    }

    fold(a).cmp(&fold(b)).then_with(|| b.cmp(a))
}
