use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

use indexmap::IndexMap;
use itertools::Itertools;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::number::{self, Number};
use crate::pattern::Pattern;

mod serde_impl;

/// Field name to value, in insertion order.
pub type Object = IndexMap<String, Value>;

/// Set of values under SameValueZero equality.
pub type ValueSet = FxHashSet<Value>;

pub(crate) static UNDEFINED: Value = Value::Undefined;

/// A dynamically typed record value.
///
/// Records and specifications share this type. Comparison and coercion follow the
/// rules of a dynamically typed host: strict equality for `$eq`, SameValueZero for
/// set membership (this is what `PartialEq`/`Hash` implement), and number/string
/// coercions for relational operators and pattern tests.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    BigInt(i128),
    String(String),
    Regex(Pattern),
    Array(Vec<Value>),
    Object(Object),
}

enum Primitive<'a> {
    Text(Cow<'a, str>),
    Num(f64),
    Big(i128),
}

impl Value {
    pub fn new_object() -> Value {
        Value::Object(Object::default())
    }

    /// The host `typeof` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Regex(_) | Value::Array(_) | Value::Object(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
        }
    }

    /// A finer grained name than [`Value::type_name`], used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Regex(_) => "regex",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// `true` for `undefined` and `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Property access with optional chaining: a missing key, or any access on
    /// a value without properties, yields `undefined`.
    ///
    /// Arrays and strings accept a canonical decimal index and the `length`
    /// pseudo-field.
    pub fn get(&self, key: &str) -> Cow<'_, Value> {
        match self {
            Value::Object(map) => Cow::Borrowed(map.get(key).unwrap_or(&UNDEFINED)),
            Value::Array(items) if key == "length" => Cow::Owned(Value::Number(items.len().into())),
            Value::Array(items) => match parse_index(key) {
                Some(index) => Cow::Borrowed(items.get(index).unwrap_or(&UNDEFINED)),
                None => Cow::Borrowed(&UNDEFINED),
            },
            Value::String(s) if key == "length" => Cow::Owned(Value::Number(s.encode_utf16().count().into())),
            Value::String(s) => match parse_index(key).and_then(|index| s.encode_utf16().nth(index)) {
                Some(unit) => Cow::Owned(Value::String(String::from_utf16_lossy(&[unit]))),
                None => Cow::Borrowed(&UNDEFINED),
            },
            _ => Cow::Borrowed(&UNDEFINED),
        }
    }

    /// String coercion as performed by `'' + value`.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Undefined => Cow::Borrowed("undefined"),
            Value::Null => Cow::Borrowed("null"),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::Number(n) => Cow::Owned(n.to_string()),
            Value::BigInt(n) => Cow::Owned(n.to_string()),
            Value::String(s) => Cow::Borrowed(s),
            Value::Regex(p) => Cow::Owned(p.to_string()),
            Value::Array(items) => Cow::Owned(
                items
                    .iter()
                    .map(|item| if item.is_nullish() { Cow::Borrowed("") } else { item.to_text() })
                    .join(","),
            ),
            Value::Object(_) => Cow::Borrowed("[object Object]"),
        }
    }

    /// Number coercion (`ToNumber`). BigInts convert to their nearest double.
    pub fn to_number(&self) -> Number {
        match self {
            Value::Undefined => number::NAN,
            Value::Null => Number::new(0.0),
            Value::Bool(b) => Number::new(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => *n,
            Value::BigInt(n) => Number::new(*n as f64),
            Value::String(s) => parse_number(s),
            Value::Array(_) | Value::Regex(_) => parse_number(&self.to_text()),
            Value::Object(_) => number::NAN,
        }
    }

    /// Strict equality (`===`). `NaN` never equals anything; composite values
    /// compare structurally.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.strict_equals(b))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.strict_equals(other)))
            }
            _ => self == other,
        }
    }

    /// Relational comparison (`<`, `>`). `None` when the operands are unordered,
    /// which makes every relational operator false.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self.to_primitive(), other.to_primitive()) {
            (Primitive::Text(a), Primitive::Text(b)) => Some(a.cmp(&b)),
            (Primitive::Big(a), Primitive::Big(b)) => Some(a.cmp(&b)),
            (Primitive::Big(a), Primitive::Text(b)) => b.trim().parse::<i128>().ok().map(|b| a.cmp(&b)),
            (Primitive::Text(a), Primitive::Big(b)) => a.trim().parse::<i128>().ok().map(|a| a.cmp(&b)),
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        }
    }

    fn to_primitive(&self) -> Primitive<'_> {
        match self {
            Value::String(s) => Primitive::Text(Cow::Borrowed(s)),
            Value::Array(_) | Value::Object(_) | Value::Regex(_) => Primitive::Text(self.to_text()),
            Value::BigInt(n) => Primitive::Big(*n),
            _ => Primitive::Num(self.to_number().value()),
        }
    }
}

impl Primitive<'_> {
    fn to_f64(&self) -> f64 {
        match self {
            Primitive::Text(s) => parse_number(s).value(),
            Primitive::Num(n) => *n,
            Primitive::Big(n) => *n as f64,
        }
    }
}

fn parse_index(key: &str) -> Option<usize> {
    key.parse::<usize>()
        .ok()
        .filter(|index| index.to_string() == key)
}

fn parse_number(s: &str) -> Number {
    let s = s.trim();

    if s.is_empty() {
        return Number::new(0.0);
    }

    let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|(prefix, radix)| s.strip_prefix(prefix).map(|digits| (digits, *radix)));

    if let Some((digits, radix)) = radix {
        return u128::from_str_radix(digits, radix)
            .map(|n| Number::new(n as f64))
            .unwrap_or(number::NAN);
    }

    match s {
        "Infinity" | "+Infinity" => Number::new(f64::INFINITY),
        "-Infinity" => Number::new(f64::NEG_INFINITY),
        _ if s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) =>
        {
            s.parse::<f64>().map(Number::new).unwrap_or(number::NAN)
        }
        _ => number::NAN,
    }
}

// SameValueZero, applied structurally to arrays and objects.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.same_value_zero(b),
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Undefined | Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => n.hash(state),
            Value::BigInt(n) => n.hash(state),
            Value::String(s) => s.hash(state),
            Value::Regex(p) => p.hash(state),
            Value::Array(items) => items.hash(state),
            Value::Object(map) => {
                // Object equality ignores key order, so entries are combined
                // with an order independent fold.
                let combined = map
                    .iter()
                    .map(|entry| FxBuildHasher.hash_one(entry))
                    .fold(0u64, |acc, h| acc ^ h);
                map.len().hash(state);
                combined.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::BigInt(n) => write!(f, "{n}n"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Regex(p) => write!(f, "{p}"),
            Value::Array(items) => write!(f, "[{}]", items.iter().map(|v| format!("{v:?}")).join(", ")),
            Value::Object(map) => write!(
                f,
                "{{{}}}",
                map.iter().map(|(k, v)| format!("{k:?}: {v:?}")).join(", ")
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n.into())
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::BigInt(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Pattern> for Value {
    fn from(p: Pattern) -> Self {
        Value::Regex(p)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(map: Object) -> Self {
        Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Value::Object(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN).into()),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
