//! Condition templates.
//!
//! Every condition compiles to the expression text a dynamic host would run
//! and to the closure that does the same work on a [`Value`].

use std::borrow::Cow;
use std::cmp::Ordering;

use rustc_hash::FxHashSet;

use super::compiled::CompiledExpr;
use super::context::{Binding, Context};
use super::literal::{Literal, literal_list, quote, stringify};
use crate::error::eval::EvalError;
use crate::pattern::Pattern;
use crate::query::{Condition, Operator};
use crate::value::Value;

/// Compiles one condition against the value found at `path`.
pub fn compile(condition: &Condition, path: &str, ctx: &mut Context) -> CompiledExpr {
    let operator = condition.operator();

    match condition {
        Condition::Eq(operand) => {
            let Literal { text, value } = stringify(operand, ctx);
            CompiledExpr::new(
                format!("({path} === {text})"),
                Box::new(move |v: &Value| Ok(v.strict_equals(&value))),
            )
        }
        Condition::Ne(operand) => {
            let Literal { text, value } = stringify(operand, ctx);
            CompiledExpr::new(
                format!("({path} !== {text})"),
                Box::new(move |v: &Value| Ok(!v.strict_equals(&value))),
            )
        }
        Condition::Gt(operand) => relational(path, operand, ctx, ">", Ordering::is_gt),
        Condition::Gte(operand) => relational(path, operand, ctx, ">=", Ordering::is_ge),
        Condition::Lt(operand) => relational(path, operand, ctx, "<", Ordering::is_lt),
        Condition::Lte(operand) => relational(path, operand, ctx, "<=", Ordering::is_le),
        Condition::Exists(expected) => {
            let expected = *expected;
            CompiledExpr::new(
                format!("(({path} !== undefined && {path} !== null) === {expected})"),
                Box::new(move |v: &Value| Ok(!v.is_nullish() == expected)),
            )
        }
        Condition::Match(pattern) => test_pattern(path, pattern, ctx),
        Condition::NotMatch(pattern) => negate(test_pattern(path, pattern, ctx)),
        Condition::Includes(operand) => includes(path, operand, ctx, operator),
        Condition::NotIncludes(operand) => negate(includes(path, operand, ctx, operator)),
        Condition::Bits(mask) => bits(path, *mask, operator),
        Condition::NotBits(mask) => negate(bits(path, *mask, operator)),
        Condition::Type(name) => {
            let name = name.clone();
            CompiledExpr::new(
                format!("(typeof {path} === {})", quote(&name)),
                Box::new(move |v: &Value| Ok(name == v.type_name())),
            )
        }
        Condition::NotType(name) => {
            let name = name.clone();
            CompiledExpr::new(
                format!("(typeof {path} !== {})", quote(&name)),
                Box::new(move |v: &Value| Ok(name != v.type_name())),
            )
        }
        Condition::In(items) => member_of(path, items, ctx),
        Condition::NotIn(items) => negate(member_of(path, items, ctx)),
        Condition::Sub(items) => subset(path, items, ctx, operator),
        Condition::NotSub(items) => negate(subset(path, items, ctx, operator)),
        Condition::Sup(items) => superset(path, items, ctx, operator),
        Condition::NotSup(items) => negate(superset(path, items, ctx, operator)),
        Condition::Con(Value::Array(items)) => contains_any(path, items, ctx, operator),
        Condition::Con(operand) => includes(path, operand, ctx, operator),
        Condition::NotCon(Value::Array(items)) => negate(contains_any(path, items, ctx, operator)),
        Condition::NotCon(operand) => negate(includes(path, operand, ctx, operator)),
    }
}

fn negate(expr: CompiledExpr) -> CompiledExpr {
    let inner = expr.eval;
    CompiledExpr::new(format!("!{}", expr.source), Box::new(move |v: &Value| inner(v).map(|b| !b)))
}

fn relational(
    path: &str,
    operand: &Value,
    ctx: &mut Context,
    symbol: &str,
    accept: fn(Ordering) -> bool,
) -> CompiledExpr {
    let Literal { text, value } = stringify(operand, ctx);

    CompiledExpr::new(
        format!("({path} {symbol} {text})"),
        Box::new(move |v: &Value| Ok(v.compare(&value).is_some_and(accept))),
    )
}

// Null and undefined are coerced to their text, not skipped.
fn test_pattern(path: &str, pattern: &Pattern, ctx: &mut Context) -> CompiledExpr {
    let Literal { text, .. } = stringify(&Value::Regex(pattern.clone()), ctx);
    let pattern = pattern.clone();

    CompiledExpr::new(
        format!("{text}.test('' + {path})"),
        Box::new(move |v: &Value| Ok(pattern.test(&v.to_text()))),
    )
}

fn includes(path: &str, operand: &Value, ctx: &mut Context, operator: Operator) -> CompiledExpr {
    let Literal { text, value } = stringify(operand, ctx);

    CompiledExpr::new(
        format!("{path}.includes({text})"),
        Box::new(move |v: &Value| match v {
            Value::Array(items) => Ok(items.contains(&value)),
            Value::String(s) => Ok(s.contains(&*value.to_text())),
            other => Err(EvalError::NotIncludable {
                operator: operator.name(),
                found: other.kind(),
            }),
        }),
    )
}

fn bits(path: &str, mask: i32, operator: Operator) -> CompiledExpr {
    CompiledExpr::new(
        format!("(({path} & {mask}) === {mask})"),
        Box::new(move |v: &Value| match v {
            Value::BigInt(_) => Err(EvalError::BigIntMix(operator.name())),
            _ => Ok((v.to_number().to_int32() & mask) == mask),
        }),
    )
}

fn register_set(items: &[Value], ctx: &mut Context) -> Binding {
    let fragment = format!("new Set({})", literal_list(items, ctx));
    ctx.register(fragment, || items.iter().cloned().collect())
}

fn member_of(path: &str, items: &[Value], ctx: &mut Context) -> CompiledExpr {
    let Binding { name, set } = register_set(items, ctx);

    CompiledExpr::new(format!("{name}.has({path})"), Box::new(move |v: &Value| Ok(set.contains(v))))
}

fn subset(path: &str, items: &[Value], ctx: &mut Context, operator: Operator) -> CompiledExpr {
    let Binding { name, set } = register_set(items, ctx);

    CompiledExpr::new(
        format!("{path}.every((value) => {name}.has(value))"),
        Box::new(move |v: &Value| match v {
            Value::Array(values) => Ok(values.iter().all(|value| set.contains(value))),
            other => Err(EvalError::NotAnArray {
                operator: operator.name(),
                found: other.kind(),
            }),
        }),
    )
}

// The set is keyed by the field value, so it is rebuilt for every record.
fn superset(path: &str, items: &[Value], ctx: &mut Context, operator: Operator) -> CompiledExpr {
    let list = literal_list(items, ctx);
    let name = ctx.register_per_call(format!("new Set({path})"));
    let items = items.to_vec();

    CompiledExpr::new(
        format!("{list}.every((value) => {name}.has(value))"),
        Box::new(move |v: &Value| {
            let present = elements(v, operator)?;
            Ok(items.iter().all(|item| present.contains(item)))
        }),
    )
}

fn contains_any(path: &str, items: &[Value], ctx: &mut Context, operator: Operator) -> CompiledExpr {
    let Binding { name, set } = register_set(items, ctx);

    CompiledExpr::new(
        format!("{path}.some((value) => {name}.has(value))"),
        Box::new(move |v: &Value| match v {
            Value::Array(values) => Ok(values.iter().any(|value| set.contains(value))),
            Value::String(s) => Ok(set.iter().any(|needle| s.contains(&*needle.to_text()))),
            other => Err(EvalError::NotIncludable {
                operator: operator.name(),
                found: other.kind(),
            }),
        }),
    )
}

/// The members of an iterable field: array elements, the characters of a
/// string, or nothing for an absent field.
fn elements(field: &Value, operator: Operator) -> Result<FxHashSet<Cow<'_, Value>>, EvalError> {
    match field {
        Value::Array(values) => Ok(values.iter().map(Cow::Borrowed).collect()),
        Value::String(s) => Ok(s.chars().map(|c| Cow::Owned(Value::String(c.to_string()))).collect()),
        Value::Undefined | Value::Null => Ok(FxHashSet::default()),
        other => Err(EvalError::NotIterable {
            operator: operator.name(),
            found: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn list(items: &[i32]) -> Vec<Value> {
        items.iter().map(|&n| Value::from(n)).collect()
    }

    fn eval(condition: Condition, value: Value) -> Result<bool, EvalError> {
        let mut ctx = Context::new();
        (compile(&condition, "data", &mut ctx).eval)(&value)
    }

    #[rstest]
    #[case::eq(Condition::Eq(Value::from(42)), Value::from(42), true)]
    #[case::eq_nan(Condition::Eq(Value::from(f64::NAN)), Value::from(f64::NAN), false)]
    #[case::eq_strict(Condition::Eq(Value::from(42)), Value::from("42"), false)]
    #[case::ne(Condition::Ne(Value::from(24)), Value::from(42), true)]
    #[case::gt(Condition::Gt(Value::from(24)), Value::from(42), true)]
    #[case::gt_nan(Condition::Gt(Value::from(24)), Value::Undefined, false)]
    #[case::gte(Condition::Gte(Value::from(42)), Value::from(42), true)]
    #[case::lt_strings(Condition::Lt(Value::from("b")), Value::from("a"), true)]
    #[case::lte(Condition::Lte(Value::from(41)), Value::from(42), false)]
    #[case::exists(Condition::Exists(true), Value::from(0), true)]
    #[case::exists_null(Condition::Exists(true), Value::Null, false)]
    #[case::not_exists(Condition::Exists(false), Value::Undefined, true)]
    #[case::match_text(Condition::Match(Pattern::with_flags("hello", "i").unwrap()), Value::from("Hello World!"), true)]
    #[case::match_coerces_null(Condition::Match(Pattern::new("^null$").unwrap()), Value::Null, true)]
    #[case::match_small_number(Condition::Match(Pattern::new("^1e-7$").unwrap()), Value::from(1e-7), true)]
    #[case::match_large_number(Condition::Match(Pattern::new(r"e\+21$").unwrap()), Value::from(1e21), true)]
    #[case::nmatch(Condition::NotMatch(Pattern::new("goodbye").unwrap()), Value::from("Hello"), true)]
    #[case::includes_array(Condition::Includes(Value::from(2)), Value::from(list(&[1, 2])), true)]
    #[case::includes_nan(Condition::Includes(Value::from(f64::NAN)), Value::from(vec![Value::from(f64::NAN)]), true)]
    #[case::includes_substring(Condition::Includes(Value::from("World")), Value::from("Hello World!"), true)]
    #[case::nincludes(Condition::NotIncludes(Value::from(4)), Value::from(list(&[1, 2])), true)]
    #[case::bits(Condition::Bits(0b101010), Value::from(42), true)]
    #[case::bits_partial(Condition::Bits(0b101010), Value::from(10), false)]
    #[case::nbits(Condition::NotBits(0b100), Value::from(42), true)]
    #[case::type_number(Condition::Type("number".into()), Value::from(1), true)]
    #[case::type_null(Condition::Type("object".into()), Value::Null, true)]
    #[case::ntype(Condition::NotType("string".into()), Value::from(1), true)]
    #[case::in_set(Condition::In(list(&[1, 2, 3])), Value::from(2), true)]
    #[case::in_missing(Condition::In(list(&[1, 2, 3])), Value::from(4), false)]
    #[case::nin(Condition::NotIn(list(&[1, 2, 3])), Value::from(4), true)]
    #[case::sub(Condition::Sub(list(&[1, 2, 3])), Value::from(list(&[1, 2])), true)]
    #[case::sub_extra(Condition::Sub(list(&[1, 2, 3])), Value::from(list(&[1, 4])), false)]
    #[case::nsub(Condition::NotSub(list(&[1])), Value::from(list(&[1, 4])), true)]
    #[case::sup(Condition::Sup(list(&[1])), Value::from(list(&[1, 2])), true)]
    #[case::sup_missing(Condition::Sup(list(&[9])), Value::from(list(&[1, 2])), false)]
    #[case::sup_string(Condition::Sup(vec![Value::from("a"), Value::from("c")]), Value::from("abc"), true)]
    #[case::sup_absent(Condition::Sup(vec![]), Value::Undefined, true)]
    #[case::nsup(Condition::NotSup(list(&[4, 5])), Value::from(list(&[1, 2])), true)]
    #[case::con_scalar(Condition::Con(Value::from(1)), Value::from(list(&[1, 2])), true)]
    #[case::con_substring(Condition::Con(Value::from("H")), Value::from("Hello"), true)]
    #[case::con_any(Condition::Con(Value::from(list(&[7, 2]))), Value::from(list(&[1, 2])), true)]
    #[case::con_any_string(Condition::Con(Value::from(vec![Value::from("x"), Value::from("ell")])), Value::from("Hello"), true)]
    #[case::ncon(Condition::NotCon(Value::from("G")), Value::from("Hello"), true)]
    #[case::ncon_any(Condition::NotCon(Value::from(list(&[7, 8]))), Value::from(list(&[1, 2])), true)]
    fn test_condition(#[case] condition: Condition, #[case] value: Value, #[case] expected: bool) {
        assert_eq!(eval(condition, value), Ok(expected));
    }

    #[rstest]
    #[case::sub_scalar(
        Condition::Sub(list(&[1])),
        Value::from(1),
        EvalError::NotAnArray { operator: "$sub", found: "number" }
    )]
    #[case::sup_number(
        Condition::NotSup(list(&[1])),
        Value::from(1),
        EvalError::NotIterable { operator: "$nsup", found: "number" }
    )]
    #[case::includes_object(
        Condition::Includes(Value::from(1)),
        Value::new_object(),
        EvalError::NotIncludable { operator: "$incl", found: "object" }
    )]
    #[case::con_undefined(
        Condition::Con(Value::from("a")),
        Value::Undefined,
        EvalError::NotIncludable { operator: "$con", found: "undefined" }
    )]
    #[case::bits_bigint(Condition::Bits(1), Value::BigInt(1), EvalError::BigIntMix("$bits"))]
    fn test_condition_error(#[case] condition: Condition, #[case] value: Value, #[case] expected: EvalError) {
        assert_eq!(eval(condition, value), Err(expected));
    }

    #[rstest]
    #[case::eq(Condition::Eq(Value::from("x")), r#"(data === "x")"#)]
    #[case::exists(Condition::Exists(true), "((data !== undefined && data !== null) === true)")]
    #[case::bits(Condition::NotBits(4), "!((data & 4) === 4)")]
    #[case::type_name(Condition::Type("number".into()), r#"(typeof data === "number")"#)]
    #[case::in_set(Condition::In(list(&[1, 2])), "v$0.has(data)")]
    #[case::nsub(Condition::NotSub(list(&[1])), "!data.every((value) => v$0.has(value))")]
    #[case::sup(Condition::Sup(list(&[1])), "[1].every((value) => v$0.has(value))")]
    #[case::match_regex(Condition::Match(Pattern::new("a").unwrap()), "scope[0].test('' + data)")]
    #[case::con(Condition::Con(Value::from(1)), "data.includes(1)")]
    fn test_source(#[case] condition: Condition, #[case] expected: &str) {
        let mut ctx = Context::new();

        assert_eq!(compile(&condition, "data", &mut ctx).source, expected);
    }
}
