use std::sync::Arc;

use itertools::Itertools;

use super::context::Context;
use crate::value::Value;

/// A value as it appears in rendered source, paired with the value the
/// compiled closures read.
#[derive(Debug, Clone)]
pub struct Literal {
    pub text: String,
    pub value: Arc<Value>,
}

/// Renders `value` as source-safe text.
///
/// Only `undefined`, `null`, booleans, numbers and quoted strings are written
/// inline. Everything else is stored through [`Context::scope`] and rendered
/// as a `scope[n]` reference.
pub fn stringify(value: &Value, ctx: &mut Context) -> Literal {
    let text = match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        _ => {
            let (text, value) = ctx.scope(value);
            return Literal { text, value };
        }
    };

    Literal {
        text,
        value: Arc::new(value.clone()),
    }
}

/// Renders the elements of a set operand as an array literal, element by
/// element, so that equal operands render to equal text.
pub fn literal_list(items: &[Value], ctx: &mut Context) -> String {
    format!("[{}]", items.iter().map(|item| stringify(item, ctx).text).join(","))
}

/// Quotes a string the way a JSON serializer does.
pub fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::undefined(Value::Undefined, "undefined")]
    #[case::null(Value::Null, "null")]
    #[case::boolean(Value::Bool(false), "false")]
    #[case::integer(Value::from(42), "42")]
    #[case::fraction(Value::from(1.5), "1.5")]
    #[case::nan(Value::from(f64::NAN), "NaN")]
    #[case::string(Value::from("a\"b"), r#""a\"b""#)]
    #[case::injection(Value::from("\"); drop(); (\""), r#""\"); drop(); (\"""#)]
    fn test_inline_literals(#[case] value: Value, #[case] expected: &str) {
        let mut ctx = Context::new();
        let literal = stringify(&value, &mut ctx);

        assert_eq!(literal.text, expected);
        assert_eq!(ctx.slots(), 0);
    }

    #[rstest]
    #[case::bigint(Value::BigInt(9))]
    #[case::array(Value::from(vec![Value::from(1)]))]
    #[case::object(Value::new_object())]
    #[case::regex(Value::Regex(crate::Pattern::new("a+").unwrap()))]
    fn test_out_of_line_values(#[case] value: Value) {
        let mut ctx = Context::new();
        let literal = stringify(&value, &mut ctx);

        assert_eq!(literal.text, "scope[0]");
        assert_eq!(*literal.value, value);
        assert_eq!(ctx.slots(), 1);
    }

    #[test]
    fn test_literal_list() {
        let mut ctx = Context::new();
        let items = vec![Value::from(1), Value::from("x"), Value::Null];

        assert_eq!(literal_list(&items, &mut ctx), r#"[1,"x",null]"#);
    }

    #[test]
    fn test_literal_list_renders_equal_composites_alike() {
        let mut ctx = Context::new();
        let pair = Value::from(vec![Value::from(1), Value::from(2)]);
        let first = literal_list(&[pair.clone(), Value::BigInt(3)], &mut ctx);
        let second = literal_list(&[pair, Value::BigInt(3)], &mut ctx);

        assert_eq!(first, "[scope[0],scope[1]]");
        assert_eq!(first, second);
        assert_eq!(ctx.slots(), 2);
    }
}
