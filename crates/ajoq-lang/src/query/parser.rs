use std::borrow::Cow;
use std::str::FromStr;

use smol_str::SmolStr;

use super::{Clause, Condition, Logic, Operator, Query};
use crate::error::compile::CompileError;
use crate::pattern::Pattern;
use crate::{Object, Value};

/// Parses a filter specification node into a [`Query`].
///
/// `node` must be an object or an array; arrays are read as objects keyed by
/// index. `max_depth` bounds the nesting of field descents and logic operands.
pub fn parse(node: &Value, max_depth: usize) -> Result<Query, CompileError> {
    Parser { max_depth }.query(node, "$", 0)
}

struct Parser {
    max_depth: usize,
}

impl Parser {
    fn query(&self, node: &Value, path: &str, depth: usize) -> Result<Query, CompileError> {
        if depth > self.max_depth {
            return Err(CompileError::DepthLimitExceeded(self.max_depth));
        }

        let entries: Vec<(Cow<'_, str>, &Value)> = match node {
            Value::Object(map) => map.iter().map(|(k, v)| (Cow::Borrowed(k.as_str()), v)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (Cow::Owned(i.to_string()), v))
                .collect(),
            Value::Undefined => return Err(CompileError::UndefinedSpecification(path.to_string())),
            other => {
                return Err(CompileError::ExpectedQuery {
                    path: path.to_string(),
                    found: other.kind(),
                });
            }
        };

        entries
            .into_iter()
            .map(|(key, value)| {
                let entry_path = format!("{path}.{key}");
                match Operator::from_str(&key) {
                    Ok(Operator::And) => self.logic(Logic::And, value, &entry_path, depth),
                    Ok(Operator::Or) => self.logic(Logic::Or, value, &entry_path, depth),
                    Ok(Operator::Nor) => self.logic(Logic::Nor, value, &entry_path, depth),
                    Ok(Operator::Not) => self.logic(Logic::Not, value, &entry_path, depth),
                    Ok(operator) => condition(operator, value, &entry_path).map(Clause::Condition),
                    Err(_) => self.field(SmolStr::new(&key), value, &entry_path, depth),
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Query::new)
    }

    fn logic(&self, logic: Logic, value: &Value, path: &str, depth: usize) -> Result<Clause, CompileError> {
        let operands = match value {
            Value::Array(items) if items.is_empty() => {
                return Err(CompileError::EmptyOperands {
                    path: path.to_string(),
                    operator: logic.operator().name(),
                });
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.logic_operand(item, &format!("{path}.{i}"), depth))
                .collect::<Result<Vec<_>, _>>()?,
            single => vec![self.logic_operand(single, path, depth)?],
        };

        Ok(Clause::Logic(logic, operands))
    }

    /// A logic operand is a sub-query, or a bare value tested against the
    /// current value like a field's.
    fn logic_operand(&self, value: &Value, path: &str, depth: usize) -> Result<Query, CompileError> {
        match value {
            Value::Undefined => Err(CompileError::UndefinedSpecification(path.to_string())),
            _ => self.operand(value, path, depth),
        }
    }

    fn field(&self, key: SmolStr, value: &Value, path: &str, depth: usize) -> Result<Clause, CompileError> {
        Ok(Clause::Field(key, self.operand(value, path, depth)?))
    }

    /// Objects and arrays descend; a regex is an implicit `$match` and any
    /// other value an implicit `$eq`.
    fn operand(&self, value: &Value, path: &str, depth: usize) -> Result<Query, CompileError> {
        Ok(match value {
            Value::Regex(pattern) => Query::new(vec![Clause::Condition(Condition::Match(pattern.clone()))]),
            Value::Object(_) | Value::Array(_) => self.query(value, path, depth + 1)?,
            literal => Query::new(vec![Clause::Condition(Condition::Eq(literal.clone()))]),
        })
    }
}

fn condition(operator: Operator, value: &Value, path: &str) -> Result<Condition, CompileError> {
    let invalid = |expected: &'static str| CompileError::InvalidOperand {
        path: path.to_string(),
        operator: operator.name(),
        expected,
        found: value.kind(),
    };

    let array = || match value {
        Value::Array(items) => Ok(items.clone()),
        _ => Err(invalid("an array")),
    };

    let pattern = || match value {
        Value::Regex(pattern) => Ok(pattern.clone()),
        Value::String(source) => Pattern::new(source),
        _ => Err(invalid("a regex or a string")),
    };

    let mask = || match value {
        Value::Number(n) => Ok(n.to_int32()),
        _ => Err(invalid("a number")),
    };

    let type_name = || match value {
        Value::String(name) => Ok(SmolStr::new(name)),
        _ => Err(invalid("a string")),
    };

    Ok(match operator {
        Operator::Eq => Condition::Eq(value.clone()),
        Operator::Ne => Condition::Ne(value.clone()),
        Operator::Gt => Condition::Gt(value.clone()),
        Operator::Gte => Condition::Gte(value.clone()),
        Operator::Lt => Condition::Lt(value.clone()),
        Operator::Lte => Condition::Lte(value.clone()),
        Operator::Exists => match value {
            Value::Bool(b) => Condition::Exists(*b),
            _ => return Err(invalid("a boolean")),
        },
        Operator::Match => Condition::Match(pattern()?),
        Operator::NotMatch => Condition::NotMatch(pattern()?),
        Operator::Includes => Condition::Includes(value.clone()),
        Operator::NotIncludes => Condition::NotIncludes(value.clone()),
        Operator::Bits => Condition::Bits(mask()?),
        Operator::NotBits => Condition::NotBits(mask()?),
        Operator::Type => Condition::Type(type_name()?),
        Operator::NotType => Condition::NotType(type_name()?),
        Operator::In => Condition::In(array()?),
        Operator::NotIn => Condition::NotIn(array()?),
        Operator::Sub => Condition::Sub(array()?),
        Operator::NotSub => Condition::NotSub(array()?),
        Operator::Sup => Condition::Sup(array()?),
        Operator::NotSup => Condition::NotSup(array()?),
        Operator::Con => Condition::Con(value.clone()),
        Operator::NotCon => Condition::NotCon(value.clone()),
        Operator::And | Operator::Or | Operator::Nor | Operator::Not => {
            unreachable!("logic operators are parsed as clauses")
        }
    })
}

/// Builds a specification value from JSON.
///
/// JSON has no regex literal, so an object of the form
/// `{"$regex": "source", "$flags": "i"}` (flags optional) becomes a
/// [`Value::Regex`]. Everything else converts as [`Value::from`] does.
pub fn from_json(json: serde_json::Value) -> Result<Value, CompileError> {
    match json {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(from_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_json::Value::Object(map) => {
            let source = map.get("$regex").and_then(|v| v.as_str());
            let flags = map.get("$flags").and_then(|v| v.as_str());
            let only_regex_keys = map.keys().all(|k| k == "$regex" || k == "$flags");

            match (source, only_regex_keys) {
                (Some(source), true) => Pattern::with_flags(source, flags.unwrap_or_default()).map(Value::Regex),
                _ => map
                    .into_iter()
                    .map(|(k, v)| from_json(v).map(|v| (k, v)))
                    .collect::<Result<Object, _>>()
                    .map(Value::Object),
            }
        }
        scalar => Ok(Value::from(scalar)),
    }
}
