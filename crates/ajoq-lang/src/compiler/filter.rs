use std::fmt;

use super::compiled::{CompiledExpr, CompiledPredicate};
use super::conditions;
use super::context::Context;
use super::literal::quote;
use super::Options;
use crate::error::compile::CompileError;
use crate::error::eval::EvalError;
use crate::query::{self, Clause, Condition, Logic, Query};
use crate::value::Value;

const ROOT: &str = "data";

/// A compiled filter specification.
///
/// Built once from a specification and applied to any number of records.
pub struct Filter {
    predicate: CompiledPredicate,
    source: String,
    declarations: usize,
    slots: usize,
}

impl Filter {
    /// Compiles `spec`.
    ///
    /// - `undefined` yields a filter that matches nothing.
    /// - Any other value that is not an object, array or regex is compared
    ///   with the whole record by strict equality; a regex is tested against
    ///   the record's text.
    /// - Objects and arrays are parsed and compiled field by field.
    pub fn new(spec: &Value, options: &Options) -> Result<Self, CompileError> {
        let mut compiler = FilterCompiler::default();

        let expr = match spec {
            Value::Undefined => CompiledExpr::new("false", Box::new(|_: &Value| Ok(false))),
            Value::Object(_) | Value::Array(_) => {
                let query = query::parse(spec, options.max_depth)?;
                compiler.query(&query, ROOT)
            }
            Value::Regex(pattern) => compiler.condition(&Condition::Match(pattern.clone()), ROOT),
            primitive => compiler.condition(&Condition::Eq(primitive.clone()), ROOT),
        };

        let ctx = compiler.ctx;
        let source = format!("{ctx}return {};", expr.source);
        tracing::debug!(
            declarations = ctx.declarations(),
            slots = ctx.slots(),
            "compiled filter\n{source}"
        );

        Ok(Self {
            predicate: expr.eval,
            source,
            declarations: ctx.declarations(),
            slots: ctx.slots(),
        })
    }

    pub fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        (self.predicate)(record)
    }

    /// Returns the matching records in their original order.
    pub fn filter<'a>(&self, records: &'a [Value]) -> Result<Vec<&'a Value>, EvalError> {
        records
            .iter()
            .filter_map(|record| self.matches(record).map(|m| m.then_some(record)).transpose())
            .collect()
    }

    /// The rendered form of the compiled filter: one `const` line per
    /// registered binding followed by the returned expression.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of bindings registered while compiling.
    pub fn declarations(&self) -> usize {
        self.declarations
    }

    /// Number of values stored out of line while compiling.
    pub fn slots(&self) -> usize {
        self.slots
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("source", &self.source).finish()
    }
}

#[derive(Default)]
struct FilterCompiler {
    ctx: Context,
}

impl FilterCompiler {
    fn condition(&mut self, condition: &Condition, path: &str) -> CompiledExpr {
        conditions::compile(condition, path, &mut self.ctx)
    }

    // Clauses of one level are joined with AND; an empty level always matches.
    fn query(&mut self, query: &Query, path: &str) -> CompiledExpr {
        let mut compiled = query
            .clauses
            .iter()
            .map(|clause| self.clause(clause, path))
            .collect::<Vec<_>>();

        match compiled.len() {
            0 => CompiledExpr::new("true", Box::new(|_: &Value| Ok(true))),
            1 => compiled.remove(0),
            _ => {
                let (sources, evals) = split(compiled);
                CompiledExpr::new(sources.join(" && "), all(evals))
            }
        }
    }

    fn clause(&mut self, clause: &Clause, path: &str) -> CompiledExpr {
        match clause {
            Clause::Condition(condition) => self.condition(condition, path),
            Clause::Logic(logic, operands) => self.logic(*logic, operands, path),
            Clause::Field(key, query) => {
                let sub_path = format!("{path}?.[{}]", quote(key));
                let CompiledExpr { source, eval } = self.query(query, &sub_path);
                let key = key.clone();

                CompiledExpr::new(source, Box::new(move |v: &Value| eval(&v.get(&key))))
            }
        }
    }

    // Every operand is compiled against the same path.
    fn logic(&mut self, logic: Logic, operands: &[Query], path: &str) -> CompiledExpr {
        let compiled = operands
            .iter()
            .map(|operand| self.query(operand, path))
            .collect::<Vec<_>>();
        let (sources, evals) = split(compiled);

        match logic {
            Logic::And => CompiledExpr::new(format!("({})", sources.join(" && ")), all(evals)),
            Logic::Or => CompiledExpr::new(format!("({})", sources.join(" || ")), any(evals)),
            Logic::Nor => CompiledExpr::new(format!("!({})", sources.join(" || ")), not(any(evals))),
            Logic::Not => CompiledExpr::new(format!("!({})", sources.join(" && ")), not(all(evals))),
        }
    }
}

fn split(compiled: Vec<CompiledExpr>) -> (Vec<String>, Vec<CompiledPredicate>) {
    compiled.into_iter().map(|c| (c.source, c.eval)).unzip()
}

// Short-circuit evaluation: later operands are not evaluated, so they cannot
// raise errors either.
fn all(evals: Vec<CompiledPredicate>) -> CompiledPredicate {
    Box::new(move |v: &Value| {
        for eval in &evals {
            if !eval(v)? {
                return Ok(false);
            }
        }
        Ok(true)
    })
}

fn any(evals: Vec<CompiledPredicate>) -> CompiledPredicate {
    Box::new(move |v: &Value| {
        for eval in &evals {
            if eval(v)? {
                return Ok(true);
            }
        }
        Ok(false)
    })
}

fn not(eval: CompiledPredicate) -> CompiledPredicate {
    Box::new(move |v: &Value| eval(v).map(|b| !b))
}
