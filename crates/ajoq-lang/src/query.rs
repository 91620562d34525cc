//! Typed representation of a filter specification.
//!
//! A specification value is parsed once into a [`Query`]: a closed tree of
//! conditions, logic combinators and field descents. Operand types are checked
//! here, so the compiler only ever sees well-formed operands.

mod operator;
mod parser;

use smol_str::SmolStr;

pub use operator::{Operator, OperatorKind};
pub use parser::{from_json, parse};

use crate::Value;
use crate::pattern::Pattern;

/// The clauses of one specification level, joined with AND.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Condition(Condition),
    Logic(Logic, Vec<Query>),
    /// Descend into a field and apply the nested query there.
    Field(SmolStr, Query),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
    Nor,
    Not,
}

/// A single condition with its typed operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Exists(bool),
    Match(Pattern),
    NotMatch(Pattern),
    Includes(Value),
    NotIncludes(Value),
    /// Mask already converted to a 32-bit integer.
    Bits(i32),
    NotBits(i32),
    Type(SmolStr),
    NotType(SmolStr),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Sub(Vec<Value>),
    NotSub(Vec<Value>),
    Sup(Vec<Value>),
    NotSup(Vec<Value>),
    Con(Value),
    NotCon(Value),
}

impl Query {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }
}

impl Logic {
    pub fn operator(&self) -> Operator {
        match self {
            Logic::And => Operator::And,
            Logic::Or => Operator::Or,
            Logic::Nor => Operator::Nor,
            Logic::Not => Operator::Not,
        }
    }
}

impl Condition {
    pub fn operator(&self) -> Operator {
        match self {
            Condition::Eq(_) => Operator::Eq,
            Condition::Ne(_) => Operator::Ne,
            Condition::Gt(_) => Operator::Gt,
            Condition::Gte(_) => Operator::Gte,
            Condition::Lt(_) => Operator::Lt,
            Condition::Lte(_) => Operator::Lte,
            Condition::Exists(_) => Operator::Exists,
            Condition::Match(_) => Operator::Match,
            Condition::NotMatch(_) => Operator::NotMatch,
            Condition::Includes(_) => Operator::Includes,
            Condition::NotIncludes(_) => Operator::NotIncludes,
            Condition::Bits(_) => Operator::Bits,
            Condition::NotBits(_) => Operator::NotBits,
            Condition::Type(_) => Operator::Type,
            Condition::NotType(_) => Operator::NotType,
            Condition::In(_) => Operator::In,
            Condition::NotIn(_) => Operator::NotIn,
            Condition::Sub(_) => Operator::Sub,
            Condition::NotSub(_) => Operator::NotSub,
            Condition::Sup(_) => Operator::Sup,
            Condition::NotSup(_) => Operator::NotSup,
            Condition::Con(_) => Operator::Con,
            Condition::NotCon(_) => Operator::NotCon,
        }
    }
}
