use thiserror::Error;

type SpecPath = String;
type OperatorName = &'static str;
type TypeName = &'static str;

/// Errors detected while turning a specification into a predicate or comparator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(r#"Invalid operand for "{operator}" at `{path}`, expected {expected}, got {found}"#)]
    InvalidOperand {
        path: SpecPath,
        operator: OperatorName,
        expected: &'static str,
        found: TypeName,
    },
    #[error("Invalid regular expression {0}")]
    InvalidRegularExpression(String),
    #[error(r#""{operator}" at `{path}` needs at least one operand"#)]
    EmptyOperands { path: SpecPath, operator: OperatorName },
    #[error("Expected a query object at `{path}`, got {found}")]
    ExpectedQuery { path: SpecPath, found: TypeName },
    #[error("Undefined specification at `{0}`")]
    UndefinedSpecification(SpecPath),
    #[error("Maximum specification depth exceeded \"{0}\"")]
    DepthLimitExceeded(usize),
}

impl CompileError {
    #[cold]
    pub fn path(&self) -> Option<&str> {
        match self {
            CompileError::InvalidOperand { path, .. } => Some(path),
            CompileError::InvalidRegularExpression(_) => None,
            CompileError::EmptyOperands { path, .. } => Some(path),
            CompileError::ExpectedQuery { path, .. } => Some(path),
            CompileError::UndefinedSpecification(path) => Some(path),
            CompileError::DepthLimitExceeded(_) => None,
        }
    }
}
