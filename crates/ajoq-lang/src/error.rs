use miette::Diagnostic;

pub mod compile;
pub mod eval;

use compile::CompileError;
use eval::EvalError;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum InnerError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Represents a high-level error with diagnostic information for the user.
#[derive(PartialEq, Debug, Clone, thiserror::Error)]
#[error("{cause}")]
pub struct Error {
    /// The underlying cause of the error.
    pub cause: InnerError,
}

impl Error {
    /// Location of the offending node inside the specification, when known.
    pub fn path(&self) -> Option<&str> {
        match &self.cause {
            InnerError::Compile(err) => err.path(),
            InnerError::Eval(_) => None,
        }
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Self { cause: err.into() }
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        Self { cause: err.into() }
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let c = match &self.cause {
            InnerError::Compile(CompileError::InvalidOperand { .. }) => "CompileError::InvalidOperand",
            InnerError::Compile(CompileError::InvalidRegularExpression(_)) => {
                "CompileError::InvalidRegularExpression"
            }
            InnerError::Compile(CompileError::EmptyOperands { .. }) => "CompileError::EmptyOperands",
            InnerError::Compile(CompileError::ExpectedQuery { .. }) => "CompileError::ExpectedQuery",
            InnerError::Compile(CompileError::UndefinedSpecification(_)) => {
                "CompileError::UndefinedSpecification"
            }
            InnerError::Compile(CompileError::DepthLimitExceeded(_)) => "CompileError::DepthLimitExceeded",
            InnerError::Eval(EvalError::NotAnArray { .. }) => "EvalError::NotAnArray",
            InnerError::Eval(EvalError::NotIterable { .. }) => "EvalError::NotIterable",
            InnerError::Eval(EvalError::NotIncludable { .. }) => "EvalError::NotIncludable",
            InnerError::Eval(EvalError::BigIntMix(_)) => "EvalError::BigIntMix",
        };

        Some(Box::new(c))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let msg = match &self.cause {
            InnerError::Compile(CompileError::InvalidOperand { .. }) => {
                "Set operators take arrays, $exists a boolean, $bits a number, $type a string and $match a regex"
            }
            InnerError::Compile(CompileError::EmptyOperands { .. }) => {
                "Logic operators take a query or value, or a non-empty array of them"
            }
            InnerError::Compile(CompileError::ExpectedQuery { .. }) => {
                "A query node must be an object or an array"
            }
            InnerError::Compile(CompileError::DepthLimitExceeded(_)) => {
                "Flatten the specification or raise the maximum depth"
            }
            _ => return None,
        };

        Some(Box::new(msg))
    }
}
