use thiserror::Error;

type OperatorName = &'static str;
type TypeName = &'static str;

/// Errors raised by a compiled predicate for one specific record.
///
/// The compiler does not check operand types against record values, so a
/// condition applied to a field of the wrong shape fails here, at call time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(r#""{operator}" expects an array field, got {found}"#)]
    NotAnArray { operator: OperatorName, found: TypeName },
    #[error(r#""{operator}" expects an iterable field, got {found}"#)]
    NotIterable { operator: OperatorName, found: TypeName },
    #[error(r#""{operator}" expects an array or string field, got {found}"#)]
    NotIncludable { operator: OperatorName, found: TypeName },
    #[error(r#"Cannot mix bigint and other types in "{0}""#)]
    BigIntMix(OperatorName),
}
