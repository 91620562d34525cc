use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// How an operator is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// Needs nothing beyond its literal operand.
    Pure,
    /// Needs an auxiliary set, built once at compile time or per record.
    SetEffect,
    /// Combines sub-queries over the same path.
    Logic,
}

/// The closed set of reserved keys.
///
/// Any key that does not parse into an `Operator` is a field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum Operator {
    #[strum(serialize = "$eq")]
    Eq,
    #[strum(serialize = "$ne")]
    Ne,
    #[strum(serialize = "$gt")]
    Gt,
    #[strum(serialize = "$gte")]
    Gte,
    #[strum(serialize = "$lt")]
    Lt,
    #[strum(serialize = "$lte")]
    Lte,
    #[strum(serialize = "$exists")]
    Exists,
    #[strum(serialize = "$match")]
    Match,
    #[strum(serialize = "$nmatch")]
    NotMatch,
    #[strum(serialize = "$incl")]
    Includes,
    #[strum(serialize = "$nincl")]
    NotIncludes,
    #[strum(serialize = "$bits")]
    Bits,
    #[strum(serialize = "$nbits")]
    NotBits,
    #[strum(to_string = "$type", serialize = "$typeof")]
    Type,
    #[strum(to_string = "$ntype", serialize = "$ntypeof")]
    NotType,
    #[strum(serialize = "$in")]
    In,
    #[strum(serialize = "$nin")]
    NotIn,
    #[strum(serialize = "$sub")]
    Sub,
    #[strum(serialize = "$nsub")]
    NotSub,
    #[strum(serialize = "$sup")]
    Sup,
    #[strum(serialize = "$nsup")]
    NotSup,
    #[strum(serialize = "$con")]
    Con,
    #[strum(serialize = "$ncon")]
    NotCon,
    #[strum(serialize = "$and")]
    And,
    #[strum(serialize = "$or")]
    Or,
    #[strum(serialize = "$nor")]
    Nor,
    #[strum(serialize = "$not")]
    Not,
}

impl Operator {
    pub fn kind(&self) -> OperatorKind {
        match self {
            Operator::Eq
            | Operator::Ne
            | Operator::Gt
            | Operator::Gte
            | Operator::Lt
            | Operator::Lte
            | Operator::Exists
            | Operator::Match
            | Operator::NotMatch
            | Operator::Includes
            | Operator::NotIncludes
            | Operator::Bits
            | Operator::NotBits
            | Operator::Type
            | Operator::NotType => OperatorKind::Pure,
            Operator::In
            | Operator::NotIn
            | Operator::Sub
            | Operator::NotSub
            | Operator::Sup
            | Operator::NotSup
            | Operator::Con
            | Operator::NotCon => OperatorKind::SetEffect,
            Operator::And | Operator::Or | Operator::Nor | Operator::Not => OperatorKind::Logic,
        }
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}
