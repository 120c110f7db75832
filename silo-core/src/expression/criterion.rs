use crate::Operand;

/// A LIKE pattern, either raw or derived from text that gets escaped with the
/// dialect's escape character when the statement is built.
#[derive(Debug, Clone, PartialEq)]
pub enum LikePattern {
    Raw(String),
    StartsWith(String),
    Contains(String),
    EndsWith(String),
}

/// One node of a where declaration.
///
/// A where declaration is a `Vec<Criterion>`; its entries are combined with
/// AND when the statement is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Eq(Operand, Operand),
    NotEq(Operand, Operand),
    Less(Operand, Operand),
    LessEq(Operand, Operand),
    Greater(Operand, Operand),
    GreaterEq(Operand, Operand),
    IsNull(Operand),
    IsNotNull(Operand),
    Like {
        target: Operand,
        pattern: LikePattern,
        negate: bool,
    },
    Between {
        target: Operand,
        lower: Operand,
        upper: Operand,
    },
    InList {
        target: Operand,
        values: Vec<Operand>,
    },
    And(Vec<Criterion>),
    Or(Vec<Criterion>),
    Not(Box<Criterion>),
}

pub fn and(criteria: impl IntoIterator<Item = Criterion>) -> Criterion {
    Criterion::And(criteria.into_iter().collect())
}

pub fn or(criteria: impl IntoIterator<Item = Criterion>) -> Criterion {
    Criterion::Or(criteria.into_iter().collect())
}

pub fn not(criterion: Criterion) -> Criterion {
    Criterion::Not(Box::new(criterion))
}
