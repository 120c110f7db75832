use crate::{
    ArithmeticOp, Criterion, IntoOperand, LikePattern, Operand, SortItem, SortKey, SortOrder, Value,
};
use std::borrow::Cow;

/// A typed reference to a table column.
///
/// The prototype value carries the semantic type needed for dialect-correct
/// binding and literal formatting. Predicate and ordering combinators on this
/// type are the entry points of the where/order DSL.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExpr {
    pub table: Cow<'static, str>,
    pub name: Cow<'static, str>,
    pub prototype: Value,
    pub alias: Option<Cow<'static, str>>,
}

impl ColumnExpr {
    pub fn new(
        table: impl Into<Cow<'static, str>>,
        name: impl Into<Cow<'static, str>>,
        prototype: Value,
    ) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            prototype,
            alias: None,
        }
    }

    /// Project this column under a different label (`expr AS "label"`).
    pub fn alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The label this column contributes to a result row.
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn eq(&self, other: impl IntoOperand) -> Criterion {
        Criterion::Eq(self.clone().into_operand(), other.into_operand())
    }

    pub fn ne(&self, other: impl IntoOperand) -> Criterion {
        Criterion::NotEq(self.clone().into_operand(), other.into_operand())
    }

    pub fn lt(&self, other: impl IntoOperand) -> Criterion {
        Criterion::Less(self.clone().into_operand(), other.into_operand())
    }

    pub fn le(&self, other: impl IntoOperand) -> Criterion {
        Criterion::LessEq(self.clone().into_operand(), other.into_operand())
    }

    pub fn gt(&self, other: impl IntoOperand) -> Criterion {
        Criterion::Greater(self.clone().into_operand(), other.into_operand())
    }

    pub fn ge(&self, other: impl IntoOperand) -> Criterion {
        Criterion::GreaterEq(self.clone().into_operand(), other.into_operand())
    }

    pub fn is_null(&self) -> Criterion {
        Criterion::IsNull(self.clone().into_operand())
    }

    pub fn is_not_null(&self) -> Criterion {
        Criterion::IsNotNull(self.clone().into_operand())
    }

    pub fn between(&self, lower: impl IntoOperand, upper: impl IntoOperand) -> Criterion {
        Criterion::Between {
            target: self.clone().into_operand(),
            lower: lower.into_operand(),
            upper: upper.into_operand(),
        }
    }

    pub fn in_list<T: IntoOperand>(&self, values: impl IntoIterator<Item = T>) -> Criterion {
        Criterion::InList {
            target: self.clone().into_operand(),
            values: values.into_iter().map(IntoOperand::into_operand).collect(),
        }
    }

    /// Raw LIKE pattern; wildcards in `pattern` stay live.
    pub fn like(&self, pattern: impl Into<String>) -> Criterion {
        Criterion::Like {
            target: self.clone().into_operand(),
            pattern: LikePattern::Raw(pattern.into()),
            negate: false,
        }
    }

    pub fn not_like(&self, pattern: impl Into<String>) -> Criterion {
        Criterion::Like {
            target: self.clone().into_operand(),
            pattern: LikePattern::Raw(pattern.into()),
            negate: true,
        }
    }

    /// LIKE with the text escaped by the dialect at build time.
    pub fn starts_with(&self, text: impl Into<String>) -> Criterion {
        Criterion::Like {
            target: self.clone().into_operand(),
            pattern: LikePattern::StartsWith(text.into()),
            negate: false,
        }
    }

    pub fn contains(&self, text: impl Into<String>) -> Criterion {
        Criterion::Like {
            target: self.clone().into_operand(),
            pattern: LikePattern::Contains(text.into()),
            negate: false,
        }
    }

    pub fn ends_with(&self, text: impl Into<String>) -> Criterion {
        Criterion::Like {
            target: self.clone().into_operand(),
            pattern: LikePattern::EndsWith(text.into()),
            negate: false,
        }
    }

    pub fn asc(&self) -> SortItem {
        SortItem {
            key: SortKey::Column(self.clone()),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(&self) -> SortItem {
        SortItem {
            key: SortKey::Column(self.clone()),
            order: SortOrder::Desc,
        }
    }

    pub fn add(&self, other: impl IntoOperand) -> Operand {
        Operand::binary(ArithmeticOp::Add, self.clone(), other)
    }

    pub fn sub(&self, other: impl IntoOperand) -> Operand {
        Operand::binary(ArithmeticOp::Sub, self.clone(), other)
    }

    pub fn mul(&self, other: impl IntoOperand) -> Operand {
        Operand::binary(ArithmeticOp::Mul, self.clone(), other)
    }

    pub fn div(&self, other: impl IntoOperand) -> Operand {
        Operand::binary(ArithmeticOp::Div, self.clone(), other)
    }

    pub fn concat(&self, other: impl IntoOperand) -> Operand {
        Operand::binary(ArithmeticOp::Concat, self.clone(), other)
    }
}
