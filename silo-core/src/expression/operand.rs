use crate::{ColumnExpr, IntoValue, Value};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Arithmetic and string operators usable inside an operand tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Concat,
}

/// A typed reference to a column, a bind value, or a derived expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(ColumnExpr),
    Value(Value),
    Binary {
        op: ArithmeticOp,
        lhs: Box<Operand>,
        rhs: Box<Operand>,
    },
}

impl Operand {
    pub fn binary(op: ArithmeticOp, lhs: impl IntoOperand, rhs: impl IntoOperand) -> Operand {
        Operand::Binary {
            op,
            lhs: Box::new(lhs.into_operand()),
            rhs: Box::new(rhs.into_operand()),
        }
    }
}

/// Anything that can appear as one side of a predicate or assignment.
pub trait IntoOperand {
    fn into_operand(self) -> Operand;
}

impl IntoOperand for Operand {
    fn into_operand(self) -> Operand {
        self
    }
}

impl IntoOperand for ColumnExpr {
    fn into_operand(self) -> Operand {
        Operand::Column(self)
    }
}

impl IntoOperand for &ColumnExpr {
    fn into_operand(self) -> Operand {
        Operand::Column(self.clone())
    }
}

impl IntoOperand for Value {
    fn into_operand(self) -> Operand {
        Operand::Value(self)
    }
}

macro_rules! operand_value {
    ($($rust:ty),+ $(,)?) => {$(
        impl IntoOperand for $rust {
            fn into_operand(self) -> Operand {
                Operand::Value(self.into_value())
            }
        }
        impl IntoOperand for Option<$rust> {
            fn into_operand(self) -> Operand {
                Operand::Value(self.into_value())
            }
        }
    )+};
}

operand_value!(
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    Decimal,
    String,
    &str,
    Vec<u8>,
    Date,
    Time,
    PrimitiveDateTime,
    OffsetDateTime,
    Uuid,
);
