//! Typed update operations
//!
//! An update column accepts either a bare value (shorthand for `set`) or an
//! operations object such as `{"increment": 1}`. `FieldOp` is the decoded
//! form; numeric operations apply with overflow and non-finite results
//! reported as `None`.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp<T> {
    Set(T),
    Increment(T),
    Decrement(T),
    Multiply(T),
    Divide(T),
}

impl<T> FieldOp<T> {
    pub fn name(&self) -> &'static str {
        match self {
            FieldOp::Set(_) => "set",
            FieldOp::Increment(_) => "increment",
            FieldOp::Decrement(_) => "decrement",
            FieldOp::Multiply(_) => "multiply",
            FieldOp::Divide(_) => "divide",
        }
    }

    pub fn operand(&self) -> &T {
        match self {
            FieldOp::Set(v)
            | FieldOp::Increment(v)
            | FieldOp::Decrement(v)
            | FieldOp::Multiply(v)
            | FieldOp::Divide(v) => v,
        }
    }

    /// Converts the operand, keeping the operation.
    pub fn map<U>(self, f: impl FnOnce(T) -> Option<U>) -> Option<FieldOp<U>> {
        Some(match self {
            FieldOp::Set(v) => FieldOp::Set(f(v)?),
            FieldOp::Increment(v) => FieldOp::Increment(f(v)?),
            FieldOp::Decrement(v) => FieldOp::Decrement(f(v)?),
            FieldOp::Multiply(v) => FieldOp::Multiply(f(v)?),
            FieldOp::Divide(v) => FieldOp::Divide(f(v)?),
        })
    }
}

impl FieldOp<Value> {
    /// Decodes one column of a validated update input.
    ///
    /// Validated input always decodes. Returns `None` for an operations
    /// object that does not hold exactly one known operation, which the
    /// update schemas reject.
    pub fn decode(value: &Value) -> Option<Self> {
        let Value::Object(ops) = value else {
            return Some(FieldOp::Set(value.clone()));
        };
        if ops.len() != 1 {
            return None;
        }
        let (name, operand) = ops.iter().next()?;
        let operand = operand.clone();
        Some(match name.as_str() {
            "set" => FieldOp::Set(operand),
            "increment" => FieldOp::Increment(operand),
            "decrement" => FieldOp::Decrement(operand),
            "multiply" => FieldOp::Multiply(operand),
            "divide" => FieldOp::Divide(operand),
            _ => return None,
        })
    }

    pub fn as_i64(self) -> Option<FieldOp<i64>> {
        self.map(|v| v.as_i64())
    }

    pub fn as_f64(self) -> Option<FieldOp<f64>> {
        self.map(|v| v.as_f64())
    }
}

/// Numeric column types update operations can apply to.
pub trait Arithmetic: Sized + Copy {
    fn add(self, rhs: Self) -> Option<Self>;
    fn sub(self, rhs: Self) -> Option<Self>;
    fn mul(self, rhs: Self) -> Option<Self>;
    fn div(self, rhs: Self) -> Option<Self>;
}

impl Arithmetic for i64 {
    fn add(self, rhs: Self) -> Option<Self> {
        self.checked_add(rhs)
    }

    fn sub(self, rhs: Self) -> Option<Self> {
        self.checked_sub(rhs)
    }

    fn mul(self, rhs: Self) -> Option<Self> {
        self.checked_mul(rhs)
    }

    fn div(self, rhs: Self) -> Option<Self> {
        self.checked_div(rhs)
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

impl Arithmetic for f64 {
    fn add(self, rhs: Self) -> Option<Self> {
        finite(self + rhs)
    }

    fn sub(self, rhs: Self) -> Option<Self> {
        finite(self - rhs)
    }

    fn mul(self, rhs: Self) -> Option<Self> {
        finite(self * rhs)
    }

    fn div(self, rhs: Self) -> Option<Self> {
        finite(self / rhs)
    }
}

impl<T: Arithmetic> FieldOp<T> {
    /// New column value, or `None` on overflow or division by zero.
    pub fn apply(&self, current: T) -> Option<T> {
        match *self {
            FieldOp::Set(v) => Some(v),
            FieldOp::Increment(v) => current.add(v),
            FieldOp::Decrement(v) => current.sub(v),
            FieldOp::Multiply(v) => current.mul(v),
            FieldOp::Divide(v) => current.div(v),
        }
    }
}
