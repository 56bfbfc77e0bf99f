//! Dynamic script values.
//!
//! Scripts have no static signatures, so every builtin receives a slice of
//! [`Value`] and checks shapes itself. Arithmetic and ordering on arrays are
//! rejected with [`ValueError::ArrayOperand`] instead of being coerced.

use crate::domain::error::ValueError;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Real(f64),
    Str(String),
    Array(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Parse a command-line token: integer, real, `null`, else string.
    pub fn from_literal(token: &str) -> Value {
        if token == "null" {
            return Value::Null;
        }
        if let Ok(v) = token.parse::<i64>() {
            return Value::Int(v);
        }
        if let Ok(v) = token.parse::<f64>() {
            return Value::Real(v);
        }
        Value::Str(token.to_string())
    }

    pub fn add(&self, rhs: &Value) -> Result<Value, ValueError> {
        if let (Value::Str(l), Value::Str(r)) = (self, rhs) {
            return Ok(Value::Str(format!("{l}{r}")));
        }
        self.numeric("+", rhs, |l, r| l.checked_add(r), |l, r| l + r)
    }

    pub fn sub(&self, rhs: &Value) -> Result<Value, ValueError> {
        self.numeric("-", rhs, |l, r| l.checked_sub(r), |l, r| l - r)
    }

    pub fn mul(&self, rhs: &Value) -> Result<Value, ValueError> {
        self.numeric("*", rhs, |l, r| l.checked_mul(r), |l, r| l * r)
    }

    pub fn div(&self, rhs: &Value) -> Result<Value, ValueError> {
        if let (Value::Int(_), Value::Int(0)) = (self, rhs) {
            return Err(ValueError::DivisionByZero);
        }
        self.numeric("/", rhs, |l, r| l.checked_div(r), |l, r| l / r)
    }

    pub fn compare(&self, rhs: &Value) -> Result<Ordering, ValueError> {
        const OP: &str = "comparison";
        check_scalar(OP, self, rhs)?;
        match (self, rhs) {
            (Value::Int(l), Value::Int(r)) => Ok(l.cmp(r)),
            (Value::Str(l), Value::Str(r)) => Ok(l.cmp(r)),
            (l, r) => match (to_real(l), to_real(r)) {
                (Some(l), Some(r)) => l.partial_cmp(&r).ok_or(ValueError::Incompatible {
                    op: OP,
                    left: "real",
                    right: "real",
                }),
                _ => Err(ValueError::Incompatible {
                    op: OP,
                    left: self.type_name(),
                    right: rhs.type_name(),
                }),
            },
        }
    }

    fn numeric(
        &self,
        op: &'static str,
        rhs: &Value,
        int_op: impl Fn(i64, i64) -> Option<i64>,
        real_op: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, ValueError> {
        check_scalar(op, self, rhs)?;
        match (self, rhs) {
            // Overflow falls through to real arithmetic.
            (Value::Int(l), Value::Int(r)) => Ok(int_op(*l, *r)
                .map(Value::Int)
                .unwrap_or_else(|| Value::Real(real_op(*l as f64, *r as f64)))),
            (l, r) => match (to_real(l), to_real(r)) {
                (Some(l), Some(r)) => Ok(Value::Real(real_op(l, r))),
                _ => Err(ValueError::Incompatible {
                    op,
                    left: self.type_name(),
                    right: rhs.type_name(),
                }),
            },
        }
    }
}

fn check_scalar(op: &'static str, left: &Value, right: &Value) -> Result<(), ValueError> {
    if left.is_array() || right.is_array() {
        return Err(ValueError::ArrayOperand { op });
    }
    if matches!(left, Value::Null) || matches!(right, Value::Null) {
        return Err(ValueError::NullOperand { op });
    }
    Ok(())
}

fn to_real(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Real(v) => Some(*v),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn display_scalars() {
        assert_eq!(Value::Int(1500).to_string(), "1500");
        assert_eq!(Value::Real(2.5).to_string(), "2.5");
        assert_eq!(Value::Str("TOPIX".into()).to_string(), "TOPIX");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn display_array() {
        let v = Value::Array(vec![Value::Int(1), Value::Str("a".into())]);
        assert_eq!(v.to_string(), "[1, a]");
    }

    #[test]
    fn int_arithmetic_stays_int() {
        assert_eq!(Value::Int(2).add(&Value::Int(3)), Ok(Value::Int(5)));
        assert_eq!(Value::Int(2).sub(&Value::Int(3)), Ok(Value::Int(-1)));
        assert_eq!(Value::Int(7).div(&Value::Int(2)), Ok(Value::Int(3)));
    }

    #[test]
    fn mixed_arithmetic_promotes_to_real() {
        match Value::Int(2).mul(&Value::Real(1.5)).unwrap() {
            Value::Real(v) => assert_relative_eq!(v, 3.0),
            other => panic!("expected real, got {other:?}"),
        }
    }

    #[test]
    fn int_overflow_promotes_to_real() {
        let result = Value::Int(i64::MAX).add(&Value::Int(1)).unwrap();
        assert!(matches!(result, Value::Real(_)));
    }

    #[test]
    fn string_concatenation() {
        let v = Value::from("13").add(&Value::from("21")).unwrap();
        assert_eq!(v, Value::Str("1321".into()));
    }

    #[test]
    fn array_operands_fail() {
        let arr = Value::Array(vec![Value::Int(1)]);
        assert_eq!(
            arr.add(&Value::Int(1)),
            Err(ValueError::ArrayOperand { op: "+" })
        );
        assert_eq!(
            Value::Int(1).compare(&arr),
            Err(ValueError::ArrayOperand { op: "comparison" })
        );
    }

    #[test]
    fn null_operands_fail() {
        assert_eq!(
            Value::Null.sub(&Value::Int(1)),
            Err(ValueError::NullOperand { op: "-" })
        );
    }

    #[test]
    fn integer_division_by_zero() {
        assert_eq!(
            Value::Int(1).div(&Value::Int(0)),
            Err(ValueError::DivisionByZero)
        );
    }

    #[test]
    fn string_and_number_are_incompatible() {
        let err = Value::from("a").add(&Value::Int(1)).unwrap_err();
        assert!(matches!(err, ValueError::Incompatible { op: "+", .. }));
    }

    #[test]
    fn compare_orders_numbers_and_strings() {
        assert_eq!(Value::Int(1).compare(&Value::Real(1.5)), Ok(Ordering::Less));
        assert_eq!(
            Value::from("b").compare(&Value::from("a")),
            Ok(Ordering::Greater)
        );
    }

    #[test]
    fn from_literal_detects_types() {
        assert_eq!(Value::from_literal("1500"), Value::Int(1500));
        assert_eq!(Value::from_literal("-3"), Value::Int(-3));
        assert_eq!(Value::from_literal("2.5"), Value::Real(2.5));
        assert_eq!(Value::from_literal("null"), Value::Null);
        assert_eq!(Value::from_literal("hello"), Value::Str("hello".into()));
    }
}
