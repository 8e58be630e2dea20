use std::fmt::{Debug, Display, Formatter};
use crate::interpreter::ast::DataType;

/// A runtime number. Integer operands stay integers; a single real operand makes the result real.
#[derive(Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

/// Failure of a single arithmetic step. Mapped to a runtime error by the evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithmeticError {
    DivisionByZero,
    Overflow,
}

type ArithmeticResult = Result<Number, ArithmeticError>;

impl Number {
    pub fn data_type(&self) -> DataType {
        match self {
            Number::Integer(_) => DataType::Integer,
            Number::Real(_) => DataType::Real,
        }
    }

    pub fn as_real(&self) -> f64 {
        match *self {
            Number::Integer(value) => value as f64,
            Number::Real(value) => value,
        }
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            Number::Integer(value) => value == 0,
            Number::Real(value) => value == 0.0,
        }
    }

    pub fn add(self, other: Number) -> ArithmeticResult {
        self.combine(other, i64::checked_add, |a, b| a + b)
    }

    pub fn subtract(self, other: Number) -> ArithmeticResult {
        self.combine(other, i64::checked_sub, |a, b| a - b)
    }

    pub fn multiply(self, other: Number) -> ArithmeticResult {
        self.combine(other, i64::checked_mul, |a, b| a * b)
    }

    /// `DIV`: truncates toward zero. A real operand keeps the result real.
    pub fn integer_divide(self, other: Number) -> ArithmeticResult {
        if other.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }

        self.combine(other, i64::checked_div, |a, b| (a / b).trunc())
    }

    /// `/`: always real.
    pub fn real_divide(self, other: Number) -> ArithmeticResult {
        if other.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }

        Ok(Number::Real(self.as_real() / other.as_real()))
    }

    pub fn negate(self) -> ArithmeticResult {
        match self {
            Number::Integer(value) => value.checked_neg().map(Number::Integer).ok_or(ArithmeticError::Overflow),
            Number::Real(value) => Ok(Number::Real(-value)),
        }
    }

    fn combine(self, other: Number, integer: impl FnOnce(i64, i64) -> Option<i64>, real: impl FnOnce(f64, f64) -> f64) -> ArithmeticResult {
        match (self, other) {
            (Number::Integer(left), Number::Integer(right)) =>
                integer(left, right).map(Number::Integer).ok_or(ArithmeticError::Overflow),
            (left, right) => Ok(Number::Real(real(left.as_real(), right.as_real()))),
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Number::Integer(value) => write!(f, "{}", value),
            Number::Real(value) =>
                if value.fract() == 0.0 && value.abs() < 1e15 { write!(f, "{:.1}", value) }
                else { write!(f, "{}", value) },
        }
    }
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Integer(value) => write!(f, "{}: INTEGER", value),
            Number::Real(_) => write!(f, "{}: REAL", self),
        }
    }
}
