use super::{error::EvalError, EResult};
use crate::common::*;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A plain number produced while evaluating a formula: roll-data values, function results and
/// the integer literals that have not been folded into a damage term yet.
#[derive(Debug, Copy, Clone)]
pub enum Number {
    Int(Int),
    Float(Float),
}

impl Number {
    /// Rounds toward negative infinity; every integer context in a formula floors.
    pub fn as_int(self) -> Int {
        match self {
            Self::Int(x) => x,
            Self::Float(x) => x.floor() as Int,
        }
    }

    pub fn as_float(self) -> Float {
        match self {
            Self::Int(x) => x as Float,
            Self::Float(x) => x,
        }
    }

    pub(crate) fn floor(self) -> Self {
        Self::Int(self.as_int())
    }

    pub(crate) fn ceil(self) -> Self {
        match self {
            Self::Int(_) => self,
            Self::Float(x) => Self::Int(x.ceil() as Int),
        }
    }

    /// Division that stays integral when the divisor divides evenly.
    pub(crate) fn checked_div(self, rhs: Self) -> EResult<Self> {
        match (self, rhs) {
            (_, Self::Int(0)) => Err(EvalError::DivisionByZero),
            (_, Self::Float(y)) if y == 0.0 => Err(EvalError::DivisionByZero),
            // `checked_rem` is `None` for `Int::MIN / -1`, which falls through to floats
            (Self::Int(x), Self::Int(y)) if x.checked_rem(y) == Some(0) => Ok(Self::Int(x / y)),
            (x, y) => Ok(Self::Float(x.as_float() / y.as_float())),
        }
    }

    pub(crate) fn checked_neg(self) -> EResult<Self> {
        match self {
            Self::Int(x) => x.checked_neg().map(Self::Int).ok_or(EvalError::Overflow),
            Self::Float(x) => Ok(Self::Float(-x)),
        }
    }
}

macro_rules! val_impl_checked_op {
    ($checked:ident, $float_op:ident) => {
        impl Number {
            pub(crate) fn $checked(self, rhs: Self) -> EResult<Self> {
                match (self, rhs) {
                    (Self::Int(x), Self::Int(y)) => {
                        x.$checked(y).map(Self::Int).ok_or(EvalError::Overflow)
                    }
                    (x, y) => Ok(Self::Float(x.as_float().$float_op(y.as_float()))),
                }
            }
        }
    };
}

val_impl_checked_op!(checked_add, add);
val_impl_checked_op!(checked_sub, sub);
val_impl_checked_op!(checked_mul, mul);

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.as_float().eq(&other.as_float())
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_float().partial_cmp(&other.as_float())
    }
}

impl From<Int> for Number {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<Float> for Number {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => fmt::Display::fmt(x, f),
            Self::Float(x) => fmt::Debug::fmt(x, f),
        }
    }
}
