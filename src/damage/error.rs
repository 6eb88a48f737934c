use crate::common::BinaryOperator;
use crate::context::PathError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("unknown function {0}")]
    UnknownFunction(String),
    #[error("{function} expects {expected} argument(s), found {found}")]
    BadArity {
        function: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("{function} expects numbers, found {found}")]
    InvalidArgument {
        function: &'static str,
        found: String,
    },
    #[error("cannot apply '{op}' to {left} and {right}")]
    InvalidOperands {
        op: BinaryOperator,
        left: String,
        right: String,
    },
    #[error("cannot negate {0}")]
    InvalidNegation(String),
    #[error("{0} cannot be used as a tag")]
    InvalidTag(String),
    #[error("dice need a positive count and size, found {count}d{size}")]
    InvalidDice { count: i64, size: i64 },
    #[error("roll data at {path:?} is {found}, expected a number or a name")]
    InvalidReference { path: String, found: String },
    #[error("can't convert {0} to damage")]
    NotDamage(String),
    #[error("cannot divide by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error(transparent)]
    Path(#[from] PathError),
}
