mod error;
mod eval;
mod instance;
mod number;
mod roller;
mod term;

type EResult<T> = Result<T, EvalError>;

pub use error::EvalError;
pub use eval::{evaluate, evaluate_damage, to_damage, DamageContext, DamageRoll, Value};
pub use instance::{DamageGroup, DamageInstance};
pub use number::Number;
pub use roller::Roller;
pub use term::{Constant, Dice, Magnitude, Term};
