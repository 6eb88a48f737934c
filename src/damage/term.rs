use super::{error::EvalError, roller::Roller, EResult};
use crate::common::*;
use enum_dispatch::enum_dispatch;
use std::fmt;
use std::num::NonZeroU32;

/// Scalar arithmetic on a single damage magnitude.
#[enum_dispatch]
pub trait Term {
    /// Expected value, rounding each die down: a d6 averages 3, not 3.5. Saturates.
    fn average(&self) -> Int;

    fn offset(&mut self, n: Int) -> EResult<()>;

    fn scale(&mut self, factor: Int) -> EResult<()>;

    /// Floor division.
    fn shrink(&mut self, divisor: Int) -> EResult<()>;
}

fn overflow<T>(value: Option<T>) -> EResult<T> {
    value.ok_or(EvalError::Overflow)
}

fn floor_div(x: Int, divisor: Int) -> EResult<Int> {
    if divisor == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let q = overflow(x.checked_div(divisor))?;
    if x.checked_rem(divisor) != Some(0) && (x < 0) != (divisor < 0) {
        overflow(q.checked_sub(1))
    } else {
        Ok(q)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Constant(pub Int);

impl Term for Constant {
    fn average(&self) -> Int {
        self.0
    }

    fn offset(&mut self, n: Int) -> EResult<()> {
        self.0 = overflow(self.0.checked_add(n))?;
        Ok(())
    }

    fn scale(&mut self, factor: Int) -> EResult<()> {
        self.0 = overflow(self.0.checked_mul(factor))?;
        Ok(())
    }

    fn shrink(&mut self, divisor: Int) -> EResult<()> {
        self.0 = floor_div(self.0, divisor)?;
        Ok(())
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Dice {
    pub count: Int,
    pub size: Int,
    pub modifier: Int,
}

impl Dice {
    pub fn new(count: Int, size: Int) -> Self {
        Self {
            count,
            size,
            modifier: 0,
        }
    }

    pub fn roll<R: Roller>(&self, roller: &mut R) -> Int {
        let sides = u32::try_from(self.size).ok().and_then(NonZeroU32::new);
        let count = usize::try_from(self.count).unwrap_or(0);
        let rolled = match sides {
            Some(sides) => roller
                .roll_iter(count, sides)
                .map(Int::from)
                .fold(0, Int::saturating_add),
            None => 0,
        };
        rolled.saturating_add(self.modifier)
    }
}

impl Term for Dice {
    fn average(&self) -> Int {
        self.count
            .saturating_mul(self.size.saturating_add(1) / 2)
            .saturating_add(self.modifier)
    }

    fn offset(&mut self, n: Int) -> EResult<()> {
        self.modifier = overflow(self.modifier.checked_add(n))?;
        Ok(())
    }

    /// Scales the number of dice; the faces and the flat modifier stay put.
    fn scale(&mut self, factor: Int) -> EResult<()> {
        self.count = overflow(self.count.checked_mul(factor))?;
        Ok(())
    }

    /// Never drops below a single die.
    fn shrink(&mut self, divisor: Int) -> EResult<()> {
        self.count = floor_div(self.count, divisor)?.max(1);
        Ok(())
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.size)?;
        match self.modifier {
            0 => Ok(()),
            m if m < 0 => write!(f, " - {}", m.unsigned_abs()),
            m => write!(f, " + {}", m),
        }
    }
}

#[enum_dispatch(Term)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Magnitude {
    Constant(Constant),
    Dice(Dice),
}

impl Magnitude {
    pub(crate) fn apply(&mut self, op: BinaryOperator, n: Int) -> EResult<()> {
        match op {
            BinaryOperator::Add => self.offset(n),
            BinaryOperator::Sub => self.offset(overflow(n.checked_neg())?),
            BinaryOperator::Mul => self.scale(n),
            BinaryOperator::Div => self.shrink(n),
        }
    }

    pub fn is_dice(&self) -> bool {
        matches!(self, Self::Dice(_))
    }

    /// Constants absorb constants, dice absorb dice with the same number of faces.
    pub fn absorb(&mut self, other: &Self) -> EResult<bool> {
        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => {
                a.0 = overflow(a.0.checked_add(b.0))?;
                Ok(true)
            }
            (Self::Dice(a), Self::Dice(b)) if a.size == b.size => {
                a.count = overflow(a.count.checked_add(b.count))?;
                a.modifier = overflow(a.modifier.checked_add(b.modifier))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn roll<R: Roller>(&self, roller: &mut R) -> Int {
        match self {
            Self::Constant(c) => c.0,
            Self::Dice(d) => d.roll(roller),
        }
    }
}

impl From<Int> for Magnitude {
    fn from(x: Int) -> Self {
        Self::Constant(Constant(x))
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => fmt::Display::fmt(c, f),
            Self::Dice(d) => fmt::Display::fmt(d, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::roller::StepRoller;

    #[test]
    fn test_display() {
        assert_eq!(Dice::new(2, 6).to_string(), "2d6");
        let mut dice = Magnitude::from(Dice::new(2, 6));
        dice.apply(BinaryOperator::Add, 4).unwrap();
        assert_eq!(dice.to_string(), "2d6 + 4");
        dice.apply(BinaryOperator::Sub, 5).unwrap();
        assert_eq!(dice.to_string(), "2d6 - 1");
        assert_eq!(Magnitude::from(Constant(5)).to_string(), "5");
    }

    #[test]
    fn test_average_floors_each_die() {
        assert_eq!(Dice::new(1, 6).average(), 3);
        assert_eq!(Dice::new(2, 6).average(), 6);
        assert_eq!(Dice::new(3, 8).average(), 12);
        let mut dice = Dice::new(2, 4);
        dice.offset(3).unwrap();
        assert_eq!(dice.average(), 7);
        assert_eq!(Constant(5).average(), 5);
    }

    #[test]
    fn test_scale_dice_counts() {
        let mut dice = Magnitude::from(Dice::new(2, 6));
        dice.apply(BinaryOperator::Mul, 3).unwrap();
        assert_eq!(dice, Magnitude::from(Dice::new(6, 6)));
        dice.apply(BinaryOperator::Div, 4).unwrap();
        assert_eq!(dice, Magnitude::from(Dice::new(1, 6)));
        dice.apply(BinaryOperator::Div, 2).unwrap();
        assert_eq!(dice, Magnitude::from(Dice::new(1, 6)));

        let mut constant = Magnitude::from(Constant(7));
        constant.apply(BinaryOperator::Div, 2).unwrap();
        assert_eq!(constant, Magnitude::from(Constant(3)));
        constant.apply(BinaryOperator::Div, -2).unwrap();
        assert_eq!(constant, Magnitude::from(Constant(-2)));
    }

    #[test]
    fn test_arithmetic_errors() {
        let mut dice = Magnitude::from(Dice::new(5_000_000_000_000_000_000, 6));
        assert_eq!(dice.apply(BinaryOperator::Mul, 2), Err(EvalError::Overflow));
        assert_eq!(dice.average(), Int::MAX);
        assert_eq!(dice.apply(BinaryOperator::Div, 0), Err(EvalError::DivisionByZero));

        let mut constant = Magnitude::from(Constant(Int::MIN));
        assert_eq!(constant.apply(BinaryOperator::Div, -1), Err(EvalError::Overflow));
        assert_eq!(constant.apply(BinaryOperator::Sub, Int::MIN), Err(EvalError::Overflow));
        assert_eq!(
            constant.absorb(&Magnitude::from(Constant(-1))),
            Err(EvalError::Overflow)
        );
    }

    #[test]
    fn test_absorb() {
        let mut a = Magnitude::from(Dice::new(1, 6));
        assert_eq!(a.absorb(&Magnitude::from(Dice::new(2, 6))), Ok(true));
        assert_eq!(a, Magnitude::from(Dice::new(3, 6)));
        assert_eq!(a.absorb(&Magnitude::from(Dice::new(1, 8))), Ok(false));
        assert_eq!(a.absorb(&Magnitude::from(Constant(3))), Ok(false));
    }

    #[test]
    fn test_roll() {
        let mut dice = Dice::new(3, 6);
        dice.offset(2).unwrap();
        assert_eq!(dice.roll(&mut StepRoller::new(1, 1)), 1 + 2 + 3 + 2);
        assert_eq!(Magnitude::from(Constant(4)).roll(&mut StepRoller::new(1, 1)), 4);
    }
}
