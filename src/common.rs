use std::fmt::{self, Write};

pub type Int = i64;

pub type Float = f64;

pub type NonEmpty<T> = vec1::Vec1<T>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        };
        f.write_char(c)
    }
}

/// Upper-cases every letter that follows a non-letter and lower-cases the rest, so
/// `off-guard` becomes `Off-Guard`.
pub(crate) fn title_case(s: &str) -> String {
    let mut ret = String::with_capacity(s.len());
    let mut after_letter = false;
    for c in s.chars() {
        if after_letter {
            ret.extend(c.to_lowercase());
        } else {
            ret.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    ret
}
