use crate::common::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Expression<'a> {
    pub(crate) root: Node<'a>,
}

impl<'a> Expression<'a> {
    pub(crate) fn new(root: Node<'a>) -> Self {
        Self { root }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    Dice(Dice),
    LiteralInt(Int),
    /// A bare name; only meaningful as a tag or a function name.
    Ident(&'a str),
    /// A roll-data path, stored without its leading `@`.
    Reference(&'a str),
    Negate(Box<Node<'a>>),
    Binary(Box<Node<'a>>, BinaryOperator, Box<Node<'a>>),
    Parenthetical(Box<Node<'a>>),
    Tuple(Vec<Node<'a>>),
    Tagged(Box<Node<'a>>, NonEmpty<Node<'a>>),
    Call(&'a str, Vec<Node<'a>>),
}

impl<'a> Node<'a> {
    pub(crate) fn new_binary(op: BinaryOperator, lhs: Self, rhs: Self) -> Self {
        Self::Binary(Box::new(lhs), op, Box::new(rhs))
    }

    pub(crate) fn new_negate(value: Self) -> Self {
        Self::Negate(Box::new(value))
    }

    pub(crate) fn new_parenthetical(value: Self) -> Self {
        Self::Parenthetical(Box::new(value))
    }

    pub(crate) fn new_tagged(value: Self, tags: NonEmpty<Self>) -> Self {
        Self::Tagged(Box::new(value), tags)
    }

    /// `count d size` where either side is itself an expression.
    pub(crate) fn new_dice_call(count: Self, size: Self) -> Self {
        Self::Call("d", vec![count, size])
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Dice {
    pub count: Int,
    pub size: Int,
}

impl Dice {
    pub fn new(count: Int, size: Int) -> Self {
        Self { count, size }
    }
}
