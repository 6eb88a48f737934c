use crate::common::*;
use crate::parse::ast;

pub trait AstVisitor<'a> {
    type Output;

    fn visit<T: ?Sized>(&mut self, node: &T) -> Self::Output
    where
        T: Accept<'a, Self>,
    {
        node.accept(self)
    }

    fn visit_dice(&mut self, dice: &ast::Dice) -> Self::Output;

    fn visit_int(&mut self, x: &Int) -> Self::Output;

    fn visit_ident(&mut self, name: &'a str) -> Self::Output;

    fn visit_reference(&mut self, path: &'a str) -> Self::Output;

    fn visit_negate(&mut self, value: &ast::Node<'a>) -> Self::Output;

    fn visit_binary(
        &mut self,
        l: &ast::Node<'a>,
        op: &BinaryOperator,
        r: &ast::Node<'a>,
    ) -> Self::Output;

    fn visit_parenthetical(&mut self, p: &ast::Node<'a>) -> Self::Output;

    fn visit_tuple(&mut self, items: &[ast::Node<'a>]) -> Self::Output;

    fn visit_tagged(&mut self, value: &ast::Node<'a>, tags: &[ast::Node<'a>]) -> Self::Output;

    fn visit_call(&mut self, name: &'a str, args: &[ast::Node<'a>]) -> Self::Output;
}

pub trait Accept<'a, V: AstVisitor<'a> + ?Sized> {
    fn accept(&self, v: &mut V) -> V::Output;
}

impl<'a, V: AstVisitor<'a> + ?Sized> Accept<'a, V> for ast::Expression<'a> {
    fn accept(&self, v: &mut V) -> V::Output {
        v.visit(&self.root)
    }
}

impl<'a, V: AstVisitor<'a> + ?Sized> Accept<'a, V> for ast::Node<'a> {
    fn accept(&self, v: &mut V) -> V::Output {
        match self {
            Self::Dice(x) => v.visit_dice(x),
            Self::LiteralInt(x) => v.visit_int(x),
            Self::Ident(x) => v.visit_ident(x),
            Self::Reference(x) => v.visit_reference(x),
            Self::Negate(x) => v.visit_negate(x),
            Self::Binary(l, op, r) => v.visit_binary(l, op, r),
            Self::Parenthetical(x) => v.visit_parenthetical(x),
            Self::Tuple(xs) => v.visit_tuple(xs),
            Self::Tagged(x, tags) => v.visit_tagged(x, tags),
            Self::Call(name, args) => v.visit_call(name, args),
        }
    }
}
