use super::{
    error::EvalError,
    instance::DamageInstance,
    number::Number,
    term::{Constant, Dice},
    EResult,
};
use crate::common::*;
use crate::context::RollData;
use crate::parse::{
    self, ast,
    visit::{self, Accept},
    ParseError,
};
use serde_json::Value as Json;
use std::fmt;
use tracing::debug;

/// An intermediate result while walking a damage formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(Number),
    /// A bare name, usable only as a tag.
    Name(String),
    Damage(DamageInstance),
    Tuple(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number {}", n),
            Self::Name(name) => write!(f, "name {:?}", name),
            Self::Damage(d) => write!(f, "damage {}", d),
            Self::Tuple(items) => {
                f.write_str("tuple (")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Function {
    Dice,
    Min,
    Max,
    Floor,
    Ceil,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "d" => Some(Self::Dice),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "floor" => Some(Self::Floor),
            "ceil" => Some(Self::Ceil),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Dice => "d",
            Self::Min => "min",
            Self::Max => "max",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
        }
    }

    fn check_arity(self, found: usize) -> EResult<()> {
        let (ok, expected) = match self {
            Self::Dice => (found == 2, "2"),
            Self::Min | Self::Max => (found >= 1, "at least 1"),
            Self::Floor | Self::Ceil => (found == 1, "1"),
        };
        if ok {
            Ok(())
        } else {
            Err(EvalError::BadArity {
                function: self.name(),
                expected,
                found,
            })
        }
    }
}

/// Evaluates a parsed formula against the roll data it may reference.
pub struct DamageContext<'d> {
    data: &'d RollData,
}

impl<'d> DamageContext<'d> {
    pub fn new(data: &'d RollData) -> Self {
        Self { data }
    }

    pub fn eval(&mut self, expr: &ast::Expression) -> EResult<DamageInstance> {
        let value = expr.accept(self)?;
        let instance = to_damage(value)?;
        debug!(
            groups = instance.groups().len(),
            average = instance.average(),
            "evaluated damage {}",
            instance
        );
        Ok(instance)
    }

    fn numbers<'a>(&mut self, function: Function, args: &[ast::Node<'a>]) -> EResult<Vec<Number>> {
        args.iter()
            .map(|arg| match arg.accept(self)? {
                Value::Number(n) => Ok(n),
                other => Err(EvalError::InvalidArgument {
                    function: function.name(),
                    found: other.to_string(),
                }),
            })
            .collect()
    }
}

fn binary(l: Value, op: BinaryOperator, r: Value) -> EResult<Value> {
    use BinaryOperator::*;

    match (l, r) {
        (Value::Number(a), Value::Number(b)) => {
            let n = match op {
                Add => a.checked_add(b)?,
                Sub => a.checked_sub(b)?,
                Mul => a.checked_mul(b)?,
                Div => a.checked_div(b)?,
            };
            Ok(Value::Number(n))
        }
        (Value::Damage(mut d), Value::Number(n)) => {
            d.apply(op, n.as_int())?;
            Ok(Value::Damage(d))
        }
        (Value::Number(n), Value::Damage(mut d)) if matches!(op, Add | Mul) => {
            d.apply(op, n.as_int())?;
            Ok(Value::Damage(d))
        }
        (Value::Damage(a), Value::Damage(b)) if op == Add => Ok(Value::Damage(a.merge(b)?)),
        (l, r) => Err(EvalError::InvalidOperands {
            op,
            left: l.to_string(),
            right: r.to_string(),
        }),
    }
}

fn add_tags(instance: &mut DamageInstance, tag: Value) -> EResult<()> {
    match tag {
        Value::Name(name) => instance.add_tag(&name),
        Value::Tuple(items) => {
            for item in items {
                add_tags(instance, item)?;
            }
        }
        other => return Err(EvalError::InvalidTag(other.to_string())),
    }
    Ok(())
}

/// Numbers become constants and a top-level tuple concatenates its members without merging.
pub fn to_damage(value: Value) -> EResult<DamageInstance> {
    match value {
        Value::Damage(d) => Ok(d),
        Value::Number(n) => Ok(DamageInstance::new(Constant(n.as_int()))),
        Value::Tuple(items) => {
            let mut items = items.into_iter();
            let mut ret = match items.next() {
                Some(first) => to_damage(first)?,
                None => return Err(EvalError::NotDamage("tuple ()".to_string())),
            };
            for item in items {
                ret.extend(to_damage(item)?);
            }
            Ok(ret)
        }
        other @ Value::Name(_) => Err(EvalError::NotDamage(other.to_string())),
    }
}

impl<'a, 'd> visit::AstVisitor<'a> for DamageContext<'d> {
    type Output = EResult<Value>;

    fn visit_dice(&mut self, dice: &ast::Dice) -> Self::Output {
        let instance = DamageInstance::new(Dice::new(dice.count, dice.size));
        Ok(Value::Damage(instance))
    }

    fn visit_int(&mut self, x: &Int) -> Self::Output {
        Ok(Value::Number((*x).into()))
    }

    fn visit_ident(&mut self, name: &'a str) -> Self::Output {
        Ok(Value::Name(name.to_string()))
    }

    fn visit_reference(&mut self, path: &'a str) -> Self::Output {
        match self.data.lookup(path)? {
            Json::Number(n) => {
                let n = n
                    .as_i64()
                    .map(Number::Int)
                    .or_else(|| n.as_f64().map(Number::Float));
                n.map(Value::Number).ok_or_else(|| EvalError::InvalidReference {
                    path: path.to_string(),
                    found: "an unrepresentable number".to_string(),
                })
            }
            Json::String(s) => Ok(Value::Name(s.clone())),
            other => Err(EvalError::InvalidReference {
                path: path.to_string(),
                found: other.to_string(),
            }),
        }
    }

    fn visit_negate(&mut self, value: &ast::Node<'a>) -> Self::Output {
        match value.accept(self)? {
            Value::Number(n) => Ok(Value::Number(n.checked_neg()?)),
            other => Err(EvalError::InvalidNegation(other.to_string())),
        }
    }

    fn visit_binary(
        &mut self,
        l: &ast::Node<'a>,
        op: &BinaryOperator,
        r: &ast::Node<'a>,
    ) -> Self::Output {
        let left = l.accept(self)?;
        let right = r.accept(self)?;
        binary(left, *op, right)
    }

    fn visit_parenthetical(&mut self, p: &ast::Node<'a>) -> Self::Output {
        p.accept(self)
    }

    fn visit_tuple(&mut self, items: &[ast::Node<'a>]) -> Self::Output {
        let values = items
            .iter()
            .map(|node| node.accept(self))
            .collect::<EResult<_>>()?;
        Ok(Value::Tuple(values))
    }

    fn visit_tagged(&mut self, value: &ast::Node<'a>, tags: &[ast::Node<'a>]) -> Self::Output {
        let mut instance = to_damage(value.accept(self)?)?;
        for tag in tags {
            let tag = tag.accept(self)?;
            add_tags(&mut instance, tag)?;
        }
        Ok(Value::Damage(instance))
    }

    fn visit_call(&mut self, name: &'a str, args: &[ast::Node<'a>]) -> Self::Output {
        let function =
            Function::from_name(name).ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        function.check_arity(args.len())?;
        let numbers = self.numbers(function, args)?;

        let n = match function {
            Function::Dice => {
                let (count, size) = (numbers[0].as_int(), numbers[1].as_int());
                if count < 1 || size < 1 {
                    return Err(EvalError::InvalidDice { count, size });
                }
                return Ok(Value::Damage(DamageInstance::new(Dice::new(count, size))));
            }
            Function::Min => numbers.into_iter().reduce(|a, b| if b < a { b } else { a }),
            Function::Max => numbers.into_iter().reduce(|a, b| if b > a { b } else { a }),
            Function::Floor => numbers.first().map(|n| n.floor()),
            Function::Ceil => numbers.first().map(|n| n.ceil()),
        };
        n.map(Value::Number).ok_or(EvalError::BadArity {
            function: function.name(),
            expected: "at least 1",
            found: 0,
        })
    }
}

/// The outcome of a damage payload: an evaluated instance, or the raw text when the formula does
/// not parse.
#[derive(Debug, Clone, PartialEq)]
pub enum DamageRoll {
    Evaluated(DamageInstance),
    Literal { payload: String, error: ParseError },
}

pub fn evaluate(expr: &ast::Expression, data: &RollData) -> EResult<DamageInstance> {
    DamageContext::new(data).eval(expr)
}

/// Syntax errors are recovered into [`DamageRoll::Literal`]; evaluation errors propagate.
pub fn evaluate_damage(payload: &str, data: &RollData) -> EResult<DamageRoll> {
    match parse::parse(payload) {
        Ok(expr) => evaluate(&expr, data).map(DamageRoll::Evaluated),
        Err(error) => {
            debug!(payload, %error, "damage formula did not parse, rendering it literally");
            Ok(DamageRoll::Literal {
                payload: payload.to_string(),
                error,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PathError;
    use serde_json::json;

    fn data() -> RollData {
        RollData::new()
            .with("actor", json!({"level": 5, "name": "Goblin"}))
            .with("item", json!({"level": 3, "damageType": "fire", "traits": ["magical"]}))
    }

    fn eval(s: &str) -> EResult<DamageInstance> {
        let data = data();
        let expr = parse::parse(s).unwrap();
        evaluate(&expr, &data)
    }

    fn check(s: &str, expected: &str) {
        assert_eq!(eval(s).unwrap().to_string(), expected, "{}", s);
    }

    fn check_err(s: &str, expected: EvalError) {
        assert_eq!(eval(s).unwrap_err(), expected, "{}", s);
    }

    #[test]
    fn test_eval_literals() {
        check("2d6", "2d6");
        check("d8", "1d8");
        check("5", "5");
        check("2 * 3 + 1", "7");
        check("7 / 2", "3");
    }

    #[test]
    fn test_eval_fold_constants() {
        check("1d6+3", "1d6 + 3");
        check("3 + 1d6", "1d6 + 3");
        check("1d6 - 1", "1d6 - 1");
        check("2d6 + 4 + 1d6", "3d6 + 4");
        check("1d6 + 1d8 + 2", "1d6 + 1d8 + 2");
    }

    #[test]
    fn test_eval_tags() {
        check("1d6[persistent,fire]", "1d6 persistent fire");
        check("1d6[(persistent,fire)]", "1d6 persistent fire");
        check("(5[splash])[fire]", "5 splash fire");
        check("2d6[area-damage]", "2d6 area-damage");
        check(
            "(2d6 + 4 + (2d6[precision]))[slashing]",
            "2d6 + 4 slashing plus 2d6 precision slashing",
        );
        check("1d6[fire] + 2d6[fire]", "3d6 fire");
        check("1d6[fire] + 2", "1d6 + 2 fire");
        check("1d6[fire] + 3 - 1", "1d6 + 2 fire");
        check("1d6[fire] + 1d8 + 2", "1d6 fire plus 1d8 + 2");
    }

    #[test]
    fn test_eval_scaling() {
        check("(1d6 + 1) * 2", "2d6 + 1");
        check("2 * 1d6[fire]", "2d6 fire");
        check("3d6 / 2", "1d6");
        check("(2d6 + 1d4)[fire] * 2", "4d6 + 2d4 fire");
    }

    #[test]
    fn test_eval_dice_forms() {
        check("(1 + 1)d6", "2d6");
        check("2d(2 * 4)", "2d8");
        check("d(2, 10)", "2d10");
        check("(@item.level)d8", "3d8");
        check("floor(@actor.level / 2)d6", "2d6");
        check("ceil(@actor.level / 2)d6", "3d6");
    }

    #[test]
    fn test_eval_functions() {
        check("max(1, @actor.level - 3)d4", "2d4");
        check("min(@item.level, 2)d12", "2d12");
        check("floor(7 / 2)", "3");
    }

    #[test]
    fn test_eval_references() {
        check("1d6[@item.damageType]", "1d6 fire");
        check("@actor.level", "5");
        check_err(
            "@actor.rank",
            EvalError::Path(PathError {
                path: "actor.rank".to_string(),
            }),
        );
    }

    #[test]
    fn test_eval_tuples() {
        check(
            "5d6[acid],5d6[cold],5d6[fire]",
            "5d6 acid plus 5d6 cold plus 5d6 fire",
        );
        check("1d6[fire], 1d6[fire]", "1d6 fire plus 1d6 fire");
    }

    #[test]
    fn test_eval_errors() {
        check_err("foo(1)", EvalError::UnknownFunction("foo".to_string()));
        check_err(
            "floor(1, 2)",
            EvalError::BadArity {
                function: "floor",
                expected: "1",
                found: 2,
            },
        );
        check_err("(0)d6", EvalError::InvalidDice { count: 0, size: 6 });
        check_err("1d6 / 0", EvalError::DivisionByZero);
        check_err("fire", EvalError::NotDamage("name \"fire\"".to_string()));
        assert!(matches!(
            eval("1d6 - 1d4"),
            Err(EvalError::InvalidOperands { op: BinaryOperator::Sub, .. })
        ));
        assert!(matches!(
            eval("5 - 1d4"),
            Err(EvalError::InvalidOperands { op: BinaryOperator::Sub, .. })
        ));
        assert!(matches!(eval("-1d4"), Err(EvalError::InvalidNegation(_))));
        assert!(matches!(eval("1d4[@actor.level]"), Err(EvalError::InvalidTag(_))));
    }

    #[test]
    fn test_eval_overflow() {
        check_err("9999999999 * 9999999999", EvalError::Overflow);
        check_err("5000000000000000000d6 * 2", EvalError::Overflow);
        check_err("1d6 + 9223372036854775807 + 1", EvalError::Overflow);
        check_err("-(-9223372036854775807 - 1)", EvalError::Overflow);
        check("(-9223372036854775807 - 1) / -1", "9223372036854775807");
    }

    #[test]
    fn test_evaluate_damage_falls_back() {
        let data = data();
        match evaluate_damage("2d6 fire", &data).unwrap() {
            DamageRoll::Literal { payload, .. } => assert_eq!(payload, "2d6 fire"),
            other => panic!("expected a literal, got {:?}", other),
        }
        assert!(matches!(
            evaluate_damage("2d6[fire]", &data),
            Ok(DamageRoll::Evaluated(_))
        ));
        assert!(evaluate_damage("bogus(2)", &data).is_err());
    }
}
