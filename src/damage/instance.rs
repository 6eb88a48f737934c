use super::error::EvalError;
use super::roller::Roller;
use super::term::{Magnitude, Term};
use super::EResult;
use crate::common::*;
use std::fmt;

/// One run of terms sharing the same tags, e.g. `2d6 + 4 slashing`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DamageGroup {
    terms: NonEmpty<Magnitude>,
    tags: Vec<String>,
}

impl DamageGroup {
    pub fn new(magnitude: impl Into<Magnitude>) -> Self {
        Self {
            terms: NonEmpty::new(magnitude.into()),
            tags: Vec::new(),
        }
    }

    pub fn terms(&self) -> &[Magnitude] {
        &self.terms
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Tags compare as sets: `[fire, persistent]` matches `[persistent, fire]`.
    pub fn same_tags(&self, other: &Self) -> bool {
        self.tags.iter().all(|t| other.tags.contains(t))
            && other.tags.iter().all(|t| self.tags.contains(t))
    }

    fn absorb(&mut self, other: Self) -> EResult<()> {
        'terms: for term in other.terms.into_vec() {
            for existing in self.terms.iter_mut() {
                if existing.absorb(&term)? {
                    continue 'terms;
                }
            }
            self.terms.push(term);
        }
        Ok(())
    }

    /// The terms alone, without tags: `2d6 + 4`.
    pub fn magnitude(&self) -> String {
        self.terms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" + ")
    }

    pub fn average(&self) -> Int {
        self.terms.iter().map(|t| t.average()).fold(0, Int::saturating_add)
    }
}

impl fmt::Display for DamageGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.magnitude())?;
        for tag in &self.tags {
            write!(f, " {}", tag)?;
        }
        Ok(())
    }
}

/// The value of a damage formula: tagged groups in insertion order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DamageInstance {
    groups: NonEmpty<DamageGroup>,
    short_label: bool,
}

impl DamageInstance {
    pub fn new(magnitude: impl Into<Magnitude>) -> Self {
        Self {
            groups: NonEmpty::new(DamageGroup::new(magnitude)),
            short_label: false,
        }
    }

    pub fn groups(&self) -> &[DamageGroup] {
        &self.groups
    }

    pub fn short_label(&self) -> bool {
        self.short_label
    }

    pub fn set_short_label(&mut self, short_label: bool) {
        self.short_label = short_label;
    }

    /// Appends `tag` to every group.
    pub fn add_tag(&mut self, tag: &str) {
        for group in self.groups.iter_mut() {
            group.tags.push(tag.to_string());
        }
    }

    /// `+` between instances: groups with the same tag set combine, new tag sets are appended.
    pub fn merge(mut self, other: Self) -> EResult<Self> {
        for group in other.groups.into_vec() {
            self.merge_group(group)?;
        }
        Ok(self)
    }

    fn merge_group(&mut self, group: DamageGroup) -> EResult<()> {
        match self.groups.iter_mut().find(|g| g.same_tags(&group)) {
            Some(existing) => existing.absorb(group),
            None => {
                self.groups.push(group);
                Ok(())
            }
        }
    }

    /// Appends the groups of `other` without merging, as a top-level `a, b` list does.
    pub fn extend(&mut self, other: Self) {
        for group in other.groups.into_vec() {
            self.groups.push(group);
        }
    }

    /// The single term `+` and `-` can fold into, if any. Its tags do not matter.
    fn foldable_term(&mut self) -> Option<&mut Magnitude> {
        if self.groups.len() != 1 {
            return None;
        }
        let group = self.groups.iter_mut().next()?;
        if group.terms.len() == 1 {
            group.terms.iter_mut().next()
        } else {
            None
        }
    }

    /// Scalar arithmetic with `self` on the left.
    ///
    /// `+` and `-` fold into a lone term so that `1d6[fire] + 3` stays `1d6 + 3 fire`; otherwise
    /// the constant joins as its own untagged group. `*` and `/` scale every term.
    pub fn apply(&mut self, op: BinaryOperator, n: Int) -> EResult<()> {
        match op {
            BinaryOperator::Add | BinaryOperator::Sub => {
                if let Some(term) = self.foldable_term() {
                    term.apply(op, n)?;
                } else {
                    let n = match op {
                        BinaryOperator::Sub => n.checked_neg().ok_or(EvalError::Overflow)?,
                        _ => n,
                    };
                    self.merge_group(DamageGroup::new(n))?;
                }
            }
            BinaryOperator::Mul | BinaryOperator::Div => {
                if op == BinaryOperator::Div && n == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                if n < 1 && self.terms().any(Magnitude::is_dice) {
                    return Err(EvalError::InvalidOperands {
                        op,
                        left: format!("damage {}", self),
                        right: format!("number {}", n),
                    });
                }
                for group in self.groups.iter_mut() {
                    for term in group.terms.iter_mut() {
                        term.apply(op, n)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn terms(&self) -> impl Iterator<Item = &Magnitude> + '_ {
        self.groups.iter().flat_map(|g| g.terms.iter())
    }

    pub fn average(&self) -> Int {
        self.groups
            .iter()
            .map(DamageGroup::average)
            .fold(0, Int::saturating_add)
    }

    pub fn roll<R: Roller>(&self, roller: &mut R) -> Int {
        self.terms()
            .map(|t| t.roll(roller))
            .fold(0, Int::saturating_add)
    }
}

impl fmt::Display for DamageInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(" plus ")?;
            }
            if self.short_label {
                f.write_str(&group.magnitude())?;
            } else {
                fmt::Display::fmt(group, f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::roller::StepRoller;
    use crate::damage::term::{Constant, Dice};
    use BinaryOperator::*;

    fn dice(count: Int, size: Int) -> DamageInstance {
        DamageInstance::new(Dice::new(count, size))
    }

    fn tagged(mut instance: DamageInstance, tags: &[&str]) -> DamageInstance {
        for tag in tags {
            instance.add_tag(tag);
        }
        instance
    }

    #[test]
    fn test_fold_constant() {
        let mut instance = dice(1, 6);
        instance.apply(Add, 3).unwrap();
        assert_eq!(instance.to_string(), "1d6 + 3");
        assert_eq!(instance.groups().len(), 1);
    }

    #[test]
    fn test_fold_into_tagged_term() {
        let mut instance = tagged(dice(1, 6), &["fire"]);
        instance.apply(Add, 3).unwrap();
        assert_eq!(instance.to_string(), "1d6 + 3 fire");
        instance.apply(Sub, 1).unwrap();
        assert_eq!(instance.to_string(), "1d6 + 2 fire");
    }

    #[test]
    fn test_constant_joins_when_not_foldable() {
        let mut instance = tagged(dice(1, 6), &["fire"]).merge(dice(1, 8)).unwrap();
        instance.apply(Add, 3).unwrap();
        assert_eq!(instance.to_string(), "1d6 fire plus 1d8 + 3");
        instance.apply(Sub, 2).unwrap();
        assert_eq!(instance.to_string(), "1d6 fire plus 1d8 + 1");
    }

    #[test]
    fn test_overflow() {
        let mut instance = dice(5_000_000_000_000_000_000, 6);
        assert_eq!(instance.apply(Mul, 2), Err(EvalError::Overflow));
        let huge = DamageInstance::new(Constant(Int::MAX));
        assert_eq!(huge.clone().merge(huge).unwrap_err(), EvalError::Overflow);
    }

    #[test]
    fn test_merge_same_tags() {
        let a = tagged(dice(1, 6), &["persistent", "fire"]);
        let b = tagged(dice(2, 6), &["fire", "persistent"]);
        assert_eq!(a.merge(b).unwrap().to_string(), "3d6 persistent fire");
    }

    #[test]
    fn test_merge_keeps_distinct_shapes() {
        let mut a = dice(2, 6);
        a.apply(Add, 4).unwrap();
        let merged = a
            .merge(dice(1, 8))
            .and_then(|m| m.merge(DamageInstance::new(Constant(2))))
            .unwrap();
        assert_eq!(merged.to_string(), "2d6 + 4 + 1d8 + 2");
    }

    #[test]
    fn test_merge_appends_new_tags() {
        let mut a = dice(2, 6);
        a.apply(Add, 4).unwrap();
        let b = tagged(dice(2, 6), &["precision"]);
        let mut merged = a.merge(b).unwrap();
        merged.add_tag("slashing");
        assert_eq!(
            merged.to_string(),
            "2d6 + 4 slashing plus 2d6 precision slashing"
        );
    }

    #[test]
    fn test_extend_does_not_merge() {
        let mut a = tagged(dice(1, 6), &["fire"]);
        a.extend(tagged(dice(1, 6), &["fire"]));
        assert_eq!(a.to_string(), "1d6 fire plus 1d6 fire");
    }

    #[test]
    fn test_scale() {
        let mut instance = tagged(dice(2, 6), &["fire"]);
        instance.apply(Add, 1).unwrap();
        instance.apply(Mul, 2).unwrap();
        assert_eq!(instance.to_string(), "4d6 + 1 fire");

        let mut instance = dice(3, 6);
        instance.apply(Div, 2).unwrap();
        assert_eq!(instance.to_string(), "1d6");
    }

    #[test]
    fn test_scale_errors() {
        assert_eq!(dice(1, 6).apply(Div, 0), Err(EvalError::DivisionByZero));
        assert!(matches!(
            dice(1, 6).apply(Mul, 0),
            Err(EvalError::InvalidOperands { op: Mul, .. })
        ));
        let mut constant = DamageInstance::new(Constant(4));
        constant.apply(Mul, 0).unwrap();
        assert_eq!(constant.to_string(), "0");
    }

    #[test]
    fn test_short_label() {
        let mut instance = tagged(dice(2, 6), &["fire"])
            .merge(tagged(dice(1, 6), &["cold"]))
            .unwrap();
        instance.set_short_label(true);
        assert_eq!(instance.to_string(), "2d6 plus 1d6");
    }

    #[test]
    fn test_average_and_roll() {
        let mut instance = dice(2, 6);
        instance.apply(Add, 1).unwrap();
        let instance = instance
            .merge(tagged(DamageInstance::new(Constant(4)), &["fire"]))
            .unwrap();
        assert_eq!(instance.average(), 6 + 1 + 4);
        assert_eq!(instance.roll(&mut StepRoller::new(1, 1)), 1 + 2 + 1 + 4);
    }
}
