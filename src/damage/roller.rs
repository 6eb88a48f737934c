use rand::{
    distributions::{DistIter, Distribution, Uniform},
    Rng,
};
use std::num::NonZeroU32;

/// A source of die results. Blanket-implemented for every [`Rng`].
pub trait Roller {
    type RollIter<'a>: Iterator<Item = u32> + 'a
    where
        Self: 'a;

    fn roll(&mut self, sides: NonZeroU32) -> u32;

    fn roll_iter(&mut self, num: usize, sides: NonZeroU32) -> Self::RollIter<'_>;
}

impl<R: Rng> Roller for R {
    type RollIter<'a> = std::iter::Take<DistIter<Uniform<u32>, &'a mut Self, u32>>
    where
        Self: 'a;

    fn roll(&mut self, sides: NonZeroU32) -> u32 {
        self.gen_range(1..=sides.get())
    }

    fn roll_iter(&mut self, num: usize, sides: NonZeroU32) -> Self::RollIter<'_> {
        Uniform::new_inclusive(1, sides.get())
            .sample_iter(self)
            .take(num)
    }
}

#[cfg(test)]
pub(crate) use step::StepRoller;
