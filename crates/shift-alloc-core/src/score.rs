// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Hard/Medium/Soft Score
//!
//! Allocation quality is a three-level score compared lexicographically:
//! any hard improvement beats any medium one, which beats any soft one.
//! All penalties are non-positive, so `0hard/0medium/0soft` is the best
//! attainable value and a hard component of `0` means the allocation is
//! feasible.

use num_traits::{CheckedAdd, CheckedSub, Zero};
use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Score {
    // Field order defines the derived lexicographic ordering.
    hard: i64,
    medium: i64,
    soft: i64,
}

impl Score {
    pub const ZERO: Score = Score::of(0, 0, 0);

    #[inline]
    pub const fn of(hard: i64, medium: i64, soft: i64) -> Self {
        Self { hard, medium, soft }
    }

    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        Self::of(hard, 0, 0)
    }

    #[inline]
    pub const fn of_medium(medium: i64) -> Self {
        Self::of(0, medium, 0)
    }

    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        Self::of(0, 0, soft)
    }

    #[inline]
    pub const fn hard(self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn medium(self) -> i64 {
        self.medium
    }

    #[inline]
    pub const fn soft(self) -> i64 {
        self.soft
    }

    /// No hard constraint is broken.
    #[inline]
    pub const fn is_feasible(self) -> bool {
        self.hard >= 0
    }

    /// Every level is at its optimum.
    #[inline]
    pub const fn is_perfect(self) -> bool {
        self.hard >= 0 && self.medium >= 0 && self.soft >= 0
    }

    /// Collapses the score to a single number, used for annealing temperatures.
    ///
    /// ```
    /// use shift_alloc_core::score::Score;
    ///
    /// let s = Score::of(-1, -2, -3);
    /// assert_eq!(s.weighted(1_000_000.0, 1_000.0, 1.0), -1_002_003.0);
    /// ```
    #[inline]
    pub fn weighted(self, hard: f64, medium: f64, soft: f64) -> f64 {
        self.hard as f64 * hard + self.medium as f64 * medium + self.soft as f64 * soft
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}hard/{}medium/{}soft", self.hard, self.medium, self.soft)
    }
}

impl CheckedAdd for Score {
    #[inline]
    fn checked_add(&self, rhs: &Self) -> Option<Self> {
        Some(Score::of(
            self.hard.checked_add(rhs.hard)?,
            self.medium.checked_add(rhs.medium)?,
            self.soft.checked_add(rhs.soft)?,
        ))
    }
}

impl CheckedSub for Score {
    #[inline]
    fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        Some(Score::of(
            self.hard.checked_sub(rhs.hard)?,
            self.medium.checked_sub(rhs.medium)?,
            self.soft.checked_sub(rhs.soft)?,
        ))
    }
}

impl Add for Score {
    type Output = Score;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        CheckedAdd::checked_add(&self, &rhs).expect("overflow in Score + Score")
    }
}

impl AddAssign for Score {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Score {
    type Output = Score;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        CheckedSub::checked_sub(&self, &rhs).expect("overflow in Score - Score")
    }
}

impl SubAssign for Score {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Score {
    type Output = Score;

    #[inline]
    fn neg(self) -> Self::Output {
        Score::of(-self.hard, -self.medium, -self.soft)
    }
}

impl Mul<i64> for Score {
    type Output = Score;

    #[inline]
    fn mul(self, factor: i64) -> Self::Output {
        Score::of(
            self.hard * factor,
            self.medium * factor,
            self.soft * factor,
        )
    }
}

impl Sum for Score {
    #[inline]
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Score::ZERO, |a, b| a + b)
    }
}

impl<'a> Sum<&'a Score> for Score {
    #[inline]
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Score::ZERO, |a, b| a + *b)
    }
}

impl Zero for Score {
    fn zero() -> Self {
        Score::ZERO
    }

    fn is_zero(&self) -> bool {
        *self == Score::ZERO
    }
}
