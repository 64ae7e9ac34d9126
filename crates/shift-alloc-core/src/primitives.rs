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

//! # Core Primitives
//!
//! Small, generic building blocks shared by the rest of the workspace.
//! The central type is [`Interval`], a half-open range over any ordered,
//! copyable value. Time windows, availability spans and shift spans are
//! all expressed through it.

use std::cmp::Ordering;
use std::fmt;

/// A half-open interval `[start, end)`.
///
/// The start is inclusive and the end is exclusive, so the interval
/// contains every `x` with `start <= x < end`. Two intervals that merely
/// touch (`a.end() == b.start()`) do not intersect; they *abut*.
///
/// # Examples
///
/// ```
/// use shift_alloc_core::primitives::Interval;
///
/// let interval = Interval::new(1, 5);
/// assert_eq!(interval.start(), 1);
/// assert_eq!(interval.end(), 5);
/// assert!(interval.contains(3));
/// assert!(!interval.contains(5));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval<T> {
    start_inclusive: T,
    end_exclusive: T,
}

impl<T> Interval<T> {
    /// Creates a new half-open interval from two bounds.
    ///
    /// The smaller bound becomes the start. Passing `b < a` swaps them.
    ///
    /// # Panics
    ///
    /// Panics if the bounds are not comparable (for example `NaN`).
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_alloc_core::primitives::Interval;
    ///
    /// let interval = Interval::new(5, 3);
    /// assert_eq!(interval.start(), 3);
    /// assert_eq!(interval.end(), 5);
    /// ```
    #[inline]
    pub fn new(a: T, b: T) -> Self
    where
        T: PartialOrd + Copy,
    {
        let ord = a
            .partial_cmp(&b)
            .expect("Interval::new: non-comparable bounds (NaN?)");
        let (s, e) = match ord {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };

        Self {
            start_inclusive: s,
            end_exclusive: e,
        }
    }

    /// Returns the inclusive start.
    #[inline]
    pub fn start(&self) -> T
    where
        T: Copy,
    {
        self.start_inclusive
    }

    /// Returns the exclusive end.
    #[inline]
    pub fn end(&self) -> T
    where
        T: Copy,
    {
        self.end_exclusive
    }

    /// Returns `true` if `x` lies in `[start, end)`.
    #[inline]
    pub fn contains(&self, x: T) -> bool
    where
        T: PartialOrd,
    {
        self.start_inclusive <= x && x < self.end_exclusive
    }

    /// Returns `true` if the two intervals share at least one value.
    ///
    /// Touching intervals do not intersect.
    ///
    /// ```
    /// use shift_alloc_core::primitives::Interval;
    ///
    /// let a = Interval::new(0, 5);
    /// assert!(a.intersects(&Interval::new(4, 8)));
    /// assert!(!a.intersects(&Interval::new(5, 8)));
    /// ```
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool
    where
        T: PartialOrd,
    {
        self.start_inclusive < other.end_exclusive && other.start_inclusive < self.end_exclusive
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_inclusive, self.end_exclusive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_order() {
        let i = Interval::new(5i32, 3i32);
        assert_eq!(i.start(), 3);
        assert_eq!(i.end(), 5);
    }

    #[test]
    #[should_panic]
    fn test_new_panics_on_nan() {
        let _ = Interval::new(f64::NAN, 1.0f64);
    }

    #[test]
    fn test_contains_is_half_open() {
        let i = Interval::new(10i32, 20i32);
        assert!(i.contains(10));
        assert!(i.contains(19));
        assert!(!i.contains(20));
        assert!(!i.contains(9));
    }

    #[test]
    fn test_touching_intervals_do_not_intersect() {
        let a = Interval::new(0i64, 10i64);
        assert!(!a.intersects(&Interval::new(10i64, 20i64)));
        assert!(a.intersects(&Interval::new(9i64, 20i64)));
        assert!(Interval::new(2i64, 3i64).intersects(&a));
    }

    #[test]
    fn test_display() {
        assert_eq!(Interval::new(3i64, 9i64).to_string(), "[3, 9)");
    }
}
