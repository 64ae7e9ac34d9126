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

use shift_alloc_model::id::{EmployeeIndex, ShiftIndex};
use std::fmt::Display;

/// A local change to the shift bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// Binds `shift` to `to`, or unbinds it when `to` is `None`.
    Reassign {
        shift: ShiftIndex,
        to: Option<EmployeeIndex>,
    },
    /// Exchanges the employees bound to `a` and `b`.
    Swap { a: ShiftIndex, b: ShiftIndex },
}

impl Move {
    #[inline]
    pub const fn reassign(shift: ShiftIndex, to: EmployeeIndex) -> Self {
        Move::Reassign {
            shift,
            to: Some(to),
        }
    }

    #[inline]
    pub const fn unbind(shift: ShiftIndex) -> Self {
        Move::Reassign { shift, to: None }
    }

    #[inline]
    pub const fn swap(a: ShiftIndex, b: ShiftIndex) -> Self {
        Move::Swap { a, b }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Reassign { shift, to: Some(e) } => write!(f, "Reassign({shift} -> {e})"),
            Move::Reassign { shift, to: None } => write!(f, "Unbind({shift})"),
            Move::Swap { a, b } => write!(f, "Swap({a}, {b})"),
        }
    }
}
