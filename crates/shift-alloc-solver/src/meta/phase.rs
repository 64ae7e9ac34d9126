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

use std::fmt::Display;

/// Lifecycle of one solve. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SolverPhase {
    #[default]
    Unsolved,
    Constructing,
    Improving,
    Terminated,
}

impl SolverPhase {
    #[inline]
    pub const fn next(self) -> Option<SolverPhase> {
        match self {
            SolverPhase::Unsolved => Some(SolverPhase::Constructing),
            SolverPhase::Constructing => Some(SolverPhase::Improving),
            SolverPhase::Improving => Some(SolverPhase::Terminated),
            SolverPhase::Terminated => None,
        }
    }

    /// Moves to the following phase.
    ///
    /// # Panics
    ///
    /// Panics when called on [`SolverPhase::Terminated`].
    #[inline]
    pub fn advance(&mut self) -> SolverPhase {
        match self.next() {
            Some(next) => {
                *self = next;
                next
            }
            None => panic!("SolverPhase::advance: already terminated"),
        }
    }

    #[inline]
    pub const fn is_terminated(self) -> bool {
        matches!(self, SolverPhase::Terminated)
    }
}

impl Display for SolverPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SolverPhase::Unsolved => "unsolved",
            SolverPhase::Constructing => "constructing",
            SolverPhase::Improving => "improving",
            SolverPhase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_advance_in_order() {
        let mut p = SolverPhase::default();
        assert_eq!(p.advance(), SolverPhase::Constructing);
        assert_eq!(p.advance(), SolverPhase::Improving);
        assert_eq!(p.advance(), SolverPhase::Terminated);
        assert!(p.is_terminated());
        assert_eq!(p.next(), None);
    }

    #[test]
    #[should_panic]
    fn test_advance_past_terminated_panics() {
        let mut p = SolverPhase::Terminated;
        p.advance();
    }
}
