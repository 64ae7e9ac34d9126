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

/// Business identifier of an employee, as given in the input.
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// # Panics
    ///
    /// Panics if `id` is empty.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        assert!(!id.is_empty(), "EmployeeId::new: id must not be empty");
        EmployeeId(id)
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmployeeId({})", self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        EmployeeId::new(value)
    }
}

/// Business identifier of a shift, as given in the input.
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShiftId(String);

impl ShiftId {
    /// # Panics
    ///
    /// Panics if `id` is empty.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        assert!(!id.is_empty(), "ShiftId::new: id must not be empty");
        ShiftId(id)
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl Display for ShiftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShiftId({})", self.0)
    }
}

impl From<&str> for ShiftId {
    fn from(value: &str) -> Self {
        ShiftId::new(value)
    }
}

/// Dense position of an employee inside a [`crate::problem::Problem`].
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmployeeIndex(usize);

impl EmployeeIndex {
    #[inline]
    pub const fn new(index: usize) -> Self {
        EmployeeIndex(index)
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Display for EmployeeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmployeeIndex({})", self.0)
    }
}

/// Dense position of a shift inside a [`crate::problem::Problem`].
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShiftIndex(usize);

impl ShiftIndex {
    #[inline]
    pub const fn new(index: usize) -> Self {
        ShiftIndex(index)
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Display for ShiftIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShiftIndex({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display_and_value() {
        let e = EmployeeId::new("e1");
        let s = ShiftId::from("s7");
        assert_eq!(e.value(), "e1");
        assert_eq!(e.to_string(), "EmployeeId(e1)");
        assert_eq!(s.to_string(), "ShiftId(s7)");
        assert_eq!(ShiftIndex::new(3).get(), 3);
    }

    #[test]
    #[should_panic]
    fn test_empty_employee_id_panics() {
        let _ = EmployeeId::new("");
    }

    #[test]
    #[should_panic]
    fn test_empty_shift_id_panics() {
        let _ = ShiftId::new(String::new());
    }
}
