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

use crate::{
    availability::AvailabilityEntry,
    employee::Employee,
    err::{DuplicateEmployeeIdError, DuplicateShiftIdError, InputError, UnknownAvailabilityEmployeeError},
    id::{EmployeeId, EmployeeIndex, ShiftId, ShiftIndex},
    shift::Shift,
};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;

/// A solver input: the employee roster and the shifts to cover.
///
/// Employees and shifts are addressed by dense [`EmployeeIndex`] and
/// [`ShiftIndex`] values in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    employees: Vec<Employee>,
    shifts: Vec<Shift>,
    employee_index: HashMap<EmployeeId, EmployeeIndex>,
}

impl Problem {
    /// # Panics
    ///
    /// Panics on duplicate employee or shift ids. Use [`ProblemBuilder`]
    /// for unvalidated input.
    pub fn new(employees: Vec<Employee>, shifts: Vec<Shift>) -> Self {
        let employee_index: HashMap<EmployeeId, EmployeeIndex> = employees
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id().clone(), EmployeeIndex::new(i)))
            .collect();
        assert_eq!(
            employee_index.len(),
            employees.len(),
            "Problem::new: duplicate employee ids"
        );
        let shift_ids: HashSet<&ShiftId> = shifts.iter().map(Shift::id).collect();
        assert_eq!(
            shift_ids.len(),
            shifts.len(),
            "Problem::new: duplicate shift ids"
        );
        Self {
            employees,
            shifts,
            employee_index,
        }
    }

    #[inline]
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    #[inline]
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    #[inline]
    pub fn employee(&self, index: EmployeeIndex) -> &Employee {
        &self.employees[index.get()]
    }

    #[inline]
    pub fn shift(&self, index: ShiftIndex) -> &Shift {
        &self.shifts[index.get()]
    }

    #[inline]
    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    #[inline]
    pub fn shift_count(&self) -> usize {
        self.shifts.len()
    }

    #[inline]
    pub fn index_of_employee(&self, id: &EmployeeId) -> Option<EmployeeIndex> {
        self.employee_index.get(id).copied()
    }

    #[inline]
    pub fn employee_indices(&self) -> impl Iterator<Item = EmployeeIndex> + use<> {
        (0..self.employees.len()).map(EmployeeIndex::new)
    }

    #[inline]
    pub fn shift_indices(&self) -> impl Iterator<Item = ShiftIndex> + use<> {
        (0..self.shifts.len()).map(ShiftIndex::new)
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Problem(employees: {}, shifts: {}, availability windows: {})",
            self.employees.len(),
            self.shifts.len(),
            self.employees
                .iter()
                .map(|e| e.availabilities().len())
                .sum::<usize>()
        )
    }
}

/// Validating, incremental construction of a [`Problem`].
///
/// Every batch operation is all-or-nothing: when it fails, nothing from
/// the batch has been added.
#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    employees: Vec<Employee>,
    employee_index: HashMap<EmployeeId, usize>,
    shifts: Vec<Shift>,
    shift_ids: HashSet<ShiftId>,
}

impl ProblemBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_employee(&mut self, employee: Employee) -> Result<&mut Self, InputError> {
        self.add_employees([employee])
    }

    pub fn add_employees<I>(&mut self, employees: I) -> Result<&mut Self, InputError>
    where
        I: IntoIterator<Item = Employee>,
    {
        let batch: Vec<Employee> = employees.into_iter().collect();
        let mut seen: HashSet<&EmployeeId> = HashSet::with_capacity(batch.len());
        for e in &batch {
            if self.employee_index.contains_key(e.id()) || !seen.insert(e.id()) {
                return Err(DuplicateEmployeeIdError::new(e.id().clone()).into());
            }
        }
        for e in batch {
            self.employee_index
                .insert(e.id().clone(), self.employees.len());
            self.employees.push(e);
        }
        Ok(self)
    }

    /// Normalizes a batch of availability rows into the matching employees.
    ///
    /// Fails with every unmatched employee id if any row names an unknown
    /// employee.
    pub fn add_availabilities<'a, I>(&mut self, entries: I) -> Result<&mut Self, InputError>
    where
        I: IntoIterator<Item = &'a AvailabilityEntry>,
    {
        let mut per_employee: HashMap<usize, Vec<&AvailabilityEntry>> = HashMap::new();
        let mut unknown: Vec<EmployeeId> = Vec::new();
        for entry in entries {
            match self.employee_index.get(entry.employee()) {
                Some(&i) => per_employee.entry(i).or_default().push(entry),
                None => {
                    if !unknown.contains(entry.employee()) {
                        unknown.push(entry.employee().clone());
                    }
                }
            }
        }
        if !unknown.is_empty() {
            return Err(UnknownAvailabilityEmployeeError::new(unknown).into());
        }
        for (i, batch) in per_employee {
            self.employees[i].add_availabilities(batch);
        }
        Ok(self)
    }

    #[inline]
    pub fn add_shift(&mut self, shift: Shift) -> Result<&mut Self, InputError> {
        self.add_shifts([shift])
    }

    pub fn add_shifts<I>(&mut self, shifts: I) -> Result<&mut Self, InputError>
    where
        I: IntoIterator<Item = Shift>,
    {
        let batch: Vec<Shift> = shifts.into_iter().collect();
        let mut seen: HashSet<&ShiftId> = HashSet::with_capacity(batch.len());
        for s in &batch {
            if self.shift_ids.contains(s.id()) || !seen.insert(s.id()) {
                return Err(DuplicateShiftIdError::new(s.id().clone()).into());
            }
        }
        for s in batch {
            self.shift_ids.insert(s.id().clone());
            self.shifts.push(s);
        }
        Ok(self)
    }

    #[inline]
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    #[inline]
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    #[inline]
    pub fn employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employee_index.get(id).map(|&i| &self.employees[i])
    }

    #[inline]
    pub fn contains_shift(&self, id: &ShiftId) -> bool {
        self.shift_ids.contains(id)
    }

    #[must_use]
    pub fn build(&self) -> Problem {
        Problem::new(self.employees.clone(), self.shifts.clone())
    }
}
