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

//! # Allocation Session
//!
//! Collects employees, availability rows and shifts across batches,
//! then solves all of them in one go. Each call to
//! [`AllocationSession::allocate_shifts`] replans every shift the session
//! knows about, including ones allocated by an earlier call.
//!
//! The session takes `&mut self` for solving, so a second solve cannot
//! start while one is in flight.

use crate::{
    constraints::{ScoreExplanation, ScoringContext, explain},
    framework::state::Solver,
    greedy::GreedySolver,
    meta::{config::MetaConfig, engine::MetaEngine, engine::MetaEngineError, oplib::prelude::op_list},
};
use shift_alloc_core::score::Score;
use shift_alloc_model::{
    availability::AvailabilityEntry,
    employee::Employee,
    err::{InputError, RecordSource},
    loading::{load_availabilities_csv, load_employees_csv, load_shifts_csv},
    problem::{Problem, ProblemBuilder},
    shift::Shift,
    sol::{Allocation, AllocationRow},
};
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Name of the allocation file the command line writes.
pub const ALLOCATIONS_OUTPUT_FILE: &str = "ALLOCATIONS_OUTPUT.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteAllocationsError {
    path: PathBuf,
    message: String,
}

impl WriteAllocationsError {
    #[inline]
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for WriteAllocationsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not write allocations to {}: {}",
            self.path.display(),
            self.message
        )
    }
}

impl std::error::Error for WriteAllocationsError {}

#[derive(Debug, Clone)]
struct Solved {
    problem: Problem,
    allocation: Allocation,
}

#[derive(Debug, Clone, Default)]
pub struct AllocationSession {
    builder: ProblemBuilder,
    solved: Option<Solved>,
}

impl AllocationSession {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_employees<I>(&mut self, employees: I) -> Result<&mut Self, InputError>
    where
        I: IntoIterator<Item = Employee>,
    {
        self.builder.add_employees(employees)?;
        Ok(self)
    }

    pub fn add_availabilities<'a, I>(&mut self, entries: I) -> Result<&mut Self, InputError>
    where
        I: IntoIterator<Item = &'a AvailabilityEntry>,
    {
        self.builder.add_availabilities(entries)?;
        Ok(self)
    }

    pub fn add_shifts<I>(&mut self, shifts: I) -> Result<&mut Self, InputError>
    where
        I: IntoIterator<Item = Shift>,
    {
        self.builder.add_shifts(shifts)?;
        Ok(self)
    }

    /// Reads the employee, availability and shift tables from `folder`.
    #[instrument(skip_all, fields(folder = %folder.display()))]
    pub fn load_from_folder(&mut self, folder: &Path) -> Result<&mut Self, InputError> {
        let employees = load_employees_csv(&folder.join(RecordSource::Employees.file_name()))?;
        let availabilities =
            load_availabilities_csv(&folder.join(RecordSource::Availabilities.file_name()))?;
        let shifts = load_shifts_csv(&folder.join(RecordSource::Shifts.file_name()))?;
        info!(
            employees = employees.len(),
            availabilities = availabilities.len(),
            shifts = shifts.len(),
            "Loaded input tables"
        );
        self.add_employees(employees)?
            .add_availabilities(&availabilities)?
            .add_shifts(shifts)
    }

    #[inline]
    pub fn employees(&self) -> &[Employee] {
        self.builder.employees()
    }

    /// Every shift known to the session, allocated or not.
    #[inline]
    pub fn shifts(&self) -> &[Shift] {
        self.builder.shifts()
    }

    #[inline]
    pub fn allocated_shifts(&self) -> &[Shift] {
        self.solved.as_ref().map_or(&[][..], |s| s.problem.shifts())
    }

    /// Shifts added since the last solve.
    #[inline]
    pub fn unallocated_shifts(&self) -> &[Shift] {
        &self.builder.shifts()[self.allocated_shifts().len()..]
    }

    #[inline]
    pub fn allocation(&self) -> Option<&Allocation> {
        self.solved.as_ref().map(|s| &s.allocation)
    }

    /// Solves every known shift and returns the best score found.
    #[instrument(skip_all)]
    pub fn allocate_shifts(&mut self, config: MetaConfig) -> Score {
        let problem = self.builder.build();
        info!(%problem, "Allocating shifts");
        let mut engine = MetaEngine::new(config, op_list(&problem), GreedySolver::new());
        let allocation = match engine.solve(&problem) {
            Ok(a) => a,
            Err(MetaEngineError::ConstructionError(never)) => match never {},
        };
        let score = allocation.score();
        info!(%score, bound = allocation.bound_count(), "Allocation finished");
        self.solved = Some(Solved {
            problem,
            allocation,
        });
        score
    }

    /// Output rows of the last solve, in shift input order.
    pub fn allocation_rows(&self) -> Vec<AllocationRow> {
        self.solved
            .as_ref()
            .map(|s| s.allocation.rows(&s.problem))
            .unwrap_or_default()
    }

    pub fn explain_score(&self) -> Option<ScoreExplanation> {
        self.solved
            .as_ref()
            .map(|s| explain(&ScoringContext::new(&s.problem), s.allocation.bindings()))
    }

    /// Writes `shiftId,employeeId,start,end,type` rows without quoting and
    /// returns how many allocation rows were written.
    pub fn write_allocations(&self, path: &Path) -> Result<usize, WriteAllocationsError> {
        let err = |e: csv::Error| WriteAllocationsError::new(path, e.to_string());
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .from_path(path)
            .map_err(err)?;
        writer.write_record(AllocationRow::HEADER).map_err(err)?;
        let rows = self.allocation_rows();
        for row in &rows {
            writer.write_record(row.to_record()).map_err(err)?;
        }
        writer
            .flush()
            .map_err(|e| WriteAllocationsError::new(path, e.to_string()))?;
        info!(path = %path.display(), rows = rows.len(), "Wrote allocations");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{
        ConstraintKind,
        tests::{any_all_month, at, shift},
    };
    use shift_alloc_model::id::{EmployeeId, ShiftId};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shift-alloc-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn quick() -> MetaConfig {
        MetaConfig::default()
            .with_time_limit(None)
            .with_max_iterations(Some(500))
    }

    fn session() -> AllocationSession {
        let mut s = AllocationSession::new();
        s.add_employees([
            Employee::new(EmployeeId::new("e1"), "e1@example.com"),
            Employee::new(EmployeeId::new("e2"), "e2@example.com"),
        ])
        .unwrap()
        .add_availabilities(&[any_all_month("e1"), any_all_month("e2")])
        .unwrap()
        .add_shifts([
            shift("s1", "online", at(12, 9, 0), at(12, 11, 0)),
            shift("s2", "online", at(12, 10, 0), at(12, 12, 0)),
        ])
        .unwrap();
        s
    }

    #[test]
    fn test_allocate_moves_shifts_to_allocated_and_reports_rows() {
        let mut s = session();
        assert_eq!(s.unallocated_shifts().len(), 2);
        assert!(s.allocation_rows().is_empty());
        let score = s.allocate_shifts(quick());
        assert_eq!(score.hard(), 0);
        assert_eq!(s.allocated_shifts().len(), 2);
        assert!(s.unallocated_shifts().is_empty());
        let rows = s.allocation_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].shift_id(), &ShiftId::new("s1"));
        assert_ne!(rows[0].employee_id(), rows[1].employee_id());
        let ex = s.explain_score().unwrap();
        assert_eq!(ex.score(), score);
        assert_eq!(ex.total(ConstraintKind::DoubleBooking).matches(), 0);
    }

    #[test]
    fn test_second_round_replans_everything_and_rejects_known_ids() {
        let mut s = session();
        s.allocate_shifts(quick());
        let err = s
            .add_shifts([shift("s1", "online", at(13, 9, 0), at(13, 10, 0))])
            .unwrap_err();
        assert!(matches!(err, InputError::DuplicateShiftId(_)));
        s.add_shifts([shift("s3", "online", at(13, 9, 0), at(13, 10, 0))])
            .unwrap();
        assert_eq!(s.unallocated_shifts().len(), 1);
        s.allocate_shifts(quick());
        assert_eq!(s.allocated_shifts().len(), 3);
        assert_eq!(s.allocation().unwrap().bound_count(), 3);
    }

    #[test]
    fn test_write_allocations_unquoted_with_header() {
        let mut s = session();
        s.allocate_shifts(quick());
        let path = scratch_dir("write").join(ALLOCATIONS_OUTPUT_FILE);
        assert_eq!(s.write_allocations(&path).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("shiftId,employeeId,start,end,type"));
        let first = lines.next().unwrap();
        assert!(first.starts_with("s1,e"));
        assert!(first.ends_with(",12/07/2021 9:00,12/07/2021 11:00,online"));
        assert!(!text.contains('"'));
    }

    #[test]
    fn test_load_from_folder_reads_three_tables() {
        let dir = scratch_dir("load");
        std::fs::write(
            dir.join(RecordSource::Employees.file_name()),
            "employeeId,name,mobile,email,importance,maxWeeklyShifts,minWeeklyShifts\n\
             e1,Ada,,ada@example.com,1,5,0\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(RecordSource::Availabilities.file_name()),
            "employeeId,type,start,end\ne1,,12/07/2021 8:00,12/07/2021 18:00\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(RecordSource::Shifts.file_name()),
            "shiftId,type,start,end\ns1,online,12/07/2021 9:00,12/07/2021 12:00\n",
        )
        .unwrap();
        let mut s = AllocationSession::new();
        s.load_from_folder(&dir).unwrap();
        assert_eq!(s.employees().len(), 1);
        assert_eq!(s.shifts().len(), 1);
        assert_eq!(s.allocate_shifts(quick()), Score::ZERO);
    }

    #[test]
    fn test_load_from_folder_chains_and_surfaces_duplicate_shift() {
        let dir = scratch_dir("load-dup");
        std::fs::write(
            dir.join(RecordSource::Employees.file_name()),
            "employeeId,name,mobile,email,importance,maxWeeklyShifts,minWeeklyShifts\n\
             e1,Ada,,ada@example.com,1,5,0\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(RecordSource::Availabilities.file_name()),
            "employeeId,type,start,end\ne1,,12/07/2021 8:00,12/07/2021 18:00\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(RecordSource::Shifts.file_name()),
            "shiftId,type,start,end\ns1,online,12/07/2021 9:00,12/07/2021 10:00\n",
        )
        .unwrap();

        let mut s = AllocationSession::new();
        s.load_from_folder(&dir)
            .unwrap()
            .add_shifts([shift("s2", "online", at(12, 13, 0), at(12, 14, 0))])
            .unwrap();
        assert_eq!(s.shifts().len(), 2);

        std::fs::write(
            dir.join(RecordSource::Shifts.file_name()),
            "shiftId,type,start,end\n\
             s9,online,12/07/2021 9:00,12/07/2021 10:00\n\
             s9,online,12/07/2021 11:00,12/07/2021 12:00\n",
        )
        .unwrap();
        let mut fresh = AllocationSession::new();
        let err = fresh.load_from_folder(&dir).unwrap_err();
        assert!(matches!(err, InputError::DuplicateShiftId(_)));
        assert!(fresh.shifts().is_empty());
    }

    #[test]
    fn test_load_from_missing_folder_is_unreadable() {
        let mut s = AllocationSession::new();
        let err = s
            .load_from_folder(Path::new("/definitely/not/a/folder"))
            .unwrap_err();
        assert!(matches!(err, InputError::Unreadable(_)));
    }
}
