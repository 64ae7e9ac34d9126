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

//! User-input errors.
//!
//! Each failure a caller may want to report separately has its own struct.
//! [`InputError`] gathers them. Defects in already validated data are not
//! represented here; they panic at entity construction.

use crate::id::{EmployeeId, ShiftId};
use chrono::NaiveDateTime;
use shift_alloc_core::time::format_date_time;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// The input table a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordSource {
    Employees,
    Availabilities,
    Shifts,
}

impl RecordSource {
    /// The file name a folder of input is expected to contain.
    #[inline]
    pub const fn file_name(self) -> &'static str {
        match self {
            RecordSource::Employees => "employee_information.csv",
            RecordSource::Availabilities => "employee_availability.csv",
            RecordSource::Shifts => "shift_information.csv",
        }
    }
}

impl Display for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateEmployeeIdError {
    id: EmployeeId,
}

impl DuplicateEmployeeIdError {
    #[inline]
    pub fn new(id: EmployeeId) -> Self {
        Self { id }
    }

    #[inline]
    pub fn id(&self) -> &EmployeeId {
        &self.id
    }
}

impl Display for DuplicateEmployeeIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Duplicate employee id '{}'", self.id.value())
    }
}

impl std::error::Error for DuplicateEmployeeIdError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateShiftIdError {
    id: ShiftId,
}

impl DuplicateShiftIdError {
    #[inline]
    pub fn new(id: ShiftId) -> Self {
        Self { id }
    }

    #[inline]
    pub fn id(&self) -> &ShiftId {
        &self.id
    }
}

impl Display for DuplicateShiftIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Duplicate shift id '{}'", self.id.value())
    }
}

impl std::error::Error for DuplicateShiftIdError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StartNotBeforeEndError {
    table: RecordSource,
    row_id: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl StartNotBeforeEndError {
    #[inline]
    pub fn new(
        table: RecordSource,
        row_id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            table,
            row_id: row_id.into(),
            start,
            end,
        }
    }

    #[inline]
    pub fn table(&self) -> RecordSource {
        self.table
    }

    /// The shift id, or the employee id for availability rows.
    #[inline]
    pub fn row_id(&self) -> &str {
        &self.row_id
    }

    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

impl Display for StartNotBeforeEndError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Row '{}' in {} starts at {} which is not before its end {}",
            self.row_id,
            self.table,
            format_date_time(self.start),
            format_date_time(self.end)
        )
    }
}

impl std::error::Error for StartNotBeforeEndError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownAvailabilityEmployeeError {
    ids: Vec<EmployeeId>,
}

impl UnknownAvailabilityEmployeeError {
    #[inline]
    pub fn new(ids: Vec<EmployeeId>) -> Self {
        Self { ids }
    }

    /// Every unmatched id, in input order.
    #[inline]
    pub fn ids(&self) -> &[EmployeeId] {
        &self.ids
    }
}

impl Display for UnknownAvailabilityEmployeeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.ids.iter().map(EmployeeId::value).collect();
        write!(
            f,
            "Availability rows reference unknown employee ids: {}",
            ids.join(", ")
        )
    }
}

impl std::error::Error for UnknownAvailabilityEmployeeError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MalformedRecordError {
    table: RecordSource,
    line: u64,
    message: String,
}

impl MalformedRecordError {
    #[inline]
    pub fn new(table: RecordSource, line: u64, message: impl Into<String>) -> Self {
        Self {
            table,
            line,
            message: message.into(),
        }
    }

    #[inline]
    pub fn table(&self) -> RecordSource {
        self.table
    }

    /// One-based line number, header included.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for MalformedRecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Malformed record in {} at line {}: {}",
            self.table, self.line, self.message
        )
    }
}

impl std::error::Error for MalformedRecordError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnreadableInputError {
    path: PathBuf,
    message: String,
}

impl UnreadableInputError {
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

impl Display for UnreadableInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not read {}: {}",
            self.path.display(),
            self.message
        )
    }
}

impl std::error::Error for UnreadableInputError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputError {
    DuplicateEmployeeId(DuplicateEmployeeIdError),
    DuplicateShiftId(DuplicateShiftIdError),
    StartNotBeforeEnd(StartNotBeforeEndError),
    UnknownAvailabilityEmployee(UnknownAvailabilityEmployeeError),
    MalformedRecord(MalformedRecordError),
    Unreadable(UnreadableInputError),
}

impl Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use InputError::*;
        match self {
            DuplicateEmployeeId(e) => write!(f, "{}", e),
            DuplicateShiftId(e) => write!(f, "{}", e),
            StartNotBeforeEnd(e) => write!(f, "{}", e),
            UnknownAvailabilityEmployee(e) => write!(f, "{}", e),
            MalformedRecord(e) => write!(f, "{}", e),
            Unreadable(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for InputError {}

impl From<DuplicateEmployeeIdError> for InputError {
    fn from(e: DuplicateEmployeeIdError) -> Self {
        InputError::DuplicateEmployeeId(e)
    }
}

impl From<DuplicateShiftIdError> for InputError {
    fn from(e: DuplicateShiftIdError) -> Self {
        InputError::DuplicateShiftId(e)
    }
}

impl From<StartNotBeforeEndError> for InputError {
    fn from(e: StartNotBeforeEndError) -> Self {
        InputError::StartNotBeforeEnd(e)
    }
}

impl From<UnknownAvailabilityEmployeeError> for InputError {
    fn from(e: UnknownAvailabilityEmployeeError) -> Self {
        InputError::UnknownAvailabilityEmployee(e)
    }
}

impl From<MalformedRecordError> for InputError {
    fn from(e: MalformedRecordError) -> Self {
        InputError::MalformedRecord(e)
    }
}

impl From<UnreadableInputError> for InputError {
    fn from(e: UnreadableInputError) -> Self {
        InputError::Unreadable(e)
    }
}
