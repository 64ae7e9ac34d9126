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

//! # Tabular Input
//!
//! Reads the three comma-separated input tables (employees, availability
//! rows and shifts) and turns each row into a validated domain value.
//! Every row is checked as it is read: required cells, number and
//! date-time syntax, contact field shape and `start < end`. The first
//! failure stops the table and names the file and line.

use crate::{
    availability::{AvailabilityEntry, AvailabilityType, ShiftType},
    employee::Employee,
    err::{InputError, MalformedRecordError, RecordSource, StartNotBeforeEndError, UnreadableInputError},
    id::{EmployeeId, ShiftId},
    shift::Shift,
    validate::{is_valid_email, is_valid_mobile},
};
use serde::Deserialize;
use shift_alloc_core::time::{TimeWindow, parse_date_time};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeRecord {
    employee_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mobile: Option<String>,
    email: String,
    #[serde(default)]
    importance: Option<u32>,
    #[serde(default)]
    max_weekly_shifts: Option<u32>,
    #[serde(default)]
    min_weekly_shifts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityRecord {
    employee_id: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    start: String,
    end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShiftRecord {
    shift_id: String,
    #[serde(rename = "type")]
    kind: String,
    start: String,
    end: String,
}

/// Removes non-ASCII characters from the header line, such as the byte
/// order mark spreadsheet tools prepend.
fn strip_header_noise(content: &str) -> Cow<'_, str> {
    let split = content.find('\n').unwrap_or(content.len());
    let (first, rest) = content.split_at(split);
    if first.is_ascii() {
        Cow::Borrowed(content)
    } else {
        let mut cleaned: String = first.chars().filter(char::is_ascii).collect();
        cleaned.push_str(rest);
        Cow::Owned(cleaned)
    }
}

fn read_records<T>(table: RecordSource, content: &str) -> Result<Vec<(u64, T)>, InputError>
where
    T: for<'de> Deserialize<'de>,
{
    let content = strip_header_noise(content);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| MalformedRecordError::new(table, 1, e.to_string()))?
        .clone();

    let mut out = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line());
            MalformedRecordError::new(table, line, e.to_string())
        })?;
        let line = record.position().map_or(0, |p| p.line());
        let value: T = record
            .deserialize(Some(&headers))
            .map_err(|e| MalformedRecordError::new(table, line, e.to_string()))?;
        out.push((line, value));
    }
    debug!(table = %table, rows = out.len(), "Read input table");
    Ok(out)
}

fn required(table: RecordSource, line: u64, column: &str, value: &str) -> Result<(), InputError> {
    if value.is_empty() {
        return Err(MalformedRecordError::new(table, line, format!("column '{column}' is empty")).into());
    }
    Ok(())
}

fn window(
    table: RecordSource,
    line: u64,
    row_id: &str,
    start: &str,
    end: &str,
) -> Result<TimeWindow, InputError> {
    let start = parse_date_time(start).map_err(|e| MalformedRecordError::new(table, line, e.to_string()))?;
    let end = parse_date_time(end).map_err(|e| MalformedRecordError::new(table, line, e.to_string()))?;
    TimeWindow::try_new(start, end)
        .map_err(|e| StartNotBeforeEndError::new(table, row_id, e.start(), e.end()).into())
}

/// Parses `employeeId,name,mobile,email,importance,maxWeeklyShifts,minWeeklyShifts`.
pub fn parse_employees(content: &str) -> Result<Vec<Employee>, InputError> {
    let table = RecordSource::Employees;
    read_records::<EmployeeRecord>(table, content)?
        .into_iter()
        .map(|(line, r)| -> Result<Employee, InputError> {
            required(table, line, "employeeId", &r.employee_id)?;
            if !is_valid_email(&r.email) {
                return Err(MalformedRecordError::new(
                    table,
                    line,
                    format!("'{}' is not a valid email", r.email),
                )
                .into());
            }
            if let Some(m) = &r.mobile
                && !is_valid_mobile(m)
            {
                return Err(MalformedRecordError::new(
                    table,
                    line,
                    format!("'{m}' is not an international mobile number ('+' and 8 to 15 digits)"),
                )
                .into());
            }
            Ok(Employee::new(EmployeeId::new(r.employee_id), r.email)
                .with_name(r.name)
                .with_mobile(r.mobile)
                .with_importance(r.importance.unwrap_or(0))
                .with_max_weekly_shifts(r.max_weekly_shifts)
                .with_min_weekly_shifts(r.min_weekly_shifts.unwrap_or(0)))
        })
        .collect()
}

/// Parses `employeeId,type,start,end`. A blank type means any type.
pub fn parse_availabilities(content: &str) -> Result<Vec<AvailabilityEntry>, InputError> {
    let table = RecordSource::Availabilities;
    read_records::<AvailabilityRecord>(table, content)?
        .into_iter()
        .map(|(line, r)| -> Result<AvailabilityEntry, InputError> {
            required(table, line, "employeeId", &r.employee_id)?;
            let w = window(table, line, &r.employee_id, &r.start, &r.end)?;
            Ok(AvailabilityEntry::new(
                EmployeeId::new(r.employee_id),
                AvailabilityType::from_cell(r.kind.as_deref()),
                w,
            ))
        })
        .collect()
}

/// Parses `shiftId,type,start,end`.
pub fn parse_shifts(content: &str) -> Result<Vec<Shift>, InputError> {
    let table = RecordSource::Shifts;
    read_records::<ShiftRecord>(table, content)?
        .into_iter()
        .map(|(line, r)| -> Result<Shift, InputError> {
            required(table, line, "shiftId", &r.shift_id)?;
            required(table, line, "type", &r.kind)?;
            let w = window(table, line, &r.shift_id, &r.start, &r.end)?;
            Ok(Shift::new(ShiftId::new(r.shift_id), ShiftType::new(r.kind), w))
        })
        .collect()
}

fn read_file(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|e| UnreadableInputError::new(path, e.to_string()).into())
}

pub fn load_employees_csv(path: &Path) -> Result<Vec<Employee>, InputError> {
    parse_employees(&read_file(path)?)
}

pub fn load_availabilities_csv(path: &Path) -> Result<Vec<AvailabilityEntry>, InputError> {
    parse_availabilities(&read_file(path)?)
}

pub fn load_shifts_csv(path: &Path) -> Result<Vec<Shift>, InputError> {
    parse_shifts(&read_file(path)?)
}
