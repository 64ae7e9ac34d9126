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

//! # Availability Windows
//!
//! An [`Availability`] is a time window together with the set of shift
//! types an employee accepts inside it. Raw input arrives as one
//! [`AvailabilityEntry`] per (type, window) row; [`normalize`] folds those
//! rows and any previously normalized windows into a canonical list:
//!
//! * no two windows overlap in time,
//! * two windows that touch never carry the same type set,
//! * at every instant the covering window's set is the union of every
//!   input type offered at that instant.
//!
//! The normalizer is a boundary sweep. Every window contributes a start and
//! an end boundary per type. Boundaries are sorted by time, then type (with
//! [`AvailabilityType::Any`] first), then starts before ends. Walking them
//! while keeping a multiset of open types yields elementary spans, which are
//! then merged when they touch and carry equal sets.

use crate::id::EmployeeId;
use chrono::NaiveDateTime;
use shift_alloc_core::time::TimeWindow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

/// The kind of work a shift requires.
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShiftType(String);

impl ShiftType {
    /// # Panics
    ///
    /// Panics if `kind` is empty.
    #[inline]
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        assert!(!kind.is_empty(), "ShiftType::new: type must not be empty");
        ShiftType(kind)
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl Display for ShiftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShiftType {
    fn from(value: &str) -> Self {
        ShiftType::new(value)
    }
}

/// A type an employee offers during an availability window.
///
/// `Any` orders before every named type. The normalizer depends on this.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AvailabilityType {
    Any,
    Only(ShiftType),
}

impl AvailabilityType {
    #[inline]
    pub fn only(kind: impl Into<String>) -> Self {
        AvailabilityType::Only(ShiftType::new(kind))
    }

    /// Maps an optional input cell to a type; blank means `Any`.
    #[inline]
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell.map(str::trim) {
            None | Some("") => AvailabilityType::Any,
            Some(s) => AvailabilityType::only(s),
        }
    }

    #[inline]
    pub fn accepts(&self, kind: &ShiftType) -> bool {
        match self {
            AvailabilityType::Any => true,
            AvailabilityType::Only(k) => k == kind,
        }
    }
}

impl Display for AvailabilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityType::Any => f.write_str("any"),
            AvailabilityType::Only(k) => write!(f, "{}", k),
        }
    }
}

/// A normalized availability window with its accepted types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Availability {
    window: TimeWindow,
    types: BTreeSet<AvailabilityType>,
}

impl Availability {
    /// # Panics
    ///
    /// Panics if `types` is empty.
    #[inline]
    pub fn new(window: TimeWindow, types: BTreeSet<AvailabilityType>) -> Self {
        assert!(
            !types.is_empty(),
            "Availability::new: type set must not be empty for window {}",
            window
        );
        Self { window, types }
    }

    #[inline]
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.window.start()
    }

    #[inline]
    pub fn end(&self) -> NaiveDateTime {
        self.window.end()
    }

    #[inline]
    pub fn types(&self) -> &BTreeSet<AvailabilityType> {
        &self.types
    }

    /// `true` if this window offers `kind` or any type.
    #[inline]
    pub fn accepts(&self, kind: &ShiftType) -> bool {
        self.types.iter().any(|t| t.accepts(kind))
    }
}

impl Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types: Vec<String> = self.types.iter().map(ToString::to_string).collect();
        write!(f, "{} {{{}}}", self.window, types.join(", "))
    }
}

/// One raw availability row: an employee offers one type during one window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AvailabilityEntry {
    employee: EmployeeId,
    kind: AvailabilityType,
    window: TimeWindow,
}

impl AvailabilityEntry {
    #[inline]
    pub fn new(employee: EmployeeId, kind: AvailabilityType, window: TimeWindow) -> Self {
        Self {
            employee,
            kind,
            window,
        }
    }

    #[inline]
    pub fn employee(&self) -> &EmployeeId {
        &self.employee
    }

    #[inline]
    pub fn kind(&self) -> &AvailabilityType {
        &self.kind
    }

    #[inline]
    pub fn window(&self) -> TimeWindow {
        self.window
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Boundary<'a> {
    // Field order is the sweep order.
    at: NaiveDateTime,
    kind: &'a AvailabilityType,
    is_end: bool,
}

/// Folds `entries` into the already normalized `existing` list.
///
/// The employee ids on `entries` are not inspected; callers match entries to
/// employees beforehand. The result is sorted by start time.
pub fn normalize<'a, I>(existing: &'a [Availability], entries: I) -> Vec<Availability>
where
    I: IntoIterator<Item = &'a AvailabilityEntry>,
{
    let mut boundaries: Vec<Boundary<'a>> = Vec::new();
    let mut push = |window: TimeWindow, kind: &'a AvailabilityType| {
        boundaries.push(Boundary {
            at: window.start(),
            kind,
            is_end: false,
        });
        boundaries.push(Boundary {
            at: window.end(),
            kind,
            is_end: true,
        });
    };
    for a in existing {
        for kind in &a.types {
            push(a.window, kind);
        }
    }
    for e in entries {
        push(e.window, &e.kind);
    }
    boundaries.sort_unstable();

    let mut open: BTreeMap<&AvailabilityType, usize> = BTreeMap::new();
    let mut spans: Vec<Availability> = Vec::new();
    for pair in boundaries.windows(2) {
        let (cur, next) = (&pair[0], &pair[1]);
        if cur.is_end {
            if let Some(n) = open.get_mut(cur.kind) {
                *n -= 1;
                if *n == 0 {
                    open.remove(cur.kind);
                }
            }
        } else {
            *open.entry(cur.kind).or_insert(0) += 1;
        }

        if cur.at == next.at || open.is_empty() {
            continue;
        }
        let types: BTreeSet<AvailabilityType> = open.keys().map(|&k| k.clone()).collect();
        let window = TimeWindow::new(cur.at, next.at);
        match spans.last_mut() {
            Some(prev) if prev.window.end() == window.start() && prev.types == types => {
                prev.window = TimeWindow::new(prev.window.start(), window.end());
            }
            _ => spans.push(Availability::new(window, types)),
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 7, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn w(day: u32, (h0, m0): (u32, u32), (h1, m1): (u32, u32)) -> TimeWindow {
        TimeWindow::new(at(day, h0, m0), at(day, h1, m1))
    }

    fn entry(kind: AvailabilityType, window: TimeWindow) -> AvailabilityEntry {
        AvailabilityEntry::new(EmployeeId::new("e1"), kind, window)
    }

    fn set(types: &[AvailabilityType]) -> BTreeSet<AvailabilityType> {
        types.iter().cloned().collect()
    }

    fn online() -> AvailabilityType {
        AvailabilityType::only("online")
    }

    fn in_person() -> AvailabilityType {
        AvailabilityType::only("in-person")
    }

    fn assert_canonical(list: &[Availability]) {
        for pair in list.windows(2) {
            assert!(
                !pair[0].window().overlaps(&pair[1].window()),
                "{} overlaps {}",
                pair[0],
                pair[1]
            );
            assert!(pair[0].start() < pair[1].start());
            if pair[0].end() == pair[1].start() {
                assert_ne!(pair[0].types(), pair[1].types());
            }
        }
    }

    #[test]
    fn test_overlapping_typed_and_any_windows_split_into_elementary_spans() {
        let entries = vec![
            entry(online(), w(11, (10, 11), (10, 12))),
            entry(in_person(), w(11, (10, 11), (10, 12))),
            entry(online(), w(11, (10, 30), (10, 40))),
            entry(in_person(), w(11, (10, 30), (10, 40))),
            entry(in_person(), w(11, (10, 50), (11, 0))),
            entry(online(), w(11, (10, 50), (10, 55))),
            entry(AvailabilityType::Any, w(11, (10, 35), (10, 55))),
        ];
        let out = normalize(&[], &entries);
        let any = AvailabilityType::Any;
        let expected = vec![
            Availability::new(w(11, (10, 11), (10, 12)), set(&[online(), in_person()])),
            Availability::new(w(11, (10, 30), (10, 35)), set(&[online(), in_person()])),
            Availability::new(
                w(11, (10, 35), (10, 40)),
                set(&[online(), in_person(), any.clone()]),
            ),
            Availability::new(w(11, (10, 40), (10, 50)), set(&[any.clone()])),
            Availability::new(
                w(11, (10, 50), (10, 55)),
                set(&[in_person(), online(), any]),
            ),
            Availability::new(w(11, (10, 55), (11, 0)), set(&[in_person()])),
        ];
        assert_eq!(out, expected);
        assert_canonical(&out);
    }

    #[test]
    fn test_duplicate_entries_collapse_and_output_is_time_ordered() {
        let entries = vec![
            entry(online(), w(11, (10, 11), (10, 12))),
            entry(online(), w(11, (10, 11), (10, 12))),
            entry(AvailabilityType::Any, w(11, (10, 11), (10, 12))),
            entry(online(), w(9, (10, 11), (10, 12))),
        ];
        let out = normalize(&[], &entries);
        assert_eq!(
            out,
            vec![
                Availability::new(w(9, (10, 11), (10, 12)), set(&[online()])),
                Availability::new(
                    w(11, (10, 11), (10, 12)),
                    set(&[online(), AvailabilityType::Any])
                ),
            ]
        );
    }

    #[test]
    fn test_touching_windows_with_equal_types_merge() {
        let entries = vec![
            entry(online(), w(11, (9, 0), (12, 0))),
            entry(online(), w(11, (12, 0), (13, 0))),
        ];
        let out = normalize(&[], &entries);
        assert_eq!(
            out,
            vec![Availability::new(w(11, (9, 0), (13, 0)), set(&[online()]))]
        );
    }

    #[test]
    fn test_touching_windows_with_different_types_stay_apart() {
        let entries = vec![
            entry(online(), w(11, (9, 0), (12, 0))),
            entry(AvailabilityType::Any, w(11, (12, 0), (13, 0))),
        ];
        let out = normalize(&[], &entries);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].end(), out[1].start());
        assert_canonical(&out);
    }

    #[test]
    fn test_normalizing_against_empty_batch_is_identity() {
        let entries = vec![
            entry(online(), w(11, (9, 0), (12, 0))),
            entry(in_person(), w(11, (11, 0), (14, 0))),
            entry(AvailabilityType::Any, w(12, (8, 0), (9, 0))),
        ];
        let once = normalize(&[], &entries);
        let twice = normalize(&once, std::iter::empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_new_batch_folds_into_existing_windows() {
        let first = normalize(&[], &[entry(online(), w(11, (9, 0), (12, 0)))]);
        let more = vec![entry(in_person(), w(11, (10, 0), (13, 0)))];
        let out = normalize(&first, &more);
        assert_eq!(
            out,
            vec![
                Availability::new(w(11, (9, 0), (10, 0)), set(&[online()])),
                Availability::new(w(11, (10, 0), (12, 0)), set(&[online(), in_person()])),
                Availability::new(w(11, (12, 0), (13, 0)), set(&[in_person()])),
            ]
        );
    }

    fn assert_union_of_offered(
        entries: &[AvailabilityEntry],
        out: &[Availability],
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) {
        let mut t = from;
        while t < to {
            let offered: BTreeSet<AvailabilityType> = entries
                .iter()
                .filter(|e| e.window().as_interval().contains(t))
                .map(|e| e.kind().clone())
                .collect();
            let covering: Vec<&Availability> = out
                .iter()
                .filter(|a| a.window().as_interval().contains(t))
                .collect();
            if offered.is_empty() {
                assert!(covering.is_empty(), "unexpected coverage at {}", t);
            } else {
                assert_eq!(covering.len(), 1, "instant {} covered by {:?}", t, covering);
                assert_eq!(covering[0].types(), &offered, "types at {}", t);
            }
            t += TimeDelta::minutes(5);
        }
    }

    #[test]
    fn test_coverage_and_type_union_hold_at_every_sampled_instant() {
        let entries = vec![
            entry(online(), w(11, (8, 0), (10, 0))),
            entry(online(), w(11, (9, 0), (11, 0))),
            entry(in_person(), w(11, (9, 30), (9, 45))),
            entry(AvailabilityType::Any, w(11, (10, 30), (12, 0))),
            entry(in_person(), w(11, (13, 0), (14, 0))),
        ];
        let out = normalize(&[], &entries);
        assert_canonical(&out);
        assert_union_of_offered(&entries, &out, at(11, 7, 0), at(11, 15, 0));
    }

    #[test]
    fn test_random_batches_normalize_canonically_in_any_split() {
        let kinds = [AvailabilityType::Any, online(), in_person()];
        let base = at(11, 8, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..300 {
            let n = rng.random_range(0..12);
            let entries: Vec<AvailabilityEntry> = (0..n)
                .map(|_| {
                    let start = base + TimeDelta::minutes(5 * rng.random_range(0..120));
                    let end = start + TimeDelta::minutes(5 * rng.random_range(1..36));
                    let kind = kinds[rng.random_range(0..kinds.len())].clone();
                    entry(kind, TimeWindow::new(start, end))
                })
                .collect();

            let out = normalize(&[], &entries);
            assert_canonical(&out);
            assert_union_of_offered(&entries, &out, base, base + TimeDelta::hours(14));
            assert_eq!(normalize(&out, std::iter::empty()), out);

            let split = rng.random_range(0..=entries.len());
            let existing = normalize(&[], &entries[..split]);
            assert_eq!(normalize(&existing, &entries[split..]), out);
        }
    }

    #[test]
    fn test_availability_accepts_named_or_any() {
        let a = Availability::new(w(11, (9, 0), (10, 0)), set(&[online()]));
        assert!(a.accepts(&ShiftType::new("online")));
        assert!(!a.accepts(&ShiftType::new("in-person")));
        let b = Availability::new(w(11, (9, 0), (10, 0)), set(&[AvailabilityType::Any]));
        assert!(b.accepts(&ShiftType::new("in-person")));
    }

    #[test]
    fn test_any_sorts_before_named_types() {
        assert!(AvailabilityType::Any < AvailabilityType::only("a"));
        assert_eq!(AvailabilityType::from_cell(Some("  ")), AvailabilityType::Any);
        assert_eq!(AvailabilityType::from_cell(None), AvailabilityType::Any);
        assert_eq!(
            AvailabilityType::from_cell(Some("online")),
            AvailabilityType::only("online")
        );
    }

    #[test]
    #[should_panic]
    fn test_empty_type_set_panics() {
        let _ = Availability::new(w(11, (9, 0), (10, 0)), BTreeSet::new());
    }
}
