//! Canonical day-set representation and the single-day toggle.
//!
//! # Responsibility
//! - Keep an employee's vacation days as sorted, disjoint, non-adjacent
//!   ranges (`RangeSet`).
//! - Translate a single-day click into the exact row replacement the store
//!   must apply (`toggle`).
//! - Fold a written row into touching rows of the same label
//!   (`absorb_touching`).
//!
//! # Invariants
//! - `RangeSet` ranges never overlap or touch.
//! - `toggle` applied twice on the same day restores the prior day set. It
//!   restores the prior rows too (ids aside) when they carry the toggle kind
//!   and no notes.
//! - Rows produced by `toggle` never overlap; touching rows always differ in
//!   kind or notes.

use crate::model::vacation::{DateRange, EmployeeId, Vacation, VacationId, VacationKind};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Sorted set of maximal, disjoint day ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeSet {
    ranges: Vec<DateRange>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the canonical set from arbitrary (possibly overlapping) ranges.
    pub fn from_ranges(ranges: impl IntoIterator<Item = DateRange>) -> Self {
        let mut sorted: Vec<DateRange> = ranges.into_iter().collect();
        sorted.sort();

        let mut merged: Vec<DateRange> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match merged.last_mut() {
                Some(last) if last.overlaps(&range) || last.is_adjacent_to(&range) => {
                    *last = last.hull(&range);
                }
                _ => merged.push(range),
            }
        }

        Self { ranges: merged }
    }

    /// Builds the canonical set from individual days in any order.
    pub fn from_days(days: impl IntoIterator<Item = NaiveDate>) -> Self {
        let sorted: BTreeSet<NaiveDate> = days.into_iter().collect();

        let mut ranges: Vec<DateRange> = Vec::new();
        let mut current: Option<DateRange> = None;
        for day in sorted {
            current = Some(match current {
                Some(open) if open.end().succ_opt() == Some(day) => {
                    open.hull(&DateRange::single(day))
                }
                Some(open) => {
                    ranges.push(open);
                    DateRange::single(day)
                }
                None => DateRange::single(day),
            });
        }
        ranges.extend(current);

        Self { ranges }
    }

    pub fn ranges(&self) -> &[DateRange] {
        &self.ranges
    }

    pub fn into_ranges(self) -> Vec<DateRange> {
        self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        let idx = self.ranges.partition_point(|range| range.end() < day);
        self.ranges
            .get(idx)
            .is_some_and(|range| range.contains(day))
    }

    /// Total number of days in the set.
    pub fn len_days(&self) -> usize {
        self.ranges.iter().map(DateRange::len_days).sum()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.ranges.iter().flat_map(DateRange::days)
    }

    /// Flips membership of `day`. Returns `true` when the day is now a member.
    pub fn toggle(&mut self, day: NaiveDate) -> bool {
        let idx = self.ranges.partition_point(|range| range.end() < day);

        if let Some(range) = self.ranges.get(idx).copied() {
            if range.contains(day) {
                let pieces = split_around(&range, day);
                self.ranges.splice(idx..=idx, pieces);
                return false;
            }
        }

        let mut insert_at = idx;
        let mut merged = DateRange::single(day);
        if insert_at > 0 && self.ranges[insert_at - 1].is_adjacent_to(&merged) {
            merged = merged.hull(&self.ranges[insert_at - 1]);
            self.ranges.remove(insert_at - 1);
            insert_at -= 1;
        }
        if insert_at < self.ranges.len() && self.ranges[insert_at].is_adjacent_to(&merged) {
            merged = merged.hull(&self.ranges[insert_at]);
            self.ranges.remove(insert_at);
        }
        self.ranges.insert(insert_at, merged);
        true
    }
}

/// Pieces of `range` left after removing `day`: zero, one or two ranges.
///
/// `day` outside `range` leaves the range untouched.
pub fn split_around(range: &DateRange, day: NaiveDate) -> Vec<DateRange> {
    if !range.contains(day) {
        return vec![*range];
    }

    let left = day
        .pred_opt()
        .and_then(|prev| DateRange::new(range.start(), prev).ok());
    let right = day
        .succ_opt()
        .and_then(|next| DateRange::new(next, range.end()).ok());
    left.into_iter().chain(right).collect()
}

/// Direction of a completed toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Added,
    Removed,
}

/// Row-level replacement a store must apply atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeChanges {
    /// Persisted rows to delete.
    pub delete: Vec<VacationId>,
    /// Unsaved rows to insert.
    pub insert: Vec<Vacation>,
}

impl RangeChanges {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.insert.is_empty()
    }
}

/// Result of toggling one day for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    pub changes: RangeChanges,
    /// The employee's full row set after the toggle, sorted by range.
    /// Rows created by this toggle have `id == None`.
    pub ranges: Vec<Vacation>,
}

/// Flips `day` for `employee_id` against its current rows.
///
/// Rows of other employees in `existing` are ignored. A day inside a row is
/// cut out of it; the remaining pieces keep the row's kind and notes. A day
/// outside every row becomes a new `added_kind` row, merged into touching
/// rows that carry the same kind and no notes.
pub fn toggle(
    employee_id: EmployeeId,
    day: NaiveDate,
    existing: &[Vacation],
    added_kind: VacationKind,
) -> ToggleOutcome {
    let owned: Vec<&Vacation> = existing
        .iter()
        .filter(|row| row.employee_id == employee_id)
        .collect();

    let containing: Vec<usize> = owned
        .iter()
        .enumerate()
        .filter(|(_, row)| row.range.contains(day))
        .map(|(idx, _)| idx)
        .collect();

    let (action, removed, insert) = if containing.is_empty() {
        let mut added = Vacation::new(employee_id, DateRange::single(day), added_kind);
        let mut removed = Vec::new();
        for (idx, row) in owned.iter().enumerate() {
            if row.same_label(&added) && row.range.is_adjacent_to(&added.range) {
                added.range = added.range.hull(&row.range);
                removed.push(idx);
            }
        }
        (ToggleAction::Added, removed, vec![added])
    } else {
        let insert: Vec<Vacation> = containing
            .iter()
            .flat_map(|idx| {
                let row = owned[*idx];
                split_around(&row.range, day)
                    .into_iter()
                    .map(move |piece| row.with_range(piece))
            })
            .collect();
        (ToggleAction::Removed, containing, insert)
    };

    let changes = RangeChanges {
        delete: removed.iter().filter_map(|idx| owned[*idx].id).collect(),
        insert,
    };

    let mut ranges: Vec<Vacation> = owned
        .iter()
        .enumerate()
        .filter(|(idx, _)| !removed.contains(idx))
        .map(|(_, row)| (*row).clone())
        .chain(changes.insert.iter().cloned())
        .collect();
    ranges.sort_by_key(|row| row.range);

    ToggleOutcome {
        action,
        changes,
        ranges,
    }
}

/// Folds `row` into the rows of its owner that touch it and share its kind
/// and notes.
///
/// Returns `None` when no such row exists. Otherwise the changes delete the
/// touching rows, and `row` itself when it is persisted, and insert one row
/// spanning all of them.
pub fn absorb_touching(row: &Vacation, existing: &[Vacation]) -> Option<RangeChanges> {
    let touching: Vec<&Vacation> = existing
        .iter()
        .filter(|other| {
            other.employee_id == row.employee_id
                && other.id.is_some()
                && other.id != row.id
                && other.same_label(row)
                && other.range.is_adjacent_to(&row.range)
        })
        .collect();
    if touching.is_empty() {
        return None;
    }

    let merged = touching
        .iter()
        .fold(row.range, |acc, other| acc.hull(&other.range));
    let mut delete: Vec<VacationId> = row.id.into_iter().collect();
    delete.extend(touching.iter().filter_map(|other| other.id));

    Some(RangeChanges {
        delete,
        insert: vec![row.with_range(merged)],
    })
}
