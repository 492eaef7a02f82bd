//! Day-set <-> range conversion.
//!
//! # Responsibility
//! - Collapse an unordered day selection into the minimal list of maximal
//!   ranges used as storage rows.
//! - Expand ranges back into days.
//!
//! # Invariants
//! - `normalize(expand(r)) == r` for any minimal, disjoint `r`.
//! - Output is sorted by start date and contains no touching ranges
//!   (`normalize_by_kind`: no touching ranges of the same kind).

use crate::engine::range_set::RangeSet;
use crate::model::vacation::{DateRange, EmployeeId, Vacation, VacationKind};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Minimal list of maximal contiguous ranges covering `days`.
pub fn normalize(days: impl IntoIterator<Item = NaiveDate>) -> Vec<DateRange> {
    RangeSet::from_days(days).into_ranges()
}

/// Every day covered by `ranges`.
pub fn expand(ranges: impl IntoIterator<Item = DateRange>) -> BTreeSet<NaiveDate> {
    ranges.into_iter().flat_map(|range| range.days()).collect()
}

/// Like [`normalize`], but only merges consecutive days of the same kind.
pub fn normalize_by_kind(days: &BTreeMap<NaiveDate, VacationKind>) -> Vec<(DateRange, VacationKind)> {
    let mut out: Vec<(DateRange, VacationKind)> = Vec::new();
    for (day, kind) in days {
        match out.last_mut() {
            Some((range, last_kind))
                if *last_kind == *kind && range.end().succ_opt() == Some(*day) =>
            {
                *range = range.hull(&DateRange::single(*day));
            }
            _ => out.push((DateRange::single(*day), *kind)),
        }
    }
    out
}

/// Unsaved rows for a full-set replacement from a uniform day selection.
pub fn rows_from_days(
    employee_id: EmployeeId,
    days: impl IntoIterator<Item = NaiveDate>,
    kind: VacationKind,
    notes: Option<&str>,
) -> Vec<Vacation> {
    normalize(days)
        .into_iter()
        .map(|range| {
            Vacation::new(employee_id, range, kind).with_notes(notes.map(str::to_string))
        })
        .collect()
}

/// Unsaved rows for a full-set replacement from a per-day kind selection.
pub fn rows_from_kinded_days(
    employee_id: EmployeeId,
    days: &BTreeMap<NaiveDate, VacationKind>,
) -> Vec<Vacation> {
    normalize_by_kind(days)
        .into_iter()
        .map(|(range, kind)| Vacation::new(employee_id, range, kind))
        .collect()
}
