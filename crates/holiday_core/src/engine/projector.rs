//! Projection of stored ranges onto a calendar window.
//!
//! # Responsibility
//! - Expand ranges into the days visible in a window (clipping, never
//!   dropping, partially visible ranges).
//! - Build per-employee calendar rows for grid and export views.
//!
//! # Invariants
//! - Totals count distinct days, never summed range lengths.
//! - A day maps to at most one `DayMark` per employee; when malformed input
//!   overlaps, the row with the earliest range wins.

use crate::model::directory::RosterEntry;
use crate::model::vacation::{DateRange, Vacation, VacationId, VacationKind};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Per-day state of one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "type", rename_all = "snake_case")]
pub enum DayStatus {
    NotOnVacation,
    OnVacation(VacationKind),
}

/// Vacation day marker with the row it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayMark {
    #[serde(rename = "type")]
    pub kind: VacationKind,
    pub vacation_id: Option<VacationId>,
}

/// One employee's row in a calendar window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeCalendar {
    #[serde(flatten)]
    pub entry: RosterEntry,
    pub days: BTreeMap<NaiveDate, DayMark>,
    /// Unclipped rows intersecting the window, sorted by range.
    pub vacations: Vec<Vacation>,
    pub total_days: usize,
}

impl EmployeeCalendar {
    pub fn status_on(&self, day: NaiveDate) -> DayStatus {
        self.days
            .get(&day)
            .map_or(DayStatus::NotOnVacation, |mark| DayStatus::OnVacation(mark.kind))
    }
}

/// Days of `ranges` that fall inside `window`.
pub fn project(
    ranges: impl IntoIterator<Item = DateRange>,
    window: &DateRange,
) -> BTreeSet<NaiveDate> {
    ranges
        .into_iter()
        .filter_map(|range| range.intersection(window))
        .flat_map(|clipped| clipped.days())
        .collect()
}

/// Distinct vacation days inside `window`.
pub fn total_days(ranges: impl IntoIterator<Item = DateRange>, window: &DateRange) -> usize {
    project(ranges, window).len()
}

/// Builds one calendar row per roster entry, in roster order.
///
/// Vacations whose employee is not on the roster are ignored.
pub fn project_calendar(
    roster: &[RosterEntry],
    vacations: &[Vacation],
    window: &DateRange,
) -> Vec<EmployeeCalendar> {
    roster
        .iter()
        .map(|entry| {
            let mut owned: Vec<Vacation> = vacations
                .iter()
                .filter(|row| row.employee_id == entry.employee.id)
                .filter(|row| row.range.overlaps(window))
                .cloned()
                .collect();
            owned.sort_by_key(|row| row.range);

            let mut days = BTreeMap::new();
            for row in &owned {
                if let Some(clipped) = row.range.intersection(window) {
                    for day in clipped.days() {
                        days.entry(day).or_insert(DayMark {
                            kind: row.kind,
                            vacation_id: row.id,
                        });
                    }
                }
            }

            EmployeeCalendar {
                entry: entry.clone(),
                total_days: days.len(),
                days,
                vacations: owned,
            }
        })
        .collect()
}
