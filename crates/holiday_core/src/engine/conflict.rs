//! Overlap detection between a candidate range and existing rows.
//!
//! # Invariants
//! - Only rows owned by the requested employee are considered.
//! - The row matching `exclude_id` is never returned.
//! - Results keep input order.

use crate::model::vacation::{DateRange, EmployeeId, Vacation, VacationId};

/// Returns every row of `employee_id` whose range intersects `candidate`.
///
/// `exclude_id` skips the row being edited in place, so an edit is checked
/// against all *other* rows only.
pub fn conflicts<'a>(
    employee_id: EmployeeId,
    candidate: &DateRange,
    existing: &'a [Vacation],
    exclude_id: Option<VacationId>,
) -> Vec<&'a Vacation> {
    existing
        .iter()
        .filter(|row| row.employee_id == employee_id)
        .filter(|row| exclude_id.is_none() || row.id != exclude_id)
        .filter(|row| row.range.overlaps(candidate))
        .collect()
}

/// Short-circuiting form of [`conflicts`].
pub fn has_conflict(
    employee_id: EmployeeId,
    candidate: &DateRange,
    existing: &[Vacation],
    exclude_id: Option<VacationId>,
) -> bool {
    existing.iter().any(|row| {
        row.employee_id == employee_id
            && (exclude_id.is_none() || row.id != exclude_id)
            && row.range.overlaps(candidate)
    })
}
