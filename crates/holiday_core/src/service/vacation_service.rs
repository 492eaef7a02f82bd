//! Vacation use-case service.
//!
//! # Responsibility
//! - Route every vacation mutation through the interval engine.
//! - Load rows explicitly by id, hand them to pure engine functions, and
//!   persist the result in one repository call.
//!
//! # Invariants
//! - Overlap checks run before any write; a conflicting request writes
//!   nothing.
//! - Created and edited rows never touch a row of the same kind and notes;
//!   such neighbours are merged in the same transaction.
//! - Toggle and full-set replacement are applied atomically by the store.
//! - Log events carry ids, dates and counts only, never notes.

use crate::engine::conflict::conflicts;
use crate::engine::normalize::{rows_from_days, rows_from_kinded_days};
use crate::engine::projector::{project, project_calendar, total_days, EmployeeCalendar};
use crate::engine::range_set::{absorb_touching, toggle, RangeChanges, ToggleOutcome};
use crate::model::vacation::{
    is_weekend, DateRange, EmployeeId, RangeEdit, RangeError, RangeRequest, ToggleRequest, Vacation,
    VacationId, VacationKind,
};
use crate::repo::vacation_repo::VacationRepository;
use crate::repo::{RepoError, TeamScope};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type VacationServiceResult<T> = Result<T, VacationServiceError>;

/// Errors from vacation use-cases.
#[derive(Debug)]
pub enum VacationServiceError {
    /// Start date after end date, or an invalid calendar period.
    InvalidRange(RangeError),
    /// Candidate range overlaps existing rows of the same employee.
    Conflict {
        employee_id: EmployeeId,
        conflicts: Vec<Vacation>,
    },
    /// Referenced employee or vacation does not exist.
    NotFound { entity: &'static str, id: i64 },
    /// Store rejected the write; nothing was persisted, retrying is safe.
    PersistenceFailure(RepoError),
}

impl Display for VacationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange(err) => write!(f, "{err}"),
            Self::Conflict {
                employee_id,
                conflicts,
            } => {
                write!(
                    f,
                    "range overlaps {} existing vacation(s) of employee {employee_id}:",
                    conflicts.len()
                )?;
                for row in conflicts {
                    write!(f, " {}", row.range)?;
                }
                Ok(())
            }
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::PersistenceFailure(err) => write!(f, "persistence failure: {err}"),
        }
    }
}

impl Error for VacationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRange(err) => Some(err),
            Self::PersistenceFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RangeError> for VacationServiceError {
    fn from(value: RangeError) -> Self {
        Self::InvalidRange(value)
    }
}

impl From<RepoError> for VacationServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::PersistenceFailure(other),
        }
    }
}

/// Vacation service facade.
pub struct VacationService<R: VacationRepository> {
    repo: R,
    toggle_kind: VacationKind,
}

impl<R: VacationRepository> VacationService<R> {
    /// Creates a service; toggled-on days default to `VacationKind::Vacation`.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            toggle_kind: VacationKind::default(),
        }
    }

    /// Overrides the kind assigned to days added by `toggle_day`.
    pub fn with_toggle_kind(mut self, kind: VacationKind) -> Self {
        self.toggle_kind = kind;
        self
    }

    pub fn toggle_kind(&self) -> VacationKind {
        self.toggle_kind
    }

    /// Flips one day for one employee and persists the row replacement.
    pub fn toggle_day(
        &mut self,
        employee_id: EmployeeId,
        day: NaiveDate,
    ) -> VacationServiceResult<ToggleOutcome> {
        self.ensure_employee(employee_id)?;
        let existing = self.repo.load_ranges(employee_id)?;
        let mut outcome = toggle(employee_id, day, &existing, self.toggle_kind);

        let inserted = self
            .repo
            .apply_changes(employee_id, &outcome.changes)
            .inspect_err(|err| {
                warn!(
                    "event=vacation_toggle module=service status=error employee_id={employee_id} date={day} error={err}"
                );
            })?;

        outcome.ranges.retain(|row| row.id.is_some());
        outcome.ranges.extend(inserted.iter().cloned());
        outcome.ranges.sort_by_key(|row| row.range);
        outcome.changes.insert = inserted;

        info!(
            "event=vacation_toggle module=service status=ok employee_id={employee_id} date={day} action={:?} deleted={} inserted={}",
            outcome.action,
            outcome.changes.delete.len(),
            outcome.changes.insert.len()
        );
        Ok(outcome)
    }

    /// Wire-level form of [`Self::toggle_day`].
    pub fn apply_toggle(&mut self, request: &ToggleRequest) -> VacationServiceResult<ToggleOutcome> {
        self.toggle_day(request.employee_id, request.date)
    }

    /// Rows of the requested employee that a create request would overlap.
    pub fn check_conflicts(
        &self,
        request: &RangeRequest,
        exclude_id: Option<VacationId>,
    ) -> VacationServiceResult<Vec<Vacation>> {
        let candidate = request.to_vacation()?;
        self.ensure_employee(candidate.employee_id)?;
        let existing = self.repo.load_ranges(candidate.employee_id)?;
        Ok(conflicts(candidate.employee_id, &candidate.range, &existing, exclude_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Creates a range after validating dates and rejecting overlaps.
    ///
    /// A range touching rows of the same kind and notes is merged with them
    /// into one new row.
    pub fn create_range(&mut self, request: &RangeRequest) -> VacationServiceResult<Vacation> {
        let candidate = request.to_vacation()?;
        self.ensure_employee(candidate.employee_id)?;
        let existing = self.repo.load_ranges(candidate.employee_id)?;
        self.reject_conflicts(&candidate, &existing, None)?;

        let created = match absorb_touching(&candidate, &existing) {
            Some(changes) => self.store_merged(candidate.employee_id, &changes)?,
            None => self.repo.create_vacation(&candidate)?,
        };
        info!(
            "event=vacation_create module=service status=ok employee_id={} vacation_id={} start={} end={}",
            created.employee_id,
            created.id.unwrap_or_default(),
            created.range.start(),
            created.range.end()
        );
        Ok(created)
    }

    /// Edits a persisted range, checking it against the owner's other rows.
    ///
    /// The row keeps its id unless the edit makes it touch rows of the same
    /// kind and notes; then all of them are replaced by one new row.
    pub fn edit_range(
        &mut self,
        id: VacationId,
        edit: &RangeEdit,
    ) -> VacationServiceResult<Vacation> {
        let current = self.get_range(id)?;
        let updated = edit.apply_to(&current)?;
        let existing = self.repo.load_ranges(current.employee_id)?;
        self.reject_conflicts(&updated, &existing, Some(id))?;

        let stored = match absorb_touching(&updated, &existing) {
            Some(changes) => self.store_merged(current.employee_id, &changes)?,
            None => {
                self.repo.update_vacation(&updated)?;
                updated
            }
        };
        info!(
            "event=vacation_edit module=service status=ok employee_id={} vacation_id={id} stored_id={} start={} end={}",
            stored.employee_id,
            stored.id.unwrap_or_default(),
            stored.range.start(),
            stored.range.end()
        );
        Ok(stored)
    }

    pub fn delete_range(&self, id: VacationId) -> VacationServiceResult<()> {
        self.repo.delete_vacation(id)?;
        info!("event=vacation_delete module=service status=ok vacation_id={id}");
        Ok(())
    }

    pub fn get_range(&self, id: VacationId) -> VacationServiceResult<Vacation> {
        self.repo
            .get_vacation(id)?
            .ok_or(VacationServiceError::NotFound {
                entity: "vacation",
                id,
            })
    }

    /// All rows of one employee, ordered by start date.
    pub fn ranges(&self, employee_id: EmployeeId) -> VacationServiceResult<Vec<Vacation>> {
        self.ensure_employee(employee_id)?;
        Ok(self.repo.load_ranges(employee_id)?)
    }

    /// Replaces every row of an employee with the normalized form of `days`.
    ///
    /// All prior rows are deleted; incremental patching from an arbitrary
    /// day selection is not attempted.
    pub fn replace_days(
        &mut self,
        employee_id: EmployeeId,
        days: &BTreeSet<NaiveDate>,
        kind: VacationKind,
        notes: Option<&str>,
    ) -> VacationServiceResult<Vec<Vacation>> {
        let rows = rows_from_days(employee_id, days.iter().copied(), kind, notes);
        self.replace_rows(employee_id, rows, days.len())
    }

    /// Like [`Self::replace_days`] with a kind per selected day.
    pub fn replace_kinded_days(
        &mut self,
        employee_id: EmployeeId,
        days: &BTreeMap<NaiveDate, VacationKind>,
    ) -> VacationServiceResult<Vec<Vacation>> {
        let rows = rows_from_kinded_days(employee_id, days);
        self.replace_rows(employee_id, rows, days.len())
    }

    /// Calendar rows for every employee in `scope` over `window`.
    pub fn calendar(
        &self,
        scope: TeamScope,
        window: &DateRange,
    ) -> VacationServiceResult<Vec<EmployeeCalendar>> {
        let roster = self.repo.roster(scope)?;
        let vacations = self.repo.load_ranges_in_window(scope, window)?;
        Ok(project_calendar(&roster, &vacations, window))
    }

    /// Distinct vacation days of one employee inside `window`.
    pub fn vacation_days(
        &self,
        employee_id: EmployeeId,
        window: &DateRange,
    ) -> VacationServiceResult<usize> {
        let rows = self.ranges(employee_id)?;
        Ok(total_days(rows.iter().map(|row| row.range), window))
    }

    /// Like [`Self::vacation_days`], skipping Saturdays and Sundays.
    pub fn vacation_weekdays(
        &self,
        employee_id: EmployeeId,
        window: &DateRange,
    ) -> VacationServiceResult<usize> {
        let rows = self.ranges(employee_id)?;
        Ok(project(rows.iter().map(|row| row.range), window)
            .into_iter()
            .filter(|day| !is_weekend(*day))
            .count())
    }

    pub fn is_on_vacation(
        &self,
        employee_id: EmployeeId,
        day: NaiveDate,
    ) -> VacationServiceResult<bool> {
        self.ensure_employee(employee_id)?;
        Ok(self.repo.is_on_vacation(employee_id, day)?)
    }

    fn replace_rows(
        &mut self,
        employee_id: EmployeeId,
        rows: Vec<Vacation>,
        day_count: usize,
    ) -> VacationServiceResult<Vec<Vacation>> {
        self.ensure_employee(employee_id)?;
        let stored = self.repo.replace_ranges(employee_id, &rows)?;
        info!(
            "event=vacation_replace module=service status=ok employee_id={employee_id} days={day_count} ranges={}",
            stored.len()
        );
        Ok(stored)
    }

    fn reject_conflicts(
        &self,
        candidate: &Vacation,
        existing: &[Vacation],
        exclude_id: Option<VacationId>,
    ) -> VacationServiceResult<()> {
        let found: Vec<Vacation> =
            conflicts(candidate.employee_id, &candidate.range, existing, exclude_id)
                .into_iter()
                .cloned()
                .collect();
        if found.is_empty() {
            return Ok(());
        }
        info!(
            "event=vacation_write module=service status=conflict employee_id={} conflicts={}",
            candidate.employee_id,
            found.len()
        );
        Err(VacationServiceError::Conflict {
            employee_id: candidate.employee_id,
            conflicts: found,
        })
    }

    fn store_merged(
        &mut self,
        employee_id: EmployeeId,
        changes: &RangeChanges,
    ) -> VacationServiceResult<Vacation> {
        let merged = self.repo.apply_changes(employee_id, changes)?;
        merged.into_iter().next().ok_or_else(|| {
            VacationServiceError::PersistenceFailure(RepoError::InvalidData(
                "merge stored no row".to_string(),
            ))
        })
    }

    fn ensure_employee(&self, employee_id: EmployeeId) -> VacationServiceResult<()> {
        if !self.repo.employee_exists(employee_id)? {
            return Err(VacationServiceError::NotFound {
                entity: "employee",
                id: employee_id,
            });
        }
        Ok(())
    }
}
