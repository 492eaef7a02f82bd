//! Vacation range persistence.
//!
//! # Responsibility
//! - Load an employee's rows for the engine and write engine results back.
//! - Serve window queries for calendar projections.
//!
//! # Invariants
//! - `apply_changes` and `replace_ranges` run in one IMMEDIATE transaction;
//!   on any failure the previous rows stay untouched.
//! - Per-employee loads are ordered by `start_date, id`.
//! - The store does not check overlaps; that is the engine's job, done by
//!   the service before any write.

use crate::engine::range_set::RangeChanges;
use crate::model::directory::RosterEntry;
use crate::model::vacation::{
    DateRange, EmployeeId, Vacation, VacationId, VacationKind,
};
use crate::repo::directory_repo::{employee_exists, query_roster, DIRECTORY_LAYOUT};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult, TeamScope};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row, TransactionBehavior};

const VACATION_SELECT_SQL: &str = "SELECT
    v.id,
    v.employee_id,
    v.start_date,
    v.end_date,
    v.type,
    v.notes
FROM vacations v";

const VACATION_LAYOUT: &[(&str, &[&str])] = &[(
    "vacations",
    &["id", "employee_id", "start_date", "end_date", "type", "notes"],
)];

/// Repository interface for vacation rows.
pub trait VacationRepository {
    /// Inserts one row and returns it with its new id.
    fn create_vacation(&self, vacation: &Vacation) -> RepoResult<Vacation>;
    /// Overwrites dates, kind and notes of a persisted row.
    fn update_vacation(&self, vacation: &Vacation) -> RepoResult<()>;
    fn delete_vacation(&self, id: VacationId) -> RepoResult<()>;
    fn get_vacation(&self, id: VacationId) -> RepoResult<Option<Vacation>>;
    /// All rows of one employee.
    fn load_ranges(&self, employee_id: EmployeeId) -> RepoResult<Vec<Vacation>>;
    /// Rows in `scope` that intersect `window` (unclipped).
    fn load_ranges_in_window(
        &self,
        scope: TeamScope,
        window: &DateRange,
    ) -> RepoResult<Vec<Vacation>>;
    /// Employees in `scope` with their team names.
    fn roster(&self, scope: TeamScope) -> RepoResult<Vec<RosterEntry>>;
    fn employee_exists(&self, employee_id: EmployeeId) -> RepoResult<bool>;
    fn is_on_vacation(&self, employee_id: EmployeeId, day: NaiveDate) -> RepoResult<bool>;
    /// Deletes and inserts rows of one employee atomically. Returns the
    /// inserted rows with ids, in `changes.insert` order.
    fn apply_changes(
        &mut self,
        employee_id: EmployeeId,
        changes: &RangeChanges,
    ) -> RepoResult<Vec<Vacation>>;
    /// Replaces every row of one employee atomically.
    fn replace_ranges(
        &mut self,
        employee_id: EmployeeId,
        ranges: &[Vacation],
    ) -> RepoResult<Vec<Vacation>>;
}

/// SQLite-backed vacation repository.
pub struct SqliteVacationRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteVacationRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, DIRECTORY_LAYOUT)?;
        ensure_connection_ready(conn, VACATION_LAYOUT)?;
        Ok(Self { conn })
    }
}

impl VacationRepository for SqliteVacationRepository<'_> {
    fn create_vacation(&self, vacation: &Vacation) -> RepoResult<Vacation> {
        insert_vacation(self.conn, vacation.employee_id, vacation)
    }

    fn update_vacation(&self, vacation: &Vacation) -> RepoResult<()> {
        let id = vacation.id.ok_or_else(|| {
            RepoError::InvalidData("cannot update a vacation without id".to_string())
        })?;
        let changed = self.conn.execute(
            "UPDATE vacations
             SET start_date = ?1, end_date = ?2, type = ?3, notes = ?4
             WHERE id = ?5 AND employee_id = ?6;",
            params![
                vacation.range.start(),
                vacation.range.end(),
                vacation.kind.as_str(),
                vacation.notes.as_deref(),
                id,
                vacation.employee_id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "vacation",
                id,
            });
        }
        Ok(())
    }

    fn delete_vacation(&self, id: VacationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM vacations WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "vacation",
                id,
            });
        }
        Ok(())
    }

    fn get_vacation(&self, id: VacationId) -> RepoResult<Option<Vacation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VACATION_SELECT_SQL} WHERE v.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_vacation_row(row)?));
        }
        Ok(None)
    }

    fn load_ranges(&self, employee_id: EmployeeId) -> RepoResult<Vec<Vacation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{VACATION_SELECT_SQL}
             WHERE v.employee_id = ?1
             ORDER BY v.start_date ASC, v.id ASC;"
        ))?;
        let vacations = collect_vacations(stmt.query([employee_id])?)?;
        Ok(vacations)
    }

    fn load_ranges_in_window(
        &self,
        scope: TeamScope,
        window: &DateRange,
    ) -> RepoResult<Vec<Vacation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{VACATION_SELECT_SQL}
             INNER JOIN employees e ON e.id = v.employee_id
             WHERE (?1 IS NULL OR e.team_id = ?1)
               AND v.start_date <= ?3
               AND v.end_date >= ?2
             ORDER BY v.employee_id ASC, v.start_date ASC, v.id ASC;"
        ))?;
        let vacations = collect_vacations(stmt.query(params![
            scope.team_id(),
            window.start(),
            window.end()
        ])?)?;
        Ok(vacations)
    }

    fn roster(&self, scope: TeamScope) -> RepoResult<Vec<RosterEntry>> {
        query_roster(self.conn, scope)
    }

    fn employee_exists(&self, employee_id: EmployeeId) -> RepoResult<bool> {
        employee_exists(self.conn, employee_id)
    }

    fn is_on_vacation(&self, employee_id: EmployeeId, day: NaiveDate) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM vacations
                WHERE employee_id = ?1
                  AND start_date <= ?2
                  AND end_date >= ?2
            );",
            params![employee_id, day],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn apply_changes(
        &mut self,
        employee_id: EmployeeId,
        changes: &RangeChanges,
    ) -> RepoResult<Vec<Vacation>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !employee_exists(&tx, employee_id)? {
            return Err(RepoError::NotFound {
                entity: "employee",
                id: employee_id,
            });
        }

        for id in &changes.delete {
            let changed = tx.execute(
                "DELETE FROM vacations WHERE id = ?1 AND employee_id = ?2;",
                params![id, employee_id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: "vacation",
                    id: *id,
                });
            }
        }

        let inserted = changes
            .insert
            .iter()
            .map(|row| insert_vacation(&tx, employee_id, row))
            .collect::<RepoResult<Vec<_>>>()?;

        tx.commit()?;
        Ok(inserted)
    }

    fn replace_ranges(
        &mut self,
        employee_id: EmployeeId,
        ranges: &[Vacation],
    ) -> RepoResult<Vec<Vacation>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !employee_exists(&tx, employee_id)? {
            return Err(RepoError::NotFound {
                entity: "employee",
                id: employee_id,
            });
        }

        tx.execute(
            "DELETE FROM vacations WHERE employee_id = ?1;",
            [employee_id],
        )?;
        let inserted = ranges
            .iter()
            .map(|row| insert_vacation(&tx, employee_id, row))
            .collect::<RepoResult<Vec<_>>>()?;

        tx.commit()?;
        Ok(inserted)
    }
}

fn insert_vacation(
    conn: &Connection,
    employee_id: EmployeeId,
    vacation: &Vacation,
) -> RepoResult<Vacation> {
    if vacation.employee_id != employee_id {
        return Err(RepoError::InvalidData(format!(
            "vacation for employee {} written under employee {employee_id}",
            vacation.employee_id
        )));
    }

    conn.execute(
        "INSERT INTO vacations (employee_id, start_date, end_date, type, notes)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            employee_id,
            vacation.range.start(),
            vacation.range.end(),
            vacation.kind.as_str(),
            vacation.notes.as_deref(),
        ],
    )?;

    Ok(Vacation {
        id: Some(conn.last_insert_rowid()),
        ..vacation.clone()
    })
}

fn collect_vacations(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Vacation>> {
    let mut vacations = Vec::new();
    while let Some(row) = rows.next()? {
        vacations.push(parse_vacation_row(row)?);
    }
    Ok(vacations)
}

fn parse_vacation_row(row: &Row<'_>) -> RepoResult<Vacation> {
    let id: VacationId = row.get("id")?;
    let start: NaiveDate = row.get("start_date")?;
    let end: NaiveDate = row.get("end_date")?;
    let range = DateRange::new(start, end)
        .map_err(|err| RepoError::InvalidData(format!("vacation {id}: {err}")))?;

    let type_text: String = row.get("type")?;
    let kind = VacationKind::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid vacation type `{type_text}` in vacations.type"
        ))
    })?;

    Ok(Vacation {
        id: Some(id),
        employee_id: row.get("employee_id")?,
        range,
        kind,
        notes: row.get("notes")?,
    })
}
