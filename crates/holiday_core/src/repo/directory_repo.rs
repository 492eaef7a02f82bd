//! Team and employee persistence.
//!
//! # Invariants
//! - Listings are deterministic: teams by `name, id`; employees by
//!   `name, id`.
//! - Deletes rely on `ON DELETE CASCADE`; callers never clean up children.

use crate::model::directory::{Employee, EmployeeDraft, RosterEntry, Team};
use crate::model::vacation::{EmployeeId, TeamId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult, TeamScope};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TEAM_SELECT_SQL: &str = "SELECT id, name, description FROM teams";

const EMPLOYEE_SELECT_SQL: &str = "SELECT id, team_id, name, email, role FROM employees";

pub(crate) const DIRECTORY_LAYOUT: &[(&str, &[&str])] = &[
    ("teams", &["id", "name", "description"]),
    ("employees", &["id", "team_id", "name", "email", "role"]),
];

/// Repository interface for the team/employee directory.
pub trait DirectoryRepository {
    fn create_team(&self, name: &str, description: Option<&str>) -> RepoResult<Team>;
    fn update_team(&self, team: &Team) -> RepoResult<()>;
    /// Deletes the team with all of its employees and their vacations.
    fn delete_team(&self, id: TeamId) -> RepoResult<()>;
    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>>;
    fn list_teams(&self) -> RepoResult<Vec<Team>>;
    fn create_employee(&self, draft: &EmployeeDraft) -> RepoResult<Employee>;
    fn update_employee(&self, id: EmployeeId, draft: &EmployeeDraft) -> RepoResult<()>;
    /// Deletes the employee and all of its vacations.
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()>;
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn list_employees(&self, scope: TeamScope) -> RepoResult<Vec<Employee>>;
}

/// SQLite-backed directory repository.
pub struct SqliteDirectoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDirectoryRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, DIRECTORY_LAYOUT)?;
        Ok(Self { conn })
    }
}

impl DirectoryRepository for SqliteDirectoryRepository<'_> {
    fn create_team(&self, name: &str, description: Option<&str>) -> RepoResult<Team> {
        self.conn.execute(
            "INSERT INTO teams (name, description) VALUES (?1, ?2);",
            params![name, description],
        )?;
        Ok(Team {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            description: description.map(str::to_string),
        })
    }

    fn update_team(&self, team: &Team) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE teams SET name = ?1, description = ?2 WHERE id = ?3;",
            params![team.name, team.description, team.id],
        )?;
        ensure_changed(changed, "team", team.id)
    }

    fn delete_team(&self, id: TeamId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM teams WHERE id = ?1;", [id])?;
        ensure_changed(changed, "team", id)
    }

    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let team = self
            .conn
            .query_row(
                &format!("{TEAM_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_team_row,
            )
            .optional()?;
        Ok(team)
    }

    fn list_teams(&self) -> RepoResult<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEAM_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let teams = stmt
            .query_map([], parse_team_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    fn create_employee(&self, draft: &EmployeeDraft) -> RepoResult<Employee> {
        self.conn.execute(
            "INSERT INTO employees (team_id, name, email, role) VALUES (?1, ?2, ?3, ?4);",
            params![draft.team_id, draft.name, draft.email, draft.role],
        )?;
        Ok(Employee {
            id: self.conn.last_insert_rowid(),
            team_id: draft.team_id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            role: draft.role.clone(),
        })
    }

    fn update_employee(&self, id: EmployeeId, draft: &EmployeeDraft) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE employees
             SET team_id = ?1, name = ?2, email = ?3, role = ?4
             WHERE id = ?5;",
            params![draft.team_id, draft.name, draft.email, draft.role, id],
        )?;
        ensure_changed(changed, "employee", id)
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE id = ?1;", [id])?;
        ensure_changed(changed, "employee", id)
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let employee = self
            .conn
            .query_row(
                &format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_employee_row,
            )
            .optional()?;
        Ok(employee)
    }

    fn list_employees(&self, scope: TeamScope) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL}
             WHERE (?1 IS NULL OR team_id = ?1)
             ORDER BY name ASC, id ASC;"
        ))?;
        let employees = stmt
            .query_map([scope.team_id()], parse_employee_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(employees)
    }
}

/// Employees in `scope` joined with their team name, ordered by team then
/// employee name.
pub(crate) fn query_roster(conn: &Connection, scope: TeamScope) -> RepoResult<Vec<RosterEntry>> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.team_id, e.name, e.email, e.role, t.name AS team_name
         FROM employees e
         INNER JOIN teams t ON t.id = e.team_id
         WHERE (?1 IS NULL OR e.team_id = ?1)
         ORDER BY t.name ASC, e.name ASC, e.id ASC;",
    )?;
    let roster = stmt
        .query_map([scope.team_id()], |row| {
            Ok(RosterEntry {
                employee: parse_employee_row(row)?,
                team_name: row.get("team_name")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(roster)
}

/// Whether an employee row with `id` exists.
pub(crate) fn employee_exists(conn: &Connection, id: EmployeeId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_changed(changed: usize, entity: &'static str, id: i64) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}

fn parse_team_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
    })
}

fn parse_employee_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get("id")?,
        team_id: row.get("team_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        role: row.get("role")?,
    })
}
