//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Keep SQL inside the persistence boundary; the engine never sees a
//!   connection.
//! - Run every multi-row vacation rewrite in one transaction.
//!
//! # Invariants
//! - Repositories are constructed only over migrated connections
//!   (`try_new` verifies schema version, tables and columns).
//! - Rows read back are re-validated; bad persisted data is reported as
//!   `RepoError::InvalidData`, never masked.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::vacation::TeamId;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod directory_repo;
pub mod vacation_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Referenced row does not exist.
    NotFound { entity: &'static str, id: i64 },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted or supplied data violates a model invariant.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "repository requires column `{column}` in table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid vacation data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Which employees a team-level query covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TeamScope {
    #[default]
    All,
    Team(TeamId),
}

impl TeamScope {
    pub(crate) fn team_id(self) -> Option<TeamId> {
        match self {
            Self::All => None,
            Self::Team(id) => Some(id),
        }
    }
}

/// Verifies schema version and the given `(table, columns)` layout.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    layout: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let actual_version = current_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in layout {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        let present = table_columns(conn, table)?;
        for &column in columns {
            if !present.iter().any(|name| name == column) {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
