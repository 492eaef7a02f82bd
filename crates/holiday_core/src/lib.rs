//! Core domain logic for team vacation planning.
//! This crate is the single source of truth for vacation range invariants.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, LoggingConfig, ToggleConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use engine::conflict::{conflicts, has_conflict};
pub use engine::normalize::{expand, normalize, normalize_by_kind};
pub use engine::projector::{
    project, project_calendar, total_days, DayMark, DayStatus, EmployeeCalendar,
};
pub use engine::range_set::{
    absorb_touching, split_around, toggle, RangeChanges, RangeSet, ToggleAction, ToggleOutcome,
};
pub use engine::window::{month_window, quarter_window, year_window};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::directory::{Employee, EmployeeDraft, RosterEntry, Team};
pub use model::vacation::{
    is_weekend, DateRange, EmployeeId, RangeEdit, RangeError, RangeRequest, TeamId,
    ToggleRequest, Vacation, VacationId, VacationKind,
};
pub use repo::directory_repo::{DirectoryRepository, SqliteDirectoryRepository};
pub use repo::vacation_repo::{SqliteVacationRepository, VacationRepository};
pub use repo::{RepoError, RepoResult, TeamScope};
pub use service::directory_service::{DirectoryService, DirectoryServiceError};
pub use service::vacation_service::{
    VacationService, VacationServiceError, VacationServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
