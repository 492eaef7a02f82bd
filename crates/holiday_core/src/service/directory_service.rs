//! Team and employee use-case service.
//!
//! # Responsibility
//! - Normalize and validate directory input before it reaches storage.
//! - Check parent team existence so callers get semantic errors instead of
//!   foreign-key failures.
//!
//! # Invariants
//! - Names are trimmed and never blank.
//! - Blank optional text (description, email, role) is stored as `None`.
//! - Emails, when present, match a basic `local@domain.tld` shape.

use crate::model::directory::{Employee, EmployeeDraft, Team};
use crate::model::vacation::{EmployeeId, TeamId};
use crate::repo::directory_repo::DirectoryRepository;
use crate::repo::{RepoError, TeamScope};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Errors from directory use-cases.
#[derive(Debug)]
pub enum DirectoryServiceError {
    /// Team or employee name is blank after trim.
    InvalidName,
    /// Email does not look like an address.
    InvalidEmail(String),
    TeamNotFound(TeamId),
    EmployeeNotFound(EmployeeId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for DirectoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email: `{value}`"),
            Self::TeamNotFound(id) => write!(f, "team not found: {id}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DirectoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DirectoryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "team",
                id,
            } => Self::TeamNotFound(id),
            RepoError::NotFound {
                entity: "employee",
                id,
            } => Self::EmployeeNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Directory service facade.
pub struct DirectoryService<R: DirectoryRepository> {
    repo: R,
}

impl<R: DirectoryRepository> DirectoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_team(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Team, DirectoryServiceError> {
        let name = normalize_name(name)?;
        let description = normalize_optional(description);
        let team = self.repo.create_team(&name, description.as_deref())?;
        info!(
            "event=team_create module=service status=ok team_id={}",
            team.id
        );
        Ok(team)
    }

    /// Renames a team and replaces its description.
    pub fn update_team(
        &self,
        id: TeamId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Team, DirectoryServiceError> {
        let team = Team {
            id,
            name: normalize_name(name)?,
            description: normalize_optional(description),
        };
        self.repo.update_team(&team)?;
        Ok(team)
    }

    /// Deletes a team together with its employees and their vacations.
    pub fn delete_team(&self, id: TeamId) -> Result<(), DirectoryServiceError> {
        self.repo.delete_team(id)?;
        info!("event=team_delete module=service status=ok team_id={id}");
        Ok(())
    }

    pub fn get_team(&self, id: TeamId) -> Result<Team, DirectoryServiceError> {
        self.repo
            .get_team(id)?
            .ok_or(DirectoryServiceError::TeamNotFound(id))
    }

    pub fn list_teams(&self) -> Result<Vec<Team>, DirectoryServiceError> {
        Ok(self.repo.list_teams()?)
    }

    pub fn create_employee(
        &self,
        draft: &EmployeeDraft,
    ) -> Result<Employee, DirectoryServiceError> {
        let draft = self.normalize_draft(draft)?;
        let employee = self.repo.create_employee(&draft)?;
        info!(
            "event=employee_create module=service status=ok employee_id={} team_id={}",
            employee.id, employee.team_id
        );
        Ok(employee)
    }

    /// Replaces an employee's editable fields, possibly moving it to another
    /// team. Its vacations follow it.
    pub fn update_employee(
        &self,
        id: EmployeeId,
        draft: &EmployeeDraft,
    ) -> Result<Employee, DirectoryServiceError> {
        let draft = self.normalize_draft(draft)?;
        self.repo.update_employee(id, &draft)?;
        Ok(Employee {
            id,
            team_id: draft.team_id,
            name: draft.name,
            email: draft.email,
            role: draft.role,
        })
    }

    /// Deletes an employee together with its vacations.
    pub fn delete_employee(&self, id: EmployeeId) -> Result<(), DirectoryServiceError> {
        self.repo.delete_employee(id)?;
        info!("event=employee_delete module=service status=ok employee_id={id}");
        Ok(())
    }

    pub fn get_employee(&self, id: EmployeeId) -> Result<Employee, DirectoryServiceError> {
        self.repo
            .get_employee(id)?
            .ok_or(DirectoryServiceError::EmployeeNotFound(id))
    }

    pub fn list_employees(&self, scope: TeamScope) -> Result<Vec<Employee>, DirectoryServiceError> {
        if let TeamScope::Team(team_id) = scope {
            self.get_team(team_id)?;
        }
        Ok(self.repo.list_employees(scope)?)
    }

    fn normalize_draft(&self, draft: &EmployeeDraft) -> Result<EmployeeDraft, DirectoryServiceError> {
        self.get_team(draft.team_id)?;
        let email = normalize_optional(draft.email.as_deref());
        if let Some(value) = email.as_deref() {
            if !EMAIL_RE.is_match(value) {
                return Err(DirectoryServiceError::InvalidEmail(value.to_string()));
            }
        }
        Ok(EmployeeDraft {
            team_id: draft.team_id,
            name: normalize_name(&draft.name)?,
            email,
            role: normalize_optional(draft.role.as_deref()),
        })
    }
}

fn normalize_name(value: &str) -> Result<String, DirectoryServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DirectoryServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
