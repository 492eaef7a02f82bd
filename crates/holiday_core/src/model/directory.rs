//! Team and employee records.
//!
//! # Invariants
//! - `Employee::team_id` always references an existing team row.
//! - Deleting a team removes its employees; deleting an employee removes its
//!   vacations (enforced by storage cascades).

use crate::model::vacation::{EmployeeId, TeamId};
use serde::{Deserialize, Serialize};

/// A named group of employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub description: Option<String>,
}

/// A person whose vacation days are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub team_id: TeamId,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Employee joined with its team's display name, as calendar views need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub employee: Employee,
    pub team_name: String,
}

/// Input for creating or replacing an employee's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub team_id: TeamId,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
}
