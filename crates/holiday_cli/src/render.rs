//! Plain-text rendering for core types.

use holiday_core::{
    DateRange, Employee, EmployeeCalendar, Team, ToggleAction, Vacation, VacationKind,
};

/// One-line terminal rendering.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Team {
    fn render(&self) -> String {
        match self.description.as_deref() {
            Some(description) => format!("#{} {} ({description})", self.id, self.name),
            None => format!("#{} {}", self.id, self.name),
        }
    }
}

impl Render for Employee {
    fn render(&self) -> String {
        let mut line = format!("#{} {} team={}", self.id, self.name, self.team_id);
        if let Some(email) = self.email.as_deref() {
            line.push_str(&format!(" <{email}>"));
        }
        if let Some(role) = self.role.as_deref() {
            line.push_str(&format!(" [{role}]"));
        }
        line
    }
}

impl Render for Vacation {
    fn render(&self) -> String {
        let id = self
            .id
            .map_or_else(|| "-".to_string(), |id| format!("#{id}"));
        let mut line = format!(
            "{id} {} {} ({} days)",
            self.range,
            self.kind,
            self.range.len_days()
        );
        if let Some(notes) = self.notes.as_deref() {
            line.push_str(&format!(" {notes}"));
        }
        line
    }
}

impl Render for ToggleAction {
    fn render(&self) -> String {
        match self {
            ToggleAction::Added => "added".to_string(),
            ToggleAction::Removed => "removed".to_string(),
        }
    }
}

fn kind_symbol(kind: VacationKind) -> char {
    match kind {
        VacationKind::Vacation => 'V',
        VacationKind::Sick => 'S',
        VacationKind::Personal => 'P',
        VacationKind::Other => 'O',
    }
}

/// Day grid: one row per employee, one column per day of `window`.
pub fn calendar_grid(calendar: &[EmployeeCalendar], window: &DateRange) -> String {
    let name_width = calendar
        .iter()
        .map(|row| row.entry.employee.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("employee".len());

    let mut out = format!("{window}\n");
    if calendar.is_empty() {
        out.push_str("(no employees)\n");
        return out;
    }

    for row in calendar {
        let cells: String = window
            .days()
            .map(|day| {
                row.days
                    .get(&day)
                    .map_or('.', |mark| kind_symbol(mark.kind))
            })
            .collect();
        out.push_str(&format!(
            "{:<name_width$} {cells} {:>3}  {}\n",
            row.entry.employee.name, row.total_days, row.entry.team_name
        ));
    }
    out
}
