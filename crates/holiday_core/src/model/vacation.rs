//! Vacation range model.
//!
//! # Responsibility
//! - Provide the closed calendar-day interval (`DateRange`) used everywhere.
//! - Define the persisted vacation row and its wire request shapes.
//!
//! # Invariants
//! - `DateRange::start() <= DateRange::end()`, enforced at construction and
//!   again on deserialization.
//! - Dates are naive calendar days; no timezone is ever attached.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Row id of a persisted vacation.
pub type VacationId = i64;

/// Row id of an employee.
pub type EmployeeId = i64;

/// Row id of a team.
pub type TeamId = i64;

/// Validation failures for ranges and calendar periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// `start` is after `end`.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// Month/quarter/year does not name a real calendar period.
    InvalidPeriod(String),
}

impl Display for RangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange { start, end } => {
                write!(f, "invalid range: start {start} is after end {end}")
            }
            Self::InvalidPeriod(details) => write!(f, "invalid calendar period: {details}"),
        }
    }
}

impl Error for RangeError {}

/// Closed, inclusive interval of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    #[serde(rename = "start_date")]
    start: NaiveDate,
    #[serde(rename = "end_date")]
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = RangeError;

    fn try_from(value: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(value.start_date, value.end_date)
    }
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// One-day range `[day, day]`.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Closed-interval overlap: `s1 <= e2 && s2 <= e1`. Symmetric.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns true when `other` begins the day after `self` ends, or the
    /// reverse.
    pub fn is_adjacent_to(&self, other: &DateRange) -> bool {
        self.end.succ_opt() == Some(other.start) || other.end.succ_opt() == Some(self.start)
    }

    /// Clips this range to `window`; `None` when they do not intersect.
    pub fn intersection(&self, window: &DateRange) -> Option<DateRange> {
        let start = self.start.max(window.start);
        let end = self.end.min(window.end);
        (start <= end).then_some(DateRange { start, end })
    }

    /// Smallest range covering both `self` and `other`.
    pub fn hull(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Number of calendar days covered, always >= 1.
    pub fn len_days(&self) -> usize {
        let span = self.end.signed_duration_since(self.start).num_days();
        usize::try_from(span).map_or(1, |days| days + 1)
    }

    /// Number of covered days that fall on Monday..Friday.
    pub fn weekday_count(&self) -> usize {
        self.days().filter(|day| !is_weekend(*day)).count()
    }

    /// Iterates every day in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Saturday or Sunday.
pub fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Category of an absence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VacationKind {
    #[default]
    Vacation,
    Sick,
    Personal,
    Other,
}

impl VacationKind {
    /// Storage/wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vacation => "vacation",
            Self::Sick => "sick",
            Self::Personal => "personal",
            Self::Other => "other",
        }
    }

    /// Parses the storage/wire spelling (case-insensitive, trimmed).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vacation" => Some(Self::Vacation),
            "sick" => Some(Self::Sick),
            "personal" => Some(Self::Personal),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl Display for VacationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One vacation row: a typed range owned by a single employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacation {
    /// `None` until the row has been persisted.
    pub id: Option<VacationId>,
    pub employee_id: EmployeeId,
    #[serde(flatten)]
    pub range: DateRange,
    #[serde(rename = "type", default)]
    pub kind: VacationKind,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Vacation {
    /// Creates an unsaved vacation row.
    pub fn new(employee_id: EmployeeId, range: DateRange, kind: VacationKind) -> Self {
        Self {
            id: None,
            employee_id,
            range,
            kind,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Same row metadata on a different range; the copy is unsaved.
    pub fn with_range(&self, range: DateRange) -> Self {
        Self {
            id: None,
            employee_id: self.employee_id,
            range,
            kind: self.kind,
            notes: self.notes.clone(),
        }
    }

    /// Whether two rows carry identical kind and notes, i.e. only their dates
    /// could tell them apart.
    pub fn same_label(&self, other: &Vacation) -> bool {
        self.kind == other.kind && self.notes == other.notes
    }
}

/// Single-day toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
}

/// Create-range request.
///
/// Dates are kept raw here so that an inverted range surfaces as a
/// `RangeError::InvalidRange` from the service instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type", default)]
    pub kind: VacationKind,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RangeRequest {
    /// Validates the dates and builds an unsaved row.
    pub fn to_vacation(&self) -> Result<Vacation, RangeError> {
        let range = DateRange::new(self.start_date, self.end_date)?;
        Ok(Vacation::new(self.employee_id, range, self.kind).with_notes(self.notes.clone()))
    }
}

/// In-place edit of a persisted range; the owner never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeEdit {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type", default)]
    pub kind: VacationKind,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RangeEdit {
    /// Applies the edit to `current`, keeping its id and owner.
    pub fn apply_to(&self, current: &Vacation) -> Result<Vacation, RangeError> {
        let range = DateRange::new(self.start_date, self.end_date)?;
        Ok(Vacation {
            id: current.id,
            employee_id: current.employee_id,
            range,
            kind: self.kind,
            notes: self.notes.clone(),
        })
    }
}
