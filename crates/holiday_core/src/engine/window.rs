//! Calendar period windows (month, quarter, year).

use crate::model::vacation::{DateRange, RangeError};
use chrono::{Datelike, NaiveDate};

/// First to last day of `month` (1-12) in `year`.
pub fn month_window(year: i32, month: u32) -> Result<DateRange, RangeError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| RangeError::InvalidPeriod(format!("month {year}-{month}")))?;
    let last = last_day_of_month(first)
        .ok_or_else(|| RangeError::InvalidPeriod(format!("month {year}-{month}")))?;
    DateRange::new(first, last)
}

/// Calendar quarter `quarter` (1-4) of `year`.
pub fn quarter_window(year: i32, quarter: u32) -> Result<DateRange, RangeError> {
    if !(1..=4).contains(&quarter) {
        return Err(RangeError::InvalidPeriod(format!("quarter {year}-Q{quarter}")));
    }
    let first_month = (quarter - 1) * 3 + 1;
    let start = month_window(year, first_month)?;
    let end = month_window(year, first_month + 2)?;
    Ok(start.hull(&end))
}

/// January 1st to December 31st of `year`.
pub fn year_window(year: i32) -> Result<DateRange, RangeError> {
    let invalid = || RangeError::InvalidPeriod(format!("year {year}"));
    let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
    DateRange::new(first, last)
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = match first.month() {
        12 => (first.year().checked_add(1)?, 1),
        month => (first.year(), month + 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}
