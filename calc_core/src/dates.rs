//! # Date Difference & Age
//!
//! Calendar breakdown between two instants. Years and months are whole
//! calendar units; adding a month to the 31st clamps to the end of the
//! shorter month. Totals count whole units of elapsed time.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::history::HistoryEntryDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDifference {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub total_months: i64,
    pub total_weeks: i64,
    pub total_days: i64,
    pub total_hours: i64,
    pub total_minutes: i64,
    pub total_seconds: i64,
}

impl DateDifference {
    /// `3Y 2M 10D`
    pub fn summary(&self) -> String {
        format!("{}Y {}M {}D", self.years, self.months, self.days)
    }

    pub fn history_entry(&self, from: NaiveDate, to: NaiveDate) -> HistoryEntryDraft {
        HistoryEntryDraft::new(
            format!("Duration from {} to {}", long_date(from), long_date(to)),
            self.summary(),
        )
    }

    pub fn age_history_entry(&self, dob: NaiveDate) -> HistoryEntryDraft {
        HistoryEntryDraft::new(format!("Age for DOB: {}", long_date(dob)), self.summary())
    }
}

fn add_months(start: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    u32::try_from(months)
        .ok()
        .and_then(|m| start.checked_add_months(Months::new(m)))
}

/// Whole calendar months from `from` to `to` (`from <= to`).
fn whole_months(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let mut months = i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month());
    while months > 0 && add_months(from, months).is_none_or(|d| d > to) {
        months -= 1;
    }
    months.max(0)
}

/// Difference between two instants in either order.
pub fn date_difference(a: NaiveDateTime, b: NaiveDateTime) -> DateDifference {
    let (from, to) = if a > b { (b, a) } else { (a, b) };

    let total_months = whole_months(from, to);
    let years = total_months / 12;
    let months = total_months % 12;
    let anchor = add_months(from, total_months).unwrap_or(from);
    let days = (to - anchor).num_days();

    let elapsed = to - from;
    DateDifference {
        years,
        months,
        days,
        total_months,
        total_weeks: elapsed.num_weeks(),
        total_days: elapsed.num_days(),
        total_hours: elapsed.num_hours(),
        total_minutes: elapsed.num_minutes(),
        total_seconds: elapsed.num_seconds(),
    }
}

/// Age at `now` for someone born at `dob`.
pub fn age(dob: NaiveDateTime, now: NaiveDateTime) -> CalcResult<DateDifference> {
    if dob > now {
        return Err(CalcError::invalid_input(
            "date_of_birth",
            dob.date().to_string(),
            "Date of birth cannot be in the future",
        ));
    }
    Ok(date_difference(dob, now))
}

/// Parse `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM[:SS]`.
pub fn parse_date_time(input: &str) -> CalcResult<NaiveDateTime> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| CalcError::invalid_input("date", input, "Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM"))
}

/// `January 1st, 2020`
pub fn long_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", date.format("%B"), day, suffix, date.year())
}
