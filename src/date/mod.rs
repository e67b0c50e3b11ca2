//! Date utilities shared by the serializer, the urgency scorer and the
//! query language.
//!
//! All task dates are plain calendar dates ([`chrono::NaiveDate`]); the
//! "current time" is always injected by the caller, never read from the
//! system clock, so every computation in the crate is reproducible.

use std::cmp::Ordering;
use std::sync::OnceLock;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use regex::Regex;

/// The serialization format for all task dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Comparison
// ============================================================================

/// Compare two optional dates for sorting.
///
/// A task with a date sorts before a task without one, so actionable work
/// surfaces first. Both absent compares equal.
pub fn compare_by_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Format an optional date with [`DATE_FORMAT`], empty string when absent.
pub fn format_optional(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

// ============================================================================
// Relative Date Expressions
// ============================================================================

/// A calendar period used by `in current week/month/year` filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Inclusive first and last day of the period containing `today`.
    /// Weeks are ISO 8601 weeks (Monday to Sunday).
    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Week => {
                let back = today.weekday().num_days_from_monday() as u64;
                let start = today - Days::new(back);
                (start, start + Days::new(6))
            }
            Self::Month => {
                let start = today.with_day(1).expect("day 1 exists in every month");
                let end = (start + Months::new(1)) - Days::new(1);
                (start, end)
            }
            Self::Year => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("jan 1 exists");
                let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).expect("dec 31 exists");
                (start, end)
            }
        }
    }

    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        let (start, end) = self.bounds(today);
        date >= start && date <= end
    }
}

fn offset_expr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:in (\d+) (day|week|month|year)s?|(\d+) (day|week|month|year)s? ago)$")
            .expect("offset expression pattern is valid")
    })
}

/// Parse a date expression used in query filters.
///
/// Accepted forms:
/// - ISO dates: `2024-01-15`
/// - `today`, `tomorrow`, `yesterday`
/// - weekday names (`monday` .. `sunday`, or `mon` .. `sun`): the next such
///   day on or after `today`
/// - `next week` / `last week`, `next month` / `last month`,
///   `next year` / `last year`
/// - `in N days/weeks/months/years` and `N days/weeks/months/years ago`
///
/// Returns `None` for anything else; the caller decides whether that is a
/// query error.
pub fn parse_date_expr(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim().to_lowercase();

    if let Ok(date) = NaiveDate::parse_from_str(&text, DATE_FORMAT) {
        return Some(date);
    }

    match text.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Days::new(1)),
        "yesterday" => return Some(today - Days::new(1)),
        "next week" => return Some(today + Days::new(7)),
        "last week" => return Some(today - Days::new(7)),
        "next month" => return today.checked_add_months(Months::new(1)),
        "last month" => return today.checked_sub_months(Months::new(1)),
        "next year" => return today.checked_add_months(Months::new(12)),
        "last year" => return today.checked_sub_months(Months::new(12)),
        _ => {}
    }

    if let Ok(weekday) = text.parse::<Weekday>() {
        let ahead = (weekday.num_days_from_monday() + 7
            - today.weekday().num_days_from_monday())
            % 7;
        return Some(today + Days::new(ahead as u64));
    }

    if let Some(caps) = offset_expr_regex().captures(&text) {
        let (amount, unit, forward) = if let Some(m) = caps.get(1) {
            (m.as_str(), caps.get(2)?.as_str(), true)
        } else {
            (caps.get(3)?.as_str(), caps.get(4)?.as_str(), false)
        };
        let amount: u32 = amount.parse().ok()?;
        return shift(today, amount, unit, forward);
    }

    None
}

fn shift(from: NaiveDate, amount: u32, unit: &str, forward: bool) -> Option<NaiveDate> {
    match (unit, forward) {
        ("day", true) => from.checked_add_days(Days::new(amount as u64)),
        ("day", false) => from.checked_sub_days(Days::new(amount as u64)),
        ("week", true) => from.checked_add_days(Days::new(amount as u64 * 7)),
        ("week", false) => from.checked_sub_days(Days::new(amount as u64 * 7)),
        ("month", true) => from.checked_add_months(Months::new(amount)),
        ("month", false) => from.checked_sub_months(Months::new(amount)),
        ("year", true) => from.checked_add_months(Months::new(amount * 12)),
        ("year", false) => from.checked_sub_months(Months::new(amount * 12)),
        _ => None,
    }
}
