//! Recurrence rules and next-occurrence generation.
//!
//! A recurrence rule is written in plain text after the recurrence
//! signifier, e.g. `every week`, `every 3 days`, `every month on the 15th`,
//! `every week on Monday, Friday when done`. Parsing is deliberately
//! forgiving: text that cannot be understood yields "no recurrence" rather
//! than an error, since users may be mid-typing when a line is parsed.
//!
//! Two anchor policies exist:
//! - **fixed schedule** (default): the next occurrence is computed from the
//!   task's own reference date, so a weekly task due Monday stays on
//!   Mondays no matter when it is completed;
//! - **when done**: the next occurrence is computed from the completion
//!   date.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

// ============================================================================
// Occurrence
// ============================================================================

/// The set of dates on a single occurrence of a recurring task.
///
/// The reference date is the due date if given, otherwise the scheduled
/// date, otherwise the start date. All dates of the next occurrence keep
/// their relative distance to the reference date, so "starts one week
/// before it is due" is preserved across occurrences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Occurrence {
    pub start_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

impl Occurrence {
    #[must_use]
    pub fn new(
        start_date: Option<NaiveDate>,
        scheduled_date: Option<NaiveDate>,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            start_date,
            scheduled_date,
            due_date,
        }
    }

    /// The date future occurrences recur from, by decreasing importance:
    /// due, then scheduled, then start. `None` when no date is set.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.due_date.or(self.scheduled_date).or(self.start_date)
    }

    /// The dates of the occurrence anchored at `next_reference`, keeping
    /// each date's offset from the current reference date.
    ///
    /// An occurrence without any date produces an empty occurrence.
    #[must_use]
    pub fn next(&self, next_reference: NaiveDate) -> Occurrence {
        let Some(reference) = self.reference_date() else {
            return Occurrence::default();
        };

        let shifted = |date: Option<NaiveDate>| {
            date.map(|d| {
                let offset = d.signed_duration_since(reference).num_days();
                if offset >= 0 {
                    next_reference + Days::new(offset as u64)
                } else {
                    next_reference - Days::new((-offset) as u64)
                }
            })
        };

        Occurrence {
            start_date: shifted(self.start_date),
            scheduled_date: shifted(self.scheduled_date),
            due_date: shifted(self.due_date),
        }
    }
}

// ============================================================================
// Recurrence
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A parsed recurrence rule together with the dates of the occurrence it
/// applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    frequency: Frequency,
    interval: u32,
    /// Restricts daily/weekly rules to these weekdays (`every weekday`,
    /// `every week on Monday, Friday`). Kept sorted Monday-first.
    weekdays: Vec<Weekday>,
    /// Fixed day of month for monthly rules (`every month on the 15th`).
    /// Clamped to the length of shorter months.
    month_day: Option<u32>,
    /// `when done`: recur from the completion date instead of the
    /// task's own dates.
    base_on_today: bool,
    occurrence: Occurrence,
}

/// Upper bound on stepping iterations when searching for the next
/// occurrence date. Generous enough for intervals like `every 100 years`.
const MAX_STEPS: u32 = 1300;

impl Recurrence {
    /// Parse a rule from the text after the recurrence signifier.
    ///
    /// Returns `None` for text that is not a recognizable rule; the task
    /// then simply has no recurrence.
    pub fn from_text(rule_text: &str, occurrence: Occurrence) -> Option<Self> {
        let lower = rule_text.trim().to_lowercase();

        let (rule, base_on_today) = match lower.strip_suffix(" when done") {
            Some(rest) => (rest.trim(), true),
            None => (lower.as_str(), false),
        };

        let rest = rule.strip_prefix("every")?.trim();
        if rest.is_empty() {
            return None;
        }

        let mut words = rest.splitn(2, ' ');
        let first = words.next()?;
        let (interval, unit_and_tail) = match first.parse::<u32>() {
            Ok(n) if n >= 1 => (n, words.next()?.trim()),
            Ok(_) => return None,
            Err(_) => (1, rest),
        };

        let (unit, tail) = match unit_and_tail.split_once(' ') {
            Some((unit, tail)) => (unit, tail.trim()),
            None => (unit_and_tail, ""),
        };

        let mut weekdays = Vec::new();
        let mut month_day = None;

        let frequency = match unit {
            "day" | "days" => {
                if !tail.is_empty() {
                    return None;
                }
                Frequency::Daily
            }
            "weekday" | "weekdays" => {
                if !tail.is_empty() || interval != 1 {
                    return None;
                }
                weekdays = vec![
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                    Weekday::Fri,
                ];
                Frequency::Daily
            }
            "week" | "weeks" => {
                if let Some(day_list) = tail.strip_prefix("on ") {
                    weekdays = parse_weekday_list(day_list)?;
                } else if !tail.is_empty() {
                    return None;
                }
                Frequency::Weekly
            }
            "month" | "months" => {
                if let Some(day_text) = tail.strip_prefix("on the ") {
                    month_day = parse_ordinal_day(day_text)?;
                } else if !tail.is_empty() {
                    return None;
                }
                Frequency::Monthly
            }
            "year" | "years" => {
                if !tail.is_empty() {
                    return None;
                }
                Frequency::Yearly
            }
            _ => return None,
        };

        Some(Self {
            frequency,
            interval,
            weekdays,
            month_day,
            base_on_today,
            occurrence,
        })
    }

    pub fn occurrence(&self) -> &Occurrence {
        &self.occurrence
    }

    /// The same rule, re-anchored to a new set of dates. Used when a next
    /// occurrence is generated, so the new task's rule recurs from its own
    /// dates rather than its predecessor's.
    #[must_use]
    pub fn with_occurrence(&self, occurrence: Occurrence) -> Self {
        Self {
            occurrence,
            ..self.clone()
        }
    }

    pub fn base_on_today(&self) -> bool {
        self.base_on_today
    }

    /// Canonical text of the rule, suitable for re-serializing the task.
    /// Parsing the returned text yields an identical rule.
    pub fn to_text(&self) -> String {
        let mut text = String::from("every");

        let is_every_weekday = self.frequency == Frequency::Daily && !self.weekdays.is_empty();
        if is_every_weekday {
            text.push_str(" weekday");
        } else {
            let unit = match self.frequency {
                Frequency::Daily => "day",
                Frequency::Weekly => "week",
                Frequency::Monthly => "month",
                Frequency::Yearly => "year",
            };
            if self.interval == 1 {
                text.push(' ');
                text.push_str(unit);
            } else {
                text.push_str(&format!(" {} {}s", self.interval, unit));
            }

            if !self.weekdays.is_empty() {
                let names: Vec<&str> = self.weekdays.iter().map(|d| weekday_name(*d)).collect();
                text.push_str(" on ");
                text.push_str(&names.join(", "));
            }
            if let Some(day) = self.month_day {
                text.push_str(&format!(" on the {}{}", day, ordinal_suffix(day)));
            }
        }

        if self.base_on_today {
            text.push_str(" when done");
        }
        text
    }

    /// The dates of the next occurrence, or `None` if the rule cannot
    /// produce a future occurrence.
    ///
    /// `today` is the completion date; it anchors `when done` rules and is
    /// the fallback when the occurrence has no dates at all.
    pub fn next(&self, today: NaiveDate) -> Option<Occurrence> {
        let next_reference = self.next_reference_date(today)?;

        if self.occurrence.reference_date().is_none() {
            // No anchor date on the task: the rule still recurs, based on
            // today, and only produces a due date.
            return Some(Occurrence::new(None, None, Some(next_reference)));
        }

        Some(self.occurrence.next(next_reference))
    }

    fn next_reference_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        let anchor = if self.base_on_today {
            today
        } else {
            self.occurrence.reference_date().unwrap_or(today)
        };
        self.next_after(anchor, anchor)
    }

    /// First date strictly after `after` matching the rule anchored at
    /// `anchor`.
    fn next_after(&self, anchor: NaiveDate, after: NaiveDate) -> Option<NaiveDate> {
        match self.frequency {
            Frequency::Daily if self.weekdays.is_empty() => {
                Some(step_days(anchor, after, self.interval as i64))
            }
            Frequency::Daily => next_matching_weekday(after, &self.weekdays),
            Frequency::Weekly if self.weekdays.is_empty() => {
                Some(step_days(anchor, after, self.interval as i64 * 7))
            }
            Frequency::Weekly => self.next_weekly_on(anchor, after),
            Frequency::Monthly => self.step_months(anchor, after, self.interval),
            Frequency::Yearly => self.step_months(anchor, after, self.interval.checked_mul(12)?),
        }
    }

    /// Weekly rule with a weekday list: scan forward for a day in the set
    /// whose week is a whole number of intervals from the anchor's week.
    fn next_weekly_on(&self, anchor: NaiveDate, after: NaiveDate) -> Option<NaiveDate> {
        let anchor_week = week_start(anchor);
        let horizon = (self.interval as u64 + 1) * 7;
        let mut candidate = after + Days::new(1);
        for _ in 0..=horizon {
            if self.weekdays.contains(&candidate.weekday()) {
                let weeks = week_start(candidate)
                    .signed_duration_since(anchor_week)
                    .num_days()
                    / 7;
                if weeks.rem_euclid(self.interval as i64) == 0 {
                    return Some(candidate);
                }
            }
            candidate = candidate + Days::new(1);
        }
        None
    }

    /// Month-stepped rules. The day of month clamps to the target month's
    /// length, so `every month` from Jan 31 lands on the last day of
    /// February rather than skipping it.
    fn step_months(&self, anchor: NaiveDate, after: NaiveDate, months: u32) -> Option<NaiveDate> {
        let wanted_day = self.month_day.unwrap_or(anchor.day());
        for k in 0..MAX_STEPS {
            let shifted = anchor.checked_add_months(Months::new(k.checked_mul(months)?))?;
            let candidate = clamp_to_day(shifted, wanted_day);
            if candidate > after {
                return Some(candidate);
            }
        }
        None
    }
}

// ============================================================================
// Date Stepping Helpers
// ============================================================================

/// First `anchor + k*step` (k >= 0) strictly after `after`.
fn step_days(anchor: NaiveDate, after: NaiveDate, step: i64) -> NaiveDate {
    let elapsed = after.signed_duration_since(anchor).num_days();
    if elapsed < 0 {
        return anchor;
    }
    let k = elapsed / step + 1;
    anchor + Days::new((k * step) as u64)
}

fn next_matching_weekday(after: NaiveDate, weekdays: &[Weekday]) -> Option<NaiveDate> {
    let mut candidate = after + Days::new(1);
    for _ in 0..7 {
        if weekdays.contains(&candidate.weekday()) {
            return Some(candidate);
        }
        candidate = candidate + Days::new(1);
    }
    None
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}

/// Replace the day of month, clamping to the month's last day.
fn clamp_to_day(date: NaiveDate, day: u32) -> NaiveDate {
    if let Some(exact) = date.with_day(day) {
        return exact;
    }
    // Requested day does not exist in this month: use the last day.
    let first = date.with_day(1).expect("day 1 exists in every month");
    (first + Months::new(1)) - Days::new(1)
}

fn parse_weekday_list(text: &str) -> Option<Vec<Weekday>> {
    let mut weekdays = Vec::new();
    for part in text.replace(" and ", ",").split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let day = part.parse::<Weekday>().ok()?;
        if !weekdays.contains(&day) {
            weekdays.push(day);
        }
    }
    if weekdays.is_empty() {
        return None;
    }
    weekdays.sort_by_key(|d| d.num_days_from_monday());
    Some(weekdays)
}

fn parse_ordinal_day(text: &str) -> Option<Option<u32>> {
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    let rest = &text[digits.len()..];
    if !matches!(rest, "" | "st" | "nd" | "rd" | "th") {
        return None;
    }
    let day: u32 = digits.parse().ok()?;
    if (1..=31).contains(&day) {
        Some(Some(day))
    } else {
        None
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
