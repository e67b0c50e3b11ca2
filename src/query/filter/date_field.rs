//! Filter/sort/group support for the date-valued fields: due, done,
//! scheduled, start, created, cancelled, and the derived happens date.

use chrono::NaiveDate;

use crate::date::{compare_by_date, parse_date_expr, Period};
use crate::query::grouper::{parse_group_line, Grouper};
use crate::query::sorter::{parse_sort_line, Sorter};
use crate::task::Task;

use super::{Field, Filter};

type DateAccessor = fn(&Task) -> Option<NaiveDate>;

/// A date expression is validated once at parse time against a fixed date;
/// the predicate re-resolves it against the injected `today` at evaluation
/// time, so `due before tomorrow` tracks the caller's clock, not the
/// moment the query was compiled.
fn validation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 3).expect("fixed validation date is valid")
}

/// One date-valued query field.
pub struct DateField {
    name: &'static str,
    accessor: DateAccessor,
    /// Whether a task lacking this date matches comparison filters. Start
    /// searches treat "no start date" as "can start now", the other dates
    /// do not match.
    match_if_missing: bool,
}

impl DateField {
    pub fn due() -> Self {
        Self {
            name: "due",
            accessor: |t| t.due_date(),
            match_if_missing: false,
        }
    }

    pub fn done() -> Self {
        Self {
            name: "done",
            accessor: |t| t.done_date(),
            match_if_missing: false,
        }
    }

    pub fn scheduled() -> Self {
        Self {
            name: "scheduled",
            accessor: |t| t.scheduled_date(),
            match_if_missing: false,
        }
    }

    pub fn start() -> Self {
        Self {
            name: "starts",
            accessor: |t| t.start_date(),
            match_if_missing: true,
        }
    }

    pub fn created() -> Self {
        Self {
            name: "created",
            accessor: |t| t.created_date(),
            match_if_missing: false,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            name: "cancelled",
            accessor: |t| t.cancelled_date(),
            match_if_missing: false,
        }
    }

    pub fn happens() -> Self {
        Self {
            name: "happens",
            accessor: |t| t.happens_date(),
            match_if_missing: false,
        }
    }

    /// The word used in `sort by` / `group by` lines; `starts` filters sort
    /// and group as `start`.
    fn key_name(&self) -> &'static str {
        if self.name == "starts" {
            "start"
        } else {
            self.name
        }
    }
}

impl Field for DateField {
    fn name(&self) -> &'static str {
        self.name
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        let lower = line.trim().to_lowercase();
        lower.starts_with(&format!("{} ", self.name))
            || lower == format!("has {} date", self.key_name())
            || lower == format!("no {} date", self.key_name())
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let lower = line.trim().to_lowercase();
        let accessor = self.accessor;
        let name = self.name;
        let match_if_missing = self.match_if_missing;

        if lower == format!("has {} date", self.key_name()) {
            return Ok(Filter::new(
                line,
                format!("has a {name} date"),
                move |task, _| accessor(task).is_some(),
            ));
        }
        if lower == format!("no {} date", self.key_name()) {
            return Ok(Filter::new(
                line,
                format!("has no {name} date"),
                move |task, _| accessor(task).is_none(),
            ));
        }

        let rest = lower
            .strip_prefix(self.name)
            .expect("can_create checked the prefix")
            .trim()
            .to_string();

        if let Some(period_word) = rest.strip_prefix("in current ") {
            let Some(period) = Period::parse(period_word.trim()) else {
                return Err(format!("do not understand {name} date"));
            };
            return Ok(Filter::new(
                line,
                format!("{name} date is in the current {}", period_word.trim()),
                move |task, ctx| match accessor(task) {
                    Some(date) => period.contains(date, ctx.today),
                    None => match_if_missing,
                },
            ));
        }

        let (relation, expr) = if let Some(expr) = rest.strip_prefix("before ") {
            ("before", expr.to_string())
        } else if let Some(expr) = rest.strip_prefix("after ") {
            ("after", expr.to_string())
        } else if let Some(expr) = rest.strip_prefix("on ") {
            ("on", expr.to_string())
        } else {
            ("on", rest)
        };

        if parse_date_expr(&expr, validation_date()).is_none() {
            return Err(format!("do not understand {name} date"));
        }

        let explanation = format!("{name} date is {relation} {expr}");
        Ok(Filter::new(line, explanation, move |task, ctx| {
            let Some(filter_date) = parse_date_expr(&expr, ctx.today) else {
                return false;
            };
            match accessor(task) {
                Some(date) => match relation {
                    "before" => date < filter_date,
                    "after" => date > filter_date,
                    _ => date == filter_date,
                },
                None => match_if_missing,
            }
        }))
    }

    fn create_sorter_from_line(&self, line: &str) -> Option<Sorter> {
        let reverse = parse_sort_line(line, self.key_name())?;
        let accessor = self.accessor;
        Some(Sorter::new(self.key_name(), reverse, move |a, b, _| {
            compare_by_date(accessor(a), accessor(b))
        }))
    }

    fn create_grouper_from_line(&self, line: &str) -> Option<Grouper> {
        let reverse = parse_group_line(line, self.key_name())?;
        let accessor = self.accessor;
        let name = self.key_name();
        Some(Grouper::new(name, reverse, move |task, _| {
            match accessor(task) {
                Some(date) => vec![date.format("%Y-%m-%d %A").to_string()],
                None => vec![format!("No {name} date")],
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::filter_matches;
    use super::super::{parse_filter, parse_grouper, parse_sorter};
    use crate::testing::TaskBuilder;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_before() {
        let task = TaskBuilder::new("t").due(date(2024, 1, 10)).build();
        assert!(filter_matches("due before 2024-01-15", &task));
        assert!(!filter_matches("due before 2024-01-10", &task));
        assert!(!filter_matches("due before 2024-01-05", &task));
    }

    #[test]
    fn test_due_after_and_on() {
        let task = TaskBuilder::new("t").due(date(2024, 1, 10)).build();
        assert!(filter_matches("due after 2024-01-05", &task));
        assert!(filter_matches("due on 2024-01-10", &task));
        assert!(filter_matches("due 2024-01-10", &task));
        assert!(!filter_matches("due on 2024-01-11", &task));
    }

    #[test]
    fn test_due_relative_words_use_injected_today() {
        // The helper context pins today to 2024-01-10.
        let task = TaskBuilder::new("t").due(date(2024, 1, 10)).build();
        assert!(filter_matches("due today", &task));
        assert!(filter_matches("due before tomorrow", &task));
        assert!(!filter_matches("due before today", &task));
    }

    #[test]
    fn test_missing_due_date_does_not_match_comparisons() {
        let task = TaskBuilder::new("t").build();
        assert!(!filter_matches("due before 2099-01-01", &task));
        assert!(filter_matches("no due date", &task));
        assert!(!filter_matches("has due date", &task));
    }

    #[test]
    fn test_missing_start_date_matches() {
        // A task with no start date can always be started.
        let task = TaskBuilder::new("t").build();
        assert!(filter_matches("starts before 2024-01-01", &task));
        assert!(filter_matches("no start date", &task));
    }

    #[test]
    fn test_in_current_week() {
        // Today is pinned to Wednesday 2024-01-10; its ISO week is
        // Jan 8 - Jan 14.
        let inside = TaskBuilder::new("t").due(date(2024, 1, 14)).build();
        let outside = TaskBuilder::new("t").due(date(2024, 1, 15)).build();
        assert!(filter_matches("due in current week", &inside));
        assert!(!filter_matches("due in current week", &outside));
    }

    #[test]
    fn test_happens_uses_earliest_date() {
        let task = TaskBuilder::new("t")
            .start(date(2024, 1, 3))
            .due(date(2024, 1, 20))
            .build();
        assert!(filter_matches("happens before 2024-01-05", &task));
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let result = parse_filter("due before glorbuary").unwrap();
        let err = result.unwrap_err();
        assert!(err.contains("do not understand due date"));
    }

    #[test]
    fn test_sorter_and_grouper_exist_for_dates() {
        assert!(parse_sorter("sort by due").is_some());
        assert!(parse_sorter("sort by start reverse").is_some());
        assert!(parse_grouper("group by scheduled").is_some());
        assert!(parse_grouper("group by happens").is_some());
    }

    #[test]
    fn test_group_label_includes_weekday() {
        let grouper = parse_grouper("group by due").unwrap();
        let task = TaskBuilder::new("t").due(date(2024, 1, 10)).build();
        let settings = crate::settings::Settings::default();
        let ctx = super::super::SearchContext {
            today: date(2024, 1, 10),
            all_tasks: &[],
            settings: &settings,
        };
        assert_eq!(grouper.group_names(&task, &ctx), vec!["2024-01-10 Wednesday"]);
        let undated = TaskBuilder::new("t").build();
        assert_eq!(grouper.group_names(&undated, &ctx), vec!["No due date"]);
    }
}
