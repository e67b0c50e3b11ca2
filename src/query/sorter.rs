//! Sorters: comparator chains compiled from `sort by ...` instructions.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::date::compare_by_date;
use crate::query::filter::SearchContext;
use crate::task::Task;

/// The comparator type all sorters compile to. The context supplies the
/// injected "today" for urgency-based sorting.
pub type Comparator = Arc<dyn Fn(&Task, &Task, &SearchContext<'_>) -> Ordering + Send + Sync>;

/// A single `sort by` instruction: a named comparator plus the optional
/// `reverse` flag.
#[derive(Clone)]
pub struct Sorter {
    property: String,
    reverse: bool,
    comparator: Comparator,
}

impl Sorter {
    pub fn new(
        property: impl Into<String>,
        reverse: bool,
        comparator: impl Fn(&Task, &Task, &SearchContext<'_>) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        Self {
            property: property.into(),
            reverse,
            comparator: Arc::new(comparator),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    pub fn compare(&self, a: &Task, b: &Task, ctx: &SearchContext<'_>) -> Ordering {
        let ordering = (self.comparator)(a, b, ctx);
        if self.reverse {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl fmt::Debug for Sorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sorter")
            .field("property", &self.property)
            .field("reverse", &self.reverse)
            .finish_non_exhaustive()
    }
}

/// Match `sort by <name> [reverse]`, returning the reverse flag.
/// Used by the field implementations; keywords are case-insensitive.
pub(crate) fn parse_sort_line(line: &str, name: &str) -> Option<bool> {
    let lower = line.trim().to_lowercase();
    let rest = lower.strip_prefix("sort by")?.trim();
    if rest == name {
        Some(false)
    } else if rest == format!("{name} reverse") {
        Some(true)
    } else {
        None
    }
}

/// The documented default ordering, applied when a query has no `sort by`
/// instructions and as the tie-breaker after user sorters: by file path,
/// then by due date, then by status symbol. Deterministic for identical
/// input across runs.
pub fn default_sorters() -> Vec<Sorter> {
    vec![
        Sorter::new("path", false, |a, b, _| a.path().cmp(b.path())),
        Sorter::new("due", false, |a, b, _| {
            compare_by_date(a.due_date(), b.due_date())
        }),
        Sorter::new("status", false, |a, b, _| {
            let type_order = a
                .status()
                .status_type()
                .group_order()
                .cmp(&b.status().status_type().group_order());
            type_order.then_with(|| a.status().symbol().cmp(&b.status().symbol()))
        }),
    ]
}

/// Stable-sort tasks by the user's sorter chain, falling back to the
/// default ordering for ties (and entirely, when no sorters are given).
pub fn sort_tasks(tasks: &mut [Task], user_sorters: &[Sorter], ctx: &SearchContext<'_>) {
    let defaults = default_sorters();
    tasks.sort_by(|a, b| {
        for sorter in user_sorters.iter().chain(defaults.iter()) {
            let ordering = sorter.compare(a, b, ctx);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::testing::TaskBuilder;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ctx_with<'a>(settings: &'a Settings) -> SearchContext<'a> {
        SearchContext {
            today: date(2024, 1, 10),
            all_tasks: &[],
            settings,
        }
    }

    #[test]
    fn test_parse_sort_line() {
        assert_eq!(parse_sort_line("sort by due", "due"), Some(false));
        assert_eq!(parse_sort_line("sort by due reverse", "due"), Some(true));
        assert_eq!(parse_sort_line("SORT BY DUE", "due"), Some(false));
        assert_eq!(parse_sort_line("sort by duedate", "due"), None);
        assert_eq!(parse_sort_line("group by due", "due"), None);
    }

    #[test]
    fn test_default_sort_path_then_due_then_status() {
        let settings = Settings::default();
        let ctx = ctx_with(&settings);

        let mut tasks = vec![
            TaskBuilder::new("b-late").path("b.md").due(date(2024, 2, 1)).build(),
            TaskBuilder::new("a").path("a.md").build(),
            TaskBuilder::new("b-early").path("b.md").due(date(2024, 1, 1)).build(),
        ];
        sort_tasks(&mut tasks, &[], &ctx);
        let names: Vec<&str> = tasks.iter().map(|t| t.description()).collect();
        assert_eq!(names, vec!["a", "b-early", "b-late"]);
    }

    #[test]
    fn test_reverse_sorter() {
        let settings = Settings::default();
        let ctx = ctx_with(&settings);
        let sorter = Sorter::new("due", true, |a, b, _| {
            compare_by_date(a.due_date(), b.due_date())
        });

        let early = TaskBuilder::new("early").due(date(2024, 1, 1)).build();
        let late = TaskBuilder::new("late").due(date(2024, 2, 1)).build();
        assert_eq!(sorter.compare(&early, &late, &ctx), Ordering::Greater);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let settings = Settings::default();
        let ctx = ctx_with(&settings);
        // Same path, same due date, same status: original order must hold.
        let mut tasks = vec![
            TaskBuilder::new("first").build(),
            TaskBuilder::new("second").build(),
            TaskBuilder::new("third").build(),
        ];
        sort_tasks(&mut tasks, &[], &ctx);
        let names: Vec<&str> = tasks.iter().map(|t| t.description()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }
}
