//! Filter/sort/group support for task priority.

use std::sync::OnceLock;

use regex::Regex;

use crate::query::grouper::{parse_group_line, Grouper};
use crate::query::sorter::{parse_sort_line, Sorter};
use crate::task::Priority;

use super::{Field, Filter};

pub struct PriorityField;

fn filter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)priority is (above |below )?(lowest|low|none|normal|medium|high|highest)$")
            .expect("priority filter pattern is valid")
    })
}

impl Field for PriorityField {
    fn name(&self) -> &'static str {
        "priority"
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        line.trim().to_lowercase().starts_with("priority")
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let caps = filter_regex()
            .captures(line.trim())
            .ok_or_else(|| "do not understand query filter (priority)".to_string())?;

        let relation = caps
            .get(1)
            .map(|m| m.as_str().trim().to_lowercase())
            .unwrap_or_default();
        let target = Priority::parse_name(&caps[2])
            .expect("regex alternatives are all valid priority names");

        let explanation = if relation.is_empty() {
            format!("priority is {}", target.name())
        } else {
            format!("priority is {relation} {}", target.name())
        };

        Ok(Filter::new(line, explanation, move |task, _| {
            // Lower number = more urgent, so "above" compares numerically
            // downwards.
            match relation.as_str() {
                "above" => task.priority().number() < target.number(),
                "below" => task.priority().number() > target.number(),
                _ => task.priority() == target,
            }
        }))
    }

    fn create_sorter_from_line(&self, line: &str) -> Option<Sorter> {
        let reverse = parse_sort_line(line, "priority")?;
        Some(Sorter::new("priority", reverse, |a, b, _| {
            a.priority().cmp(&b.priority())
        }))
    }

    fn create_grouper_from_line(&self, line: &str) -> Option<Grouper> {
        let reverse = parse_group_line(line, "priority")?;
        Some(Grouper::new("priority", reverse, |task, _| {
            vec![task.priority().group_text()]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::filter_matches;
    use super::super::{parse_filter, parse_sorter};
    use crate::task::Priority;
    use crate::testing::TaskBuilder;

    #[test]
    fn test_priority_is() {
        let task = TaskBuilder::new("t").priority(Priority::High).build();
        assert!(filter_matches("priority is high", &task));
        assert!(!filter_matches("priority is medium", &task));
    }

    #[test]
    fn test_priority_none_answers_to_normal() {
        let task = TaskBuilder::new("t").build();
        assert!(filter_matches("priority is none", &task));
        assert!(filter_matches("priority is normal", &task));
    }

    #[test]
    fn test_priority_above_below() {
        let medium = TaskBuilder::new("t").priority(Priority::Medium).build();
        assert!(filter_matches("priority is above normal", &medium));
        assert!(filter_matches("priority is below high", &medium));
        assert!(!filter_matches("priority is above high", &medium));
    }

    #[test]
    fn test_unknown_priority_is_an_error() {
        let result = parse_filter("priority is urgent").unwrap();
        assert!(result.unwrap_err().contains("priority"));
    }

    #[test]
    fn test_sort_by_priority_orders_highest_first() {
        let sorter = parse_sorter("sort by priority").unwrap();
        let high = TaskBuilder::new("h").priority(Priority::High).build();
        let low = TaskBuilder::new("l").priority(Priority::Low).build();
        let settings = crate::settings::Settings::default();
        let ctx = super::super::SearchContext {
            today: chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            all_tasks: &[],
            settings: &settings,
        };
        assert_eq!(sorter.compare(&high, &low, &ctx), std::cmp::Ordering::Less);
    }
}
