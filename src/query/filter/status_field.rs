//! Filter/sort/group support for status and status type.

use std::sync::OnceLock;

use regex::Regex;

use crate::query::grouper::{parse_group_line, Grouper};
use crate::query::sorter::{parse_sort_line, Sorter};
use crate::status::StatusType;

use super::{Field, Filter};

// ============================================================================
// Status
// ============================================================================

/// The whole-status field: `done` / `not done` filters, plus sorting and
/// grouping by the status itself.
///
/// `done` matches every closed task: DONE, CANCELLED and NON_TASK.
pub struct StatusField;

impl Field for StatusField {
    fn name(&self) -> &'static str {
        "status"
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        let lower = line.trim().to_lowercase();
        lower == "done" || lower == "not done"
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let negate = line.trim().to_lowercase() == "not done";
        let explanation = if negate {
            "status type is TODO or IN_PROGRESS"
        } else {
            "status type is DONE, CANCELLED or NON_TASK"
        };
        Ok(Filter::new(line, explanation, move |task, _| {
            task.is_done() != negate
        }))
    }

    fn create_sorter_from_line(&self, line: &str) -> Option<Sorter> {
        let reverse = parse_sort_line(line, "status")?;
        Some(Sorter::new("status", reverse, |a, b, _| {
            let type_order = a
                .status()
                .status_type()
                .group_order()
                .cmp(&b.status().status_type().group_order());
            type_order.then_with(|| a.status().symbol().cmp(&b.status().symbol()))
        }))
    }

    fn create_grouper_from_line(&self, line: &str) -> Option<Grouper> {
        let reverse = parse_group_line(line, "status")?;
        Some(Grouper::new("status", reverse, |task, _| {
            vec![task.status().name().to_string()]
        }))
    }
}

// ============================================================================
// Status Type
// ============================================================================

/// `status.type is [not] <TYPE>` - matches on the semantic type so custom
/// symbols behave sensibly.
pub struct StatusTypeField;

fn status_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)status\.type is( not)? (todo|in_progress|done|cancelled|non_task)$")
            .expect("status.type pattern is valid")
    })
}

fn parse_status_type(text: &str) -> Option<StatusType> {
    match text.to_uppercase().as_str() {
        "TODO" => Some(StatusType::Todo),
        "IN_PROGRESS" => Some(StatusType::InProgress),
        "DONE" => Some(StatusType::Done),
        "CANCELLED" => Some(StatusType::Cancelled),
        "NON_TASK" => Some(StatusType::NonTask),
        _ => None,
    }
}

impl Field for StatusTypeField {
    fn name(&self) -> &'static str {
        "status.type"
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        line.trim().to_lowercase().starts_with("status.type")
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let caps = status_type_regex()
            .captures(line.trim())
            .ok_or_else(|| "do not understand query filter (status.type)".to_string())?;
        let negate = caps.get(1).is_some();
        let wanted =
            parse_status_type(&caps[2]).expect("regex alternatives are all valid status types");

        let explanation = if negate {
            format!("status type is not {wanted}")
        } else {
            format!("status type is {wanted}")
        };
        Ok(Filter::new(line, explanation, move |task, _| {
            (task.status().status_type() == wanted) != negate
        }))
    }

    fn create_sorter_from_line(&self, line: &str) -> Option<Sorter> {
        let reverse = parse_sort_line(line, "status.type")?;
        Some(Sorter::new("status.type", reverse, |a, b, _| {
            a.status()
                .status_type()
                .group_order()
                .cmp(&b.status().status_type().group_order())
        }))
    }

    fn create_grouper_from_line(&self, line: &str) -> Option<Grouper> {
        let reverse = parse_group_line(line, "status.type")?;
        Some(Grouper::new("status.type", reverse, |task, _| {
            vec![task.status().status_type().group_text()]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::filter_matches;
    use super::super::{parse_filter, parse_grouper};
    use crate::testing::TaskBuilder;

    #[test]
    fn test_done_and_not_done() {
        let open = TaskBuilder::new("open").build();
        let done = TaskBuilder::new("done").status_symbol('x').build();
        assert!(filter_matches("not done", &open));
        assert!(filter_matches("done", &done));
        assert!(!filter_matches("done", &open));
        // Keywords are case-insensitive.
        assert!(filter_matches("NOT DONE", &open));
    }

    #[test]
    fn test_status_type_is() {
        let open = TaskBuilder::new("open").build();
        let done = TaskBuilder::new("done").status_symbol('x').build();
        assert!(filter_matches("status.type is TODO", &open));
        assert!(filter_matches("status.type is not DONE", &open));
        assert!(filter_matches("status.type is done", &done));
    }

    #[test]
    fn test_bad_status_type_is_an_error() {
        let result = parse_filter("status.type is WAITING").unwrap();
        assert!(result.unwrap_err().contains("status.type"));
    }

    #[test]
    fn test_group_by_status_uses_names() {
        let grouper = parse_grouper("group by status").unwrap();
        let settings = crate::settings::Settings::default();
        let ctx = super::super::SearchContext {
            today: chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            all_tasks: &[],
            settings: &settings,
        };
        let open = TaskBuilder::new("open").build();
        let done = TaskBuilder::new("done").status_symbol('x').build();
        assert_eq!(grouper.group_names(&open, &ctx), vec!["Todo"]);
        assert_eq!(grouper.group_names(&done, &ctx), vec!["Done"]);
    }
}
