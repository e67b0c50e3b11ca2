//! The remaining query fields: recurring, urgency, id, depends-on, and the
//! blocked/blocking relationship predicates.

use std::sync::OnceLock;

use regex::Regex;

use crate::query::grouper::{parse_group_line, Grouper};
use crate::query::sorter::{parse_sort_line, Sorter};

use super::{Field, Filter};

// ============================================================================
// Recurring
// ============================================================================

pub struct RecurringField;

impl Field for RecurringField {
    fn name(&self) -> &'static str {
        "recurring"
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        let lower = line.trim().to_lowercase();
        lower == "is recurring" || lower == "is not recurring"
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let negate = line.trim().to_lowercase() == "is not recurring";
        let explanation = if negate { "is not recurring" } else { "is recurring" };
        Ok(Filter::new(line, explanation, move |task, _| {
            task.is_recurring() != negate
        }))
    }

    fn create_grouper_from_line(&self, line: &str) -> Option<Grouper> {
        let reverse = parse_group_line(line, "recurring")?;
        Some(Grouper::new("recurring", reverse, |task, _| {
            if task.is_recurring() {
                vec!["Recurring".to_string()]
            } else {
                vec!["Not Recurring".to_string()]
            }
        }))
    }
}

// ============================================================================
// Urgency
// ============================================================================

pub struct UrgencyField;

fn urgency_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)urgency (above|below) (-?\d+(?:\.\d+)?)$")
            .expect("urgency filter pattern is valid")
    })
}

impl Field for UrgencyField {
    fn name(&self) -> &'static str {
        "urgency"
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        line.trim().to_lowercase().starts_with("urgency")
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let caps = urgency_regex()
            .captures(line.trim())
            .ok_or_else(|| "do not understand query filter (urgency)".to_string())?;
        let above = caps[1].to_lowercase() == "above";
        let threshold: f64 = caps[2]
            .parse()
            .map_err(|_| "do not understand urgency threshold".to_string())?;

        let relation = if above { "above" } else { "below" };
        let explanation = format!("urgency is {relation} {threshold}");
        Ok(Filter::new(line, explanation, move |task, ctx| {
            let urgency = task.urgency(ctx.today);
            if above {
                urgency > threshold
            } else {
                urgency < threshold
            }
        }))
    }

    /// `sort by urgency` puts the most urgent work first; `reverse` flips
    /// that.
    fn create_sorter_from_line(&self, line: &str) -> Option<Sorter> {
        let reverse = parse_sort_line(line, "urgency")?;
        Some(Sorter::new("urgency", reverse, |a, b, ctx| {
            b.urgency(ctx.today)
                .partial_cmp(&a.urgency(ctx.today))
                .unwrap_or(std::cmp::Ordering::Equal)
        }))
    }

    fn create_grouper_from_line(&self, line: &str) -> Option<Grouper> {
        let reverse = parse_group_line(line, "urgency")?;
        Some(Grouper::new("urgency", reverse, |task, ctx| {
            vec![format!("{:.2}", task.urgency(ctx.today))]
        }))
    }
}

// ============================================================================
// Id
// ============================================================================

pub struct IdField;

impl Field for IdField {
    fn name(&self) -> &'static str {
        "id"
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        let lower = line.trim().to_lowercase();
        lower == "has id" || lower == "no id" || lower.starts_with("id ")
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();

        if lower == "has id" {
            return Ok(Filter::new(line, "has an id", |task, _| {
                !task.id().is_empty()
            }));
        }
        if lower == "no id" {
            return Ok(Filter::new(line, "has no id", |task, _| {
                task.id().is_empty()
            }));
        }

        let rest = trimmed[2..].trim_start();
        let lower_rest = rest.to_lowercase();
        let (negate, needle) = if lower_rest.starts_with("includes ") {
            (false, lower_rest["includes ".len()..].to_string())
        } else if lower_rest.starts_with("does not include ") {
            (true, lower_rest["does not include ".len()..].to_string())
        } else {
            return Err("do not understand query filter (id)".to_string());
        };

        let relation = if negate { "does not include" } else { "includes" };
        let explanation = format!("id {relation} '{needle}'");
        Ok(Filter::new(line, explanation, move |task, _| {
            task.id().to_lowercase().contains(&needle) != negate
        }))
    }

    fn create_sorter_from_line(&self, line: &str) -> Option<Sorter> {
        let reverse = parse_sort_line(line, "id")?;
        Some(Sorter::new("id", reverse, |a, b, _| a.id().cmp(b.id())))
    }

    fn create_grouper_from_line(&self, line: &str) -> Option<Grouper> {
        let reverse = parse_group_line(line, "id")?;
        Some(Grouper::new("id", reverse, |task, _| {
            if task.id().is_empty() {
                Vec::new()
            } else {
                vec![task.id().to_string()]
            }
        }))
    }
}

// ============================================================================
// Depends On
// ============================================================================

pub struct DependsOnField;

impl Field for DependsOnField {
    fn name(&self) -> &'static str {
        "depends on"
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        let lower = line.trim().to_lowercase();
        lower == "has depends on" || lower == "no depends on"
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let negate = line.trim().to_lowercase() == "no depends on";
        let explanation = if negate {
            "does not depend on any task"
        } else {
            "depends on at least one task"
        };
        Ok(Filter::new(line, explanation, move |task, _| {
            task.depends_on().is_empty() == negate
        }))
    }
}

// ============================================================================
// Blocked / Blocking
// ============================================================================

/// Relationship predicates over the whole task collection. These are the
/// only built-in filters that consult `ctx.all_tasks`.
pub struct BlockingField;

impl Field for BlockingField {
    fn name(&self) -> &'static str {
        "blocking"
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        matches!(
            line.trim().to_lowercase().as_str(),
            "is blocked" | "is not blocked" | "is blocking" | "is not blocking"
        )
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        match line.trim().to_lowercase().as_str() {
            "is blocked" => Ok(Filter::new(
                line,
                "waits on another live task",
                |task, ctx| task.is_blocked(ctx.all_tasks),
            )),
            "is not blocked" => Ok(Filter::new(
                line,
                "does not wait on any live task",
                |task, ctx| !task.is_blocked(ctx.all_tasks),
            )),
            "is blocking" => Ok(Filter::new(
                line,
                "another live task waits on this one",
                |task, ctx| task.is_blocking(ctx.all_tasks),
            )),
            "is not blocking" => Ok(Filter::new(
                line,
                "no live task waits on this one",
                |task, ctx| !task.is_blocking(ctx.all_tasks),
            )),
            _ => Err("do not understand query filter (blocking)".to_string()),
        }
    }
}
