//! Filter/sort/group support for tags.

use std::sync::OnceLock;

use regex::Regex;

use crate::query::grouper::Grouper;
use crate::query::sorter::Sorter;

use super::{Field, Filter};

/// Tags accept both singular and plural spellings: `tag includes x`,
/// `tags do not include y`.
pub struct TagsField;

fn filter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)tags? (includes|include|does not include|do not include) (.+)$")
            .expect("tags filter pattern is valid")
    })
}

fn sort_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)sort by tag( (\d+))?( reverse)?$").expect("tags sort pattern is valid")
    })
}

impl Field for TagsField {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        let lower = line.trim().to_lowercase();
        filter_regex().is_match(line.trim()) || lower == "has tags" || lower == "no tags"
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();

        if lower == "has tags" {
            return Ok(Filter::new(line, "has at least one tag", |task, _| {
                !task.tags().is_empty()
            }));
        }
        if lower == "no tags" {
            return Ok(Filter::new(line, "has no tags", |task, _| {
                task.tags().is_empty()
            }));
        }

        let caps = filter_regex()
            .captures(trimmed)
            .ok_or_else(|| "do not understand query filter (tags)".to_string())?;
        let negate = caps[1].to_lowercase().contains("not");
        let needle = caps[2].trim().to_lowercase();

        let relation = if negate { "do not include" } else { "include" };
        let explanation = format!("tags {relation} '{}' (case-insensitive)", caps[2].trim());
        Ok(Filter::new(line, explanation, move |task, _| {
            let any = task
                .tags()
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle));
            any != negate
        }))
    }

    /// `sort by tag [N] [reverse]`: sort by the N-th tag (1-based, default
    /// first). Tasks with fewer tags sort after tasks that have the tag.
    fn create_sorter_from_line(&self, line: &str) -> Option<Sorter> {
        let caps = sort_regex().captures(line.trim())?;
        let instance: usize = caps
            .get(2)
            .map_or(1, |m| m.as_str().parse().unwrap_or(1))
            .max(1);
        let reverse = caps.get(3).is_some();

        Some(Sorter::new("tag", reverse, move |a, b, _| {
            let tag_a = a.tags().get(instance - 1);
            let tag_b = b.tags().get(instance - 1);
            match (tag_a, tag_b) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        }))
    }

    /// `group by tags` files a task into one group per tag.
    fn create_grouper_from_line(&self, line: &str) -> Option<Grouper> {
        let reverse = crate::query::grouper::parse_group_line(line, "tags")?;
        Some(Grouper::new("tags", reverse, |task, _| {
            task.tags().to_vec()
        }))
    }
}
