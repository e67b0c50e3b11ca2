//! Filter/sort/group support for the string-valued fields: description,
//! path, heading, filename, folder, root, backlink, recurrence rule and
//! status name.

use regex::Regex;

use crate::query::grouper::{parse_group_line, Grouper};
use crate::query::sorter::{parse_sort_line, Sorter};
use crate::task::Task;

use super::{Field, Filter, SearchContext};

type ValueFn = fn(&Task, &SearchContext<'_>) -> String;

/// One string-valued query field.
///
/// Supported grammar:
/// `<name> includes <text>`, `<name> does not include <text>`,
/// `<name> regex matches /pattern/[i]`,
/// `<name> regex does not match /pattern/[i]`.
/// `includes` matching is case-insensitive.
pub struct TextField {
    name: &'static str,
    value: ValueFn,
    /// Label used when grouping a task with an empty value; `None`
    /// disables grouping for the field.
    group_empty_label: Option<&'static str>,
    supports_sort: bool,
}

impl TextField {
    pub fn description() -> Self {
        Self {
            name: "description",
            // The global filter token is not part of what the user thinks
            // of as the description.
            value: |t, ctx| ctx.settings.global_filter.remove_as_word_from(t.description()),
            group_empty_label: None,
            supports_sort: true,
        }
    }

    pub fn path() -> Self {
        Self {
            name: "path",
            value: |t, _| t.path().to_string(),
            group_empty_label: Some(""),
            supports_sort: true,
        }
    }

    pub fn heading() -> Self {
        Self {
            name: "heading",
            value: |t, _| t.preceding_header().unwrap_or_default().to_string(),
            group_empty_label: Some("(No heading)"),
            supports_sort: false,
        }
    }

    pub fn filename() -> Self {
        Self {
            name: "filename",
            value: |t, _| t.filename().unwrap_or_default(),
            group_empty_label: Some("Unknown Location"),
            supports_sort: true,
        }
    }

    pub fn folder() -> Self {
        Self {
            name: "folder",
            value: |t, _| t.location().folder(),
            group_empty_label: Some(""),
            supports_sort: false,
        }
    }

    pub fn root() -> Self {
        Self {
            name: "root",
            value: |t, _| t.location().root(),
            group_empty_label: Some(""),
            supports_sort: false,
        }
    }

    pub fn backlink() -> Self {
        Self {
            name: "backlink",
            value: |t, _| backlink_text(t),
            group_empty_label: Some("Unknown Location"),
            supports_sort: false,
        }
    }

    pub fn recurrence() -> Self {
        Self {
            name: "recurrence",
            value: |t, _| t.recurrence_rule(),
            group_empty_label: Some("None"),
            supports_sort: false,
        }
    }

    pub fn status_name() -> Self {
        Self {
            name: "status.name",
            value: |t, _| t.status().name().to_string(),
            group_empty_label: Some(""),
            supports_sort: true,
        }
    }
}

/// The text a host would display when linking back to the task's origin:
/// the file name, plus the heading when it adds information.
fn backlink_text(task: &Task) -> String {
    let Some(filename) = task.filename() else {
        return "Unknown Location".to_string();
    };
    match task.preceding_header() {
        Some(heading) if heading != filename => format!("{filename} > {heading}"),
        _ => filename,
    }
}

/// Split `/pattern/flags` into its parts.
fn split_regex_literal(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    Some((&rest[..end], &rest[end + 1..]))
}

fn build_regex(text: &str) -> Result<Regex, String> {
    let Some((pattern, flags)) = split_regex_literal(text) else {
        return Err("check your leading and trailing slashes".to_string());
    };
    let pattern = if flags.contains('i') {
        format!("(?i){pattern}")
    } else {
        pattern.to_string()
    };
    Regex::new(&pattern).map_err(|e| e.to_string())
}

impl Field for TextField {
    fn name(&self) -> &'static str {
        self.name
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        line.trim()
            .to_lowercase()
            .starts_with(&format!("{} ", self.name))
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let trimmed = line.trim();
        let rest = trimmed[self.name.len()..].trim_start();
        // Relation keywords are case-insensitive; they are plain ASCII, so
        // prefix lengths carry over from the lowercased copy.
        let lower_rest = rest.to_lowercase();
        let value = self.value;
        let name = self.name;

        let (negate, needle) = if lower_rest.starts_with("includes ") {
            (false, rest["includes ".len()..].to_string())
        } else if lower_rest.starts_with("does not include ") {
            (true, rest["does not include ".len()..].to_string())
        } else if lower_rest.starts_with("regex matches ") {
            return self.regex_filter(line, &rest["regex matches ".len()..], false);
        } else if lower_rest.starts_with("regex does not match ") {
            return self.regex_filter(line, &rest["regex does not match ".len()..], true);
        } else {
            return Err(format!("do not understand query filter ({name})"));
        };

        let relation = if negate { "does not include" } else { "includes" };
        let explanation = format!("{name} {relation} '{needle}' (case-insensitive)");
        Ok(Filter::new(line, explanation, move |task, ctx| {
            let haystack = value(task, ctx).to_lowercase();
            haystack.contains(&needle.to_lowercase()) != negate
        }))
    }

    fn create_sorter_from_line(&self, line: &str) -> Option<Sorter> {
        if !self.supports_sort {
            return None;
        }
        let reverse = parse_sort_line(line, self.name)?;
        let value = self.value;
        Some(Sorter::new(self.name, reverse, move |a, b, ctx| {
            value(a, ctx)
                .to_lowercase()
                .cmp(&value(b, ctx).to_lowercase())
        }))
    }

    fn create_grouper_from_line(&self, line: &str) -> Option<Grouper> {
        let empty_label = self.group_empty_label?;
        let reverse = parse_group_line(line, self.name)?;
        let value = self.value;
        Some(Grouper::new(self.name, reverse, move |task, ctx| {
            let text = value(task, ctx);
            if text.is_empty() {
                vec![empty_label.to_string()]
            } else {
                vec![text]
            }
        }))
    }
}

impl TextField {
    fn regex_filter(&self, line: &str, pattern: &str, negate: bool) -> Result<Filter, String> {
        let name = self.name;
        let regex = build_regex(pattern.trim())
            .map_err(|e| format!("cannot parse regex ({name}); {e}"))?;
        let value = self.value;
        let relation = if negate { "does not match" } else { "matches" };
        let explanation = format!("{name} regex {relation} {}", pattern.trim());
        Ok(Filter::new(line, explanation, move |task, ctx| {
            regex.is_match(&value(task, ctx)) != negate
        }))
    }
}
