//! The task-line grammar.
//!
//! Recognizes a single line of text as a checklist item and decomposes it
//! into indentation, list marker, status symbol, body, and a trailing
//! block-link annotation. This is deliberately the only place in the crate
//! that knows what a checklist line looks like.

use std::sync::OnceLock;

use regex::Regex;

/// A task line, broken down into sections.
///
/// Produced by [`extract_components`]; `None` from that function means the
/// line is not a checklist item at all, which is different from "checklist
/// item that fails the global filter" - the latter still yields components
/// and is filtered out later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskComponents {
    /// Leading whitespace and blockquote markers, preserved verbatim.
    pub indentation: String,
    /// `-`, `*`, `+`, or a numbered marker such as `3.`.
    pub list_marker: String,
    /// The single character between the checkbox brackets.
    pub status_symbol: char,
    /// Everything after the checkbox, block link removed.
    pub body: String,
    /// Trailing `^block-id` anchor including its leading space, or empty.
    pub block_link: String,
}

/// Indentation, list marker, checkbox with captured status character, body.
/// Indentation admits `>` so tasks inside blockquotes and callouts parse.
fn task_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([\s>]*)([-*+]|[0-9]+\.) +\[(.)\] *(.*)$")
            .expect("task line pattern is valid")
    })
}

/// A block link is a caret-prefixed token at the absolute end of the line.
fn block_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" \^[a-zA-Z0-9-]+$").expect("block link pattern is valid"))
}

/// Hash followed by anything but punctuation likely to end a tag. Anchored
/// to start-of-text or whitespace so URL fragments are not caught.
fn hashtag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(^|\s)#[^ !@#$%^&*(),.?":{}|<>]+"#).expect("hashtag pattern is valid")
    })
}

/// Like [`hashtag_regex`], but only matching at the end of the text.
pub(crate) fn hashtag_from_end_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(^|\s)#[^ !@#$%^&*(),.?":{}|<>]+$"#)
            .expect("trailing hashtag pattern is valid")
    })
}

/// Extract the component parts of a task line.
///
/// Returns `None` if the line is not a checklist item (no list marker or no
/// checkbox). Callers must treat that as "skip", never as a failure.
pub fn extract_components(line: &str) -> Option<TaskComponents> {
    let caps = task_regex().captures(line)?;

    let indentation = caps[1].to_string();
    let list_marker = caps[2].to_string();
    let status_symbol = caps[3].chars().next()?;
    let mut body = caps[4].trim().to_string();

    // The block link is always expected at the very end of the line.
    let block_link = match block_link_regex().find(&body) {
        Some(found) => {
            let link = found.as_str().to_string();
            body.truncate(found.start());
            body = body.trim_end().to_string();
            link
        }
        None => String::new(),
    };

    Some(TaskComponents {
        indentation,
        list_marker,
        status_symbol,
        body,
        block_link,
    })
}

/// All hashtags in a piece of text, in reading order, whitespace trimmed.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    hashtag_regex()
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_task() {
        let components = extract_components("- [ ] Buy milk").unwrap();
        assert_eq!(components.indentation, "");
        assert_eq!(components.list_marker, "-");
        assert_eq!(components.status_symbol, ' ');
        assert_eq!(components.body, "Buy milk");
        assert_eq!(components.block_link, "");
    }

    #[test]
    fn test_extract_indented_and_numbered() {
        let components = extract_components("    3. [x] Done item").unwrap();
        assert_eq!(components.indentation, "    ");
        assert_eq!(components.list_marker, "3.");
        assert_eq!(components.status_symbol, 'x');
        assert_eq!(components.body, "Done item");
    }

    #[test]
    fn test_extract_blockquoted_task() {
        let components = extract_components("> - [/] In a callout").unwrap();
        assert_eq!(components.indentation, "> ");
        assert_eq!(components.status_symbol, '/');
    }

    #[test]
    fn test_extract_block_link() {
        let components = extract_components("- [ ] Pay rent ^due-rent").unwrap();
        assert_eq!(components.body, "Pay rent");
        assert_eq!(components.block_link, " ^due-rent");
    }

    #[test]
    fn test_caret_mid_line_is_not_a_block_link() {
        let components = extract_components("- [ ] Review ^notes^ formatting").unwrap();
        assert_eq!(components.body, "Review ^notes^ formatting");
        assert_eq!(components.block_link, "");
    }

    #[test]
    fn test_non_checklist_lines_return_none() {
        assert!(extract_components("Just a paragraph").is_none());
        assert!(extract_components("- a list item without checkbox").is_none());
        assert!(extract_components("# A heading").is_none());
        assert!(extract_components("").is_none());
    }

    #[test]
    fn test_extract_hashtags_skips_url_fragments() {
        let tags = extract_hashtags("#dog #car http://www/ddd#ere #house");
        assert_eq!(tags, vec!["#dog", "#car", "#house"]);
    }

    #[test]
    fn test_extract_hashtags_keeps_nested_tags() {
        let tags = extract_hashtags("work #task/errands now");
        assert_eq!(tags, vec!["#task/errands"]);
    }

    #[test]
    fn test_unicode_status_symbol() {
        let components = extract_components("- [❓] Mystery").unwrap();
        assert_eq!(components.status_symbol, '❓');
    }
}
