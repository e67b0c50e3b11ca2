//! Splitting query source text into logical statements.
//!
//! A trailing backslash continues a statement onto the following line;
//! surrounding whitespace around the break collapses to a single space.

use std::sync::OnceLock;

use regex::Regex;

fn continuation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]*\\\n[ \t]*").expect("continuation pattern is valid"))
}

/// Remove newlines escaped by a backslash.
pub fn continue_lines(input: &str) -> String {
    continuation_regex().replace_all(input, " ").to_string()
}

/// Split input into trimmed, non-empty statements, joining continued lines
/// first.
pub fn scan(input: &str) -> Vec<String> {
    continue_lines(input)
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_plain_lines() {
        assert_eq!(scan("not done\nsort by due"), vec!["not done", "sort by due"]);
    }

    #[test]
    fn test_scan_skips_blank_lines_and_trims() {
        assert_eq!(scan("  not done  \n\n\n  short\n"), vec!["not done", "short"]);
    }

    #[test]
    fn test_continuation_joins_lines() {
        assert_eq!(
            scan("( due before tomorrow ) \\\n  AND ( is recurring )"),
            vec!["( due before tomorrow ) AND ( is recurring )"]
        );
    }

    #[test]
    fn test_continuation_at_end_of_input_is_kept() {
        assert_eq!(scan("not done \\"), vec!["not done \\"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(scan("").is_empty());
    }
}
