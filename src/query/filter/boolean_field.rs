//! Boolean combinators over sub-filters.
//!
//! Grammar: parenthesized sub-filters combined with `AND`, `OR` and `NOT`
//! (uppercase), with the usual precedence `NOT` > `AND` > `OR` and
//! parentheses for grouping:
//!
//! ```text
//! (due before tomorrow) AND ((is recurring) OR (priority is high))
//! NOT (description includes waiting)
//! ```
//!
//! Each parenthesized leaf is compiled through the regular field registry,
//! so everything a plain filter line can say is available inside a boolean
//! expression. This field is registered last: its leaves reference all the
//! other fields.

use super::{parse_filter, Field, Filter};

pub struct BooleanField;

impl Field for BooleanField {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn can_create_filter_for_line(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.starts_with('(') || trimmed.starts_with("NOT")
    }

    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String> {
        let tokens = tokenize(line.trim())
            .map_err(|e| format!("malformed boolean query - {e} (in '{}')", line.trim()))?;
        let mut parser = Parser { tokens, pos: 0 };
        let root = parser.parse_expression()?;
        if parser.pos != parser.tokens.len() {
            return Err(format!(
                "malformed boolean query - unexpected trailing input (in '{}')",
                line.trim()
            ));
        }

        let explanation = root.explanation().to_string();
        Ok(Filter::new(line, explanation, move |task, ctx| {
            root.matches(task, ctx)
        }))
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    And,
    Or,
    Not,
    /// The text between one balanced pair of parentheses.
    Group(String),
}

fn tokenize(line: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '(' {
            let mut depth = 1;
            let mut j = i + 1;
            let mut inner = String::new();
            while j < chars.len() && depth > 0 {
                match chars[j] {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                if depth > 0 {
                    inner.push(chars[j]);
                }
                j += 1;
            }
            if depth != 0 {
                return Err("unbalanced parentheses".to_string());
            }
            tokens.push(Token::Group(inner.trim().to_string()));
            i = j;
            continue;
        }

        let mut j = i;
        let mut word = String::new();
        while j < chars.len() && !chars[j].is_whitespace() && chars[j] != '(' {
            word.push(chars[j]);
            j += 1;
        }
        match word.as_str() {
            "AND" => tokens.push(Token::And),
            "OR" => tokens.push(Token::Or),
            "NOT" => tokens.push(Token::Not),
            _ => return Err(format!("unexpected text '{word}' outside parentheses")),
        }
        i = j;
    }

    Ok(tokens)
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// expression := and_chain (OR and_chain)*
    fn parse_expression(&mut self) -> Result<Filter, String> {
        let mut left = self.parse_and_chain()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and_chain()?;
            left = combine_or(left, right);
        }
        Ok(left)
    }

    /// and_chain := unary (AND unary)*
    fn parse_and_chain(&mut self) -> Result<Filter, String> {
        let mut left = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.parse_unary()?;
            left = combine_and(left, right);
        }
        Ok(left)
    }

    /// unary := NOT unary | group
    fn parse_unary(&mut self) -> Result<Filter, String> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(combine_not(inner));
        }
        match self.peek().cloned() {
            Some(Token::Group(text)) => {
                self.advance();
                parse_leaf(&text)
            }
            Some(token) => Err(format!("expected a parenthesized filter, found {token:?}")),
            None => Err("expected a parenthesized filter, found end of line".to_string()),
        }
    }
}

/// A parenthesized leaf is either a nested boolean expression or a plain
/// filter line handled by the field registry.
fn parse_leaf(text: &str) -> Result<Filter, String> {
    if let Ok(tokens) = tokenize(text) {
        if !tokens.is_empty() {
            let mut parser = Parser { tokens, pos: 0 };
            let filter = parser.parse_expression()?;
            if parser.pos == parser.tokens.len() {
                return Ok(filter);
            }
            return Err(format!("malformed boolean sub-expression '{text}'"));
        }
    }

    match parse_filter(text) {
        Some(result) => result,
        None => Err(format!("couldn't parse sub-expression '{text}'")),
    }
}

fn combine_and(a: Filter, b: Filter) -> Filter {
    let explanation = format!("({}) AND ({})", a.explanation(), b.explanation());
    Filter::new("", explanation, move |task, ctx| {
        a.matches(task, ctx) && b.matches(task, ctx)
    })
}

fn combine_or(a: Filter, b: Filter) -> Filter {
    let explanation = format!("({}) OR ({})", a.explanation(), b.explanation());
    Filter::new("", explanation, move |task, ctx| {
        a.matches(task, ctx) || b.matches(task, ctx)
    })
}

fn combine_not(inner: Filter) -> Filter {
    let explanation = format!("NOT ({})", inner.explanation());
    Filter::new("", explanation, move |task, ctx| !inner.matches(task, ctx))
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::filter_matches;
    use super::super::parse_filter;
    use crate::task::Priority;
    use crate::testing::TaskBuilder;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_and() {
        let task = TaskBuilder::new("urgent errand #errands")
            .due(date(2024, 1, 5))
            .build();
        assert!(filter_matches(
            "(due before 2024-01-10) AND (tags include errands)",
            &task
        ));
        assert!(!filter_matches(
            "(due before 2024-01-10) AND (tags include work)",
            &task
        ));
    }

    #[test]
    fn test_or() {
        let task = TaskBuilder::new("no tags here").due(date(2024, 1, 5)).build();
        assert!(filter_matches(
            "(tags include work) OR (due before 2024-01-10)",
            &task
        ));
        assert!(!filter_matches(
            "(tags include work) OR (due before 2024-01-01)",
            &task
        ));
    }

    #[test]
    fn test_not() {
        let task = TaskBuilder::new("quiet task").build();
        assert!(filter_matches("NOT (description includes loud)", &task));
        assert!(!filter_matches("NOT (description includes quiet)", &task));
    }

    #[test]
    fn test_precedence_not_binds_tighter_than_and() {
        let task = TaskBuilder::new("keep").priority(Priority::High).build();
        // NOT applies to the first group only.
        assert!(filter_matches(
            "NOT (description includes drop) AND (priority is high)",
            &task
        ));
    }

    #[test]
    fn test_nested_parentheses() {
        let task = TaskBuilder::new("x #home").due(date(2024, 1, 5)).build();
        assert!(filter_matches(
            "((due before 2024-01-10) OR (tags include work)) AND (tags include home)",
            &task
        ));
    }

    #[test]
    fn test_unbalanced_parentheses_error() {
        let result = parse_filter("(due before 2024-01-10").unwrap();
        assert!(result.unwrap_err().contains("unbalanced"));
    }

    #[test]
    fn test_bad_leaf_error() {
        let result = parse_filter("(glorb by whatever) AND (not done)").unwrap();
        assert!(result.unwrap_err().contains("glorb by whatever"));
    }

    #[test]
    fn test_lowercase_operators_are_not_operators() {
        let result = parse_filter("(not done) and (is recurring)").unwrap();
        assert!(result.unwrap_err().contains("and"));
    }
}
