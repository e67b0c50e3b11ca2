//! The signifier codec: between a task's structured fields and the body
//! text of its markdown line.
//!
//! Fields are marked by emoji signifiers (`📅 2024-01-10`, `⏫`, `🔁 every
//! week`). Serialization emits components in a fixed, documented order;
//! deserialization repeatedly strips recognized signifiers from the *end*
//! of the body, which lets users interleave tags and signifiers freely.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::date::DATE_FORMAT;
use crate::task::components::hashtag_from_end_regex;
use crate::task::recurrence::{Occurrence, Recurrence};
use crate::task::Priority;

// ============================================================================
// Symbols
// ============================================================================

pub const PRIORITY_HIGHEST: &str = "🔺";
pub const PRIORITY_HIGH: &str = "⏫";
pub const PRIORITY_MEDIUM: &str = "🔼";
pub const PRIORITY_LOW: &str = "🔽";
pub const PRIORITY_LOWEST: &str = "⏬";

pub const CREATED_DATE_SYMBOL: &str = "➕";
pub const START_DATE_SYMBOL: &str = "🛫";
pub const SCHEDULED_DATE_SYMBOL: &str = "⏳";
pub const DUE_DATE_SYMBOL: &str = "📅";
pub const DONE_DATE_SYMBOL: &str = "✅";
pub const CANCELLED_DATE_SYMBOL: &str = "❌";
pub const RECURRENCE_SYMBOL: &str = "🔁";
pub const ID_SYMBOL: &str = "🆔";
pub const DEPENDS_ON_SYMBOL: &str = "⛔";

fn priority_symbol(priority: Priority) -> &'static str {
    match priority {
        Priority::Highest => PRIORITY_HIGHEST,
        Priority::High => PRIORITY_HIGH,
        Priority::Medium => PRIORITY_MEDIUM,
        Priority::Low => PRIORITY_LOW,
        Priority::Lowest => PRIORITY_LOWEST,
        Priority::None => "",
    }
}

fn priority_from_symbol(symbol: &str) -> Priority {
    match symbol {
        PRIORITY_HIGHEST => Priority::Highest,
        PRIORITY_HIGH => Priority::High,
        PRIORITY_MEDIUM => Priority::Medium,
        PRIORITY_LOW => Priority::Low,
        PRIORITY_LOWEST => Priority::Lowest,
        _ => Priority::None,
    }
}

// ============================================================================
// Trailing-Signifier Patterns
// ============================================================================
// All patterns are anchored at the end of the body because signifiers are
// matched and removed from the end until none are left. Alternate emoji
// variants (⌛, 📆, 🗓) are accepted on input; the canonical symbol is
// written on output.

macro_rules! trailing_regex {
    ($name:ident, $pattern:literal) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("signifier pattern is valid"))
        }
    };
}

trailing_regex!(priority_regex, r"([🔺⏫🔼🔽⏬])$");
trailing_regex!(done_date_regex, r"✅ *(\d{4}-\d{2}-\d{2})$");
trailing_regex!(cancelled_date_regex, r"❌ *(\d{4}-\d{2}-\d{2})$");
trailing_regex!(due_date_regex, r"[📅📆🗓] *(\d{4}-\d{2}-\d{2})$");
trailing_regex!(scheduled_date_regex, r"[⏳⌛] *(\d{4}-\d{2}-\d{2})$");
trailing_regex!(start_date_regex, r"🛫 *(\d{4}-\d{2}-\d{2})$");
trailing_regex!(created_date_regex, r"➕ *(\d{4}-\d{2}-\d{2})$");
trailing_regex!(recurrence_regex, r"🔁 ?([a-zA-Z0-9, !]+)$");
trailing_regex!(id_regex, r"🆔 *([a-z0-9]+)$");
trailing_regex!(depends_on_regex, r"⛔ *([a-z0-9]+( *, *[a-z0-9]+)*)$");

/// Failsafe bound on the strip-from-the-end loop so pathological input can
/// never spin forever.
const MAX_SIGNIFIER_RUNS: usize = 20;

// ============================================================================
// Deserialization
// ============================================================================

/// The fields recovered from a task body by [`deserialize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDetails {
    pub description: String,
    pub priority: Priority,
    pub created_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub done_date: Option<NaiveDate>,
    pub cancelled_date: Option<NaiveDate>,
    pub recurrence: Option<Recurrence>,
    pub id: String,
    pub depends_on: Vec<String>,
    pub tags: Vec<String>,
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Parse the structured fields out of a task body (the text after the
/// checkbox, block link already removed).
///
/// Signifiers are matched and stripped from the end of the body until
/// nothing matches or [`MAX_SIGNIFIER_RUNS`] is reached. When the same kind
/// of signifier appears more than once, every occurrence is stripped and
/// each overwrites the captured value, so the occurrence closest to the
/// start of the line ends up in the field. This is documented behaviour,
/// not validated as an error.
///
/// Tags encountered while stripping are re-appended to the description so
/// interleaved tags keep their natural reading order.
pub fn deserialize(body: &str) -> TaskDetails {
    let mut line = body.trim().to_string();
    let mut details = TaskDetails::default();
    // Rule text is captured but not resolved until stripping has finished:
    // building a Recurrence needs the reference dates, which may appear
    // earlier in the line than the rule itself.
    let mut recurrence_rule = String::new();
    let mut trailing_tags = String::new();

    let mut runs = 0;
    loop {
        let mut matched = false;

        if let Some(caps) = priority_regex().captures(&line) {
            details.priority = priority_from_symbol(caps.get(1).map_or("", |m| m.as_str()));
            line = strip_match(&line, priority_regex());
            matched = true;
        }

        for (regex, slot) in [
            (done_date_regex(), &mut details.done_date),
            (cancelled_date_regex(), &mut details.cancelled_date),
            (due_date_regex(), &mut details.due_date),
            (scheduled_date_regex(), &mut details.scheduled_date),
            (start_date_regex(), &mut details.start_date),
            (created_date_regex(), &mut details.created_date),
        ] {
            if let Some(caps) = regex.captures(&line) {
                *slot = parse_date(&caps[1]);
                line = strip_match(&line, regex);
                matched = true;
            }
        }

        if let Some(caps) = recurrence_regex().captures(&line) {
            recurrence_rule = caps[1].trim().to_string();
            line = strip_match(&line, recurrence_regex());
            matched = true;
        }

        if let Some(caps) = id_regex().captures(&line) {
            details.id = caps[1].to_string();
            line = strip_match(&line, id_regex());
            matched = true;
        }

        if let Some(caps) = depends_on_regex().captures(&line) {
            details.depends_on = caps[1]
                .split(',')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect();
            line = strip_match(&line, depends_on_regex());
            matched = true;
        }

        if let Some(found) = hashtag_from_end_regex().find(&line) {
            let tag = found.as_str().trim().to_string();
            line.truncate(found.start());
            line = line.trim().to_string();
            // Prepend: matching runs right-to-left, the description reads
            // left-to-right.
            trailing_tags = if trailing_tags.is_empty() {
                tag
            } else {
                format!("{tag} {trailing_tags}")
            };
            matched = true;
        }

        runs += 1;
        if !matched || runs > MAX_SIGNIFIER_RUNS {
            break;
        }
    }

    if !recurrence_rule.is_empty() {
        details.recurrence = Recurrence::from_text(
            &recurrence_rule,
            Occurrence::new(
                details.start_date,
                details.scheduled_date,
                details.due_date,
            ),
        );
    }

    if !trailing_tags.is_empty() {
        line = format!("{line} {trailing_tags}");
    }

    details.tags = super::components::extract_hashtags(&line);
    details.description = line;
    details
}

fn strip_match(line: &str, regex: &Regex) -> String {
    regex.replace(line, "").trim().to_string()
}

// ============================================================================
// Serialization
// ============================================================================

/// Inputs to [`serialize`]: the field values of a task, borrowed.
///
/// Kept separate from `Task` so the codec stays independent of the entity
/// type (and trivially testable).
#[derive(Debug, Clone, Copy)]
pub struct SerializeParts<'a> {
    pub description: &'a str,
    pub priority: Priority,
    pub created_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub done_date: Option<NaiveDate>,
    pub cancelled_date: Option<NaiveDate>,
    pub recurrence: Option<&'a Recurrence>,
    pub id: &'a str,
    pub depends_on: &'a [String],
    pub block_link: &'a str,
    /// An inferred scheduled date came from the file name, not the text,
    /// and must not be written back.
    pub scheduled_date_is_inferred: bool,
}

/// Flatten task fields back into body text.
///
/// Component order is a documented contract: description, priority,
/// created, start, scheduled, due, cancelled, done, recurrence, depends-on,
/// id, block link. The block link, when present, is always last.
pub fn serialize(parts: &SerializeParts<'_>) -> String {
    let mut out = String::from(parts.description);

    let symbol = priority_symbol(parts.priority);
    if !symbol.is_empty() {
        out.push(' ');
        out.push_str(symbol);
    }

    let scheduled = if parts.scheduled_date_is_inferred {
        None
    } else {
        parts.scheduled_date
    };
    let dates = [
        (CREATED_DATE_SYMBOL, parts.created_date),
        (START_DATE_SYMBOL, parts.start_date),
        (SCHEDULED_DATE_SYMBOL, scheduled),
        (DUE_DATE_SYMBOL, parts.due_date),
        (CANCELLED_DATE_SYMBOL, parts.cancelled_date),
        (DONE_DATE_SYMBOL, parts.done_date),
    ];
    for (symbol, date) in dates {
        if let Some(date) = date {
            out.push_str(&format!(" {symbol} {}", date.format(DATE_FORMAT)));
        }
    }

    if let Some(recurrence) = parts.recurrence {
        out.push_str(&format!(" {RECURRENCE_SYMBOL} {}", recurrence.to_text()));
    }

    if !parts.depends_on.is_empty() {
        out.push_str(&format!(
            " {DEPENDS_ON_SYMBOL} {}",
            parts.depends_on.join(",")
        ));
    }

    if !parts.id.is_empty() {
        out.push_str(&format!(" {ID_SYMBOL} {}", parts.id));
    }

    out.push_str(parts.block_link);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_deserialize_plain_description() {
        let details = deserialize("Buy milk");
        assert_eq!(details.description, "Buy milk");
        assert_eq!(details.priority, Priority::None);
        assert!(details.due_date.is_none());
        assert!(details.tags.is_empty());
    }

    #[test]
    fn test_deserialize_due_date() {
        let details = deserialize("Buy milk 📅 2024-01-10");
        assert_eq!(details.description, "Buy milk");
        assert_eq!(details.due_date, Some(date(2024, 1, 10)));
    }

    #[test]
    fn test_deserialize_all_signifiers() {
        let details = deserialize(
            "Ship release ⏫ ➕ 2024-01-01 🛫 2024-01-02 ⏳ 2024-01-03 📅 2024-01-05 🔁 every week",
        );
        assert_eq!(details.description, "Ship release");
        assert_eq!(details.priority, Priority::High);
        assert_eq!(details.created_date, Some(date(2024, 1, 1)));
        assert_eq!(details.start_date, Some(date(2024, 1, 2)));
        assert_eq!(details.scheduled_date, Some(date(2024, 1, 3)));
        assert_eq!(details.due_date, Some(date(2024, 1, 5)));
        let recurrence = details.recurrence.unwrap();
        assert_eq!(recurrence.to_text(), "every week");
        assert_eq!(
            recurrence.occurrence().reference_date(),
            Some(date(2024, 1, 5))
        );
    }

    #[test]
    fn test_deserialize_signifiers_in_any_order() {
        let details = deserialize("Pay rent 📅 2024-02-01 🔼 ✅ 2024-01-28");
        assert_eq!(details.description, "Pay rent");
        assert_eq!(details.priority, Priority::Medium);
        assert_eq!(details.due_date, Some(date(2024, 2, 1)));
        assert_eq!(details.done_date, Some(date(2024, 1, 28)));
    }

    #[test]
    fn test_deserialize_alternate_emoji_variants() {
        let details = deserialize("Variant ⌛ 2024-01-03 📆 2024-01-05");
        assert_eq!(details.scheduled_date, Some(date(2024, 1, 3)));
        assert_eq!(details.due_date, Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_deserialize_interleaved_tags_restored_in_order() {
        let details = deserialize("Do something #tag1 📅 2024-01-10 #tag2 🛫 2024-01-05");
        assert_eq!(details.description, "Do something #tag1 #tag2");
        assert_eq!(details.tags, vec!["#tag1", "#tag2"]);
        assert_eq!(details.due_date, Some(date(2024, 1, 10)));
        assert_eq!(details.start_date, Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_deserialize_duplicate_signifier_leftmost_wins() {
        // Right-to-left stripping overwrites the capture each time, so the
        // occurrence closest to the start of the line ends up in the field.
        let details = deserialize("Twice 📅 2024-01-01 📅 2024-02-02");
        assert_eq!(details.due_date, Some(date(2024, 1, 1)));
        assert_eq!(details.description, "Twice");
    }

    #[test]
    fn test_deserialize_id_and_depends_on() {
        let details = deserialize("Deploy ⛔ abc123,def456 🆔 xyz789");
        assert_eq!(details.description, "Deploy");
        assert_eq!(details.id, "xyz789");
        assert_eq!(details.depends_on, vec!["abc123", "def456"]);
    }

    #[test]
    fn test_deserialize_invalid_recurrence_is_dropped() {
        let details = deserialize("Water plants 🔁 every blarg");
        assert_eq!(details.description, "Water plants");
        assert!(details.recurrence.is_none());
    }

    #[test]
    fn test_deserialize_unrecognized_trailing_text_stays_in_description() {
        let details = deserialize("Call mom maybe tomorrow");
        assert_eq!(details.description, "Call mom maybe tomorrow");
    }

    #[test]
    fn test_serialize_component_order() {
        let recurrence =
            Recurrence::from_text("every week", Occurrence::new(None, None, Some(date(2024, 1, 5))))
                .unwrap();
        let depends_on = vec!["abc123".to_string()];
        let parts = SerializeParts {
            description: "Ship release",
            priority: Priority::High,
            created_date: Some(date(2024, 1, 1)),
            start_date: Some(date(2024, 1, 2)),
            scheduled_date: Some(date(2024, 1, 3)),
            due_date: Some(date(2024, 1, 5)),
            done_date: None,
            cancelled_date: None,
            recurrence: Some(&recurrence),
            id: "xyz789",
            depends_on: &depends_on,
            block_link: " ^ship",
            scheduled_date_is_inferred: false,
        };
        assert_eq!(
            serialize(&parts),
            "Ship release ⏫ ➕ 2024-01-01 🛫 2024-01-02 ⏳ 2024-01-03 📅 2024-01-05 \
             🔁 every week ⛔ abc123 🆔 xyz789 ^ship"
        );
    }

    #[test]
    fn test_serialize_inferred_scheduled_date_omitted() {
        let parts = SerializeParts {
            description: "From daily note",
            priority: Priority::None,
            created_date: None,
            start_date: None,
            scheduled_date: Some(date(2024, 1, 3)),
            due_date: None,
            done_date: None,
            cancelled_date: None,
            recurrence: None,
            id: "",
            depends_on: &[],
            block_link: "",
            scheduled_date_is_inferred: true,
        };
        assert_eq!(serialize(&parts), "From daily note");
    }

    #[test]
    fn test_roundtrip_through_codec() {
        let body = "Do something #tag1 #tag2 🔼 🛫 2024-01-02 📅 2024-01-10";
        let details = deserialize(body);
        let parts = SerializeParts {
            description: &details.description,
            priority: details.priority,
            created_date: details.created_date,
            start_date: details.start_date,
            scheduled_date: details.scheduled_date,
            due_date: details.due_date,
            done_date: details.done_date,
            cancelled_date: details.cancelled_date,
            recurrence: details.recurrence.as_ref(),
            id: &details.id,
            depends_on: &details.depends_on,
            block_link: "",
            scheduled_date_is_inferred: false,
        };
        assert_eq!(serialize(&parts), body);
    }
}
