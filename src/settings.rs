//! Settings snapshot consumed by the parser and the query pipeline.
//!
//! The host application owns persistence and hands the core a plain
//! [`Settings`] value. Nothing in this module is a process-wide singleton:
//! parsing and query entry points take the settings they need as arguments,
//! which keeps tests isolated and concurrent queries safe by construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::status::StatusConfiguration;

// ============================================================================
// Global Filter
// ============================================================================

/// A required substring (usually a tag such as `#task`) that a checklist
/// item's text must contain to be treated as a task at all.
///
/// An empty filter matches every checklist item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalFilter {
    value: String,
    /// Remove the filter token from descriptions when parsing.
    pub remove_from_description: bool,
}

impl GlobalFilter {
    /// Create a filter from its token text.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            remove_from_description: false,
        }
    }

    /// Enable removal of the filter token from parsed descriptions.
    #[must_use]
    pub fn with_removal(mut self) -> Self {
        self.remove_from_description = true;
        self
    }

    /// The filter token text.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Whether a task body contains the filter. An empty filter matches
    /// everything.
    pub fn included_in(&self, description: &str) -> bool {
        description.contains(&self.value)
    }

    /// Whether a tag is exactly the global filter token.
    pub fn equals(&self, tag: &str) -> bool {
        self.value == tag
    }

    /// Remove the filter from a description if removal is enabled.
    pub fn remove_depending_on_settings(&self, description: &str) -> String {
        if self.remove_from_description {
            self.remove_as_word_from(description)
        } else {
            description.to_string()
        }
    }

    /// Remove the filter only where it appears as a separate word, so that
    /// nested tags like `#task/subtag` are kept untouched.
    ///
    /// Known quirk, kept deliberately: when the same filter token appears
    /// several times in one description, adjacent repeats are only partially
    /// removed (the word-boundary whitespace is consumed by the previous
    /// match) and only the first double-space left behind is collapsed.
    pub fn remove_as_word_from(&self, description: &str) -> String {
        if self.is_empty() {
            return description.to_string();
        }

        let pattern = format!(r"(^|\s){}($|\s)", regex::escape(&self.value));
        let re = regex::Regex::new(&pattern).expect("escaped filter is a valid pattern");

        if re.is_match(description) {
            re.replace_all(description, "$1$2")
                .replacen("  ", " ", 1)
                .trim()
                .to_string()
        } else {
            description.to_string()
        }
    }

    /// Prepend the filter to a description, for hosts that add new tasks.
    pub fn prepend_to(&self, description: &str) -> String {
        format!("{} {}", self.value, description)
    }
}

// ============================================================================
// Debug Settings
// ============================================================================

/// Debug toggles that alter query behaviour for troubleshooting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugSettings {
    /// Ignore `sort by` instructions, leaving only the default ordering.
    pub ignore_sort_instructions: bool,
}

// ============================================================================
// Settings
// ============================================================================

/// Snapshot of all user options the core consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Required token for a checklist item to count as a task.
    pub global_filter: GlobalFilter,
    /// Query source text prepended to every query in the vault.
    pub global_query: String,
    /// Stamp the done date when a task transitions into DONE.
    pub set_done_date: bool,
    /// Stamp a created date onto new recurrences.
    pub set_created_date: bool,
    /// Stamp the cancelled date when a task transitions into CANCELLED.
    pub set_cancelled_date: bool,
    /// Write the next recurrence below the completed task instead of above.
    pub recurrence_on_next_line: bool,
    /// User-defined statuses appended to the core ones.
    pub custom_statuses: Vec<StatusConfiguration>,
    /// Named query fragments usable via `preset <name>`.
    pub presets: BTreeMap<String, String>,
    pub debug: DebugSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_filter: GlobalFilter::default(),
            global_query: String::new(),
            set_done_date: true,
            set_created_date: false,
            set_cancelled_date: true,
            recurrence_on_next_line: false,
            custom_statuses: Vec::new(),
            presets: BTreeMap::new(),
            debug: DebugSettings::default(),
        }
    }
}
