//! Task priority levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority of a task, from `Highest` down to `Lowest`.
///
/// `None` is the default for tasks without a priority signifier; note that
/// its user-facing name is "Normal" - the absence of a marker does not mean
/// the task is unimportant, only unmarked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Highest,
    High,
    Medium,
    #[default]
    None,
    Low,
    Lowest,
}

impl Priority {
    /// All priorities, from most to least urgent.
    pub const ALL: [Priority; 6] = [
        Priority::Highest,
        Priority::High,
        Priority::Medium,
        Priority::None,
        Priority::Low,
        Priority::Lowest,
    ];

    /// Numeric rank used for sorting: Highest = 0 .. Lowest = 5.
    pub fn number(self) -> u8 {
        match self {
            Self::Highest => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::None => 3,
            Self::Low => 4,
            Self::Lowest => 5,
        }
    }

    /// Display name; `None` shows as "Normal".
    pub fn name(self) -> &'static str {
        match self {
            Self::Highest => "Highest",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::None => "Normal",
            Self::Low => "Low",
            Self::Lowest => "Lowest",
        }
    }

    /// Parse a priority from its display name, case-insensitively.
    /// Both "normal" and "none" map to [`Priority::None`].
    pub fn parse_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "highest" => Some(Self::Highest),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "normal" | "none" => Some(Self::None),
            "low" => Some(Self::Low),
            "lowest" => Some(Self::Lowest),
            _ => None,
        }
    }

    /// Group label with a hidden numeric prefix so that headings sort from
    /// Highest to Lowest. The `%%..%%` comment is hidden by the host when
    /// rendered.
    pub fn group_text(self) -> String {
        format!("%%{}%%{} priority", self.number(), self.name())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    /// Orders by urgency rank: `Highest < High < ... < Lowest`, matching
    /// ascending sort putting the most urgent work first.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.number().cmp(&other.number())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_numbers_are_strictly_increasing() {
        let numbers: Vec<u8> = Priority::ALL.iter().map(|p| p.number()).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_none_displays_as_normal() {
        assert_eq!(Priority::None.name(), "Normal");
        assert_eq!(Priority::None.to_string(), "Normal");
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(Priority::parse_name("high"), Some(Priority::High));
        assert_eq!(Priority::parse_name("NORMAL"), Some(Priority::None));
        assert_eq!(Priority::parse_name("none"), Some(Priority::None));
        assert_eq!(Priority::parse_name("urgent"), None);
    }

    #[test]
    fn test_ordering_puts_highest_first() {
        let mut priorities = vec![Priority::Low, Priority::Highest, Priority::None];
        priorities.sort();
        assert_eq!(
            priorities,
            vec![Priority::Highest, Priority::None, Priority::Low]
        );
    }

    #[test]
    fn test_group_text() {
        assert_eq!(Priority::Highest.group_text(), "%%0%%Highest priority");
        assert_eq!(Priority::None.group_text(), "%%3%%Normal priority");
    }
}
