//! Task statuses: the symbol inside the checkbox brackets, its semantic
//! type, and the transition to the next status when a task is toggled.
//!
//! Statuses are plain data. The set of known statuses, and the cycles
//! between them, live in the [`StatusRegistry`].
//!
//! # Example
//!
//! ```rust
//! use taskdown::status::{Status, StatusType};
//!
//! let todo = Status::make_todo();
//! assert_eq!(todo.symbol(), ' ');
//! assert_eq!(todo.next_symbol(), 'x');
//! assert_eq!(todo.status_type(), StatusType::Todo);
//! ```

mod registry;

pub use registry::StatusRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Status Type
// ============================================================================

/// The semantic type of a status, independent of its symbol.
///
/// Several symbols may share a type; filters and grouping work on types so
/// that custom statuses behave sensibly without per-symbol configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusType {
    Todo,
    InProgress,
    Done,
    Cancelled,
    NonTask,
}

impl StatusType {
    /// Numeric prefix used to order types in group headings: in-progress
    /// work first, then open, then closed.
    pub fn group_order(self) -> u8 {
        match self {
            Self::InProgress => 1,
            Self::Todo => 2,
            Self::Done => 3,
            Self::Cancelled => 4,
            Self::NonTask => 5,
        }
    }

    /// Group label with a hidden `%%N%%` prefix controlling sort order.
    /// The `%%..%%` comment is invisible once rendered by the host.
    pub fn group_text(self) -> String {
        format!("%%{}%%{}", self.group_order(), self)
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Cancelled => "CANCELLED",
            Self::NonTask => "NON_TASK",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Status Configuration
// ============================================================================

/// Host-persistable description of one status: the checkbox symbol, a
/// display name, the symbol toggling advances to, and the semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfiguration {
    pub symbol: char,
    pub name: String,
    pub next_symbol: char,
    pub status_type: StatusType,
}

impl StatusConfiguration {
    #[must_use]
    pub fn new(
        symbol: char,
        name: impl Into<String>,
        next_symbol: char,
        status_type: StatusType,
    ) -> Self {
        Self {
            symbol,
            name: name.into(),
            next_symbol,
            status_type,
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// One possible state of a task.
///
/// Two `Status` values are interchangeable when their symbol and type agree,
/// even if constructed separately; see [`Status::identical_to`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    configuration: StatusConfiguration,
}

impl Status {
    #[must_use]
    pub fn new(configuration: StatusConfiguration) -> Self {
        Self { configuration }
    }

    /// The default Todo status. Goes to Done when toggled.
    #[must_use]
    pub fn make_todo() -> Self {
        Self::new(StatusConfiguration::new(' ', "Todo", 'x', StatusType::Todo))
    }

    /// The default Done status. Goes to Todo when toggled.
    #[must_use]
    pub fn make_done() -> Self {
        Self::new(StatusConfiguration::new('x', "Done", ' ', StatusType::Done))
    }

    /// The default In Progress status. Goes to Done when toggled.
    #[must_use]
    pub fn make_in_progress() -> Self {
        Self::new(StatusConfiguration::new(
            '/',
            "In Progress",
            'x',
            StatusType::InProgress,
        ))
    }

    /// The default Cancelled status. Goes to Todo when toggled.
    #[must_use]
    pub fn make_cancelled() -> Self {
        Self::new(StatusConfiguration::new(
            '-',
            "Cancelled",
            ' ',
            StatusType::Cancelled,
        ))
    }

    /// Create a single-use status for a symbol the registry does not know.
    ///
    /// Unknown symbols are treated as open work: the type is Todo and
    /// toggling advances to 'x'. The synthesized status is not added to the
    /// registry.
    #[must_use]
    pub fn make_unknown(symbol: char) -> Self {
        Self::new(StatusConfiguration::new(
            symbol,
            "Unknown",
            'x',
            StatusType::Todo,
        ))
    }

    pub fn symbol(&self) -> char {
        self.configuration.symbol
    }

    pub fn name(&self) -> &str {
        &self.configuration.name
    }

    pub fn next_symbol(&self) -> char {
        self.configuration.next_symbol
    }

    pub fn status_type(&self) -> StatusType {
        self.configuration.status_type
    }

    pub fn configuration(&self) -> &StatusConfiguration {
        &self.configuration
    }

    /// Whether the status type is [`StatusType::Done`].
    pub fn is_completed(&self) -> bool {
        self.status_type() == StatusType::Done
    }

    pub fn is_cancelled(&self) -> bool {
        self.status_type() == StatusType::Cancelled
    }

    /// Two statuses behave identically when symbol and type agree; the
    /// display name and next-symbol do not affect matching or equality of
    /// parsed tasks.
    pub fn identical_to(&self, other: &Status) -> bool {
        self.symbol() == other.symbol() && self.status_type() == other.status_type()
    }

    /// One-line summary for registry reports.
    pub fn preview_text(&self) -> String {
        format!(
            "- [{}] => [{}], name: '{}', type: '{}'.",
            self.symbol(),
            self.next_symbol(),
            self.name(),
            self.status_type(),
        )
    }
}
