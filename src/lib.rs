//! taskdown - Markdown checklist task engine
//!
//! A pure, synchronous core for note-taking hosts: it recognizes
//! specially-formatted checklist lines as tasks, extracts structured
//! fields (dates, priority, recurrence, dependencies, tags) from emoji
//! signifiers, and runs a small query language that filters, sorts and
//! groups tasks into report-ready results.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`task`] - The task-line grammar, the signifier codec, the immutable
//!   `Task` entity with its state transitions, recurrence, urgency and
//!   dependency helpers
//! - [`status`] - Status symbols, semantic types and the cycling registry
//! - [`query`] - The query language: statement parsing, filters, sorters,
//!   groupers, and the filter/sort/group pipeline
//! - [`settings`] - The host-provided settings snapshot and global filter
//! - [`date`] - Date comparison and relative date expressions
//! - [`error`] - Custom error types and handling
//! - [`testing`] - Fixtures for building tasks in tests
//!
//! Everything is driven by explicit context objects: the host passes in
//! settings, a status registry and a "today" value, and gets back plain
//! values. There is no I/O, no clock access and no global state, so
//! concurrent queries over a shared task collection are safe by
//! construction.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use taskdown::{
//!     ParseContext, Query, QueryContext, QueryFile, Settings, StatusRegistry, Task,
//!     TaskLocation,
//! };
//!
//! let settings = Settings::default();
//! let registry = StatusRegistry::new();
//! let ctx = ParseContext::new(&settings, &registry);
//!
//! let task = Task::from_line(
//!     "- [ ] Buy milk 📅 2024-01-10",
//!     TaskLocation::from_unknown_position("inbox.md"),
//!     None,
//!     &ctx,
//! )
//! .expect("line is a task");
//! assert_eq!(task.description(), "Buy milk");
//!
//! let query = Query::parse(
//!     "due before 2024-01-15\nsort by due",
//!     &QueryFile::new("report.md"),
//!     &settings,
//! );
//! let today = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
//! let result = query.apply_to_tasks(&[task], &QueryContext::new(today, &settings));
//! assert_eq!(result.task_count(), 1);
//! ```

pub mod date;
pub mod error;
pub mod query;
pub mod settings;
pub mod status;
pub mod task;
pub mod testing;

// Re-export commonly used types
pub use error::{Result, TaskdownError};

// Re-export task types
pub use task::{
    extract_components, extract_hashtags, Occurrence, ParseContext, Priority, Recurrence, Task,
    TaskComponents, TaskLocation, TaskOverrides,
};

// Re-export status types
pub use status::{Status, StatusConfiguration, StatusRegistry, StatusType};

// Re-export query types
pub use query::{
    Field, Filter, GroupHeading, Grouper, LayoutOptions, Query, QueryContext, QueryFile,
    QueryResult, SearchContext, Sorter, TaskGroup, TaskGroups,
};

// Re-export settings types
pub use settings::{DebugSettings, GlobalFilter, Settings};
