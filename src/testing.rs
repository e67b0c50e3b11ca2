//! Testing infrastructure: fixtures for building tasks programmatically.
//!
//! The builder composes a markdown line and runs it through the real
//! parser, so fixture tasks can never drift from what parsing produces.
//! Hosts embedding the crate are welcome to use it in their own tests.

use chrono::NaiveDate;

use crate::settings::Settings;
use crate::status::StatusRegistry;
use crate::task::serializer::{serialize, SerializeParts};
use crate::task::{Occurrence, ParseContext, Priority, Recurrence, Task, TaskLocation};

/// A fresh default settings/registry pair for tests.
#[must_use]
pub fn default_context() -> (Settings, StatusRegistry) {
    (Settings::default(), StatusRegistry::new())
}

/// Builds a [`Task`] from field values by serializing them into a markdown
/// line and parsing it back.
///
/// ```rust
/// use taskdown::testing::TaskBuilder;
///
/// let task = TaskBuilder::new("water plants")
///     .recurrence("every week")
///     .build();
/// assert!(task.is_recurring());
/// ```
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    description: String,
    status_symbol: char,
    priority: Priority,
    created_date: Option<NaiveDate>,
    start_date: Option<NaiveDate>,
    scheduled_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    done_date: Option<NaiveDate>,
    cancelled_date: Option<NaiveDate>,
    recurrence_text: Option<String>,
    id: String,
    depends_on: Vec<String>,
    path: String,
}

impl TaskBuilder {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            status_symbol: ' ',
            priority: Priority::None,
            created_date: None,
            start_date: None,
            scheduled_date: None,
            due_date: None,
            done_date: None,
            cancelled_date: None,
            recurrence_text: None,
            id: String::new(),
            depends_on: Vec::new(),
            path: "test.md".to_string(),
        }
    }

    #[must_use]
    pub fn status_symbol(mut self, symbol: char) -> Self {
        self.status_symbol = symbol;
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn created(mut self, date: NaiveDate) -> Self {
        self.created_date = Some(date);
        self
    }

    #[must_use]
    pub fn start(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    #[must_use]
    pub fn scheduled(mut self, date: NaiveDate) -> Self {
        self.scheduled_date = Some(date);
        self
    }

    #[must_use]
    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    #[must_use]
    pub fn done(mut self, date: NaiveDate) -> Self {
        self.done_date = Some(date);
        self
    }

    #[must_use]
    pub fn cancelled(mut self, date: NaiveDate) -> Self {
        self.cancelled_date = Some(date);
        self
    }

    /// Recurrence rule text, e.g. `"every week"`.
    #[must_use]
    pub fn recurrence(mut self, rule_text: impl Into<String>) -> Self {
        self.recurrence_text = Some(rule_text.into());
        self
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn depends_on(mut self, depends_on: Vec<String>) -> Self {
        self.depends_on = depends_on;
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Serialize the fields into a line and parse it with default settings.
    ///
    /// # Panics
    ///
    /// Panics if the composed line does not parse, which indicates a bug in
    /// the builder or an unparseable recurrence rule.
    #[must_use]
    pub fn build(&self) -> Task {
        let recurrence = self.recurrence_text.as_deref().map(|text| {
            Recurrence::from_text(
                text,
                Occurrence::new(self.start_date, self.scheduled_date, self.due_date),
            )
            .expect("builder recurrence rule must be valid")
        });

        let body = serialize(&SerializeParts {
            description: &self.description,
            priority: self.priority,
            created_date: self.created_date,
            start_date: self.start_date,
            scheduled_date: self.scheduled_date,
            due_date: self.due_date,
            done_date: self.done_date,
            cancelled_date: self.cancelled_date,
            recurrence: recurrence.as_ref(),
            id: &self.id,
            depends_on: &self.depends_on,
            block_link: "",
            scheduled_date_is_inferred: false,
        });
        let line = format!("- [{}] {}", self.status_symbol, body);

        let (settings, registry) = default_context();
        Task::parse_signifiers(
            &line,
            TaskLocation::from_unknown_position(self.path.clone()),
            None,
            &ParseContext::new(&settings, &registry),
        )
        .expect("builder always composes a parseable line")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_builder_produces_parsed_task() {
        let task = TaskBuilder::new("build me")
            .priority(Priority::High)
            .due(date(2024, 1, 10))
            .id("abc123")
            .build();
        assert_eq!(task.description(), "build me");
        assert_eq!(task.priority(), Priority::High);
        assert_eq!(task.due_date(), Some(date(2024, 1, 10)));
        assert_eq!(task.id(), "abc123");
    }

    #[test]
    fn test_builder_status_symbol() {
        let task = TaskBuilder::new("done already").status_symbol('x').build();
        assert!(task.is_done());
    }

    #[test]
    fn test_builder_tags_come_from_description() {
        let task = TaskBuilder::new("tagged #home #work").build();
        assert_eq!(task.tags(), &["#home", "#work"]);
    }
}
