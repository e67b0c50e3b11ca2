//! The task entity and its state transitions.
//!
//! A [`Task`] is an immutable value: every edit - toggling, stamping dates,
//! adding a dependency - returns one or more new `Task` values and leaves
//! the original untouched. That makes concurrent queries over a shared task
//! collection safe without any locking.
//!
//! Parsing goes through [`Task::from_line`] with an explicit
//! [`ParseContext`] carrying the settings and the status registry; there
//! are no process-wide singletons to initialize.

pub mod components;
pub mod dependency;
pub mod location;
pub mod priority;
pub mod recurrence;
pub mod serializer;
pub mod urgency;

pub use components::{extract_components, extract_hashtags, TaskComponents};
pub use location::TaskLocation;
pub use priority::Priority;
pub use recurrence::{Occurrence, Recurrence};

use std::sync::OnceLock;

use chrono::NaiveDate;
use tracing::debug;

use crate::date::compare_by_date;
use crate::settings::Settings;
use crate::status::{Status, StatusRegistry, StatusType};

// ============================================================================
// Parse Context
// ============================================================================

/// Everything the parser consults besides the line itself.
///
/// Built once per scan and passed by reference; constructing one is cheap.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub settings: &'a Settings,
    pub registry: &'a StatusRegistry,
}

impl<'a> ParseContext<'a> {
    #[must_use]
    pub fn new(settings: &'a Settings, registry: &'a StatusRegistry) -> Self {
        Self { settings, registry }
    }
}

// ============================================================================
// Task
// ============================================================================

/// A parsed checklist task.
///
/// All fields are private and immutable; use [`Task::with`] to derive an
/// edited copy. `original_markdown` preserves the exact source line so
/// hosts can locate and replace it safely.
#[derive(Debug, Clone)]
pub struct Task {
    status: Status,
    description: String,
    indentation: String,
    list_marker: String,
    location: TaskLocation,
    tags: Vec<String>,
    priority: Priority,
    created_date: Option<NaiveDate>,
    start_date: Option<NaiveDate>,
    scheduled_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    done_date: Option<NaiveDate>,
    cancelled_date: Option<NaiveDate>,
    recurrence: Option<Recurrence>,
    depends_on: Vec<String>,
    id: String,
    block_link: String,
    scheduled_date_is_inferred: bool,
    original_markdown: String,
    urgency_cache: OnceLock<f64>,
}

impl Task {
    // ========================================================================
    // Parsing
    // ========================================================================

    /// Parse a line into a task, honouring the global filter.
    ///
    /// Returns `None` both for lines that are not checklist items and for
    /// checklist items whose body does not contain the global filter.
    /// Either way the caller should skip the line, not report an error.
    pub fn from_line(
        line: &str,
        location: TaskLocation,
        fallback_scheduled_date: Option<NaiveDate>,
        ctx: &ParseContext<'_>,
    ) -> Option<Task> {
        let components = components::extract_components(line)?;

        // Cheap rejection before signifier parsing.
        if !ctx.settings.global_filter.included_in(&components.body) {
            return None;
        }

        Self::parse_signifiers(line, location, fallback_scheduled_date, ctx)
    }

    /// Parse a line into a task without checking the global filter.
    ///
    /// The global filter tag is still removed from the tag list (and from
    /// the description when the settings say so).
    pub fn parse_signifiers(
        line: &str,
        location: TaskLocation,
        fallback_scheduled_date: Option<NaiveDate>,
        ctx: &ParseContext<'_>,
    ) -> Option<Task> {
        let components = components::extract_components(line)?;
        let status = ctx.registry.by_symbol_or_create(components.status_symbol);

        let details = serializer::deserialize(&components.body);

        let mut scheduled_date = details.scheduled_date;
        let mut scheduled_date_is_inferred = false;
        let no_dates_set = details.start_date.is_none()
            && details.scheduled_date.is_none()
            && details.due_date.is_none();
        if no_dates_set {
            if let Some(fallback) = fallback_scheduled_date {
                scheduled_date = Some(fallback);
                scheduled_date_is_inferred = true;
            }
        }

        let global_filter = &ctx.settings.global_filter;
        let tags: Vec<String> = details
            .tags
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !global_filter.equals(tag))
            .collect();

        let description = global_filter.remove_depending_on_settings(&details.description);

        Some(Task {
            status,
            description,
            indentation: components.indentation,
            list_marker: components.list_marker,
            location,
            tags,
            priority: details.priority,
            created_date: details.created_date,
            start_date: details.start_date,
            scheduled_date,
            due_date: details.due_date,
            done_date: details.done_date,
            cancelled_date: details.cancelled_date,
            recurrence: details.recurrence,
            depends_on: details.depends_on,
            id: details.id,
            block_link: components.block_link,
            scheduled_date_is_inferred,
            original_markdown: line.to_string(),
            urgency_cache: OnceLock::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The description with all recognized tags removed.
    pub fn description_without_tags(&self) -> String {
        let mut text = self.description.clone();
        for tag in &self.tags {
            text = text.replace(tag.as_str(), "");
        }
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn indentation(&self) -> &str {
        &self.indentation
    }

    pub fn list_marker(&self) -> &str {
        &self.list_marker
    }

    pub fn location(&self) -> &TaskLocation {
        &self.location
    }

    pub fn path(&self) -> &str {
        self.location.path()
    }

    pub fn filename(&self) -> Option<String> {
        self.location.filename()
    }

    pub fn preceding_header(&self) -> Option<&str> {
        self.location.preceding_header()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn created_date(&self) -> Option<NaiveDate> {
        self.created_date
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn done_date(&self) -> Option<NaiveDate> {
        self.done_date
    }

    pub fn cancelled_date(&self) -> Option<NaiveDate> {
        self.cancelled_date
    }

    pub fn scheduled_date_is_inferred(&self) -> bool {
        self.scheduled_date_is_inferred
    }

    pub fn recurrence(&self) -> Option<&Recurrence> {
        self.recurrence.as_ref()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// The recurrence rule text, empty when the task does not recur.
    pub fn recurrence_rule(&self) -> String {
        self.recurrence
            .as_ref()
            .map(Recurrence::to_text)
            .unwrap_or_default()
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn block_link(&self) -> &str {
        &self.block_link
    }

    pub fn original_markdown(&self) -> &str {
        &self.original_markdown
    }

    /// Whether the status type counts as closed: DONE, CANCELLED or
    /// NON_TASK.
    pub fn is_done(&self) -> bool {
        matches!(
            self.status.status_type(),
            StatusType::Done | StatusType::Cancelled | StatusType::NonTask
        )
    }

    /// The earliest of start, scheduled and due - the first point at which
    /// the user might want to act on the task.
    pub fn happens_date(&self) -> Option<NaiveDate> {
        [self.start_date, self.scheduled_date, self.due_date]
            .into_iter()
            .flatten()
            .min()
    }

    /// Urgency score relative to `today`.
    ///
    /// Memoized on first call: a task is parsed fresh on every scan, so the
    /// cache never spans a change of date in practice.
    pub fn urgency(&self, today: NaiveDate) -> f64 {
        *self
            .urgency_cache
            .get_or_init(|| urgency::calculate(self, today))
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// The body text of the task: description plus signifiers, without the
    /// list marker and checkbox.
    pub fn to_serialized_body(&self) -> String {
        serializer::serialize(&serializer::SerializeParts {
            description: &self.description,
            priority: self.priority,
            created_date: self.created_date,
            start_date: self.start_date,
            scheduled_date: self.scheduled_date,
            due_date: self.due_date,
            done_date: self.done_date,
            cancelled_date: self.cancelled_date,
            recurrence: self.recurrence.as_ref(),
            id: &self.id,
            depends_on: &self.depends_on,
            block_link: &self.block_link,
            scheduled_date_is_inferred: self.scheduled_date_is_inferred,
        })
    }

    /// The exact text to write back to a document for this task.
    pub fn to_file_line_string(&self) -> String {
        format!(
            "{}{} [{}] {}",
            self.indentation,
            self.list_marker,
            self.status.symbol(),
            self.to_serialized_body()
        )
    }

    // ========================================================================
    // Copy-with-Overrides
    // ========================================================================

    /// Derive an edited copy.
    ///
    /// ```rust
    /// # use taskdown::testing::TaskBuilder;
    /// let task = TaskBuilder::new("write docs").build();
    /// let renamed = task.with(|t| t.description("write better docs"));
    /// assert_eq!(task.description(), "write docs");
    /// assert_eq!(renamed.description(), "write better docs");
    /// ```
    #[must_use]
    pub fn with(&self, build: impl FnOnce(TaskOverrides) -> TaskOverrides) -> Task {
        let mut task = build(TaskOverrides {
            task: self.clone(),
        })
        .task;
        // Derived state must not leak into the edited copy.
        task.urgency_cache = OnceLock::new();
        task
    }

    // ========================================================================
    // State Transitions
    // ========================================================================

    /// Advance the task to the next status in its configured cycle.
    ///
    /// Returns `[next_occurrence, toggled]` for completed recurring tasks,
    /// `[toggled]` otherwise. See [`Task::handle_new_status`].
    #[must_use]
    pub fn toggle(
        &self,
        today: NaiveDate,
        settings: &Settings,
        registry: &StatusRegistry,
    ) -> Vec<Task> {
        let new_status = registry.get_next_status_or_create(&self.status);
        self.handle_new_status(new_status, today, settings, registry)
    }

    /// Like [`Task::toggle`], but with the returned pair ordered the way
    /// the user wants the lines saved.
    #[must_use]
    pub fn toggle_in_users_order(
        &self,
        today: NaiveDate,
        settings: &Settings,
        registry: &StatusRegistry,
    ) -> Vec<Task> {
        let new_tasks = self.toggle(today, settings, registry);
        Self::put_recurrence_in_users_order(new_tasks, settings)
    }

    /// Apply a new status and return the resulting task(s).
    ///
    /// - If `new_status` behaves identically to the current status the task
    ///   is returned unchanged: no date stamping, and crucially no
    ///   recurrence generation.
    /// - Otherwise a copy with the new status is produced. Transitioning
    ///   *into* DONE or CANCELLED stamps today's date into the matching
    ///   date field if the corresponding setting is enabled; staying within
    ///   the type preserves the existing date; transitioning out does not
    ///   clear other date kinds.
    /// - Completing a not-yet-completed recurring task also produces the
    ///   next occurrence. The pair is returned as
    ///   `[next_occurrence, toggled]`; use
    ///   [`Task::handle_new_status_in_users_order`] to honour the save
    ///   order setting.
    #[must_use]
    pub fn handle_new_status(
        &self,
        new_status: Status,
        today: NaiveDate,
        settings: &Settings,
        registry: &StatusRegistry,
    ) -> Vec<Task> {
        if new_status.identical_to(&self.status) {
            return vec![self.clone()];
        }

        debug!(
            path = %self.location.path(),
            line = self.location.line_number(),
            from = %self.status.symbol(),
            to = %new_status.symbol(),
            "task status transition"
        );

        let new_done_date = self.transition_date(
            &new_status,
            StatusType::Done,
            self.done_date,
            settings.set_done_date,
            today,
        );
        let new_cancelled_date = self.transition_date(
            &new_status,
            StatusType::Cancelled,
            self.cancelled_date,
            settings.set_cancelled_date,
            today,
        );

        let next_occurrence = if new_status.is_completed() && !self.status.is_completed() {
            self.recurrence.as_ref().and_then(|r| r.next(today))
        } else {
            None
        };

        let toggled = self.with(|t| {
            t.status(new_status.clone())
                .done_date(new_done_date)
                .cancelled_date(new_cancelled_date)
        });

        let mut new_tasks = Vec::with_capacity(2);
        if let Some(occurrence) = next_occurrence {
            new_tasks.push(self.create_next_occurrence(&new_status, occurrence, today, settings, registry));
        }
        // The next occurrence goes before the completed task.
        new_tasks.push(toggled);
        new_tasks
    }

    /// Like [`Task::handle_new_status`], but with the returned pair ordered
    /// the way the user wants the lines saved.
    #[must_use]
    pub fn handle_new_status_in_users_order(
        &self,
        new_status: Status,
        today: NaiveDate,
        settings: &Settings,
        registry: &StatusRegistry,
    ) -> Vec<Task> {
        let new_tasks = self.handle_new_status(new_status, today, settings, registry);
        Self::put_recurrence_in_users_order(new_tasks, settings)
    }

    fn put_recurrence_in_users_order(mut new_tasks: Vec<Task>, settings: &Settings) -> Vec<Task> {
        if settings.recurrence_on_next_line {
            new_tasks.reverse();
        }
        new_tasks
    }

    /// The new value for a progress-tracking date (done or cancelled) on a
    /// status transition:
    /// - entering the type stamps `today`, if the setting allows;
    /// - already in the type preserves the existing date;
    /// - any other target type clears it.
    fn transition_date(
        &self,
        new_status: &Status,
        status_type: StatusType,
        old_date: Option<NaiveDate>,
        enabled_in_settings: bool,
        today: NaiveDate,
    ) -> Option<NaiveDate> {
        if new_status.status_type() != status_type {
            return None;
        }
        if self.status.status_type() != status_type {
            enabled_in_settings.then_some(today)
        } else {
            old_date
        }
    }

    fn create_next_occurrence(
        &self,
        new_status: &Status,
        occurrence: Occurrence,
        today: NaiveDate,
        settings: &Settings,
        registry: &StatusRegistry,
    ) -> Task {
        let next_status = registry.get_next_recurrence_status_or_create(new_status);
        let created_date = settings.set_created_date.then_some(today);
        // Re-anchor the rule so the new occurrence recurs from its own
        // dates, exactly as if its line had been re-parsed.
        let recurrence = self
            .recurrence
            .as_ref()
            .map(|rule| rule.with_occurrence(occurrence));

        self.with(|t| {
            t.status(next_status)
                .recurrence(recurrence)
                .start_date(occurrence.start_date)
                .scheduled_date(occurrence.scheduled_date)
                .due_date(occurrence.due_date)
                .created_date(created_date)
                .done_date(None)
                .cancelled_date(None)
                // A new occurrence is independent: no shared anchor, no
                // shared dependency identity.
                .block_link(String::new())
                .id(String::new())
                .depends_on(Vec::new())
        })
    }

    // ========================================================================
    // Dependencies
    // ========================================================================

    /// Whether this task waits on another live task.
    ///
    /// A closed task is never blocked, and a dependency id that matches no
    /// live task never blocks. Only direct dependencies count.
    pub fn is_blocked(&self, all_tasks: &[Task]) -> bool {
        if self.depends_on.is_empty() || self.is_done() {
            return false;
        }

        self.depends_on.iter().any(|dep_id| {
            all_tasks
                .iter()
                .any(|task| task.id == *dep_id && !task.is_done())
        })
    }

    /// Whether any live task waits on this one. A closed task, or one
    /// without an id, is never blocking. Only direct dependencies count.
    pub fn is_blocking(&self, all_tasks: &[Task]) -> bool {
        if self.id.is_empty() || self.is_done() {
            return false;
        }

        all_tasks
            .iter()
            .any(|task| !task.is_done() && task.depends_on.contains(&self.id))
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Strict field-by-field comparison, excluding `original_markdown`.
    ///
    /// Hosts use this to skip re-rendering when a file edit did not change
    /// any task, so the definition of identical must stay strict.
    pub fn identical_to(&self, other: &Task) -> bool {
        self.description == other.description
            && self.location == other.location
            && self.indentation == other.indentation
            && self.list_marker == other.list_marker
            && self.priority == other.priority
            && self.block_link == other.block_link
            && self.scheduled_date_is_inferred == other.scheduled_date_is_inferred
            && self.id == other.id
            && self.depends_on == other.depends_on
            && self.status.identical_to(&other.status)
            && self.tags == other.tags
            && compare_by_date(self.created_date, other.created_date).is_eq()
            && compare_by_date(self.start_date, other.start_date).is_eq()
            && compare_by_date(self.scheduled_date, other.scheduled_date).is_eq()
            && compare_by_date(self.due_date, other.due_date).is_eq()
            && compare_by_date(self.done_date, other.done_date).is_eq()
            && compare_by_date(self.cancelled_date, other.cancelled_date).is_eq()
            && self.recurrence == other.recurrence
    }

    /// Whether two task lists contain identical tasks in the same order.
    pub fn tasks_lists_identical(old_tasks: &[Task], new_tasks: &[Task]) -> bool {
        old_tasks.len() == new_tasks.len()
            && old_tasks
                .iter()
                .zip(new_tasks)
                .all(|(old, new)| old.identical_to(new))
    }
}

// ============================================================================
// Overrides Builder
// ============================================================================

/// Builder handed to the closure of [`Task::with`]; each setter replaces
/// one field on the copied task.
pub struct TaskOverrides {
    task: Task,
}

impl TaskOverrides {
    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.task.status = status;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.task.description = description.into();
        self
    }

    #[must_use]
    pub fn location(mut self, location: TaskLocation) -> Self {
        self.task.location = location;
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.task.priority = priority;
        self
    }

    #[must_use]
    pub fn created_date(mut self, date: Option<NaiveDate>) -> Self {
        self.task.created_date = date;
        self
    }

    #[must_use]
    pub fn start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.task.start_date = date;
        self
    }

    #[must_use]
    pub fn scheduled_date(mut self, date: Option<NaiveDate>) -> Self {
        self.task.scheduled_date = date;
        // An explicit edit replaces any filename-inferred value.
        self.task.scheduled_date_is_inferred = false;
        self
    }

    #[must_use]
    pub fn due_date(mut self, date: Option<NaiveDate>) -> Self {
        self.task.due_date = date;
        self
    }

    #[must_use]
    pub fn done_date(mut self, date: Option<NaiveDate>) -> Self {
        self.task.done_date = date;
        self
    }

    #[must_use]
    pub fn cancelled_date(mut self, date: Option<NaiveDate>) -> Self {
        self.task.cancelled_date = date;
        self
    }

    #[must_use]
    pub fn recurrence(mut self, recurrence: Option<Recurrence>) -> Self {
        self.task.recurrence = recurrence;
        self
    }

    #[must_use]
    pub fn depends_on(mut self, depends_on: Vec<String>) -> Self {
        self.task.depends_on = depends_on;
        self
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.task.id = id.into();
        self
    }

    #[must_use]
    pub fn block_link(mut self, block_link: impl Into<String>) -> Self {
        self.task.block_link = block_link.into();
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.task.tags = tags;
        self
    }
}
