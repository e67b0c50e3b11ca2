//! Filters: named pure predicates over tasks, and the field registry that
//! parses filter/sort/group instructions.
//!
//! Each query field (due date, description, tags, ...) implements
//! [`Field`]. Instruction parsing walks [`field_registry`] in a documented
//! priority order and the first field that recognizes a line wins -
//! more-specific fields are registered before fields whose grammar could
//! contain them (`status.type` before `status`), and the boolean
//! combinator field is always last because its sub-expressions can contain
//! any of the others.

mod boolean_field;
mod date_field;
mod misc_field;
mod priority_field;
mod status_field;
mod tag_field;
mod text_field;

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;

use crate::query::grouper::Grouper;
use crate::query::sorter::Sorter;
use crate::settings::Settings;
use crate::task::Task;

// ============================================================================
// Search Context
// ============================================================================

/// Ambient inputs to predicate evaluation: the injected "now", the full
/// task collection (for relational predicates like `is blocked`), and the
/// settings snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'a> {
    pub today: NaiveDate,
    pub all_tasks: &'a [Task],
    pub settings: &'a Settings,
}

// ============================================================================
// Filter
// ============================================================================

/// The predicate type all filters compile to.
///
/// Predicates must be pure functions of `(task, context)`: no mutation, no
/// dependence on evaluation order across filters. That keeps filter
/// application order-independent, as the pipeline contract requires.
pub type FilterFunction = Arc<dyn Fn(&Task, &SearchContext<'_>) -> bool + Send + Sync>;

/// A compiled filter: the instruction it came from, a human-readable
/// explanation, and the predicate.
#[derive(Clone)]
pub struct Filter {
    instruction: String,
    explanation: String,
    function: FilterFunction,
}

impl Filter {
    pub fn new(
        instruction: impl Into<String>,
        explanation: impl Into<String>,
        function: impl Fn(&Task, &SearchContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            explanation: explanation.into(),
            function: Arc::new(function),
        }
    }

    /// Build a custom filter from a host-supplied predicate.
    ///
    /// This is the extension point for predicates the query language cannot
    /// express. The function must be pure.
    pub fn from_fn(
        instruction: impl Into<String>,
        function: impl Fn(&Task, &SearchContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        let instruction = instruction.into();
        Self {
            explanation: instruction.clone(),
            instruction,
            function: Arc::new(function),
        }
    }

    pub fn matches(&self, task: &Task, ctx: &SearchContext<'_>) -> bool {
        (self.function)(task, ctx)
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Explain output for this filter, indented by `indent`. When the
    /// explanation adds nothing over the instruction only the instruction
    /// is shown.
    pub fn explain_indented(&self, indent: &str) -> String {
        if self.instruction == self.explanation {
            format!("{indent}{}", self.instruction)
        } else {
            format!("{indent}{} =>\n{indent}  {}", self.instruction, self.explanation)
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("instruction", &self.instruction)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Field Trait and Registry
// ============================================================================

/// One queryable field: recognizes and compiles its own filter grammar,
/// and optionally offers a sorter and a grouper.
pub trait Field: Send + Sync {
    /// The field name as written in instructions.
    fn name(&self) -> &'static str;

    /// Whether this field's filter grammar matches the line. A `true` here
    /// claims the line: a later syntax problem becomes this field's error,
    /// not another field's match.
    fn can_create_filter_for_line(&self, line: &str) -> bool;

    /// Compile the line into a filter, or a human-readable error message.
    fn create_filter_or_error(&self, line: &str) -> Result<Filter, String>;

    /// Parse a `sort by ...` line for this field, if it supports sorting.
    fn create_sorter_from_line(&self, line: &str) -> Option<Sorter> {
        let _ = line;
        None
    }

    /// Parse a `group by ...` line for this field, if it supports grouping.
    fn create_grouper_from_line(&self, line: &str) -> Option<Grouper> {
        let _ = line;
        None
    }
}

/// The ordered field table. First match wins; order is part of the
/// contract (see module docs).
pub fn field_registry() -> &'static [Box<dyn Field>] {
    static REGISTRY: OnceLock<Vec<Box<dyn Field>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        vec![
            // status.name and status.type go before status, to avoid
            // ambiguity.
            Box::new(text_field::TextField::status_name()),
            Box::new(status_field::StatusTypeField),
            Box::new(status_field::StatusField),
            Box::new(misc_field::RecurringField),
            Box::new(priority_field::PriorityField),
            Box::new(date_field::DateField::happens()),
            Box::new(date_field::DateField::cancelled()),
            Box::new(date_field::DateField::created()),
            Box::new(date_field::DateField::start()),
            Box::new(date_field::DateField::scheduled()),
            Box::new(date_field::DateField::due()),
            Box::new(date_field::DateField::done()),
            Box::new(text_field::TextField::path()),
            Box::new(text_field::TextField::folder()),
            Box::new(text_field::TextField::root()),
            Box::new(text_field::TextField::backlink()),
            Box::new(text_field::TextField::description()),
            Box::new(tag_field::TagsField),
            Box::new(text_field::TextField::heading()),
            Box::new(text_field::TextField::filename()),
            Box::new(misc_field::UrgencyField),
            Box::new(text_field::TextField::recurrence()),
            Box::new(misc_field::IdField),
            Box::new(misc_field::DependsOnField),
            Box::new(misc_field::BlockingField),
            // The boolean field must stay last: it aggregates the others.
            Box::new(boolean_field::BooleanField),
        ]
    })
}

/// Compile a filter line via the field registry. `None` means no field
/// recognized the line at all.
pub fn parse_filter(line: &str) -> Option<Result<Filter, String>> {
    field_registry()
        .iter()
        .find(|field| field.can_create_filter_for_line(line))
        .map(|field| field.create_filter_or_error(line))
}

/// Parse a `sort by ...` line via the field registry.
pub fn parse_sorter(line: &str) -> Option<Sorter> {
    if !line.to_lowercase().starts_with("sort by") {
        return None;
    }
    field_registry()
        .iter()
        .find_map(|field| field.create_sorter_from_line(line))
}

/// Parse a `group by ...` line via the field registry.
pub fn parse_grouper(line: &str) -> Option<Grouper> {
    if !line.to_lowercase().starts_with("group by") {
        return None;
    }
    field_registry()
        .iter()
        .find_map(|field| field.create_grouper_from_line(line))
}
