//! Groupers: group-key extractors compiled from `group by ...`
//! instructions.

use std::fmt;
use std::sync::Arc;

use crate::query::filter::SearchContext;
use crate::task::Task;

/// The extractor type all groupers compile to.
///
/// A task can belong to several groups at once (grouping by tags puts a
/// task with three tags into three groups), so the extractor returns a
/// list. An empty list means "no value": the pipeline files the task under
/// an unnamed group rather than dropping it.
pub type GrouperFunction = Arc<dyn Fn(&Task, &SearchContext<'_>) -> Vec<String> + Send + Sync>;

/// A single `group by` instruction.
#[derive(Clone)]
pub struct Grouper {
    property: String,
    reverse: bool,
    function: GrouperFunction,
}

impl Grouper {
    pub fn new(
        property: impl Into<String>,
        reverse: bool,
        function: impl Fn(&Task, &SearchContext<'_>) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            property: property.into(),
            reverse,
            function: Arc::new(function),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    /// Reversed group-heading order for this level.
    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    pub fn group_names(&self, task: &Task, ctx: &SearchContext<'_>) -> Vec<String> {
        (self.function)(task, ctx)
    }
}

impl fmt::Debug for Grouper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grouper")
            .field("property", &self.property)
            .field("reverse", &self.reverse)
            .finish_non_exhaustive()
    }
}

/// Match `group by <name> [reverse]`, returning the reverse flag.
pub(crate) fn parse_group_line(line: &str, name: &str) -> Option<bool> {
    let lower = line.trim().to_lowercase();
    let rest = lower.strip_prefix("group by")?.trim();
    if rest == name {
        Some(false)
    } else if rest == format!("{name} reverse") {
        Some(true)
    } else {
        None
    }
}
