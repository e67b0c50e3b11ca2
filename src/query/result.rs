//! The outcome of running a query: grouped tasks, or an error to render in
//! their place.

use super::group::TaskGroups;

/// Grouped tasks plus an optional search error. When `search_error` is
/// set the groups are empty and the host should render the error text
/// instead of results.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    groups: TaskGroups,
    search_error: Option<String>,
}

impl QueryResult {
    #[must_use]
    pub fn from_groups(groups: TaskGroups) -> Self {
        Self {
            groups,
            search_error: None,
        }
    }

    #[must_use]
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            groups: TaskGroups::default(),
            search_error: Some(message.into()),
        }
    }

    pub fn groups(&self) -> &TaskGroups {
        &self.groups
    }

    pub fn search_error_message(&self) -> Option<&str> {
        self.search_error.as_deref()
    }

    /// The number of tasks that survived filtering and the overall limit.
    pub fn task_count(&self) -> usize {
        self.groups.total_task_count()
    }
}
