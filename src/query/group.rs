//! Grouping tasks into a hierarchical result with synthesized headings.
//!
//! Every `group by` instruction adds one level to a group-key tuple. Tasks
//! can appear in several groups at once (tags), so grouping is not a
//! partition. Heading synthesis is outline-style: walking the groups in
//! key order, a heading is emitted only for the levels that changed since
//! the previous group, and a change at a higher level resets all lower
//! levels to "unseen" - exactly what a nested-outline renderer needs. This
//! is not plain de-duplication.

use std::collections::BTreeMap;

use crate::query::filter::SearchContext;
use crate::query::grouper::Grouper;
use crate::task::Task;

// ============================================================================
// Headings
// ============================================================================

/// One heading to render before a group's tasks: the nesting level (0 =
/// outermost) and the group name at that level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHeading {
    level: usize,
    name: String,
}

impl GroupHeading {
    #[must_use]
    pub fn new(level: usize, name: impl Into<String>) -> Self {
        Self {
            level,
            name: name.into(),
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Task Group
// ============================================================================

/// A leaf group: its full key path, the headings to show before it, and
/// its tasks in pipeline order.
#[derive(Debug, Clone)]
pub struct TaskGroup {
    group_key: Vec<String>,
    headings: Vec<GroupHeading>,
    tasks: Vec<Task>,
}

impl TaskGroup {
    /// The group names from all levels, outermost first. Empty for the
    /// implicit group of an ungrouped query.
    pub fn group_key(&self) -> &[String] {
        &self.group_key
    }

    /// The minimal headings to emit before this group's tasks.
    pub fn headings(&self) -> &[GroupHeading] {
        &self.headings
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

// ============================================================================
// Task Groups
// ============================================================================

/// The grouped result of a query.
#[derive(Debug, Clone, Default)]
pub struct TaskGroups {
    groups: Vec<TaskGroup>,
    total_task_count: usize,
}

impl TaskGroups {
    /// Group tasks by the grouper chain.
    ///
    /// With no groupers, all tasks land in a single group with an empty
    /// key. Group keys are ordered lexicographically level by level
    /// (reversed at levels whose grouper asked for it), so heading order is
    /// deterministic.
    #[must_use]
    pub fn new(groupers: &[Grouper], tasks: Vec<Task>, ctx: &SearchContext<'_>) -> Self {
        let total_task_count = tasks.len();

        if groupers.is_empty() {
            return Self {
                groups: vec![TaskGroup {
                    group_key: Vec::new(),
                    headings: Vec::new(),
                    tasks,
                }],
                total_task_count,
            };
        }

        // BTreeMap gives lexicographic key order for free; reversed levels
        // are handled by a re-sort below.
        let mut grouped: BTreeMap<Vec<String>, Vec<Task>> = BTreeMap::new();
        for task in &tasks {
            for key in Self::key_paths(groupers, task, ctx) {
                grouped.entry(key).or_default().push(task.clone());
            }
        }

        let mut groups: Vec<TaskGroup> = grouped
            .into_iter()
            .map(|(group_key, tasks)| TaskGroup {
                group_key,
                headings: Vec::new(),
                tasks,
            })
            .collect();

        if groupers.iter().any(Grouper::is_reversed) {
            groups.sort_by(|a, b| {
                for (level, grouper) in groupers.iter().enumerate() {
                    let ordering = a.group_key[level].cmp(&b.group_key[level]);
                    let ordering = if grouper.is_reversed() {
                        ordering.reverse()
                    } else {
                        ordering
                    };
                    if ordering.is_ne() {
                        return ordering;
                    }
                }
                std::cmp::Ordering::Equal
            });
        }

        let mut result = Self {
            groups,
            total_task_count,
        };
        result.recalculate_headings(groupers.len());
        result
    }

    /// All key tuples a task belongs to: the cartesian product of the
    /// names each grouper produces. A grouper yielding nothing contributes
    /// an unnamed level so the task is not lost from the results.
    fn key_paths(groupers: &[Grouper], task: &Task, ctx: &SearchContext<'_>) -> Vec<Vec<String>> {
        let mut paths: Vec<Vec<String>> = vec![Vec::new()];
        for grouper in groupers {
            let mut names = grouper.group_names(task, ctx);
            if names.is_empty() {
                names.push(String::new());
            }
            let mut next = Vec::with_capacity(paths.len() * names.len());
            for path in &paths {
                for name in &names {
                    let mut extended = path.clone();
                    extended.push(name.clone());
                    next.push(extended);
                }
            }
            paths = next;
        }
        paths
    }

    /// The "pjeby" minimal-heading algorithm: compare each group's key to
    /// the last seen value per level; on a change, emit a heading and reset
    /// every lower level to unseen.
    fn recalculate_headings(&mut self, levels: usize) {
        let mut last_at_level: Vec<String> = vec![String::new(); levels];
        for group in &mut self.groups {
            let mut headings = Vec::new();
            for level in 0..group.group_key.len() {
                let name = &group.group_key[level];
                if *name != last_at_level[level] {
                    headings.push(GroupHeading::new(level, name.clone()));
                    for lower in last_at_level.iter_mut().skip(level) {
                        lower.clear();
                    }
                    last_at_level[level] = name.clone();
                }
            }
            group.headings = headings;
        }
    }

    /// Cap the number of tasks shown within each group independently.
    pub fn apply_group_limit(&mut self, limit: usize) {
        for group in &mut self.groups {
            group.tasks.truncate(limit);
        }
    }

    pub fn groups(&self) -> &[TaskGroup] {
        &self.groups
    }

    /// The number of tasks that entered grouping (not counting multiple
    /// memberships).
    pub fn total_task_count(&self) -> usize {
        self.total_task_count
    }

    /// Total membership count across groups; at least
    /// [`TaskGroups::total_task_count`] when grouping is multi-membership.
    pub fn total_membership_count(&self) -> usize {
        self.groups.iter().map(|g| g.tasks.len()).sum()
    }
}
