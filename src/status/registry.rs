//! The registry of known statuses and the transitions between them.

use tracing::debug;

use super::{Status, StatusConfiguration, StatusType};

/// Tracks all the registered statuses a task can have, and resolves status
/// cycling for toggles and recurrence.
///
/// Construct one per host/session and pass it explicitly to the parsing and
/// transition entry points; there is no global instance. Tests can build a
/// fresh registry each, so they stay independent and can run in parallel.
#[derive(Debug, Clone)]
pub struct StatusRegistry {
    registered: Vec<Status>,
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusRegistry {
    /// A registry seeded with the core statuses: `' '` (Todo) and `'x'`
    /// (Done), cycling between each other.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            registered: Vec::new(),
        };
        registry.add_defaults();
        registry
    }

    /// A registry seeded with the core statuses plus the given custom ones.
    /// Duplicate symbols are ignored, first registration wins.
    #[must_use]
    pub fn with_custom(custom: &[StatusConfiguration]) -> Self {
        let mut registry = Self::new();
        for configuration in custom {
            registry.add(configuration.clone());
        }
        registry
    }

    fn add_defaults(&mut self) {
        self.add(Status::make_todo().configuration().clone());
        self.add(Status::make_done().configuration().clone());
    }

    /// Replace the registry contents with the given list, in order.
    /// Duplicate symbols are ignored.
    pub fn set(&mut self, statuses: Vec<StatusConfiguration>) {
        self.registered.clear();
        for configuration in statuses {
            self.add(configuration);
        }
    }

    /// Reset to the core statuses only. Intended for test isolation and for
    /// hosts reloading configuration.
    pub fn reset_to_defaults(&mut self) {
        self.registered.clear();
        self.add_defaults();
    }

    /// Register a status if its symbol is not already taken.
    pub fn add(&mut self, configuration: StatusConfiguration) {
        if !self.has_symbol(configuration.symbol) {
            self.registered.push(Status::new(configuration));
        }
    }

    pub fn registered_statuses(&self) -> &[Status] {
        &self.registered
    }

    pub fn has_symbol(&self, symbol: char) -> bool {
        self.by_symbol(symbol).is_some()
    }

    /// Look up a status by its checkbox symbol.
    pub fn by_symbol(&self, symbol: char) -> Option<&Status> {
        self.registered.iter().find(|s| s.symbol() == symbol)
    }

    /// Look up a status by symbol, synthesizing an unregistered one for
    /// unknown symbols. Never fails; the synthesized status is not added to
    /// the registry.
    #[must_use]
    pub fn by_symbol_or_create(&self, symbol: char) -> Status {
        self.by_symbol(symbol)
            .cloned()
            .unwrap_or_else(|| Status::make_unknown(symbol))
    }

    /// Look up a status by display name.
    pub fn by_name(&self, name: &str) -> Option<&Status> {
        self.registered.iter().find(|s| s.name() == name)
    }

    /// The status toggling advances to, synthesized if the configured next
    /// symbol is not registered.
    #[must_use]
    pub fn get_next_status_or_create(&self, status: &Status) -> Status {
        match self.by_symbol(status.next_symbol()) {
            Some(next) => next.clone(),
            None => {
                debug!(
                    symbol = %status.symbol(),
                    next = %status.next_symbol(),
                    "next status symbol not registered, synthesizing"
                );
                Status::make_unknown(status.next_symbol())
            }
        }
    }

    /// The status for a newly generated recurrence, after the task with
    /// `new_status` was completed.
    ///
    /// Walks the configured cycle looking first for a Todo status, then for
    /// an In Progress one. Falls back to `' '` so the new occurrence is
    /// always found by "not done" searches even in half-configured setups.
    #[must_use]
    pub fn get_next_recurrence_status_or_create(&self, new_status: &Status) -> Status {
        let next = self.get_next_status_or_create(new_status);

        if let Some(found) = self.walk_cycle_for_type(&next, StatusType::Todo) {
            return found;
        }
        if let Some(found) = self.walk_cycle_for_type(&next, StatusType::InProgress) {
            return found;
        }

        self.by_symbol_or_create(' ')
    }

    /// Advance through next-status transitions looking for a wanted type.
    /// The walk is bounded by the registry size so misconfigured cycles
    /// cannot loop forever.
    fn walk_cycle_for_type(&self, start: &Status, wanted: StatusType) -> Option<Status> {
        if start.status_type() == wanted {
            return Some(start.clone());
        }
        let mut current = start.clone();
        for _ in 0..self.registered.len().saturating_sub(1) {
            current = self.get_next_status_or_create(&current);
            if current.status_type() == wanted {
                return Some(current);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_core_statuses() {
        let registry = StatusRegistry::new();
        assert!(registry.has_symbol(' '));
        assert!(registry.has_symbol('x'));
        assert_eq!(registry.registered_statuses().len(), 2);
    }

    #[test]
    fn test_by_symbol_or_create_synthesizes_unknown() {
        let registry = StatusRegistry::new();
        let status = registry.by_symbol_or_create('?');
        assert_eq!(status.symbol(), '?');
        assert_eq!(status.status_type(), StatusType::Todo);
        // Synthesized statuses are not registered.
        assert!(!registry.has_symbol('?'));
    }

    #[test]
    fn test_toggle_cycles_todo_done() {
        let registry = StatusRegistry::new();
        let todo = registry.by_symbol_or_create(' ');
        let done = registry.get_next_status_or_create(&todo);
        assert_eq!(done.symbol(), 'x');
        let back = registry.get_next_status_or_create(&done);
        assert_eq!(back.symbol(), ' ');
    }

    #[test]
    fn test_custom_three_step_cycle() {
        let mut registry = StatusRegistry::new();
        registry.set(vec![
            StatusConfiguration::new(' ', "Todo", '/', StatusType::Todo),
            StatusConfiguration::new('/', "In Progress", 'x', StatusType::InProgress),
            StatusConfiguration::new('x', "Done", ' ', StatusType::Done),
        ]);

        let todo = registry.by_symbol_or_create(' ');
        let in_progress = registry.get_next_status_or_create(&todo);
        assert_eq!(in_progress.symbol(), '/');
        let done = registry.get_next_status_or_create(&in_progress);
        assert_eq!(done.symbol(), 'x');
        let back = registry.get_next_status_or_create(&done);
        assert_eq!(back.symbol(), ' ');
    }

    #[test]
    fn test_duplicate_symbols_ignored() {
        let mut registry = StatusRegistry::new();
        registry.add(StatusConfiguration::new('x', "Shadow", '-', StatusType::Cancelled));
        let status = registry.by_symbol('x').unwrap();
        assert_eq!(status.name(), "Done");
    }

    #[test]
    fn test_recurrence_status_walks_to_todo() {
        let mut registry = StatusRegistry::new();
        registry.set(vec![
            StatusConfiguration::new(' ', "Todo", '/', StatusType::Todo),
            StatusConfiguration::new('/', "In Progress", 'x', StatusType::InProgress),
            StatusConfiguration::new('x', "Done", ' ', StatusType::Done),
        ]);
        let done = registry.by_symbol_or_create('x');
        let next = registry.get_next_recurrence_status_or_create(&done);
        assert_eq!(next.status_type(), StatusType::Todo);
        assert_eq!(next.symbol(), ' ');
    }

    #[test]
    fn test_recurrence_status_falls_back_to_space() {
        // A registry where the cycle after Done never reaches Todo or
        // In Progress.
        let mut registry = StatusRegistry::new();
        registry.set(vec![
            StatusConfiguration::new('x', "Done", '-', StatusType::Done),
            StatusConfiguration::new('-', "Cancelled", 'x', StatusType::Cancelled),
        ]);
        let done = registry.by_symbol_or_create('x');
        let next = registry.get_next_recurrence_status_or_create(&done);
        assert_eq!(next.symbol(), ' ');
        assert_eq!(next.status_type(), StatusType::Todo);
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut registry = StatusRegistry::new();
        registry.add(StatusConfiguration::new('!', "Important", 'x', StatusType::Todo));
        assert!(registry.has_symbol('!'));
        registry.reset_to_defaults();
        assert!(!registry.has_symbol('!'));
        assert!(registry.has_symbol(' '));
    }
}
