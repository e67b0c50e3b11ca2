//! Layout options: pure data describing how the host should render
//! results. Rendering itself is out of scope; the query language only
//! parses the toggles.

/// Flags set by `short`/`full` mode, `explain`, and `hide ...`/`show ...`
/// instructions.
///
/// `hide_urgency` defaults to true: urgency is a derived score most users
/// only want on request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    pub short_mode: bool,
    pub explain_query: bool,
    pub hide_task_count: bool,
    pub hide_backlinks: bool,
    pub hide_postpone_button: bool,
    pub hide_priority: bool,
    pub hide_created_date: bool,
    pub hide_start_date: bool,
    pub hide_scheduled_date: bool,
    pub hide_due_date: bool,
    pub hide_done_date: bool,
    pub hide_cancelled_date: bool,
    pub hide_recurrence_rule: bool,
    pub hide_edit_button: bool,
    pub hide_urgency: bool,
    pub hide_tags: bool,
    pub hide_id: bool,
    pub hide_depends_on: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            short_mode: false,
            explain_query: false,
            hide_task_count: false,
            hide_backlinks: false,
            hide_postpone_button: false,
            hide_priority: false,
            hide_created_date: false,
            hide_start_date: false,
            hide_scheduled_date: false,
            hide_due_date: false,
            hide_done_date: false,
            hide_cancelled_date: false,
            hide_recurrence_rule: false,
            hide_edit_button: false,
            hide_urgency: true,
            hide_tags: false,
            hide_id: false,
            hide_depends_on: false,
        }
    }
}

impl LayoutOptions {
    /// Apply one `hide <option>` / `show <option>` instruction. Returns
    /// false for options the layout does not know.
    pub fn apply_option(&mut self, hide: bool, option: &str) -> bool {
        let flag = match option {
            "task count" => &mut self.hide_task_count,
            "backlink" => &mut self.hide_backlinks,
            "postpone button" => &mut self.hide_postpone_button,
            "priority" => &mut self.hide_priority,
            "created date" => &mut self.hide_created_date,
            "start date" => &mut self.hide_start_date,
            "scheduled date" => &mut self.hide_scheduled_date,
            "due date" => &mut self.hide_due_date,
            "done date" => &mut self.hide_done_date,
            "cancelled date" => &mut self.hide_cancelled_date,
            "recurrence rule" => &mut self.hide_recurrence_rule,
            "edit button" => &mut self.hide_edit_button,
            "urgency" => &mut self.hide_urgency,
            "tags" => &mut self.hide_tags,
            "id" => &mut self.hide_id,
            "depends on" => &mut self.hide_depends_on,
            _ => return false,
        };
        *flag = hide;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let layout = LayoutOptions::default();
        assert!(!layout.short_mode);
        assert!(!layout.hide_priority);
        assert!(layout.hide_urgency);
    }

    #[test]
    fn test_apply_option() {
        let mut layout = LayoutOptions::default();
        assert!(layout.apply_option(true, "priority"));
        assert!(layout.hide_priority);
        assert!(layout.apply_option(false, "urgency"));
        assert!(!layout.hide_urgency);
        assert!(!layout.apply_option(true, "weather"));
    }
}
