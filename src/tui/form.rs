//! Task form handling for the terminal user interface.
//!
//! This module provides the `TaskForm` structure for creating and editing
//! tasks in the TUI, including field ordering, selector cycling, and
//! validation into `NewTask`/`TaskPatch` values.

use chrono::{DateTime, Local};

use crate::dates::parse_due_input;
use crate::fields::{Priority, Status, TeamView};
use crate::generate::{subcategories_for, CATEGORIES};
use crate::task::{NewTask, Task, TaskPatch};
use crate::tui::input::InputField;

/// Global order constants for task form fields.
pub const TITLE_ORDER: usize = 0;
pub const DESCRIPTION_ORDER: usize = 1;
pub const ASSIGNED_ORDER: usize = 2;
pub const CONTROL_NAME_ORDER: usize = 3;
pub const WORKFLOW_STEP_ORDER: usize = 4;
pub const DUE_ORDER: usize = 5;
pub const CATEGORY_ORDER: usize = 6;
pub const SUBCATEGORY_ORDER: usize = 7;
pub const PRIORITY_ORDER: usize = 8;
pub const STATUS_ORDER: usize = 9;
pub const TEAM_VIEW_ORDER: usize = 10;

const FIELD_COUNT: usize = 11;

/// Form state for adding or editing a task.
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub assigned_to: InputField,
    pub control_name: InputField,
    pub workflow_step: InputField,
    pub due: InputField,
    pub category: usize,
    pub subcategory: usize,
    pub priority: usize,
    pub status: usize,
    pub team_view: usize,
    pub current_field: usize,
    pub priorities: Vec<Priority>,
    pub statuses: Vec<Status>,
    pub team_views: Vec<Option<TeamView>>,
}

impl TaskForm {
    /// Create an empty form with sensible defaults.
    pub fn new() -> Self {
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            assigned_to: InputField::with_value("Not Delegated"),
            control_name: InputField::new(),
            workflow_step: InputField::with_value("Pending Finance Review"),
            due: InputField::with_value("tomorrow"),
            category: 0,
            subcategory: 0,
            priority: 1, // Medium
            status: 0,   // Outstanding
            team_view: 0,
            current_field: 0,
            priorities: vec![
                Priority::Low,
                Priority::Medium,
                Priority::High,
                Priority::Critical,
            ],
            statuses: vec![Status::Outstanding, Status::Completed],
            team_views: vec![
                None,
                Some(TeamView::Owner),
                Some(TeamView::Pending),
                Some(TeamView::Watcher),
                Some(TeamView::Rfi),
                Some(TeamView::Team),
                Some(TeamView::Extended),
            ],
        };
        form.update_active_field();
        form
    }

    /// Create a form populated from an existing task.
    pub fn from_task(task: &Task) -> Self {
        let mut form = Self::new();
        form.title = InputField::with_value(&task.title);
        form.description = InputField::with_value(&task.description);
        form.assigned_to = InputField::with_value(&task.assigned_to);
        form.control_name = InputField::with_value(&task.control_name);
        form.workflow_step = InputField::with_value(&task.workflow_step);
        form.due = InputField::with_value(&task.due.format("%Y-%m-%d %H:%M").to_string());
        form.category = CATEGORIES
            .iter()
            .position(|c| *c == task.category)
            .unwrap_or(0);
        form.subcategory = task
            .subcategory
            .as_deref()
            .and_then(|sub| {
                subcategories_for(form.selected_category())
                    .iter()
                    .position(|s| *s == sub)
                    .map(|i| i + 1)
            })
            .unwrap_or(0);
        form.priority = form
            .priorities
            .iter()
            .position(|&p| p == task.priority)
            .unwrap_or(1);
        form.status = form
            .statuses
            .iter()
            .position(|&s| s == task.status)
            .unwrap_or(0);
        form.team_view = form
            .team_views
            .iter()
            .position(|&t| t == task.team_view)
            .unwrap_or(0);
        form.update_active_field();
        form
    }

    /// The category name the selector currently points at.
    pub fn selected_category(&self) -> &'static str {
        CATEGORIES[self.category]
    }

    /// The subcategory the selector currently points at; index 0 is "none".
    pub fn selected_subcategory(&self) -> Option<String> {
        if self.subcategory == 0 {
            None
        } else {
            subcategories_for(self.selected_category())
                .get(self.subcategory - 1)
                .map(|s| s.to_string())
        }
    }

    fn fields_mut(&mut self) -> [&mut InputField; 6] {
        [
            &mut self.title,
            &mut self.description,
            &mut self.assigned_to,
            &mut self.control_name,
            &mut self.workflow_step,
            &mut self.due,
        ]
    }

    fn active_field_mut(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_ORDER => Some(&mut self.title),
            DESCRIPTION_ORDER => Some(&mut self.description),
            ASSIGNED_ORDER => Some(&mut self.assigned_to),
            CONTROL_NAME_ORDER => Some(&mut self.control_name),
            WORKFLOW_STEP_ORDER => Some(&mut self.workflow_step),
            DUE_ORDER => Some(&mut self.due),
            _ => None,
        }
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FIELD_COUNT - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which field is marked active for rendering.
    pub fn update_active_field(&mut self) {
        for field in self.fields_mut() {
            field.active = false;
        }
        if let Some(field) = self.active_field_mut() {
            field.active = true;
        }
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.active_field_mut() {
            field.handle_char(c);
        }
    }

    /// Handle backspace for the currently active field.
    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.active_field_mut() {
            field.handle_backspace();
        }
    }

    /// Handle left/right arrows: cursor movement in text fields, cycling
    /// in selectors. Changing category resets the subcategory, since the
    /// options depend on it.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            CATEGORY_ORDER => {
                self.category = cycle(self.category, CATEGORIES.len(), right);
                self.subcategory = 0;
            }
            SUBCATEGORY_ORDER => {
                let len = subcategories_for(self.selected_category()).len() + 1;
                self.subcategory = cycle(self.subcategory, len, right);
            }
            PRIORITY_ORDER => {
                self.priority = cycle(self.priority, self.priorities.len(), right);
            }
            STATUS_ORDER => {
                self.status = cycle(self.status, self.statuses.len(), right);
            }
            TEAM_VIEW_ORDER => {
                self.team_view = cycle(self.team_view, self.team_views.len(), right);
            }
            _ => {
                if let Some(field) = self.active_field_mut() {
                    if right {
                        field.move_cursor_right();
                    } else {
                        field.move_cursor_left();
                    }
                }
            }
        }
    }

    /// Validate the form into fields for a new task.
    pub fn build_new(&self, now: DateTime<Local>) -> Result<NewTask, String> {
        if self.title.value.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        let due = parse_due_input(&self.due.value, now)
            .ok_or_else(|| format!("Unrecognised due date '{}'", self.due.value))?;
        let category = self.selected_category();
        let (control_type, workflow_name) = if category.contains("PnL") {
            ("Final PnL Sign-Off", "PnL Sign-Off")
        } else {
            ("Trade Surveillance Alert", "Transaction Monitoring")
        };
        Ok(NewTask {
            title: self.title.value.trim().to_string(),
            description: self.description.value.clone(),
            status: self.statuses[self.status],
            priority: self.priorities[self.priority],
            due,
            assigned_to: self.assigned_to.value.clone(),
            category: category.to_string(),
            subcategory: self.selected_subcategory(),
            control_name: self.control_name.value.clone(),
            control_type: control_type.to_string(),
            workflow_name: workflow_name.to_string(),
            workflow_step: self.workflow_step.value.clone(),
            alert_text: None,
            team_view: self.team_views[self.team_view],
        })
    }

    /// Validate the form into a patch for an existing task.
    pub fn build_patch(&self, now: DateTime<Local>) -> Result<TaskPatch, String> {
        let new = self.build_new(now)?;
        Ok(TaskPatch {
            title: Some(new.title),
            description: Some(new.description),
            status: Some(new.status),
            priority: Some(new.priority),
            due: Some(new.due),
            assigned_to: Some(new.assigned_to),
            category: Some(new.category),
            subcategory: Some(new.subcategory),
            control_name: Some(new.control_name),
            workflow_step: Some(new.workflow_step),
            alert_text: None,
            team_view: Some(new.team_view),
        })
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

fn cycle(current: usize, len: usize, forward: bool) -> usize {
    if forward {
        (current + 1) % len
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_title_rejected() {
        let form = TaskForm::new();
        assert!(form.build_new(Local::now()).is_err());
    }

    #[test]
    fn test_build_new_from_defaults() {
        let mut form = TaskForm::new();
        for c in "IPV check".chars() {
            form.handle_char(c);
        }
        let new = form.build_new(Local::now()).unwrap();
        assert_eq!(new.title, "IPV check");
        assert_eq!(new.status, Status::Outstanding);
        assert_eq!(new.priority, Priority::Medium);
        assert_eq!(new.category, CATEGORIES[0]);
    }

    #[test]
    fn test_category_change_resets_subcategory() {
        let mut form = TaskForm::new();
        form.current_field = SUBCATEGORY_ORDER;
        form.handle_left_right(true);
        assert_eq!(form.subcategory, 1);
        form.current_field = CATEGORY_ORDER;
        form.handle_left_right(true);
        assert_eq!(form.subcategory, 0);
    }

    #[test]
    fn test_bad_due_rejected() {
        let mut form = TaskForm::new();
        form.title = InputField::with_value("x");
        form.due = InputField::with_value("whenever");
        assert!(form.build_new(Local::now()).is_err());
    }
}
