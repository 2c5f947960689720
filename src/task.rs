//! Task data structures and partial-update types.
//!
//! This module defines the core `Task` struct representing a single
//! compliance control item, its owned collections (notes, files,
//! reconciliation rows), and the `NewTask`/`TaskPatch` types used by the
//! store's add and update operations.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::fields::{Priority, Status, TeamView};

/// A compliance control work item with workflow and assignment metadata.
///
/// The identifier is unique within a collection and never reassigned.
/// `created` is set once at creation; `due` is mutable via edit. Days
/// overdue is always recomputed from the due date, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due: DateTime<Local>,
    pub created: DateTime<Local>,
    pub assigned_to: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub control_name: String,
    pub control_type: String,
    pub workflow_name: String,
    pub workflow_step: String,
    pub alert_text: Option<String>,
    pub team_view: Option<TeamView>,
    pub responsible_supervisor: Option<String>,
    pub responsible_employee: Option<String>,
    #[serde(default)]
    pub notes: Vec<TaskNote>,
    #[serde(default)]
    pub files: Vec<TaskFile>,
    #[serde(default)]
    pub info_rows: Vec<InfoRow>,
}

impl Task {
    /// Whole days this task is past due, 0 if not past due.
    pub fn days_overdue(&self, now: DateTime<Local>) -> i64 {
        dates::days_overdue(self.due, now)
    }
}

/// A note attached to a task. Append-only from the user's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNote {
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Local>,
    /// Author initials shown next to the note.
    pub avatar: Option<String>,
    #[serde(default)]
    pub approved: bool,
}

/// A file reference attached to a task. No bytes are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub reference: String,
}

/// One row of the additional-info reconciliation table: expected vs.
/// actual value for an application/account pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoRow {
    pub application: String,
    pub account: String,
    pub expected: f64,
    pub actual: f64,
}

impl InfoRow {
    pub fn variance(&self) -> f64 {
        self.actual - self.expected
    }
}

/// Fields for a task about to be added. The store synthesizes the
/// identifier and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due: DateTime<Local>,
    pub assigned_to: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub control_name: String,
    pub control_type: String,
    pub workflow_name: String,
    pub workflow_step: String,
    pub alert_text: Option<String>,
    pub team_view: Option<TeamView>,
}

/// An explicit partial update: every field optional, merged onto a task by
/// [`crate::store::TaskStore::update`]. Identifier and creation timestamp
/// are deliberately absent; both are immutable.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub due: Option<DateTime<Local>>,
    pub assigned_to: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<Option<String>>,
    pub control_name: Option<String>,
    pub workflow_step: Option<String>,
    pub alert_text: Option<Option<String>>,
    pub team_view: Option<Option<TeamView>>,
}

impl TaskPatch {
    /// Apply every present field to the task.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(v) = &self.title {
            task.title = v.clone();
        }
        if let Some(v) = &self.description {
            task.description = v.clone();
        }
        if let Some(v) = self.status {
            task.status = v;
        }
        if let Some(v) = self.priority {
            task.priority = v;
        }
        if let Some(v) = self.due {
            task.due = v;
        }
        if let Some(v) = &self.assigned_to {
            task.assigned_to = v.clone();
        }
        if let Some(v) = &self.category {
            task.category = v.clone();
        }
        if let Some(v) = &self.subcategory {
            task.subcategory = v.clone();
        }
        if let Some(v) = &self.control_name {
            task.control_name = v.clone();
        }
        if let Some(v) = &self.workflow_step {
            task.workflow_step = v.clone();
        }
        if let Some(v) = &self.alert_text {
            task.alert_text = v.clone();
        }
        if let Some(v) = self.team_view {
            task.team_view = v;
        }
    }
}
