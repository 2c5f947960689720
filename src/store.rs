//! In-memory task store.
//!
//! `TaskStore` is the single source of truth for the task collection, the
//! active filter specification and the current detail-view selection for
//! one session. All mutation is synchronous; every change is visible to the
//! next read. There is no persistence — a new session regenerates a fresh
//! synthetic collection.

use chrono::{DateTime, Local};

use crate::dates;
use crate::fields::{DocumentType, Severity, Status, format_document_type};
use crate::filter::FilterSpec;
use crate::task::{NewTask, Task, TaskNote, TaskPatch};

/// Counts backing the dashboard status tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub outstanding: usize,
    pub due_today: usize,
    pub upcoming: usize,
    pub completed: usize,
    pub all: usize,
}

/// State container for the task collection and its derived filtered view.
///
/// Mutations that name an unknown identifier are permissive no-ops; they
/// report `false` so callers can surface a "not found" message, but they
/// never fail.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    filters: FilterSpec,
    selected: Option<String>,
}

impl TaskStore {
    /// Create a store over an initial collection, with no active filters
    /// and no selection.
    pub fn new(tasks: Vec<Task>) -> Self {
        TaskStore {
            tasks,
            filters: FilterSpec::default(),
            selected: None,
        }
    }

    /// The full, unfiltered collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The active filter specification.
    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    /// Replace the filter specification wholesale.
    pub fn set_filters(&mut self, spec: FilterSpec) {
        self.filters = spec;
    }

    /// The ordered subsequence of tasks matching the active filters,
    /// recomputed on every read.
    pub fn filtered(&self, now: DateTime<Local>) -> Vec<&Task> {
        self.filters.apply(&self.tasks, now)
    }

    /// Look up a task by identifier.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Replace a task's status. Returns false if the identifier is unknown.
    pub fn update_status(&mut self, id: &str, status: Status) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.status = status;
                true
            }
            None => false,
        }
    }

    /// Merge a patch into the matching task. Returns false if the
    /// identifier is unknown. Selection tracks the identifier, so an edit
    /// to the selected task is reflected in the detail view with no extra
    /// bookkeeping.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                patch.apply_to(task);
                true
            }
            None => false,
        }
    }

    /// Add a task, synthesizing its identifier and creation timestamp.
    /// New tasks are prepended, matching the dashboard's newest-first list.
    /// Returns the new identifier.
    pub fn add(&mut self, fields: NewTask, now: DateTime<Local>) -> String {
        let id = self.next_id();
        self.tasks.insert(
            0,
            Task {
                id: id.clone(),
                title: fields.title,
                description: fields.description,
                status: fields.status,
                priority: fields.priority,
                due: fields.due,
                created: now,
                assigned_to: fields.assigned_to,
                category: fields.category,
                subcategory: fields.subcategory,
                control_name: fields.control_name,
                control_type: fields.control_type,
                workflow_name: fields.workflow_name,
                workflow_step: fields.workflow_step,
                alert_text: fields.alert_text,
                team_view: fields.team_view,
                responsible_supervisor: None,
                responsible_employee: None,
                notes: Vec::new(),
                files: Vec::new(),
                info_rows: Vec::new(),
            },
        );
        id
    }

    /// Remove a task. Clears the selection if it pointed at the removed
    /// task. Returns false (and changes nothing) if the identifier is
    /// unknown, so repeating a delete is a no-op.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() < before;
        if removed && self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        removed
    }

    /// Set or clear the detail-view selection.
    pub fn select(&mut self, id: Option<String>) {
        self.selected = id;
    }

    /// The currently selected task, if the selection still exists.
    pub fn selected_task(&self) -> Option<&Task> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    /// The selected identifier, if any.
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Append a note to a task. Returns false if the identifier is unknown.
    pub fn add_note(&mut self, id: &str, note: TaskNote) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.notes.push(note);
                true
            }
            None => false,
        }
    }

    /// Bulk sign-off: mark each named task completed, stamp its workflow
    /// step, and append a note recording the chosen document type. Unknown
    /// identifiers are skipped. Returns how many tasks were updated.
    pub fn sign_off(
        &mut self,
        ids: &[String],
        document_type: DocumentType,
        author: &str,
        note: &str,
        now: DateTime<Local>,
    ) -> usize {
        let mut updated = 0;
        for id in ids {
            if let Some(task) = self.get_mut(id) {
                task.status = Status::Completed;
                task.workflow_step = "COMPLETE".to_string();
                let content = if note.is_empty() {
                    format!("Signed off ({})", format_document_type(document_type))
                } else {
                    format!("Signed off ({}): {}", format_document_type(document_type), note)
                };
                task.notes.push(TaskNote {
                    author: author.to_string(),
                    content,
                    timestamp: now,
                    avatar: None,
                    approved: true,
                });
                updated += 1;
            }
        }
        updated
    }

    /// Tab counts over the full collection: outstanding, due today,
    /// upcoming, completed, and all.
    pub fn stats(&self, now: DateTime<Local>) -> Stats {
        let mut stats = Stats {
            outstanding: 0,
            due_today: 0,
            upcoming: 0,
            completed: 0,
            all: self.tasks.len(),
        };
        for task in &self.tasks {
            match task.status {
                Status::Completed => stats.completed += 1,
                Status::Outstanding => {
                    stats.outstanding += 1;
                    match dates::severity(task.due, now) {
                        Severity::DueToday => stats.due_today += 1,
                        Severity::Normal => stats.upcoming += 1,
                        Severity::Overdue => {}
                    }
                }
            }
        }
        stats
    }

    /// Next identifier: one past the highest numeric id in the collection.
    fn next_id(&self) -> String {
        let max = self
            .tasks
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use chrono::Duration;

    fn task(id: &str, status: Status) -> Task {
        let now = Local::now();
        Task {
            id: id.to_string(),
            title: format!("Control Review {}", id),
            description: String::new(),
            status,
            priority: Priority::Low,
            due: now + Duration::days(2),
            created: now,
            assigned_to: "Not Delegated".to_string(),
            category: "Anomalous Trading".to_string(),
            subcategory: None,
            control_name: "WashTrade Detection".to_string(),
            control_type: "Trade Surveillance Alert".to_string(),
            workflow_name: "Transaction Monitoring".to_string(),
            workflow_step: "Under Investigation".to_string(),
            alert_text: None,
            team_view: None,
            responsible_supervisor: None,
            responsible_employee: None,
            notes: Vec::new(),
            files: Vec::new(),
            info_rows: Vec::new(),
        }
    }

    fn store() -> TaskStore {
        TaskStore::new(vec![
            task("167175", Status::Outstanding),
            task("167176", Status::Completed),
            task("167177", Status::Outstanding),
        ])
    }

    #[test]
    fn test_update_status_changes_only_that_task() {
        let mut s = store();
        assert!(s.update_status("167175", Status::Completed));
        assert_eq!(s.get("167175").unwrap().status, Status::Completed);
        assert_eq!(s.get("167177").unwrap().status, Status::Outstanding);
    }

    #[test]
    fn test_update_status_unknown_id_is_noop() {
        let mut s = store();
        assert!(!s.update_status("999999", Status::Completed));
        assert_eq!(s.tasks().len(), 3);
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut s = store();
        let patch = TaskPatch {
            title: Some("Renamed".to_string()),
            priority: Some(Priority::Critical),
            ..TaskPatch::default()
        };
        assert!(s.update("167176", &patch));
        let t = s.get("167176").unwrap();
        assert_eq!(t.title, "Renamed");
        assert_eq!(t.priority, Priority::Critical);
        // Untouched fields survive.
        assert_eq!(t.status, Status::Completed);
        assert_eq!(t.control_name, "WashTrade Detection");
    }

    #[test]
    fn test_patch_can_clear_optional_fields() {
        let mut s = store();
        s.update(
            "167175",
            &TaskPatch {
                alert_text: Some(Some("variance detected".to_string())),
                ..TaskPatch::default()
            },
        );
        assert!(s.get("167175").unwrap().alert_text.is_some());
        s.update(
            "167175",
            &TaskPatch {
                alert_text: Some(None),
                ..TaskPatch::default()
            },
        );
        assert!(s.get("167175").unwrap().alert_text.is_none());
    }

    #[test]
    fn test_add_synthesizes_id_and_created() {
        let mut s = store();
        let now = Local::now();
        let id = s.add(
            NewTask {
                title: "New control".to_string(),
                description: String::new(),
                status: Status::Outstanding,
                priority: Priority::High,
                due: now + Duration::days(1),
                assigned_to: "Sarah Mitchell".to_string(),
                category: "Cancel and Amend Review".to_string(),
                subcategory: None,
                control_name: "CrossTrade Validation".to_string(),
                control_type: "Trade Surveillance Alert".to_string(),
                workflow_name: "Transaction Monitoring".to_string(),
                workflow_step: "Pending Finance Review".to_string(),
                alert_text: None,
                team_view: None,
            },
            now,
        );
        assert_eq!(id, "167178");
        assert_eq!(s.tasks().len(), 4);
        // Prepended.
        assert_eq!(s.tasks()[0].id, "167178");
        assert_eq!(s.tasks()[0].created, now);
    }

    #[test]
    fn test_delete_clears_selection_and_is_idempotent() {
        let mut s = store();
        s.select(Some("167176".to_string()));
        assert!(s.delete("167176"));
        assert_eq!(s.tasks().len(), 2);
        assert!(s.selected_task().is_none());
        // Second delete of the same id is a no-op.
        assert!(!s.delete("167176"));
        assert_eq!(s.tasks().len(), 2);
    }

    #[test]
    fn test_delete_keeps_unrelated_selection() {
        let mut s = store();
        s.select(Some("167175".to_string()));
        s.delete("167177");
        assert_eq!(s.selected_task().unwrap().id, "167175");
    }

    #[test]
    fn test_selection_sees_edits_without_refetch() {
        let mut s = store();
        s.select(Some("167175".to_string()));
        s.update(
            "167175",
            &TaskPatch {
                title: Some("Edited in place".to_string()),
                ..TaskPatch::default()
            },
        );
        assert_eq!(s.selected_task().unwrap().title, "Edited in place");
    }

    #[test]
    fn test_filters_drive_the_derived_view() {
        let mut s = store();
        s.set_filters(FilterSpec {
            status: Some(Status::Completed),
            ..FilterSpec::default()
        });
        let now = Local::now();
        let view = s.filtered(now);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "167176");
        // Mutation is immediately visible to the next read.
        s.update_status("167175", Status::Completed);
        assert_eq!(s.filtered(now).len(), 2);
    }

    #[test]
    fn test_sign_off_marks_completed_and_appends_note() {
        let mut s = store();
        let now = Local::now();
        let ids = vec!["167175".to_string(), "167177".to_string(), "nope".to_string()];
        let updated = s.sign_off(&ids, DocumentType::Attestation, "Emma Johnson", "All clear", now);
        assert_eq!(updated, 2);
        for id in ["167175", "167177"] {
            let t = s.get(id).unwrap();
            assert_eq!(t.status, Status::Completed);
            assert_eq!(t.workflow_step, "COMPLETE");
            let note = t.notes.last().unwrap();
            assert!(note.approved);
            assert_eq!(note.content, "Signed off (Attestation): All clear");
        }
    }

    #[test]
    fn test_stats_counts() {
        let mut s = store();
        // One outstanding task due today, one overdue.
        s.update(
            "167175",
            &TaskPatch {
                due: Some(Local::now()),
                ..TaskPatch::default()
            },
        );
        s.update(
            "167177",
            &TaskPatch {
                due: Some(Local::now() - Duration::days(3)),
                ..TaskPatch::default()
            },
        );
        let stats = s.stats(Local::now());
        assert_eq!(stats.all, 3);
        assert_eq!(stats.outstanding, 2);
        assert_eq!(stats.due_today, 1);
        assert_eq!(stats.upcoming, 0);
        assert_eq!(stats.completed, 1);
    }
}
