//! Task filtering.
//!
//! A `FilterSpec` is a value object holding the currently active predicate
//! values. All dimensions are ANDed together; within the free-text search
//! the title, control name and identifier are ORed. Filtering preserves the
//! input order of the collection and never fabricates or duplicates entries.

use chrono::{DateTime, Local};

use crate::dates;
use crate::fields::{Priority, Status, TeamView};
use crate::task::Task;

/// The active filter predicate values. Replaced wholesale on every change.
///
/// `None` (or an empty string) on a dimension means "match everything".
/// `due_within` keeps the raw form input; anything that does not parse as an
/// integer degrades to no restriction rather than failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub status: Option<Status>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub priority: Option<Priority>,
    pub team_view: Option<TeamView>,
    pub search: String,
    pub due_within: String,
}

impl FilterSpec {
    /// True when no dimension restricts anything.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.category.is_none()
            && self.subcategory.is_none()
            && self.priority.is_none()
            && self.team_view.is_none()
            && self.search.is_empty()
            && self.due_window().is_none()
    }

    /// The parsed day-window bound, if one is set and well-formed.
    pub fn due_window(&self) -> Option<i64> {
        let s = self.due_within.trim();
        if s.is_empty() {
            return None;
        }
        s.parse().ok()
    }

    /// Whether a single task satisfies every active predicate.
    pub fn matches(&self, task: &Task, now: DateTime<Local>) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if task.category != *category {
                return false;
            }
        }
        if let Some(subcategory) = &self.subcategory {
            if task.subcategory.as_deref() != Some(subcategory.as_str()) {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(team_view) = self.team_view {
            if task.team_view != Some(team_view) {
                return false;
            }
        }
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let hit = task.title.to_lowercase().contains(&needle)
                || task.control_name.to_lowercase().contains(&needle)
                || task.id.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(days) = self.due_window() {
            if dates::days_from_now(task.due, now) > days {
                return false;
            }
        }
        true
    }

    /// The ordered subsequence of tasks matching every active predicate.
    pub fn apply<'a>(&self, tasks: &'a [Task], now: DateTime<Local>) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t, now)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(id: &str, status: Status) -> Task {
        let now = Local::now();
        Task {
            id: id.to_string(),
            title: format!("Final PnL Sign-Off - Control Review {}", id),
            description: "desc".to_string(),
            status,
            priority: Priority::Medium,
            due: now + Duration::days(1),
            created: now,
            assigned_to: "Alex Thompson".to_string(),
            category: "Final PnL Sign-Off".to_string(),
            subcategory: None,
            control_name: "Rates | Institutional Swaps | PnL Sign-Off".to_string(),
            control_type: "Final PnL Sign-Off".to_string(),
            workflow_name: "PnL Sign-Off".to_string(),
            workflow_step: "Pending Desk Approval".to_string(),
            alert_text: None,
            team_view: Some(TeamView::Owner),
            responsible_supervisor: None,
            responsible_employee: None,
            notes: Vec::new(),
            files: Vec::new(),
            info_rows: Vec::new(),
        }
    }

    #[test]
    fn test_empty_spec_matches_all_and_preserves_order() {
        let tasks = vec![
            sample("1", Status::Outstanding),
            sample("2", Status::Completed),
            sample("3", Status::Outstanding),
        ];
        let spec = FilterSpec::default();
        let out = spec.apply(&tasks, Local::now());
        let ids: Vec<&str> = out.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_status_filter_completed() {
        let tasks = vec![
            sample("1", Status::Outstanding),
            sample("2", Status::Completed),
            sample("3", Status::Outstanding),
        ];
        let spec = FilterSpec {
            status: Some(Status::Completed),
            ..FilterSpec::default()
        };
        let out = spec.apply(&tasks, Local::now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "2");
    }

    #[test]
    fn test_result_is_subsequence_and_idempotent() {
        let tasks = vec![
            sample("10", Status::Outstanding),
            sample("11", Status::Completed),
            sample("12", Status::Outstanding),
            sample("13", Status::Completed),
        ];
        let now = Local::now();
        let spec = FilterSpec {
            status: Some(Status::Outstanding),
            ..FilterSpec::default()
        };
        let once: Vec<Task> = spec.apply(&tasks, now).into_iter().cloned().collect();
        // Every survivor satisfies the predicate; every excluded task
        // violates it.
        assert!(once.iter().all(|t| spec.matches(t, now)));
        assert!(tasks
            .iter()
            .filter(|t| !once.iter().any(|o| o.id == t.id))
            .all(|t| !spec.matches(t, now)));
        let twice = spec.apply(&once, now);
        assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn test_search_matches_id() {
        let mut task = sample("167180", Status::Outstanding);
        task.title = "Anomalous Trading - Control Review 6".to_string();
        task.control_name = "WashTrade Detection".to_string();
        let tasks = vec![task, sample("167181", Status::Outstanding)];
        let spec = FilterSpec {
            search: "167180".to_string(),
            ..FilterSpec::default()
        };
        let out = spec.apply(&tasks, Local::now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "167180");
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_and_control() {
        let tasks = vec![sample("1", Status::Outstanding)];
        for needle in ["final pnl", "FINAL PNL", "institutional swaps"] {
            let spec = FilterSpec {
                search: needle.to_string(),
                ..FilterSpec::default()
            };
            assert_eq!(spec.apply(&tasks, Local::now()).len(), 1, "{}", needle);
        }
    }

    #[test]
    fn test_due_window_seven_days() {
        let now = Local::now();
        let mut in_five = sample("1", Status::Outstanding);
        in_five.due = now + Duration::days(5);
        let mut in_ten = sample("2", Status::Outstanding);
        in_ten.due = now + Duration::days(10);
        let tasks = vec![in_five, in_ten];
        let spec = FilterSpec {
            due_within: "7".to_string(),
            ..FilterSpec::default()
        };
        let out = spec.apply(&tasks, now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");
    }

    #[test]
    fn test_due_window_includes_overdue_tasks() {
        let now = Local::now();
        let mut late = sample("1", Status::Outstanding);
        late.due = now - Duration::days(3);
        let spec = FilterSpec {
            due_within: "7".to_string(),
            ..FilterSpec::default()
        };
        assert!(spec.matches(&late, now));
    }

    #[test]
    fn test_malformed_due_window_is_no_restriction() {
        let now = Local::now();
        let mut far = sample("1", Status::Outstanding);
        far.due = now + Duration::days(90);
        for raw in ["abc", "7 days", "--", " "] {
            let spec = FilterSpec {
                due_within: raw.to_string(),
                ..FilterSpec::default()
            };
            assert!(spec.due_window().is_none(), "{:?}", raw);
            assert!(spec.matches(&far, now), "{:?}", raw);
        }
    }

    #[test]
    fn test_subcategory_requires_exact_match() {
        let mut with_sub = sample("1", Status::Outstanding);
        with_sub.subcategory = Some("Securities Dealer Transaction Review".to_string());
        let without = sample("2", Status::Outstanding);
        let tasks = vec![with_sub, without];
        let spec = FilterSpec {
            subcategory: Some("Securities Dealer Transaction Review".to_string()),
            ..FilterSpec::default()
        };
        let out = spec.apply(&tasks, Local::now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");
    }

    #[test]
    fn test_dimensions_are_conjunctive() {
        let mut a = sample("1", Status::Outstanding);
        a.priority = Priority::Critical;
        let mut b = sample("2", Status::Completed);
        b.priority = Priority::Critical;
        let tasks = vec![a, b];
        let spec = FilterSpec {
            status: Some(Status::Outstanding),
            priority: Some(Priority::Critical),
            ..FilterSpec::default()
        };
        let out = spec.apply(&tasks, Local::now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");
    }

    #[test]
    fn test_team_view_filter() {
        let mut watcher = sample("1", Status::Outstanding);
        watcher.team_view = Some(TeamView::Watcher);
        let owner = sample("2", Status::Outstanding);
        let tasks = vec![watcher, owner];
        let spec = FilterSpec {
            team_view: Some(TeamView::Watcher),
            ..FilterSpec::default()
        };
        let out = spec.apply(&tasks, Local::now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");
    }
}
