//! Enumerations for TUI state management.

use crate::fields::Status;

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq)]
pub enum AppState {
    TaskList,
    TaskDetail,
    FilterSheet,
    AddTask,
    EditTask,
    SignOff,
    Help,
    Confirm,
}

/// Input mode for text entry fields.
#[derive(Clone, Copy, PartialEq)]
pub enum InputMode {
    None,
    Text,
}

/// Status tab across the top of the task list.
#[derive(Clone, Copy, PartialEq)]
pub enum StatusTab {
    All,
    Outstanding,
    Completed,
}

impl StatusTab {
    /// The next tab in cycling order.
    pub fn next(self) -> Self {
        match self {
            StatusTab::All => StatusTab::Outstanding,
            StatusTab::Outstanding => StatusTab::Completed,
            StatusTab::Completed => StatusTab::All,
        }
    }

    /// The status this tab restricts to, if any.
    pub fn status(self) -> Option<Status> {
        match self {
            StatusTab::All => None,
            StatusTab::Outstanding => Some(Status::Outstanding),
            StatusTab::Completed => Some(Status::Completed),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusTab::All => "All",
            StatusTab::Outstanding => "Outstanding",
            StatusTab::Completed => "Completed",
        }
    }
}
