//! Enumerations and field types for control-monitor tasks.
//!
//! This module defines the structured data types used to classify tasks:
//! completion status, priority, the viewer's team relationship, sign-off
//! document types, and the derived due-date classifications.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task completion status.
///
/// Two states only; "overdue" is a derived display concept computed from the
/// due date (see [`crate::dates::severity`]), never stored on the task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[serde(alias = "Outstanding")]
    Outstanding,
    #[serde(alias = "Completed")]
    Completed,
}

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// The current viewer's relationship to a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TeamView {
    /// Task is owned by the viewer.
    Owner,
    /// Pending on someone else.
    Pending,
    /// Viewer is watching the task.
    Watcher,
    /// Request for information directed at the viewer.
    Rfi,
    /// Task belongs to the viewer's team.
    Team,
    /// Task belongs to the viewer's extended team.
    Extended,
}

/// Document type attached to a bulk sign-off action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Attestation,
    Exception,
    SupportingEvidence,
    ManagementApproval,
}

/// Derived urgency of a due date relative to the current moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Overdue,
    DueToday,
    Normal,
}

/// Relative calendar-day bucket for a due date, used to pick a
/// human-readable label ("Today, 3:00 PM" vs. "Jun 12, 2025, 3:00 PM").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayBucket {
    Today,
    Tomorrow,
    Yesterday,
    Other,
}

/// Format a status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Outstanding => "Outstanding",
        Status::Completed => "Completed",
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
        Priority::Critical => "Critical",
    }
}

/// Format a team view tag for display.
pub fn format_team_view(t: Option<TeamView>) -> &'static str {
    match t {
        Some(TeamView::Owner) => "My Items",
        Some(TeamView::Pending) => "Pending on Others",
        Some(TeamView::Watcher) => "Watching",
        Some(TeamView::Rfi) => "RFI",
        Some(TeamView::Team) => "Team",
        Some(TeamView::Extended) => "Extended Team",
        None => "-",
    }
}

/// Format a sign-off document type for display.
pub fn format_document_type(d: DocumentType) -> &'static str {
    match d {
        DocumentType::Attestation => "Attestation",
        DocumentType::Exception => "Exception",
        DocumentType::SupportingEvidence => "Supporting Evidence",
        DocumentType::ManagementApproval => "Management Approval",
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format_status(*self))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format_priority(*self))
    }
}
