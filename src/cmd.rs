//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers for the subcommands: the
//! dashboard TUI, filtered listings, single-task views, tab statistics,
//! JSON export of the generated collection, and shell completions.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::dates::{format_due, severity};
use crate::fields::{
    format_priority, format_status, format_team_view, Priority, Severity, Status, TeamView,
};
use crate::filter::FilterSpec;
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive dashboard.
    Ui,

    /// List tasks with optional filters.
    List {
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Filter by category (exact name).
        #[arg(long)]
        category: Option<String>,
        /// Filter by subcategory (exact name).
        #[arg(long)]
        subcategory: Option<String>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Filter by team view.
        #[arg(long, value_enum)]
        team_view: Option<TeamView>,
        /// Case-insensitive search over title, control name and id.
        #[arg(long)]
        search: Option<String>,
        /// Keep only tasks due within this many days.
        #[arg(long)]
        due_within: Option<String>,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task by id.
    View {
        /// Task id to view.
        id: String,
    },

    /// Print status-tab counts for the collection.
    Stats,

    /// Dump the generated collection as JSON.
    Export {
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the dashboard TUI over the store.
pub fn cmd_ui(store: TaskStore) {
    if let Err(e) = run_tui(store) {
        eprintln!("UI error: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_list(
    store: &mut TaskStore,
    status: Option<Status>,
    category: Option<String>,
    subcategory: Option<String>,
    priority: Option<Priority>,
    team_view: Option<TeamView>,
    search: Option<String>,
    due_within: Option<String>,
    limit: Option<usize>,
) {
    store.set_filters(FilterSpec {
        status,
        category,
        subcategory,
        priority,
        team_view,
        search: search.unwrap_or_default(),
        due_within: due_within.unwrap_or_default(),
    });
    let now = Local::now();
    let tasks = store.filtered(now);
    if tasks.is_empty() {
        println!("No tasks found");
        return;
    }
    let shown = limit.unwrap_or(tasks.len()).min(tasks.len());
    print_table(&tasks[..shown], now);
    if shown < tasks.len() {
        println!("... and {} more", tasks.len() - shown);
    }
}

pub fn cmd_view(store: &TaskStore, id: &str) {
    let Some(task) = store.get(id) else {
        println!("No task with id {}", id);
        return;
    };
    let now = Local::now();
    println!("#{}  {}", task.id, task.title);
    println!("Status:     {}", format_status(task.status));
    println!("Priority:   {}", format_priority(task.priority));
    print!("Due:        {}", format_due(task.due, now));
    let overdue = task.days_overdue(now);
    if task.status == Status::Outstanding && overdue > 0 {
        print!("  ({}d overdue)", overdue);
    }
    println!();
    println!("Created:    {}", format_due(task.created, now));
    println!("Assigned:   {}", task.assigned_to);
    println!("Category:   {}", task.category);
    if let Some(sub) = &task.subcategory {
        println!("Subcat:     {}", sub);
    }
    println!("Control:    {}", task.control_name);
    println!("Type:       {}", task.control_type);
    println!("Workflow:   {} / {}", task.workflow_name, task.workflow_step);
    println!("Team view:  {}", format_team_view(task.team_view));
    if let Some(sup) = &task.responsible_supervisor {
        println!("Supervisor: {}", sup);
    }
    if let Some(emp) = &task.responsible_employee {
        println!("Employee:   {}", emp);
    }
    if let Some(alert) = &task.alert_text {
        println!("\n!! {}", alert);
    }
    println!("\n{}", task.description);
    if !task.notes.is_empty() {
        println!("\nNotes:");
        for note in &task.notes {
            let mark = if note.approved { " [approved]" } else { "" };
            println!(
                "  {} ({}){}: {}",
                note.author,
                format_due(note.timestamp, now),
                mark,
                note.content
            );
        }
    }
    if !task.files.is_empty() {
        println!("\nFiles:");
        for file in &task.files {
            println!("  {} ({} KB)", file.name, file.size / 1024);
        }
    }
    if !task.info_rows.is_empty() {
        println!("\nAdditional info:");
        println!(
            "  {:<10} {:<12} {:>14} {:>14} {:>12}",
            "App", "Account", "Expected", "Actual", "Variance"
        );
        for row in &task.info_rows {
            println!(
                "  {:<10} {:<12} {:>14.2} {:>14.2} {:>12.2}",
                row.application,
                row.account,
                row.expected,
                row.actual,
                row.variance()
            );
        }
    }
}

pub fn cmd_stats(store: &TaskStore) {
    let stats = store.stats(Local::now());
    println!("Outstanding: {}", stats.outstanding);
    println!("Due today:   {}", stats.due_today);
    println!("Upcoming:    {}", stats.upcoming);
    println!("Completed:   {}", stats.completed);
    println!("All:         {}", stats.all);
}

pub fn cmd_export(store: &TaskStore, output: Option<PathBuf>) {
    let json = match serde_json::to_string_pretty(store.tasks()) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to serialize tasks: {}", e);
            std::process::exit(1);
        }
    };
    match output {
        Some(path) => {
            let result = File::create(&path).and_then(|mut f| f.write_all(json.as_bytes()));
            match result {
                Ok(()) => println!("Exported {} tasks to {}", store.tasks().len(), path.display()),
                Err(e) => {
                    eprintln!("Failed to write {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => println!("{}", json),
    }
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Print tasks in a fixed-width table with severity markers.
fn print_table(tasks: &[&Task], now: DateTime<Local>) {
    println!(
        "{:<8} {:<3} {:<12} {:<9} {:<22} {:<36} {}",
        "ID", "", "Status", "Priority", "Due", "Category", "Title"
    );
    for task in tasks {
        let marker = match severity(task.due, now) {
            Severity::Overdue if task.status == Status::Outstanding => "!",
            Severity::DueToday if task.status == Status::Outstanding => "*",
            _ => "",
        };
        println!(
            "{:<8} {:<3} {:<12} {:<9} {:<22} {:<36} {}",
            task.id,
            marker,
            format_status(task.status),
            format_priority(task.priority),
            format_due(task.due, now),
            truncate(&task.category, 36),
            truncate(&task.title, 48)
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-ten", 11), "exactly-ten");
        let cut = truncate("a very long category name", 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with('…'));
    }
}
