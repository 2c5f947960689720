//! Main application logic for the dashboard TUI.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the interface, and coordinates between the
//! task list, detail view, filter sheet, task forms and the sign-off
//! dialog.

use std::collections::HashSet;
use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::dates::{format_due, severity};
use crate::fields::{
    format_document_type, format_priority, format_status, format_team_view, Priority, Severity,
    Status, TeamView,
};
use crate::filter::FilterSpec;
use crate::generate::{subcategories_for, CATEGORIES};
use crate::store::TaskStore;
use crate::task::TaskNote;
use crate::tui::colors::{ALERT_RED, BRAND_RED, CRITICAL_MAGENTA, MUTED_GRAY, WARN_YELLOW};
use crate::tui::enums::{AppState, InputMode, StatusTab};
use crate::tui::form::{
    TaskForm, ASSIGNED_ORDER, CATEGORY_ORDER, CONTROL_NAME_ORDER, DESCRIPTION_ORDER, DUE_ORDER,
    PRIORITY_ORDER, STATUS_ORDER, SUBCATEGORY_ORDER, TEAM_VIEW_ORDER, TITLE_ORDER,
    WORKFLOW_STEP_ORDER,
};
use crate::tui::input::InputField;
use crate::tui::signoff::{SignOffField, SignOffForm};
use crate::tui::utils::centered_rect;

/// Name the dashboard signs notes with. There is no user account system;
/// the viewer is a fixed reviewer identity.
const REVIEWER: &str = "Control Reviewer";

/// Filter sheet state: selectors over the category/subcategory/priority/
/// team-view dimensions plus the day-window text input. Index 0 of every
/// selector means "all".
struct FilterSheet {
    category: usize,
    subcategory: usize,
    priority: usize,
    team_view: usize,
    days: InputField,
    current_field: usize,
}

const SHEET_FIELDS: usize = 5;

impl FilterSheet {
    fn from_spec(spec: &FilterSpec) -> Self {
        let category = spec
            .category
            .as_deref()
            .and_then(|c| CATEGORIES.iter().position(|k| *k == c))
            .map(|i| i + 1)
            .unwrap_or(0);
        let sub_pool = if category == 0 {
            &[][..]
        } else {
            subcategories_for(CATEGORIES[category - 1])
        };
        let subcategory = spec
            .subcategory
            .as_deref()
            .and_then(|s| sub_pool.iter().position(|k| *k == s))
            .map(|i| i + 1)
            .unwrap_or(0);
        let priority = spec
            .priority
            .map(|p| PRIORITY_CHOICES.iter().position(|&k| k == p).unwrap_or(0) + 1)
            .unwrap_or(0);
        let team_view = spec
            .team_view
            .map(|t| TEAM_VIEW_CHOICES.iter().position(|&k| k == t).unwrap_or(0) + 1)
            .unwrap_or(0);
        FilterSheet {
            category,
            subcategory,
            priority,
            team_view,
            days: InputField::with_value(&spec.due_within),
            current_field: 0,
        }
    }

    fn selected_category(&self) -> Option<&'static str> {
        if self.category == 0 {
            None
        } else {
            Some(CATEGORIES[self.category - 1])
        }
    }

    fn selected_subcategory(&self) -> Option<String> {
        let pool = subcategories_for(self.selected_category()?);
        if self.subcategory == 0 {
            None
        } else {
            pool.get(self.subcategory - 1).map(|s| s.to_string())
        }
    }

    fn handle_left_right(&mut self, right: bool) {
        let cycle = |current: usize, len: usize| {
            if right {
                (current + 1) % len
            } else if current == 0 {
                len - 1
            } else {
                current - 1
            }
        };
        match self.current_field {
            0 => {
                self.category = cycle(self.category, CATEGORIES.len() + 1);
                self.subcategory = 0;
            }
            1 => {
                let pool = self
                    .selected_category()
                    .map(subcategories_for)
                    .unwrap_or(&[]);
                if !pool.is_empty() {
                    self.subcategory = cycle(self.subcategory, pool.len() + 1);
                }
            }
            2 => self.priority = cycle(self.priority, PRIORITY_CHOICES.len() + 1),
            3 => self.team_view = cycle(self.team_view, TEAM_VIEW_CHOICES.len() + 1),
            4 => {
                if right {
                    self.days.move_cursor_right();
                } else {
                    self.days.move_cursor_left();
                }
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.category = 0;
        self.subcategory = 0;
        self.priority = 0;
        self.team_view = 0;
        self.days.clear();
    }
}

const PRIORITY_CHOICES: [Priority; 4] = [
    Priority::Low,
    Priority::Medium,
    Priority::High,
    Priority::Critical,
];

const TEAM_VIEW_CHOICES: [TeamView; 6] = [
    TeamView::Owner,
    TeamView::Pending,
    TeamView::Watcher,
    TeamView::Rfi,
    TeamView::Team,
    TeamView::Extended,
];

/// Main application state for the dashboard.
///
/// Owns the task store, the current screen, the derived list of visible
/// task ids, multi-selection for sign-off, and the various dialog forms.
pub struct App {
    state: AppState,
    store: TaskStore,
    table_state: TableState,
    visible: Vec<String>,
    tab: StatusTab,
    search_text: String,
    search_active: bool,
    marked: HashSet<String>,
    task_form: TaskForm,
    signoff_form: SignOffForm,
    sheet: FilterSheet,
    input_mode: InputMode,
    status_message: String,
    confirm_delete: Option<String>,
    note_field: InputField,
    note_active: bool,
}

impl App {
    /// Create the app over a populated store and compute the initial view.
    pub fn new(store: TaskStore) -> Self {
        let sheet = FilterSheet::from_spec(store.filters());
        let mut app = App {
            state: AppState::TaskList,
            store,
            table_state: TableState::default(),
            visible: Vec::new(),
            tab: StatusTab::All,
            search_text: String::new(),
            search_active: false,
            marked: HashSet::new(),
            task_form: TaskForm::new(),
            signoff_form: SignOffForm::new(0),
            sheet,
            input_mode: InputMode::None,
            status_message: String::new(),
            confirm_delete: None,
            note_field: InputField::new(),
            note_active: false,
        };
        app.refresh_view();
        app
    }

    /// Main loop: draw, poll, handle, until quit.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;
            if self.handle_input()? {
                return Ok(());
            }
        }
    }

    /// Rebuild the filter spec from the tab, search text and filter sheet,
    /// push it into the store, and recompute the visible id list.
    /// Attempts to preserve the highlighted row when possible.
    fn refresh_view(&mut self) {
        let old_selected_id = self
            .table_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .cloned();

        self.store.set_filters(FilterSpec {
            status: self.tab.status(),
            category: self.sheet.selected_category().map(str::to_string),
            subcategory: self.sheet.selected_subcategory(),
            priority: if self.sheet.priority == 0 {
                None
            } else {
                Some(PRIORITY_CHOICES[self.sheet.priority - 1])
            },
            team_view: if self.sheet.team_view == 0 {
                None
            } else {
                Some(TEAM_VIEW_CHOICES[self.sheet.team_view - 1])
            },
            search: self.search_text.clone(),
            due_within: self.sheet.days.value.clone(),
        });

        let now = Local::now();
        self.visible = self
            .store
            .filtered(now)
            .iter()
            .map(|t| t.id.clone())
            .collect();

        // Drop marks that are no longer in the collection at all.
        let store = &self.store;
        self.marked.retain(|id| store.get(id).is_some());

        if let Some(old_id) = old_selected_id {
            if let Some(new_idx) = self.visible.iter().position(|id| *id == old_id) {
                self.table_state.select(Some(new_idx));
                return;
            }
        }
        self.table_state.select(if self.visible.is_empty() {
            None
        } else {
            Some(0)
        });
    }

    /// The id under the cursor in the task list.
    fn highlighted_id(&self) -> Option<String> {
        self.table_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .cloned()
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    /// Ids a sign-off would cover: the marked set, or the highlighted task
    /// when nothing is marked.
    fn signoff_targets(&self) -> Vec<String> {
        if self.marked.is_empty() {
            self.highlighted_id().into_iter().collect()
        } else {
            let mut ids: Vec<String> = self.marked.iter().cloned().collect();
            ids.sort();
            ids
        }
    }

    // ---- input handling ----

    /// Poll for and dispatch keyboard events based on the current state.
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                self.status_message.clear();
                let quit = match self.state {
                    AppState::TaskList => self.handle_task_list_input(key.code, key.modifiers),
                    AppState::TaskDetail => self.handle_detail_input(key.code),
                    AppState::FilterSheet => self.handle_sheet_input(key.code, key.modifiers),
                    AppState::AddTask => self.handle_form_input(key.code, false),
                    AppState::EditTask => self.handle_form_input(key.code, true),
                    AppState::SignOff => self.handle_signoff_input(key.code),
                    AppState::Confirm => self.handle_confirm_input(key.code),
                    AppState::Help => self.handle_help_input(key.code),
                };
                return Ok(quit);
            }
        }
        Ok(false)
    }

    /// Keyboard input for the task list, including live search.
    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.search_active {
            match key {
                KeyCode::Esc => {
                    self.search_active = false;
                    self.search_text.clear();
                    self.input_mode = InputMode::None;
                    self.refresh_view();
                }
                KeyCode::Enter => {
                    self.search_active = false;
                    self.input_mode = InputMode::None;
                    self.set_status_message(format!(
                        "Search '{}' ({} tasks)",
                        self.search_text,
                        self.visible.len()
                    ));
                }
                KeyCode::Backspace => {
                    self.search_text.pop();
                    self.refresh_view();
                }
                KeyCode::Char(c) => {
                    self.search_text.push(c);
                    self.refresh_view();
                }
                _ => {}
            }
            return false;
        }

        match key {
            KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Esc => {
                if !self.search_text.is_empty() {
                    self.search_text.clear();
                    self.refresh_view();
                } else {
                    return true;
                }
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Tab => {
                self.tab = self.tab.next();
                self.refresh_view();
                self.set_status_message(format!(
                    "{} ({} tasks)",
                    self.tab.label(),
                    self.visible.len()
                ));
            }
            KeyCode::Enter => {
                if let Some(id) = self.highlighted_id() {
                    self.store.select(Some(id));
                    self.note_active = false;
                    self.note_field.clear();
                    self.state = AppState::TaskDetail;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.highlighted_id() {
                    if !self.marked.remove(&id) {
                        self.marked.insert(id);
                    }
                    self.move_selection(1);
                }
            }
            KeyCode::Char('a') => {
                self.task_form = TaskForm::new();
                self.state = AppState::AddTask;
                self.input_mode = InputMode::Text;
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.highlighted_id() {
                    if let Some(task) = self.store.get(&id) {
                        self.task_form = TaskForm::from_task(task);
                        self.store.select(Some(id));
                        self.state = AppState::EditTask;
                        self.input_mode = InputMode::Text;
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.highlighted_id() {
                    self.confirm_delete = Some(id);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('s') => {
                let targets = self.signoff_targets();
                if targets.is_empty() {
                    self.set_status_message("Nothing selected to sign off".to_string());
                } else {
                    self.signoff_form = SignOffForm::new(targets.len());
                    self.state = AppState::SignOff;
                    self.input_mode = InputMode::Text;
                }
            }
            KeyCode::Char('c') => {
                // Toggle completion in place.
                if let Some(id) = self.highlighted_id() {
                    let new_status = match self.store.get(&id).map(|t| t.status) {
                        Some(Status::Completed) => Status::Outstanding,
                        Some(Status::Outstanding) => Status::Completed,
                        None => return false,
                    };
                    if self.store.update_status(&id, new_status) {
                        self.refresh_view();
                        self.set_status_message(format!(
                            "Task {} marked {}",
                            id,
                            format_status(new_status)
                        ));
                    }
                }
            }
            KeyCode::Char('f') => {
                self.sheet = FilterSheet::from_spec(self.store.filters());
                self.state = AppState::FilterSheet;
            }
            KeyCode::Char('/') => {
                self.search_active = true;
                self.input_mode = InputMode::Text;
                self.set_status_message(
                    "Search: type to match title/control/id, Enter to apply, Esc to cancel"
                        .to_string(),
                );
            }
            KeyCode::Char('x') => {
                if self.marked.is_empty() {
                    self.set_status_message("No marks to clear".to_string());
                } else {
                    self.marked.clear();
                    self.set_status_message("Marks cleared".to_string());
                }
            }
            KeyCode::Char('h') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn move_selection(&mut self, delta: i64) {
        if self.visible.is_empty() {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as i64;
        let next = (current + delta).clamp(0, self.visible.len() as i64 - 1);
        self.table_state.select(Some(next as usize));
    }

    /// Keyboard input for the detail view, including the inline note
    /// input.
    fn handle_detail_input(&mut self, key: KeyCode) -> bool {
        if self.note_active {
            match key {
                KeyCode::Esc => {
                    self.note_active = false;
                    self.note_field.clear();
                    self.input_mode = InputMode::None;
                }
                KeyCode::Enter => {
                    let content = self.note_field.value.trim().to_string();
                    if !content.is_empty() {
                        if let Some(id) = self.store.selected_id().map(str::to_string) {
                            self.store.add_note(
                                &id,
                                TaskNote {
                                    author: REVIEWER.to_string(),
                                    content,
                                    timestamp: Local::now(),
                                    avatar: None,
                                    approved: false,
                                },
                            );
                            self.set_status_message("Note added".to_string());
                        }
                    }
                    self.note_active = false;
                    self.note_field.clear();
                    self.input_mode = InputMode::None;
                }
                KeyCode::Backspace => self.note_field.handle_backspace(),
                KeyCode::Left => self.note_field.move_cursor_left(),
                KeyCode::Right => self.note_field.move_cursor_right(),
                KeyCode::Char(c) => self.note_field.handle_char(c),
                _ => {}
            }
            return false;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.store.select(None);
                self.state = AppState::TaskList;
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.store.selected_task() {
                    self.task_form = TaskForm::from_task(task);
                    self.state = AppState::EditTask;
                    self.input_mode = InputMode::Text;
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.store.selected_id() {
                    self.confirm_delete = Some(id.to_string());
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('s') => {
                if let Some(id) = self.store.selected_id() {
                    self.marked.insert(id.to_string());
                    self.signoff_form = SignOffForm::new(self.signoff_targets().len());
                    self.state = AppState::SignOff;
                    self.input_mode = InputMode::Text;
                }
            }
            KeyCode::Char('n') => {
                self.note_active = true;
                self.note_field.clear();
                self.note_field.active = true;
                self.input_mode = InputMode::Text;
            }
            _ => {}
        }
        false
    }

    /// Keyboard input for the filter sheet.
    fn handle_sheet_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Esc => {
                // Discard edits: rebuild from the active spec next time.
                self.state = AppState::TaskList;
            }
            KeyCode::Enter => {
                self.state = AppState::TaskList;
                self.refresh_view();
                self.set_status_message(format!("Filters applied ({} tasks)", self.visible.len()));
            }
            KeyCode::Tab | KeyCode::Down => {
                self.sheet.current_field = (self.sheet.current_field + 1) % SHEET_FIELDS;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.sheet.current_field = if self.sheet.current_field == 0 {
                    SHEET_FIELDS - 1
                } else {
                    self.sheet.current_field - 1
                };
            }
            KeyCode::Left => self.sheet.handle_left_right(false),
            KeyCode::Right => self.sheet.handle_left_right(true),
            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.sheet.reset();
            }
            KeyCode::Backspace => {
                if self.sheet.current_field == 4 {
                    self.sheet.days.handle_backspace();
                }
            }
            KeyCode::Char(c) => {
                if self.sheet.current_field == 4 {
                    self.sheet.days.handle_char(c);
                }
            }
            _ => {}
        }
        false
    }

    /// Keyboard input for the add/edit forms.
    fn handle_form_input(&mut self, key: KeyCode, is_edit: bool) -> bool {
        match key {
            KeyCode::Esc => {
                self.state = if is_edit && self.store.selected_task().is_some() {
                    AppState::TaskDetail
                } else {
                    AppState::TaskList
                };
                self.input_mode = InputMode::None;
            }
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Enter => {
                let now = Local::now();
                if is_edit {
                    match self.task_form.build_patch(now) {
                        Ok(patch) => {
                            let Some(id) = self.store.selected_id().map(str::to_string) else {
                                self.state = AppState::TaskList;
                                return false;
                            };
                            if self.store.update(&id, &patch) {
                                self.set_status_message(format!("Task {} updated", id));
                            } else {
                                self.set_status_message(format!("Task {} not found", id));
                            }
                            self.refresh_view();
                            self.state = AppState::TaskDetail;
                            self.input_mode = InputMode::None;
                        }
                        Err(e) => self.set_status_message(e),
                    }
                } else {
                    match self.task_form.build_new(now) {
                        Ok(new) => {
                            let id = self.store.add(new, now);
                            self.refresh_view();
                            self.set_status_message(format!("Task {} added", id));
                            self.state = AppState::TaskList;
                            self.input_mode = InputMode::None;
                        }
                        Err(e) => self.set_status_message(e),
                    }
                }
            }
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        false
    }

    /// Keyboard input for the sign-off dialog.
    fn handle_signoff_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Esc => {
                self.state = AppState::TaskList;
                self.input_mode = InputMode::None;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.signoff_form.toggle_focus();
            }
            KeyCode::Left => self.signoff_form.handle_left_right(false),
            KeyCode::Right => self.signoff_form.handle_left_right(true),
            KeyCode::Backspace => self.signoff_form.handle_backspace(),
            KeyCode::Enter => {
                let targets = self.signoff_targets();
                let updated = self.store.sign_off(
                    &targets,
                    self.signoff_form.document_type(),
                    REVIEWER,
                    self.signoff_form.note.value.trim(),
                    Local::now(),
                );
                self.marked.clear();
                self.refresh_view();
                self.set_status_message(format!("Signed off {} task(s)", updated));
                self.state = AppState::TaskList;
                self.input_mode = InputMode::None;
            }
            KeyCode::Char(c) => self.signoff_form.handle_char(c),
            _ => {}
        }
        false
    }

    /// Keyboard input for the delete confirmation.
    fn handle_confirm_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.confirm_delete.take() {
                    if self.store.delete(&id) {
                        self.marked.remove(&id);
                        self.set_status_message(format!("Task {} deleted", id));
                    } else {
                        self.set_status_message(format!("Task {} not found", id));
                    }
                    self.refresh_view();
                }
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_delete = None;
                self.state = if self.store.selected_task().is_some() {
                    AppState::TaskDetail
                } else {
                    AppState::TaskList
                };
            }
            _ => {}
        }
        false
    }

    fn handle_help_input(&mut self, key: KeyCode) -> bool {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h')) {
            self.state = AppState::TaskList;
        }
        false
    }

    // ---- rendering ----

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        match self.state {
            AppState::TaskDetail | AppState::EditTask => self.render_detail(f, chunks[1]),
            _ => self.render_task_list(f, chunks[1]),
        }
        self.render_status_bar(f, chunks[2]);

        match self.state {
            AppState::FilterSheet => self.render_filter_sheet(f),
            AppState::AddTask | AppState::EditTask => {
                self.render_task_form(f, self.state == AppState::EditTask)
            }
            AppState::SignOff => self.render_signoff(f),
            AppState::Confirm => self.render_confirm(f),
            AppState::Help => self.render_help(f),
            _ => {}
        }
    }

    /// Title row plus the status tabs with live counts.
    fn render_header(&self, f: &mut Frame, area: Rect) {
        let stats = self.store.stats(Local::now());
        let tab_span = |tab: StatusTab, count: usize| {
            let label = format!(" {} ({}) ", tab.label(), count);
            if self.tab == tab {
                Span::styled(
                    label,
                    Style::default()
                        .bg(BRAND_RED)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(label, Style::default().fg(MUTED_GRAY))
            }
        };
        let header = Line::from(vec![
            Span::styled(
                "CONTROL MONITOR",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            tab_span(StatusTab::All, stats.all),
            tab_span(StatusTab::Outstanding, stats.outstanding),
            tab_span(StatusTab::Completed, stats.completed),
            Span::styled(
                format!("   due today {}  upcoming {}", stats.due_today, stats.upcoming),
                Style::default().fg(MUTED_GRAY),
            ),
        ]);
        let block = Paragraph::new(header)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Left);
        f.render_widget(block, area);
    }

    /// The filtered task table. Severity drives row color for outstanding
    /// tasks; completed rows are dimmed.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let now = Local::now();

        let header_cells = ["", "ID", "Status", "Priority", "Due", "Category", "Title"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(BRAND_RED).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .visible
            .iter()
            .filter_map(|id| self.store.get(id))
            .map(|task| {
                let mark = if self.marked.contains(&task.id) { "●" } else { "" };
                let style = match task.status {
                    Status::Completed => Style::default().fg(MUTED_GRAY),
                    Status::Outstanding => match severity(task.due, now) {
                        Severity::Overdue => Style::default().fg(ALERT_RED),
                        Severity::DueToday => Style::default().fg(WARN_YELLOW),
                        Severity::Normal => {
                            if task.priority == Priority::Critical {
                                Style::default().fg(CRITICAL_MAGENTA)
                            } else {
                                Style::default().fg(Color::White)
                            }
                        }
                    },
                };
                let title = if task.alert_text.is_some() {
                    format!("! {}", task.title)
                } else {
                    task.title.clone()
                };
                Row::new(vec![
                    Cell::from(mark),
                    Cell::from(task.id.clone()),
                    Cell::from(format_status(task.status)),
                    Cell::from(format_priority(task.priority)),
                    Cell::from(format_due(task.due, now)),
                    Cell::from(task.category.clone()),
                    Cell::from(title),
                ])
                .style(style)
            })
            .collect();

        if rows.is_empty() {
            let empty = Paragraph::new("No tasks found")
                .block(Block::default().borders(Borders::ALL).title(" Tasks "))
                .alignment(Alignment::Center)
                .style(Style::default().fg(MUTED_GRAY));
            f.render_widget(empty, area);
            return;
        }

        let widths = [
            Constraint::Length(2),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(22),
            Constraint::Length(34),
            Constraint::Min(24),
        ];
        let title = if self.search_active || !self.search_text.is_empty() {
            format!(" Tasks — search: {}_ ", self.search_text)
        } else {
            format!(" Tasks ({}) ", self.visible.len())
        };
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(
                Style::default()
                    .bg(Color::Rgb(40, 40, 40))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    /// Full detail view: metadata, alert banner, description, notes, files
    /// and the reconciliation table.
    fn render_detail(&mut self, f: &mut Frame, area: Rect) {
        let now = Local::now();
        let Some(task) = self.store.selected_task() else {
            let empty = Paragraph::new("No task selected")
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center);
            f.render_widget(empty, area);
            return;
        };

        let mut lines: Vec<Line> = Vec::new();
        if let Some(alert) = &task.alert_text {
            lines.push(Line::from(Span::styled(
                format!("!! {}", alert),
                Style::default().fg(ALERT_RED).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::raw(""));
        }

        let due_style = match severity(task.due, now) {
            Severity::Overdue => Style::default().fg(ALERT_RED),
            Severity::DueToday => Style::default().fg(WARN_YELLOW),
            Severity::Normal => Style::default(),
        };
        let overdue = task.days_overdue(now);
        let due_text = if task.status == Status::Outstanding && overdue > 0 {
            format!("{} ({}d overdue)", format_due(task.due, now), overdue)
        } else {
            format_due(task.due, now)
        };
        lines.push(Line::from(vec![
            Span::styled("Status: ", Style::default().fg(MUTED_GRAY)),
            Span::raw(format_status(task.status)),
            Span::styled("   Priority: ", Style::default().fg(MUTED_GRAY)),
            Span::raw(format_priority(task.priority)),
            Span::styled("   Due: ", Style::default().fg(MUTED_GRAY)),
            Span::styled(due_text, due_style),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Assigned: ", Style::default().fg(MUTED_GRAY)),
            Span::raw(task.assigned_to.clone()),
            Span::styled("   Team view: ", Style::default().fg(MUTED_GRAY)),
            Span::raw(format_team_view(task.team_view)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Control: ", Style::default().fg(MUTED_GRAY)),
            Span::raw(task.control_name.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Workflow: ", Style::default().fg(MUTED_GRAY)),
            Span::raw(format!("{} / {}", task.workflow_name, task.workflow_step)),
        ]));
        let mut people = Vec::new();
        if let Some(sup) = &task.responsible_supervisor {
            people.push(format!("supervisor {}", sup));
        }
        if let Some(emp) = &task.responsible_employee {
            people.push(format!("employee {}", emp));
        }
        if !people.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Responsible: ", Style::default().fg(MUTED_GRAY)),
                Span::raw(people.join(", ")),
            ]));
        }
        lines.push(Line::raw(""));
        for text_line in task.description.lines() {
            lines.push(Line::raw(text_line.to_string()));
        }

        if !task.info_rows.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                "Additional info",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!(
                    "  {:<10} {:<12} {:>14} {:>14} {:>12}",
                    "App", "Account", "Expected", "Actual", "Variance"
                ),
                Style::default().fg(MUTED_GRAY),
            )));
            for row in &task.info_rows {
                let variance = row.variance();
                let style = if variance.abs() > 10_000.0 {
                    Style::default().fg(WARN_YELLOW)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!(
                        "  {:<10} {:<12} {:>14.2} {:>14.2} {:>12.2}",
                        row.application, row.account, row.expected, row.actual, variance
                    ),
                    style,
                )));
            }
        }

        if !task.notes.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                format!("Notes ({})", task.notes.len()),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for note in &task.notes {
                let mark = if note.approved { " ✓" } else { "" };
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {} · {}{}: ", note.author, format_due(note.timestamp, now), mark),
                        Style::default().fg(MUTED_GRAY),
                    ),
                    Span::raw(note.content.clone()),
                ]));
            }
        }

        if !task.files.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                format!("Files ({})", task.files.len()),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for file in &task.files {
                lines.push(Line::raw(format!(
                    "  {} ({} KB)",
                    file.name,
                    file.size / 1024
                )));
            }
        }

        if self.note_active {
            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::styled("New note: ", Style::default().fg(WARN_YELLOW)),
                Span::raw(format!("{}_", self.note_field.value)),
            ]));
        }

        let title = format!(" #{} — {} ", task.id, task.title);
        let detail = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        f.render_widget(detail, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => {
                    let marks = if self.marked.is_empty() {
                        String::new()
                    } else {
                        format!("  [{} marked]", self.marked.len())
                    };
                    format!(
                        "Enter view  Space mark  s sign-off  a add  e edit  d delete  c complete  f filters  / search  Tab tabs  h help  Esc quit{}",
                        marks
                    )
                }
                AppState::TaskDetail => {
                    "e edit  d delete  s sign-off  n note  Esc back".to_string()
                }
                AppState::FilterSheet => {
                    "Tab next field  ←/→ change  Ctrl+R reset  Enter apply  Esc cancel".to_string()
                }
                AppState::AddTask | AppState::EditTask => {
                    "Tab next field  ←/→ move/cycle  Enter save  Esc cancel".to_string()
                }
                AppState::SignOff => {
                    "Tab switch field  ←/→ document type  Enter submit  Esc cancel".to_string()
                }
                AppState::Confirm => "y confirm  n cancel".to_string(),
                AppState::Help => "Esc back".to_string(),
            }
        };
        // Yellow while a text field is capturing keystrokes.
        let style = if self.input_mode == InputMode::Text {
            Style::default().fg(WARN_YELLOW)
        } else {
            Style::default().fg(MUTED_GRAY)
        };
        let bar = Paragraph::new(text).style(style);
        f.render_widget(bar, area);
    }

    fn render_filter_sheet(&self, f: &mut Frame) {
        let area = centered_rect(60, 50, f.area());
        f.render_widget(Clear, area);

        let active = |idx: usize| {
            if self.sheet.current_field == idx {
                Style::default().fg(WARN_YELLOW).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            }
        };
        let category = self.sheet.selected_category().unwrap_or("All");
        let subcategory = self
            .sheet
            .selected_subcategory()
            .unwrap_or_else(|| "All".to_string());
        let priority = if self.sheet.priority == 0 {
            "All"
        } else {
            format_priority(PRIORITY_CHOICES[self.sheet.priority - 1])
        };
        let team_view = if self.sheet.team_view == 0 {
            "All"
        } else {
            format_team_view(Some(TEAM_VIEW_CHOICES[self.sheet.team_view - 1]))
        };
        let days = if self.sheet.current_field == 4 {
            format!("{}_", self.sheet.days.value)
        } else if self.sheet.days.value.is_empty() {
            "Any".to_string()
        } else {
            self.sheet.days.value.clone()
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Category:    ", active(0)),
                Span::raw(format!("◂ {} ▸", category)),
            ]),
            Line::from(vec![
                Span::styled("Subcategory: ", active(1)),
                Span::raw(format!("◂ {} ▸", subcategory)),
            ]),
            Line::from(vec![
                Span::styled("Priority:    ", active(2)),
                Span::raw(format!("◂ {} ▸", priority)),
            ]),
            Line::from(vec![
                Span::styled("Team view:   ", active(3)),
                Span::raw(format!("◂ {} ▸", team_view)),
            ]),
            Line::from(vec![
                Span::styled("Due within:  ", active(4)),
                Span::raw(format!("{} days", days)),
            ]),
        ];
        let sheet = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Filters "))
            .wrap(Wrap { trim: false });
        f.render_widget(sheet, area);
    }

    fn render_task_form(&self, f: &mut Frame, is_edit: bool) {
        let area = centered_rect(70, 70, f.area());
        f.render_widget(Clear, area);

        let text_line = |label: &str, field: &InputField, order: usize| {
            let style = if self.task_form.current_field == order {
                Style::default().fg(WARN_YELLOW).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let value = if self.task_form.current_field == order {
                format!("{}_", field.value)
            } else {
                field.value.clone()
            };
            Line::from(vec![Span::styled(label.to_string(), style), Span::raw(value)])
        };
        let select_line = |label: &str, value: String, order: usize| {
            let style = if self.task_form.current_field == order {
                Style::default().fg(WARN_YELLOW).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(label.to_string(), style),
                Span::raw(format!("◂ {} ▸", value)),
            ])
        };

        let form = &self.task_form;
        let lines = vec![
            text_line("Title:         ", &form.title, TITLE_ORDER),
            text_line("Description:   ", &form.description, DESCRIPTION_ORDER),
            text_line("Assigned to:   ", &form.assigned_to, ASSIGNED_ORDER),
            text_line("Control name:  ", &form.control_name, CONTROL_NAME_ORDER),
            text_line("Workflow step: ", &form.workflow_step, WORKFLOW_STEP_ORDER),
            text_line("Due:           ", &form.due, DUE_ORDER),
            select_line(
                "Category:      ",
                form.selected_category().to_string(),
                CATEGORY_ORDER,
            ),
            select_line(
                "Subcategory:   ",
                form.selected_subcategory().unwrap_or_else(|| "-".to_string()),
                SUBCATEGORY_ORDER,
            ),
            select_line(
                "Priority:      ",
                format_priority(form.priorities[form.priority]).to_string(),
                PRIORITY_ORDER,
            ),
            select_line(
                "Status:        ",
                format_status(form.statuses[form.status]).to_string(),
                STATUS_ORDER,
            ),
            select_line(
                "Team view:     ",
                format_team_view(form.team_views[form.team_view]).to_string(),
                TEAM_VIEW_ORDER,
            ),
        ];
        let title = if is_edit { " Edit Task " } else { " Add Task " };
        let popup = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        f.render_widget(popup, area);
    }

    fn render_signoff(&self, f: &mut Frame) {
        let area = centered_rect(55, 35, f.area());
        f.render_widget(Clear, area);

        let doc_style = if self.signoff_form.focus == SignOffField::DocumentType {
            Style::default().fg(WARN_YELLOW).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let note_style = if self.signoff_form.focus == SignOffField::Note {
            Style::default().fg(WARN_YELLOW).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let note_value = if self.signoff_form.focus == SignOffField::Note {
            format!("{}_", self.signoff_form.note.value)
        } else {
            self.signoff_form.note.value.clone()
        };

        let lines = vec![
            Line::raw(format!(
                "Sign off {} task(s) as completed",
                self.signoff_form.task_count
            )),
            Line::raw(""),
            Line::from(vec![
                Span::styled("Document type: ", doc_style),
                Span::raw(format!(
                    "◂ {} ▸",
                    format_document_type(self.signoff_form.document_type())
                )),
            ]),
            Line::from(vec![Span::styled("Note:          ", note_style), Span::raw(note_value)]),
        ];
        let popup = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Sign-Off "))
            .wrap(Wrap { trim: false });
        f.render_widget(popup, area);
    }

    fn render_confirm(&self, f: &mut Frame) {
        let area = centered_rect(40, 20, f.area());
        f.render_widget(Clear, area);
        let id = self.confirm_delete.as_deref().unwrap_or("?");
        let popup = Paragraph::new(vec![
            Line::raw(format!("Delete task {}?", id)),
            Line::raw(""),
            Line::raw("y / Enter to confirm, n / Esc to cancel"),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .border_style(Style::default().fg(ALERT_RED)),
        )
        .alignment(Alignment::Center);
        f.render_widget(popup, area);
    }

    fn render_help(&self, f: &mut Frame) {
        let area = centered_rect(60, 70, f.area());
        f.render_widget(Clear, area);
        let lines = vec![
            Line::raw("Task list"),
            Line::raw("  ↑/↓        move      Enter      open detail"),
            Line::raw("  Space      mark for sign-off    x  clear marks"),
            Line::raw("  Tab        cycle status tabs    /  live search"),
            Line::raw("  f          filter sheet         c  toggle complete"),
            Line::raw("  a/e/d      add / edit / delete"),
            Line::raw("  s          sign off marked (or highlighted) tasks"),
            Line::raw(""),
            Line::raw("Detail"),
            Line::raw("  e edit   d delete   s sign-off   n add note"),
            Line::raw(""),
            Line::raw("Dialogs: Tab moves, ←/→ cycles, Enter applies, Esc cancels"),
            Line::raw("Ctrl+Q quits from anywhere in the task list"),
        ];
        let popup = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Help "));
        f.render_widget(popup, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{generate_tasks, rng_from_seed};

    fn app() -> App {
        let tasks = generate_tasks(30, Local::now(), &mut rng_from_seed(Some(9)));
        App::new(TaskStore::new(tasks))
    }

    #[test]
    fn test_initial_view_shows_everything() {
        let app = app();
        assert_eq!(app.visible.len(), 30);
        assert_eq!(app.table_state.selected(), Some(0));
    }

    #[test]
    fn test_tab_cycle_filters_by_status() {
        let mut app = app();
        app.tab = app.tab.next();
        app.refresh_view();
        assert!(app
            .visible
            .iter()
            .all(|id| app.store.get(id).unwrap().status == Status::Outstanding));
        app.tab = app.tab.next();
        app.refresh_view();
        assert!(app
            .visible
            .iter()
            .all(|id| app.store.get(id).unwrap().status == Status::Completed));
    }

    #[test]
    fn test_search_narrows_view() {
        let mut app = app();
        let target = app.visible[5].clone();
        app.search_text = target.clone();
        app.refresh_view();
        assert_eq!(app.visible, vec![target]);
    }

    #[test]
    fn test_selection_preserved_across_refresh() {
        let mut app = app();
        app.table_state.select(Some(4));
        let id = app.highlighted_id().unwrap();
        app.refresh_view();
        assert_eq!(app.highlighted_id(), Some(id));
    }

    #[test]
    fn test_signoff_targets_fall_back_to_highlight() {
        let mut app = app();
        app.table_state.select(Some(2));
        assert_eq!(app.signoff_targets(), vec![app.visible[2].clone()]);
        app.marked.insert(app.visible[0].clone());
        app.marked.insert(app.visible[1].clone());
        assert_eq!(app.signoff_targets().len(), 2);
    }

    #[test]
    fn test_sheet_roundtrip_from_spec() {
        let spec = FilterSpec {
            category: Some(CATEGORIES[2].to_string()),
            priority: Some(Priority::High),
            due_within: "7".to_string(),
            ..FilterSpec::default()
        };
        let sheet = FilterSheet::from_spec(&spec);
        assert_eq!(sheet.selected_category(), Some(CATEGORIES[2]));
        assert_eq!(sheet.priority, 3);
        assert_eq!(sheet.days.value, "7");
    }
}
