//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Severity colors mirror the dashboard's due-date badges.

/// Overdue tasks.
pub const ALERT_RED: Color = Color::Rgb(214, 69, 69);
/// Tasks due today.
pub const WARN_YELLOW: Color = Color::Rgb(224, 180, 0);
/// Completed tasks and muted chrome.
pub const MUTED_GRAY: Color = Color::Rgb(120, 120, 120);
/// Brand accent for headers and the active tab.
pub const BRAND_RED: Color = Color::Rgb(114, 0, 0);
/// Critical-priority marker.
pub const CRITICAL_MAGENTA: Color = Color::Rgb(186, 60, 140);
