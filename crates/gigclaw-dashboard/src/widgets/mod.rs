//! Dashboard widgets module
//!
//! Each widget renders one part of the dashboard from a shared
//! `&DashboardState`; none of them mutate it.

use gigclaw_core::TaskStatus;
use ratatui::style::Color;

mod stats_panel;
mod status_bar;
mod task_table;

pub use stats_panel::StatsPanelWidget;
pub use status_bar::StatusBarWidget;
pub use task_table::TaskTableWidget;

/// Color for a task status, shared by the table and stats panel
pub fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Posted => Color::Green,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Completed => Color::LightBlue,
        TaskStatus::Verified => Color::DarkGray,
        TaskStatus::Cancelled => Color::Red,
        TaskStatus::Unknown => Color::White,
    }
}

/// Truncate text to `max_len` characters, marking the cut with an ellipsis
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
