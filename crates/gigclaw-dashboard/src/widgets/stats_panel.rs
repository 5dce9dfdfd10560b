//! Marketplace stats panel widget
//!
//! Per-status task counts for the current snapshot.

use super::status_color;
use crate::DashboardState;
use gigclaw_core::{StatusCounts, TaskStatus};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders},
};

pub struct StatsPanelWidget;

impl StatsPanelWidget {
    /// Render the stats panel
    pub fn render(state: &DashboardState, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" MARKETPLACE STATS ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        if !state.has_snapshot() {
            buf.set_string(
                inner.x + 1,
                inner.y,
                "No data loaded yet",
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        let counts = state.status_counts();
        for (row, (status, count)) in Self::rows(&counts).into_iter().enumerate() {
            let y = inner.y + row as u16;
            if y >= inner.y + inner.height {
                return;
            }
            let label = format!("{} {:<12}", status.indicator(), status.to_string());
            buf.set_string(
                inner.x + 1,
                y,
                &label,
                Style::default().fg(status_color(status)),
            );
            buf.set_string(
                inner.x + 16,
                y,
                format!("{:>5}", count),
                Style::default().fg(Color::White).bold(),
            );
        }

        let total_y = inner.y + Self::rows(&counts).len() as u16 + 1;
        if total_y < inner.y + inner.height {
            buf.set_string(
                inner.x + 1,
                total_y,
                format!("{:<14} {:>5}", "Total", counts.total()),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            );
        }
    }

    fn rows(counts: &StatusCounts) -> Vec<(TaskStatus, usize)> {
        let mut rows = vec![
            (TaskStatus::Posted, counts.posted),
            (TaskStatus::InProgress, counts.in_progress),
            (TaskStatus::Completed, counts.completed),
            (TaskStatus::Verified, counts.verified),
            (TaskStatus::Cancelled, counts.cancelled),
        ];
        if counts.other > 0 {
            rows.push((TaskStatus::Unknown, counts.other));
        }
        rows
    }

    /// Render a compact single-line summary for smaller areas
    pub fn render_compact(state: &DashboardState, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let counts = state.status_counts();
        let compact = format!(
            "Posted: {} | In progress: {} | Completed: {} | Verified: {} | Total: {}",
            counts.posted,
            counts.in_progress,
            counts.completed,
            counts.verified,
            counts.total()
        );

        buf.set_string(area.x, area.y, &compact, Style::default().fg(Color::White));
    }
}
