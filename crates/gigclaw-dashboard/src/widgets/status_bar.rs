//! Connection status line widget

use crate::DashboardState;
use ratatui::prelude::*;

pub struct StatusBarWidget;

impl StatusBarWidget {
    /// Render connectivity, last update time and task count on one line
    pub fn render(state: &DashboardState, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let (indicator, label, color) = Self::connectivity(state);
        let line = Line::from(vec![
            Span::styled(format!("{} {}", indicator, label), Style::default().fg(color)),
            Span::styled("  |  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Last update: {}", state.formatted_last_update()),
                Style::default().fg(Color::Gray),
            ),
            Span::styled("  |  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Tasks: {}", state.tasks.len()),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }

    fn connectivity(state: &DashboardState) -> (&'static str, &'static str, Color) {
        if state.loading {
            ("◌", "Refreshing", Color::Yellow)
        } else if state.error.is_some() {
            ("✗", "Disconnected", Color::Red)
        } else if state.has_snapshot() {
            ("●", "Connected", Color::Green)
        } else {
            ("○", "Waiting", Color::DarkGray)
        }
    }
}
