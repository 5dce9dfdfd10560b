//! Task table widget
//!
//! Displays the current task snapshot with budget and status.

use super::{status_color, truncate_text};
use crate::DashboardState;
use gigclaw_core::Task;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Table},
};

const ID_WIDTH: u16 = 10;

pub struct TaskTableWidget;

impl TaskTableWidget {
    /// Render the task table
    pub fn render(state: &DashboardState, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" TASKS ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let inner = block.inner(area);
        block.render(area, buf);

        if state.tasks.is_empty() {
            Self::render_empty(state, inner, buf);
            return;
        }

        let title_width = state.geometry.title_width;
        let widths = [
            Constraint::Length(ID_WIDTH),
            Constraint::Length(title_width),
            Constraint::Length(14), // Budget
            Constraint::Length(14), // Status
            Constraint::Min(10),    // Tags
        ];

        let header = Row::new(vec![
            Cell::from("ID"),
            Cell::from("Title"),
            Cell::from("Budget"),
            Cell::from("Status"),
            Cell::from("Tags"),
        ])
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = state
            .tasks
            .iter()
            .take(state.geometry.visible_rows as usize)
            .map(|task| Self::create_task_row(task, title_width as usize))
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1);

        Widget::render(table, inner, buf);
    }

    fn render_empty(state: &DashboardState, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        if state.loading && !state.has_snapshot() {
            buf.set_string(
                area.x + 1,
                area.y,
                "◌ Loading tasks...",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        buf.set_string(
            area.x + 1,
            area.y,
            "No tasks found.",
            Style::default().fg(Color::DarkGray),
        );
        if area.height >= 3 {
            buf.set_string(
                area.x + 1,
                area.y + 2,
                "Create your first task: gigclaw task post --title 'My Task' --budget 50",
                Style::default().fg(Color::Gray),
            );
        }
    }

    /// Create a table row for a task
    fn create_task_row(task: &Task, title_width: usize) -> Row<'static> {
        let id = truncate_text(&task.id, ID_WIDTH as usize);
        let title = truncate_text(&task.title, title_width);
        let status = format!("{} {}", task.status.indicator(), task.status);
        let tags = if task.tags.is_empty() {
            "-".to_string()
        } else {
            task.tags.join(", ")
        };

        Row::new(vec![
            Cell::from(id).style(Style::default().fg(Color::DarkGray)),
            Cell::from(title).style(Style::default().fg(Color::White)),
            Cell::from(task.formatted_budget()).style(Style::default().fg(Color::Cyan)),
            Cell::from(status).style(Style::default().fg(status_color(task.status))),
            Cell::from(tags).style(Style::default().fg(Color::Gray)),
        ])
    }
}
