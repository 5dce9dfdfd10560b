//! Main UI layout and rendering
//!
//! Defines the overall dashboard layout and delegates to individual widgets.
//! Rendering reads the state and never changes it.

use crate::{
    widgets::{StatsPanelWidget, StatusBarWidget, TaskTableWidget},
    DashboardState, Tab,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

const KEY_LEGEND: &str = "tab/←→: Switch tabs | r: Refresh | q: Quit | ?: Help";

const HELP_LINES: &[(&str, &str)] = &[
    ("tab, →", "Next tab"),
    ("shift+tab, ←", "Previous tab"),
    ("r, F5", "Refresh now"),
    ("?", "Show this help"),
    ("q, esc, ctrl+c", "Quit"),
];

/// Draw the entire dashboard UI
pub fn draw(frame: &mut Frame, state: &DashboardState) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header (title + status line)
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Content area
            Constraint::Length(1), // Key legend
        ])
        .split(size);

    render_header(frame, chunks[0], state);
    render_tabs(frame, chunks[1], state);

    if state.error.is_some() {
        render_error(frame, chunks[2], state);
    } else {
        match state.active_tab {
            Tab::Tasks => render_tasks(frame, chunks[2], state),
            Tab::Stats => render_stats(frame, chunks[2], state),
            Tab::Help => render_help(frame, chunks[2]),
        }
    }

    let legend = Paragraph::new(Line::from(Span::styled(
        KEY_LEGEND,
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(legend, chunks[3]);
}

/// Render the header with title and status line
fn render_header(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 {
        return;
    }

    let title = Paragraph::new(Line::from(Span::styled(
        "GigClaw Dashboard",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, Rect { height: 1, ..inner });

    if inner.height >= 2 {
        let status_area = Rect {
            y: inner.y + 1,
            height: 1,
            ..inner
        };
        frame.render_widget(
            WidgetAdapter::new(|area, buf| StatusBarWidget::render(state, area, buf)),
            status_area,
        );
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let tab_titles: Vec<&str> = Tab::ALL.iter().map(|tab| tab.title()).collect();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title("View"))
        .select(state.active_tab.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_tasks(frame: &mut Frame, area: Rect, state: &DashboardState) {
    frame.render_widget(
        WidgetAdapter::new(|area, buf| TaskTableWidget::render(state, area, buf)),
        area,
    );
}

fn render_stats(frame: &mut Frame, area: Rect, state: &DashboardState) {
    // Boxed panel needs room for five rows, a blank and the total
    if area.height < 9 {
        frame.render_widget(
            WidgetAdapter::new(|area, buf| StatsPanelWidget::render_compact(state, area, buf)),
            area,
        );
    } else {
        frame.render_widget(
            WidgetAdapter::new(|area, buf| StatsPanelWidget::render(state, area, buf)),
            area,
        );
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(HELP_LINES.iter().map(|(keys, action)| {
        Line::from(vec![
            Span::styled(format!("  {:<16}", keys), Style::default().fg(Color::Yellow)),
            Span::raw(*action),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tasks refresh automatically after each successful update.",
        Style::default().fg(Color::Gray),
    )));

    let help = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" HELP "));
    frame.render_widget(help, area);
}

/// Error view shown in place of the tab content while the last fetch failed
fn render_error(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let Some(error) = &state.error else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("✗ {}", error.kind.headline()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::raw(error.to_string())),
        Line::from(""),
    ];
    lines.extend(error.kind.suggestions().iter().map(|suggestion| {
        Line::from(Span::styled(
            format!("  • {}", suggestion),
            Style::default().fg(Color::Gray),
        ))
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        snapshot_summary(state),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        "Press r to retry or q to quit",
        Style::default().fg(Color::Yellow),
    )));

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" ERROR ")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn snapshot_summary(state: &DashboardState) -> String {
    if state.has_snapshot() {
        format!(
            "Showing last known data: {} tasks as of {}",
            state.tasks.len(),
            state.formatted_last_update()
        )
    } else {
        "No data loaded yet".to_string()
    }
}

/// Widget adapter to bridge static render methods to ratatui's Widget trait
struct WidgetAdapter<F>
where
    F: Fn(Rect, &mut Buffer),
{
    render_fn: F,
}

impl<F> WidgetAdapter<F>
where
    F: Fn(Rect, &mut Buffer),
{
    fn new(render_fn: F) -> Self {
        Self { render_fn }
    }
}

impl<F> Widget for WidgetAdapter<F>
where
    F: Fn(Rect, &mut Buffer),
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        (self.render_fn)(area, buf);
    }
}
