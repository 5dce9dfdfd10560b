//! Dashboard state types
//!
//! `DashboardState` is owned by [`crate::App`] and mutated only by its
//! update function. Widgets receive it by shared reference.

use chrono::{DateTime, Utc};
use gigclaw_core::{ApiError, StatusCounts, Task};
use std::time::Duration;

/// Dashboard tabs, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Tasks,
    Stats,
    Help,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Tasks, Tab::Stats, Tab::Help];

    pub fn index(&self) -> usize {
        match self {
            Self::Tasks => 0,
            Self::Stats => 1,
            Self::Help => 2,
        }
    }

    fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn prev(&self) -> Self {
        Self::from_index(self.index() + Self::ALL.len() - 1)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Tasks => "Tasks",
            Self::Stats => "Stats",
            Self::Help => "Help",
        }
    }
}

/// Terminal size in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

/// Task table geometry derived from the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableGeometry {
    /// Width of the title column
    pub title_width: u16,
    /// Task rows that fit on screen
    pub visible_rows: u16,
}

impl TableGeometry {
    const MIN_TABLE_WIDTH: u16 = 60;
    // Header, status line, tabs, legend and borders
    const CHROME_HEIGHT: u16 = 12;

    pub fn for_viewport(viewport: Viewport) -> Self {
        let table_width = viewport.width.saturating_sub(10).max(Self::MIN_TABLE_WIDTH);
        Self {
            title_width: table_width / 3,
            visible_rows: viewport.height.saturating_sub(Self::CHROME_HEIGHT).max(1),
        }
    }
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self::for_viewport(Viewport::default())
    }
}

/// Presentation state of the dashboard
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub active_tab: Tab,
    /// Last successfully fetched snapshot, replaced wholesale
    pub tasks: Vec<Task>,
    /// A fetch is in flight
    pub loading: bool,
    /// Error from the most recent fetch, if it failed
    pub error: Option<ApiError>,
    /// Completion time of the last successful fetch
    pub last_update: Option<DateTime<Utc>>,
    pub viewport: Viewport,
    pub geometry: TableGeometry,
}

impl DashboardState {
    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::from_tasks(&self.tasks)
    }

    /// Whether any snapshot has been received yet
    pub fn has_snapshot(&self) -> bool {
        self.last_update.is_some()
    }

    pub fn formatted_last_update(&self) -> String {
        self.last_update
            .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string())
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Delay between a successful fetch and the next automatic one
    pub refresh_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
        }
    }
}
