//! # gigclaw-dashboard
//!
//! Terminal dashboard for the GigClaw marketplace.
//!
//! A Ratatui TUI that keeps a live view of the task list:
//! - Task table with budget and status
//! - Per-status counts
//! - Connectivity and last-update status line
//!
//! ## Usage
//!
//! ```bash
//! gigclaw dashboard              # Refresh every 30 seconds
//! gigclaw dashboard --refresh 10
//! ```
//!
//! ## Architecture
//!
//! ```text
//!  input thread ──┐
//!                 ├──▶ mpsc ──▶ App::update ──▶ Command ──▶ Effects
//!  Effects tasks ─┘                │                         │
//!       ▲                          ▼                         │
//!       │                     ui::draw(&state)               │
//!       └────────── fetch / one-shot timer ◀─────────────────┘
//! ```
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ GigClaw Dashboard                                           │
//! │ ● Connected  |  Last update: 09:15:23  |  Tasks: 12         │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Tasks │ Stats │ Help                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │ ID        Title            Budget        Status             │
//! │ t-001     Label images     25.00 USDC    ● posted           │
//! └─────────────────────────────────────────────────────────────┘
//!  tab/←→: Switch tabs | r: Refresh | q: Quit | ?: Help
//! ```

mod state;

pub use state::{DashboardConfig, DashboardState, Tab, TableGeometry, Viewport};

mod error;

pub use error::Result;

mod widgets;

pub use widgets::{StatsPanelWidget, StatusBarWidget, TaskTableWidget};

mod app;
mod event;
mod feed;
mod run;
mod terminal;
mod ui;
mod worker;

pub use app::{App, Command, Msg};
pub use event::{event_to_msg, key_to_msg};
pub use feed::TaskFeed;
pub use run::run;
pub use ui::draw;
pub use worker::Effects;
