//! Dashboard state machine
//!
//! `App::update` is the only writer of [`DashboardState`]. It consumes one
//! [`Msg`] at a time and returns the follow-up [`Command`], if any. Commands
//! are executed elsewhere (see [`crate::worker`]); their results come back as
//! messages.

use crate::{DashboardConfig, DashboardState, Tab, TableGeometry, Viewport};
use chrono::{DateTime, Utc};
use gigclaw_core::{ApiError, Task};
use std::time::Duration;

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Quit,
    NextTab,
    PrevTab,
    /// Jump straight to the help tab
    ShowHelp,
    /// User asked for fresh data
    Refresh,
    /// A one-shot refresh timer fired; carries the generation it was armed with
    RefreshTimer(u64),
    Resize { width: u16, height: u16 },
    FetchSucceeded {
        tasks: Vec<Task>,
        fetched_at: DateTime<Utc>,
    },
    FetchFailed(ApiError),
}

impl From<Result<Vec<Task>, ApiError>> for Msg {
    fn from(result: Result<Vec<Task>, ApiError>) -> Self {
        match result {
            Ok(tasks) => Msg::FetchSucceeded {
                tasks,
                fetched_at: Utc::now(),
            },
            Err(err) => Msg::FetchFailed(err),
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a background fetch of the task list
    Fetch,
    /// Deliver `Msg::RefreshTimer(generation)` once after the delay
    ScheduleRefresh { delay: Duration, generation: u64 },
}

/// Main application state
pub struct App {
    pub state: DashboardState,
    pub config: DashboardConfig,
    /// Signal to exit the application
    pub should_quit: bool,
    /// Only the most recently armed timer may trigger a fetch
    timer_generation: u64,
}

impl App {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            state: DashboardState::default(),
            config,
            should_quit: false,
            timer_generation: 0,
        }
    }

    /// Initial transition: start the first fetch
    pub fn init(&mut self) -> Option<Command> {
        self.start_fetch()
    }

    /// Apply one message
    pub fn update(&mut self, msg: Msg) -> Option<Command> {
        match msg {
            Msg::Quit => {
                self.should_quit = true;
                None
            }
            Msg::NextTab => {
                self.state.active_tab = self.state.active_tab.next();
                None
            }
            Msg::PrevTab => {
                self.state.active_tab = self.state.active_tab.prev();
                None
            }
            Msg::ShowHelp => {
                self.state.active_tab = Tab::Help;
                None
            }
            Msg::Refresh => self.start_fetch(),
            Msg::RefreshTimer(generation) => {
                if generation != self.timer_generation {
                    tracing::debug!("Ignoring superseded refresh timer");
                    return None;
                }
                self.start_fetch()
            }
            Msg::Resize { width, height } => {
                let viewport = Viewport { width, height };
                self.state.viewport = viewport;
                self.state.geometry = TableGeometry::for_viewport(viewport);
                None
            }
            Msg::FetchSucceeded { tasks, fetched_at } => {
                if !self.state.loading {
                    tracing::debug!("Ignoring fetch result with no fetch in flight");
                    return None;
                }
                tracing::debug!("Fetched {} tasks", tasks.len());
                self.state.tasks = tasks;
                self.state.loading = false;
                self.state.error = None;
                self.state.last_update = Some(fetched_at);
                self.timer_generation += 1;
                Some(Command::ScheduleRefresh {
                    delay: self.config.refresh_interval,
                    generation: self.timer_generation,
                })
            }
            Msg::FetchFailed(err) => {
                if !self.state.loading {
                    tracing::debug!("Ignoring fetch error with no fetch in flight");
                    return None;
                }
                tracing::warn!("Dashboard fetch failed: {}", err);
                self.state.error = Some(err);
                self.state.loading = false;
                None
            }
        }
    }

    /// At most one fetch may be in flight
    fn start_fetch(&mut self) -> Option<Command> {
        if self.state.loading {
            tracing::debug!("Fetch already in flight, skipping refresh");
            return None;
        }
        self.state.loading = true;
        Some(Command::Fetch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigclaw_core::{ApiErrorKind, TaskStatus};

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: String::new(),
            budget: 25.0,
            currency: "USDC".to_string(),
            status: TaskStatus::Posted,
            tags: Vec::new(),
            created_at: None,
            bids: Vec::new(),
            settlement: None,
        }
    }

    fn succeeded(ids: &[&str]) -> Msg {
        Msg::FetchSucceeded {
            tasks: ids.iter().map(|id| task(id)).collect(),
            fetched_at: Utc::now(),
        }
    }

    fn failed() -> Msg {
        Msg::FetchFailed(ApiError::from_status(503, "down").exhausted(4))
    }

    fn app() -> App {
        App::new(DashboardConfig {
            refresh_interval: Duration::from_secs(30),
        })
    }

    #[test]
    fn test_app_creation() {
        let app = app();
        assert_eq!(app.state.active_tab, Tab::Tasks);
        assert!(!app.should_quit);
        assert!(!app.state.loading);
    }

    #[test]
    fn test_init_starts_fetch() {
        let mut app = app();
        assert_eq!(app.init(), Some(Command::Fetch));
        assert!(app.state.loading);
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert_eq!(app.update(Msg::Quit), None);
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_cycling() {
        let mut app = app();
        app.update(Msg::NextTab);
        assert_eq!(app.state.active_tab, Tab::Stats);
        app.update(Msg::NextTab);
        assert_eq!(app.state.active_tab, Tab::Help);
        app.update(Msg::NextTab);
        assert_eq!(app.state.active_tab, Tab::Tasks);

        app.update(Msg::PrevTab);
        assert_eq!(app.state.active_tab, Tab::Help);

        app.update(Msg::NextTab);
        app.update(Msg::ShowHelp);
        assert_eq!(app.state.active_tab, Tab::Help);
    }

    #[test]
    fn test_refresh_while_loading_is_noop() {
        let mut app = app();
        assert_eq!(app.update(Msg::Refresh), Some(Command::Fetch));
        assert!(app.state.loading);

        assert_eq!(app.update(Msg::Refresh), None);
        assert_eq!(app.update(Msg::RefreshTimer(0)), None);
        assert!(app.state.loading);
    }

    #[test]
    fn test_success_replaces_snapshot_and_rearms_timer() {
        let mut app = app();
        app.init();
        let cmd = app.update(succeeded(&["a", "b"]));

        assert_eq!(
            cmd,
            Some(Command::ScheduleRefresh {
                delay: Duration::from_secs(30),
                generation: 1,
            })
        );
        assert_eq!(app.state.tasks.len(), 2);
        assert!(!app.state.loading);
        assert!(app.state.last_update.is_some());
    }

    #[test]
    fn test_failure_keeps_snapshot() {
        let mut app = app();
        app.init();
        app.update(succeeded(&["a", "b"]));
        let last_update = app.state.last_update;

        assert_eq!(app.update(Msg::Refresh), Some(Command::Fetch));
        assert_eq!(app.update(failed()), None);

        assert!(!app.state.loading);
        let ids: Vec<_> = app.state.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(app.state.last_update, last_update);
        assert_eq!(app.state.error.as_ref().unwrap().kind, ApiErrorKind::ServerError);
    }

    #[test]
    fn test_success_after_failure_clears_error_without_merge() {
        let mut app = app();
        app.init();
        app.update(succeeded(&["a", "b"]));
        app.update(Msg::Refresh);
        app.update(failed());

        app.update(Msg::Refresh);
        app.update(succeeded(&["b", "c"]));

        assert!(app.state.error.is_none());
        let ids: Vec<_> = app.state.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_manual_refresh_supersedes_pending_timer() {
        let mut app = app();
        app.init();
        app.update(succeeded(&["a"]));

        // Manual refresh completes before the first timer fires
        app.update(Msg::Refresh);
        let cmd = app.update(succeeded(&["b"]));
        assert!(matches!(
            cmd,
            Some(Command::ScheduleRefresh { generation: 2, .. })
        ));

        assert_eq!(app.update(Msg::RefreshTimer(1)), None);
        assert!(!app.state.loading);
        assert_eq!(app.update(Msg::RefreshTimer(2)), Some(Command::Fetch));
    }

    #[test]
    fn test_stale_results_ignored() {
        let mut app = app();
        assert_eq!(app.update(succeeded(&["x"])), None);
        assert!(app.state.tasks.is_empty());
        assert_eq!(app.update(failed()), None);
        assert!(app.state.error.is_none());
    }

    #[test]
    fn test_resize_recomputes_geometry() {
        let mut app = app();
        app.update(Msg::Resize {
            width: 130,
            height: 40,
        });
        assert_eq!(app.state.viewport, Viewport { width: 130, height: 40 });
        assert_eq!(app.state.geometry.title_width, 40);
        assert_eq!(app.state.geometry.visible_rows, 28);
    }

    #[test]
    fn test_msg_from_fetch_result() {
        assert!(matches!(Msg::from(Ok(vec![task("a")])), Msg::FetchSucceeded { .. }));
        let err = ApiError::from_status(404, "gone");
        assert_eq!(Msg::from(Err(err.clone())), Msg::FetchFailed(err));
    }
}
