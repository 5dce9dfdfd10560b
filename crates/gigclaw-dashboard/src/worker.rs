//! Background effects
//!
//! Each [`Command`] runs on its own tokio task. Workers never see the
//! dashboard state: they own a handle to the feed and a sender, and report
//! back with a single immutable [`Msg`].

use crate::{app::Command, app::Msg, TaskFeed};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Executes commands emitted by the state machine
#[derive(Clone)]
pub struct Effects {
    feed: Arc<dyn TaskFeed>,
    tx: UnboundedSender<Msg>,
}

impl Effects {
    pub fn new(feed: Arc<dyn TaskFeed>, tx: UnboundedSender<Msg>) -> Self {
        Self { feed, tx }
    }

    pub fn execute(&self, command: Command) {
        match command {
            Command::Fetch => self.spawn_fetch(),
            Command::ScheduleRefresh { delay, generation } => self.spawn_timer(delay, generation),
        }
    }

    fn spawn_fetch(&self) {
        let feed = Arc::clone(&self.feed);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let msg = Msg::from(feed.fetch_tasks().await);
            if tx.send(msg).is_err() {
                tracing::debug!("Dashboard closed before fetch completed");
            }
        });
    }

    fn spawn_timer(&self, delay: std::time::Duration, generation: u64) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Msg::RefreshTimer(generation));
        });
    }
}
