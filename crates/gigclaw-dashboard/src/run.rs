//! Main run loop for the dashboard application
//!
//! Every state change flows through one channel: key and resize events from
//! the input thread, fetch results and timer ticks from [`Effects`]. The loop
//! draws, waits for the next message, applies it, and executes whatever
//! command the transition returned.

use crate::{
    app::{App, Msg},
    event, terminal, ui,
    worker::Effects,
    DashboardConfig, Result, TaskFeed,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Main entry point for running the dashboard
pub async fn run(feed: Arc<dyn TaskFeed>, config: DashboardConfig) -> Result<()> {
    terminal::install_panic_hook();
    let mut terminal = terminal::init()?;
    let _guard = terminal::TerminalGuard::new();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let effects = Effects::new(feed, tx.clone());
    let mut app = App::new(config);

    let viewport = terminal::viewport(&terminal)?;
    app.update(Msg::Resize {
        width: viewport.width,
        height: viewport.height,
    });

    let input = event::spawn_input_reader(tx);

    if let Some(command) = app.init() {
        effects.execute(command);
    }

    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, &app.state))?;

        let Some(msg) = rx.recv().await else {
            tracing::debug!("Message channel closed");
            break;
        };
        tracing::debug!(?msg, "Dashboard message");

        if let Some(command) = app.update(msg) {
            effects.execute(command);
        }
    }

    // Closing the receiver stops the input thread at its next poll
    drop(rx);
    drop(effects);
    match tokio::task::spawn_blocking(move || input.join()).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::warn!("Input reader panicked"),
        Err(e) => tracing::warn!("Failed to join input reader: {}", e),
    }

    terminal::restore()?;

    Ok(())
}
