//! Terminal setup and teardown utilities
//!
//! Handles entering/exiting raw mode and alternate screen.

use crate::{Result, Viewport};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gigclaw_core::GigError;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

/// Terminal type for the dashboard
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI rendering
pub fn init() -> Result<Tui> {
    enable_raw_mode()
        .map_err(|e| GigError::Dashboard(format!("Failed to enable raw mode: {}", e)))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| GigError::Dashboard(format!("Failed to enter alternate screen: {}", e)))?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
        .map_err(|e| GigError::Dashboard(format!("Failed to create terminal: {}", e)))
}

/// Restore the terminal to its original state
pub fn restore() -> Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen)
        .map_err(|e| GigError::Dashboard(format!("Failed to leave alternate screen: {}", e)))?;

    disable_raw_mode()
        .map_err(|e| GigError::Dashboard(format!("Failed to disable raw mode: {}", e)))?;

    Ok(())
}

/// Current terminal size as a viewport
pub fn viewport(terminal: &Tui) -> Result<Viewport> {
    let size = terminal
        .size()
        .map_err(|e| GigError::Dashboard(format!("Failed to query terminal size: {}", e)))?;
    Ok(Viewport {
        width: size.width,
        height: size.height,
    })
}

/// Restore the terminal before the default panic message is printed
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        previous(info);
    }));
}

/// RAII guard for terminal state
///
/// Restores the terminal on drop, including early returns through `?`.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best effort; nothing useful to do with an error here
        let _ = restore();
    }
}
