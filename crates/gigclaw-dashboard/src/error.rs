//! Dashboard error types, re-exported from gigclaw-core
//!
//! Terminal, rendering and event handling failures use
//! `GigError::Dashboard(String)`. Fetch failures are never errors here:
//! they are carried in the dashboard state as an `ApiError`.

pub use gigclaw_core::Result;
