//! # gigclaw-core
//!
//! Core types for the GigClaw marketplace CLI.
//!
//! - Data model: tasks, bids, settlement and health snapshots
//! - Error taxonomy shared by the client, dashboard and command layer
//! - Configuration loading (file, environment, flags)

pub mod config;
mod error;
mod types;

pub use config::{ClientConfig, GigclawConfig, DEFAULT_API_URL};
pub use error::{ApiError, ApiErrorKind, GigError, Result};
pub use types::*;
