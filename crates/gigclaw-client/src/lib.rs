//! # gigclaw-client
//!
//! Resilient client for the GigClaw marketplace API.
//!
//! - One typed operation per marketplace capability
//! - Uniform retry policy: transport failures and 5xx are retried with
//!   quadratic backoff, 4xx is returned immediately
//! - Every failure classified into [`gigclaw_core::ApiError`]
//!
//! The HTTP layer sits behind the [`Transport`] trait so the retry loop can
//! be exercised without a network.

mod client;
mod retry;
mod transport;

pub use client::{ApiResult, MarketplaceClient};
pub use retry::RetryPolicy;
pub use transport::{
    ApiRequest, ApiResponse, HttpMethod, ReqwestTransport, Transport, TransportError,
};
