//! Unified error types for GigClaw
//!
//! `ApiError` is the stable taxonomy every marketplace call fails with.
//! `GigError` wraps it together with configuration and local I/O failures.

use thiserror::Error;

/// Classification of a failed marketplace call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Request exceeded its per-attempt deadline
    Timeout,
    /// Transport could not reach the host
    ConnectionRefused,
    /// 404
    NotFound,
    /// 401 or 403
    Unauthorized,
    /// 400
    BadRequest,
    /// 5xx, surfaced only once retries are exhausted
    ServerError,
    Unknown,
}

impl ApiErrorKind {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Whether this kind of failure may heal on its own
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ConnectionRefused | Self::ServerError
        )
    }

    /// Short user-facing summary
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Timeout => "API request timed out",
            Self::ConnectionRefused => "Cannot connect to GigClaw API",
            Self::NotFound => "Resource not found",
            Self::Unauthorized => "Authentication failed",
            Self::BadRequest => "Invalid request",
            Self::ServerError => "API server error",
            Self::Unknown => "Unexpected API failure",
        }
    }

    /// Suggested resolutions, most useful first
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Self::Timeout => &[
                "Check your internet connection",
                "The API might be temporarily unavailable",
                "Try again in a few moments",
            ],
            Self::ConnectionRefused => &[
                "Check that the API URL is correct (--api-url or config file)",
                "The service might be down",
                "Try: gigclaw health",
            ],
            Self::NotFound => &[
                "The task or bid ID might be incorrect",
                "Check available tasks: gigclaw task list",
                "The resource may have been deleted",
            ],
            Self::Unauthorized => &[
                "Check your API key (--api-key or GIGCLAW_API_KEY)",
                "Update the api_key entry in ~/.gigclaw/config.toml",
            ],
            Self::BadRequest => &[
                "Check your command arguments",
                "Verify required flags are provided",
                "Run with --help for usage info",
            ],
            Self::ServerError => &[
                "The server encountered an error",
                "This is usually temporary - please try again",
                "Check status: gigclaw health",
            ],
            Self::Unknown => &[
                "Run with --verbose or GIGCLAW_DEBUG=true for details",
                "Check your configuration: gigclaw doctor",
                "Try: gigclaw health",
            ],
        }
    }
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.headline())
    }
}

/// A classified marketplace failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", self.render())]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// Raw detail (response body or transport message)
    pub message: String,
    /// Number of attempts made before giving up
    pub attempts: u32,
    /// Set when the retry budget ran out
    pub exhausted: bool,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            attempts: 1,
            exhausted: false,
        }
    }

    /// Classify a non-success HTTP response
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ApiErrorKind::from_status(status), body)
        }
    }

    /// Mark as the final failure after the retry budget was used up
    pub fn exhausted(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self.exhausted = true;
        self
    }

    fn render(&self) -> String {
        let detail = match self.status {
            Some(status) if self.message.is_empty() => format!("API error {}", status),
            Some(status) => format!("API error {}: {}", status, self.message),
            None => self.message.clone(),
        };
        if self.exhausted {
            format!("max retries exceeded after {} attempts: {}", self.attempts, detail)
        } else {
            detail
        }
    }

    /// Multi-line report with suggestions, for terminal output
    pub fn report(&self) -> String {
        let mut out = format!("✗ {}\n\n  {}\n\nSuggestions:\n", self.kind.headline(), self);
        for suggestion in self.kind.suggestions() {
            out.push_str("  • ");
            out.push_str(suggestion);
            out.push('\n');
        }
        out
    }
}


/// Unified error type for all GigClaw operations
#[derive(Error, Debug)]
pub enum GigError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Dashboard error: {0}")]
    Dashboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias using GigError
pub type Result<T> = std::result::Result<T, GigError>;
