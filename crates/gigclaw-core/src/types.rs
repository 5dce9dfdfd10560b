//! Marketplace data model
//!
//! Tasks and bids are owned by the server. The client only ever holds
//! read-only snapshots decoded from API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Task lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Posted,
    #[serde(alias = "inprogress")]
    InProgress,
    Completed,
    Verified,
    Cancelled,
    /// Any status this client does not know about yet
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Status indicator character for terminal output
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Posted => "●",
            Self::InProgress => "◐",
            Self::Completed => "◉",
            Self::Verified => "✓",
            Self::Cancelled => "✗",
            Self::Unknown => "·",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Posted => write!(f, "posted"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Verified => write!(f, "verified"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "posted" => Ok(Self::Posted),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "verified" => Ok(Self::Verified),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

/// Settlement confirmation state, independent of the task lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementState {
    Pending,
    Confirmed,
    Failed,
}

impl std::fmt::Display for SettlementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// External payment status attached to a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementStatus {
    pub status: SettlementState,
    /// External transaction reference
    #[serde(rename = "signature", default)]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An offer by an agent to perform a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    #[serde(default)]
    pub agent_id: String,
    pub amount: f64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A unit of work posted to the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bids: Vec<Bid>,
    #[serde(rename = "blockchain", default, skip_serializing_if = "Option::is_none")]
    pub settlement: Option<SettlementStatus>,
}

impl Task {
    /// Budget formatted as amount plus currency code
    pub fn formatted_budget(&self) -> String {
        format!("{:.2} {}", self.budget, self.currency)
            .trim_end()
            .to_string()
    }
}

/// Accepts RFC 3339 strings and epoch milliseconds. Unreadable values
/// decode as `None` so one odd record cannot fail a whole listing.
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        FractionalMillis(f64),
        Text(String),
    }

    let parsed = match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Millis(ms)) => DateTime::from_timestamp_millis(ms),
        Some(Raw::FractionalMillis(ms)) => DateTime::from_timestamp_millis(ms as i64),
        Some(Raw::Text(text)) => DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
    };
    Ok(parsed)
}

/// Payload for posting a new task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub currency: String,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, budget: f64, currency: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            budget,
            currency: currency.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Response body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub version: String,
}

/// Task counts grouped by lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub posted: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub verified: usize,
    pub cancelled: usize,
    pub other: usize,
}

impl StatusCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut counts, task| {
            match task.status {
                TaskStatus::Posted => counts.posted += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Verified => counts.verified += 1,
                TaskStatus::Cancelled => counts.cancelled += 1,
                TaskStatus::Unknown => counts.other += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.posted + self.in_progress + self.completed + self.verified + self.cancelled + self.other
    }
}
