//! Marketplace API client
//!
//! Key design: every operation goes through one retry loop. Transport
//! failures and 5xx responses are retried with quadratic backoff; any other
//! response is returned to the operation, which classifies it.

use crate::retry::RetryPolicy;
use crate::transport::{ApiRequest, ApiResponse, HttpMethod, ReqwestTransport, Transport};
use gigclaw_core::{
    ApiError, ApiErrorKind, Bid, ClientConfig, HealthResponse, NewTask, Result, SettlementStatus,
    Task,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Result of a marketplace call
pub type ApiResult<T> = std::result::Result<T, ApiError>;

// Response bodies are echoed into errors; keep them readable.
const MAX_ERROR_BODY: usize = 512;

#[derive(Deserialize)]
struct TaskList {
    tasks: Vec<Task>,
}

/// `POST /api/tasks` answers with either a bare task or a task wrapped
/// together with its settlement status.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedTask {
    Wrapped {
        task: Task,
        #[serde(default)]
        blockchain: Option<SettlementStatus>,
    },
    Bare(Task),
}

impl CreatedTask {
    fn into_task(self) -> Task {
        match self {
            Self::Wrapped { mut task, blockchain } => {
                if blockchain.is_some() {
                    task.settlement = blockchain;
                }
                task
            }
            Self::Bare(task) => task,
        }
    }
}

/// Client for the GigClaw marketplace API
///
/// Stateless between calls apart from its immutable configuration.
#[derive(Clone)]
pub struct MarketplaceClient {
    config: ClientConfig,
    policy: RetryPolicy,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for MarketplaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceClient")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.config.api_key.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl MarketplaceClient {
    /// Create a client backed by reqwest
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            policy: RetryPolicy::from_config(&config),
            config,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ApiRequest {
        let mut headers = vec![
            ("Content-Type", "application/json".to_string()),
            ("Accept", "application/json".to_string()),
        ];
        if let Some(key) = &self.config.api_key {
            headers.push(("Authorization", format!("Bearer {}", key)));
        }

        ApiRequest {
            method,
            url: format!("{}{}", self.config.base_url, path),
            headers,
            body,
        }
    }

    /// Send a request, retrying transport failures and 5xx responses
    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<ApiResponse> {
        let request = self.build_request(method, path, body);
        let max_attempts = self.policy.max_attempts();
        let mut last_error: Option<ApiError> = None;

        tracing::debug!("{} {}", request.method, request.url);

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let backoff = self.policy.backoff(attempt);
                tracing::debug!(
                    "Retry attempt {}/{} after {:?}",
                    attempt,
                    self.policy.max_retries,
                    backoff
                );
                tokio::time::sleep(backoff).await;
            }

            let outcome = self.transport.send(&request).await;
            let retry = RetryPolicy::should_retry(&outcome);

            match outcome {
                Ok(response) if !retry => return Ok(response),
                Ok(response) => {
                    tracing::warn!(
                        "Server error ({}) on {} {} (attempt {}/{})",
                        response.status,
                        request.method,
                        path,
                        attempt + 1,
                        max_attempts
                    );
                    last_error = Some(ApiError::from_status(
                        response.status,
                        truncate_body(&response.body),
                    ));
                }
                Err(err) => {
                    tracing::warn!(
                        "Request {} {} failed (attempt {}/{}): {}",
                        request.method,
                        path,
                        attempt + 1,
                        max_attempts,
                        err
                    );
                    last_error = Some(err.into());
                }
            }
        }

        let error = last_error
            .unwrap_or_else(|| ApiError::new(ApiErrorKind::Unknown, "no attempt was made"));
        Err(error.exhausted(max_attempts))
    }

    /// Fail unless the response carries the expected status
    fn expect_status(response: ApiResponse, expected: u16, context: &str) -> ApiResult<ApiResponse> {
        if response.status == expected {
            return Ok(response);
        }
        let body = truncate_body(&response.body);
        tracing::debug!("{} failed with {}: {}", context, response.status, body);
        let message = if body.is_empty() {
            context.to_string()
        } else {
            format!("{}: {}", context, body)
        };
        Err(ApiError::from_status(response.status, message))
    }

    fn decode<T: DeserializeOwned>(response: &ApiResponse, what: &str) -> ApiResult<T> {
        serde_json::from_str(&response.body).map_err(|e| {
            ApiError::new(
                ApiErrorKind::Unknown,
                format!("failed to decode {}: {}", what, e),
            )
        })
    }

    /// `GET /health`
    pub async fn health(&self) -> ApiResult<HealthResponse> {
        let response = self.execute(HttpMethod::Get, "/health", None).await?;
        let response = Self::expect_status(response, 200, "health check failed")?;
        Self::decode(&response, "health response")
    }

    /// Whether the API answers its health endpoint
    pub async fn check_connectivity(&self) -> ApiResult<()> {
        tracing::debug!("Checking API connectivity...");
        let response = self.execute(HttpMethod::Get, "/health", None).await?;
        Self::expect_status(response, 200, "API is not healthy")?;
        Ok(())
    }

    /// `GET /api/tasks`
    pub async fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        let response = self.execute(HttpMethod::Get, "/api/tasks", None).await?;
        let response = Self::expect_status(response, 200, "failed to list tasks")?;
        let list: TaskList = Self::decode(&response, "tasks")?;
        tracing::debug!("Fetched {} tasks", list.tasks.len());
        Ok(list.tasks)
    }

    /// `POST /api/tasks`
    pub async fn create_task(&self, task: &NewTask) -> ApiResult<Task> {
        let body = serde_json::to_value(task).map_err(|e| {
            ApiError::new(ApiErrorKind::BadRequest, format!("failed to encode task: {}", e))
        })?;
        let response = self
            .execute(HttpMethod::Post, "/api/tasks", Some(body))
            .await?;
        let response = Self::expect_status(response, 201, "failed to create task")?;
        let created: CreatedTask = Self::decode(&response, "task")?;
        let task = created.into_task();
        tracing::info!("Created task {}", task.id);
        Ok(task)
    }

    /// `POST /api/tasks/{id}/bid`
    pub async fn place_bid(&self, task_id: &str, amount: f64, message: &str) -> ApiResult<Bid> {
        let body = serde_json::json!({
            "amount": amount,
            "message": message,
        });
        let path = format!("/api/tasks/{}/bid", task_id);
        let response = self.execute(HttpMethod::Post, &path, Some(body)).await?;
        let response = Self::expect_status(response, 201, "failed to place bid")?;
        let bid: Bid = Self::decode(&response, "bid")?;
        tracing::info!("Placed bid {} on task {}", bid.id, task_id);
        Ok(bid)
    }

    /// `POST /api/tasks/{id}/accept`
    pub async fn accept_bid(&self, task_id: &str, bid_id: &str) -> ApiResult<()> {
        let body = serde_json::json!({ "bidId": bid_id });
        let path = format!("/api/tasks/{}/accept", task_id);
        let response = self.execute(HttpMethod::Post, &path, Some(body)).await?;
        Self::expect_status(response, 200, "failed to accept bid")?;
        tracing::info!("Accepted bid {} on task {}", bid_id, task_id);
        Ok(())
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use gigclaw_core::{GigError, SettlementState, TaskStatus};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    type Outcome = std::result::Result<ApiResponse, TransportError>;

    /// Replays scripted outcomes; repeats the last one when the script runs out
    struct ScriptedTransport {
        script: Mutex<VecDeque<Outcome>>,
        fallback: Outcome,
        sent: Mutex<Vec<(ApiRequest, Instant)>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Outcome>) -> Arc<Self> {
            let fallback = script
                .last()
                .cloned()
                .unwrap_or_else(|| Ok(ApiResponse::new(200, "{}")));
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                sent: Mutex::new(Vec::new()),
            })
        }

        fn always(outcome: Outcome) -> Arc<Self> {
            Self::new(vec![outcome])
        }

        fn attempts(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.sent.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
        }

        fn gaps(&self) -> Vec<Duration> {
            let sent = self.sent.lock().unwrap();
            sent.windows(2).map(|w| w[1].1 - w[0].1).collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &ApiRequest) -> Outcome {
            self.sent
                .lock()
                .unwrap()
                .push((request.clone(), Instant::now()));
            let mut script = self.script.lock().unwrap();
            script.pop_front().unwrap_or_else(|| self.fallback.clone())
        }
    }

    fn client(transport: Arc<ScriptedTransport>, max_retries: u32) -> MarketplaceClient {
        let config = ClientConfig::new("http://api.test").with_max_retries(max_retries);
        MarketplaceClient::with_transport(config, transport).unwrap()
    }

    fn tasks_body() -> String {
        serde_json::json!({
            "tasks": [
                {"id": "t1", "title": "Fix bug", "budget": 50.0, "currency": "USDC", "status": "posted", "tags": ["urgent"]},
                {"id": "t2", "title": "Write docs", "budget": 20.0, "currency": "SOL", "status": "completed", "tags": []}
            ]
        })
        .to_string()
    }

    #[test]
    fn test_empty_base_url_fails_before_any_request() {
        let transport = ScriptedTransport::always(Ok(ApiResponse::new(200, "{}")));
        let result = MarketplaceClient::with_transport(ClientConfig::new(""), transport.clone());
        assert!(matches!(result, Err(GigError::Config(_))));
        assert_eq!(transport.attempts(), 0);

        assert!(matches!(
            MarketplaceClient::new(ClientConfig::new("")),
            Err(GigError::Config(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_exhaust_retries() {
        for max_retries in [0u32, 1, 3] {
            let transport = ScriptedTransport::always(Ok(ApiResponse::new(503, "unavailable")));
            let err = client(transport.clone(), max_retries)
                .list_tasks()
                .await
                .unwrap_err();

            assert_eq!(transport.attempts(), max_retries as usize + 1);
            assert!(err.exhausted);
            assert_eq!(err.kind, ApiErrorKind::ServerError);
            assert_eq!(err.attempts, max_retries + 1);
            assert!(err.to_string().starts_with("max retries exceeded"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_errors_are_not_retried() {
        let cases = [
            (400, ApiErrorKind::BadRequest),
            (401, ApiErrorKind::Unauthorized),
            (403, ApiErrorKind::Unauthorized),
            (404, ApiErrorKind::NotFound),
            (409, ApiErrorKind::Unknown),
        ];
        for (status, kind) in cases {
            let transport = ScriptedTransport::always(Ok(ApiResponse::new(status, "nope")));
            let err = client(transport.clone(), 3)
                .place_bid("t1", 10.0, "")
                .await
                .unwrap_err();

            assert_eq!(transport.attempts(), 1, "status {}", status);
            assert_eq!(err.kind, kind);
            assert_eq!(err.status, Some(status));
            assert!(!err.exhausted);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Connect("connection refused".into())),
            Ok(ApiResponse::new(502, "bad gateway")),
            Ok(ApiResponse::new(200, tasks_body())),
        ]);
        let started = Instant::now();
        let tasks = client(transport.clone(), 3).list_tasks().await.unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(transport.attempts(), 3);

        let gaps = transport.gaps();
        assert_eq!(gaps.len(), 2);
        assert!(gaps[0] >= Duration::from_secs(1) && gaps[0] < Duration::from_millis(1_050));
        assert!(gaps[1] >= Duration::from_secs(4) && gaps[1] < Duration::from_millis(4_050));
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_are_classified_after_retries() {
        let transport = ScriptedTransport::always(Err(TransportError::Timeout("30s".into())));
        let err = client(transport.clone(), 2).health().await.unwrap_err();

        assert_eq!(transport.attempts(), 3);
        assert_eq!(err.kind, ApiErrorKind::Timeout);
        assert!(err.exhausted);
        assert!(err.status.is_none());
    }

    #[tokio::test]
    async fn test_request_headers() {
        let transport = ScriptedTransport::always(Ok(ApiResponse::new(200, tasks_body())));
        let config = ClientConfig::new("http://api.test").with_api_key("secret");
        let client = MarketplaceClient::with_transport(config, transport.clone()).unwrap();
        client.list_tasks().await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "http://api.test/api/tasks");
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("authorization"), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn test_no_authorization_without_key() {
        let transport = ScriptedTransport::always(Ok(ApiResponse::new(200, tasks_body())));
        client(transport.clone(), 0).list_tasks().await.unwrap();
        assert_eq!(transport.requests()[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn test_create_task_bare_response() {
        let body = serde_json::json!({
            "id": "t1", "title": "Fix bug", "budget": 50.0,
            "currency": "USDC", "status": "posted", "tags": ["urgent"]
        });
        let transport = ScriptedTransport::always(Ok(ApiResponse::new(201, body.to_string())));
        let payload = NewTask::new("Fix bug", 50.0, "USDC").with_tags(vec!["urgent".into()]);
        let task = client(transport.clone(), 3).create_task(&payload).await.unwrap();

        assert_eq!(task.id, "t1");
        assert_eq!(task.title, "Fix bug");
        assert_eq!(task.budget, 50.0);
        assert_eq!(task.currency, "USDC");
        assert_eq!(task.status, TaskStatus::Posted);
        assert_eq!(task.tags, vec!["urgent".to_string()]);

        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "http://api.test/api/tasks");
        assert_eq!(request.body.as_ref().unwrap()["tags"], serde_json::json!(["urgent"]));
    }

    #[tokio::test]
    async fn test_create_task_wrapped_response() {
        let body = serde_json::json!({
            "task": {"id": "t9", "title": "Audit", "budget": 5.0, "currency": "SOL", "status": "posted"},
            "blockchain": {"status": "pending", "signature": "sig123"}
        });
        let transport = ScriptedTransport::always(Ok(ApiResponse::new(201, body.to_string())));
        let task = client(transport, 0)
            .create_task(&NewTask::new("Audit", 5.0, "SOL"))
            .await
            .unwrap();

        assert_eq!(task.id, "t9");
        let settlement = task.settlement.unwrap();
        assert_eq!(settlement.status, SettlementState::Pending);
        assert_eq!(settlement.reference, "sig123");
    }

    #[tokio::test]
    async fn test_create_task_unexpected_success_code() {
        let transport = ScriptedTransport::always(Ok(ApiResponse::new(200, "{}")));
        let err = client(transport, 0)
            .create_task(&NewTask::new("x", 1.0, "USDC"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unknown);
        assert_eq!(err.status, Some(200));
    }

    #[tokio::test]
    async fn test_place_and_accept_bid() {
        let bid = serde_json::json!({
            "id": "b1", "agentId": "agent-1", "amount": 45.0,
            "message": "can do", "status": "pending"
        });
        let transport = ScriptedTransport::new(vec![
            Ok(ApiResponse::new(201, bid.to_string())),
            Ok(ApiResponse::new(200, "")),
        ]);
        let client = client(transport.clone(), 0);

        let placed = client.place_bid("t1", 45.0, "can do").await.unwrap();
        assert_eq!(placed.id, "b1");
        assert_eq!(placed.agent_id, "agent-1");

        client.accept_bid("t1", "b1").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://api.test/api/tasks/t1/bid");
        assert_eq!(
            requests[0].body,
            Some(serde_json::json!({"amount": 45.0, "message": "can do"}))
        );
        assert_eq!(requests[1].url, "http://api.test/api/tasks/t1/accept");
        assert_eq!(requests[1].body, Some(serde_json::json!({"bidId": "b1"})));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_unknown() {
        let transport = ScriptedTransport::always(Ok(ApiResponse::new(200, "<html>")));
        let err = client(transport, 0).list_tasks().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unknown);
        assert!(err.message.contains("failed to decode tasks"));
    }

    #[tokio::test]
    async fn test_health_and_connectivity() {
        let body = serde_json::json!({"status": "ok", "timestamp": "now", "version": "1.2.0"});
        let transport = ScriptedTransport::always(Ok(ApiResponse::new(200, body.to_string())));
        let client = client(transport, 0);

        let health = client.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, "1.2.0");
        assert!(client.check_connectivity().await.is_ok());
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("  short  "), "short");
        let long = "x".repeat(MAX_ERROR_BODY + 10);
        assert_eq!(truncate_body(&long).chars().count(), MAX_ERROR_BODY + 1);
    }
}
