//! Task data source for the dashboard

use async_trait::async_trait;
use gigclaw_client::MarketplaceClient;
use gigclaw_core::{ApiError, Task};

/// Produces full task-list snapshots
#[async_trait]
pub trait TaskFeed: Send + Sync + 'static {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiError>;
}

#[async_trait]
impl TaskFeed for MarketplaceClient {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.list_tasks().await
    }
}
