pub mod in_memory;

use crate::core::errors::CarebookError;
use crate::core::models::audit::AppLog;
use async_trait::async_trait;

/// Activity trail of completed workflow actions.
#[async_trait]
pub trait LoggingService: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        actor_id: Option<&str>,
    ) -> Result<(), CarebookError>;
    async fn get_logs(&self) -> Result<Vec<AppLog>, CarebookError>;
}
