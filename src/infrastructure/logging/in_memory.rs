use crate::core::constants::MAX_ACTIVITY_LOGS;
use crate::core::errors::CarebookError;
use crate::core::models::audit::AppLog;
use crate::infrastructure::logging::LoggingService;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Bounded activity trail, oldest entries first.
#[derive(Clone)]
pub struct InMemoryLogging {
    entries: Arc<RwLock<VecDeque<AppLog>>>,
    capacity: usize,
}

impl Default for InMemoryLogging {
    fn default() -> Self {
        Self::with_capacity(MAX_ACTIVITY_LOGS)
    }
}

impl InMemoryLogging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        InMemoryLogging {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }
}

#[async_trait]
impl LoggingService for InMemoryLogging {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        actor_id: Option<&str>,
    ) -> Result<(), CarebookError> {
        let details = match details {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            other => {
                return Err(CarebookError::LoggingError(format!(
                    "Activity details for {} must be a JSON object, got {}",
                    action, other
                )));
            }
        };
        let entry = AppLog {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            actor_id: actor_id.map(String::from),
            details,
            timestamp: Utc::now(),
        };

        let mut entries = self.entries.write().await;
        if entries.len() >= self.capacity {
            entries.pop_front();
            debug!("Activity log full, dropped oldest entry");
        }
        entries.push_back(entry);
        Ok(())
    }

    async fn get_logs(&self) -> Result<Vec<AppLog>, CarebookError> {
        Ok(self.entries.read().await.iter().cloned().collect())
    }
}
