use crate::core::errors::CarebookError;
use crate::infrastructure::images::{ImageHost, ImageUpload};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Keeps uploads in process memory; used when no image host is configured.
#[derive(Clone, Default)]
pub struct InMemoryImageHost {
    images: Arc<RwLock<HashMap<String, ImageUpload>>>,
}

impl InMemoryImageHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, reference: &str) -> Option<ImageUpload> {
        self.images.read().await.get(reference).cloned()
    }

    pub async fn count(&self) -> usize {
        self.images.read().await.len()
    }
}

#[async_trait]
impl ImageHost for InMemoryImageHost {
    async fn upload(&self, image: ImageUpload, folder: &str) -> Result<String, CarebookError> {
        let reference = format!("memory://{}/{}-{}", folder, Uuid::new_v4(), image.file_name);
        self.images.write().await.insert(reference.clone(), image);
        Ok(reference)
    }
}
