pub mod cloudinary;
pub mod in_memory;

use crate::core::errors::CarebookError;
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Image hosting collaborator. Returns a reference (URL) that can be stored on a record.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: ImageUpload, folder: &str) -> Result<String, CarebookError>;
}
