use crate::config::CloudinaryConfig;
use crate::core::errors::{CarebookError, FieldError};
use crate::infrastructure::images::{ImageHost, ImageUpload};
use async_trait::async_trait;
use reqwest::{Client, multipart};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Signed uploads against the Cloudinary image upload API.
pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Parameters are signed in alphabetical order, `key=value` joined by `&`,
    /// with the API secret appended.
    fn sign(&self, params: &mut [(&str, String)]) -> String {
        params.sort_by(|a, b| a.0.cmp(b.0));
        let joined = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{:x}", Sha256::digest(format!("{}{}", joined, self.config.api_secret).as_bytes()))
    }
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, image: ImageUpload, folder: &str) -> Result<String, CarebookError> {
        let url = format!("{}/{}/image/upload", self.config.base_url, self.config.cloud_name);
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&mut [("folder", folder.to_string()), ("timestamp", timestamp.clone())]);

        let file = multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| {
                CarebookError::InvalidInput(
                    "image".to_string(),
                    FieldError::new("image", "Invalid image", format!("Unsupported content type: {}", e)),
                )
            })?;
        let form = multipart::Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        debug!("Uploading image to {}", url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CarebookError::Upstream(format!("Image upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Cloudinary upload failed: {} - {}", status, body);
            return Err(CarebookError::Upstream(format!("Image host returned HTTP {}: {}", status, body)));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| CarebookError::Upstream(format!("Failed to parse image host response: {}", e)))?;
        info!("Uploaded image {}", uploaded.public_id);
        Ok(uploaded.secure_url)
    }
}
