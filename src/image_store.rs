use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

use crate::config::ImageUploadSettings;
use crate::errors::AppError;

/// External image host used by the admin content paths.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Uploads an image and returns its public URL.
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError>;
}

/// Unsigned multipart upload to a Cloudinary-style image host.
#[derive(Clone)]
pub struct HttpImageStore {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl HttpImageStore {
    pub fn new(settings: &ImageUploadSettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create image host client: {}", e))
            })?;

        Ok(Self {
            client,
            upload_url: settings.url.clone(),
            upload_preset: settings.preset.clone(),
        })
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| AppError::BadRequest(format!("Invalid content type: {}", e)))?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Image upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Image host returned {}: {}",
                status, error_text
            )));
        }

        let data: serde_json::Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse image host response: {}", e))
        })?;

        let url = data
            .get("secure_url")
            .or_else(|| data.get("url"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::ExternalApiError("Image host response has no URL".to_string())
            })?;

        tracing::info!("✓ Uploaded {} ({} bytes) to {}", filename, size, url);
        Ok(url.to_string())
    }
}
