//! services/api/src/adapters/media.rs
//!
//! This module contains the adapter for the Cloudinary image API.
//! It implements the `MediaStore` port from the `core` crate.

use async_trait::async_trait;
use chrono::Utc;
use neural_impulse_core::domain::{ImageUpload, StoredImage};
use neural_impulse_core::ports::{MediaError, MediaResult, MediaStore};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::MediaConfig;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `MediaStore` port against Cloudinary's upload API.
#[derive(Clone)]
pub struct CloudinaryAdapter {
    client: reqwest::Client,
    config: MediaConfig,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryAdapter {
    /// Creates a new `CloudinaryAdapter`.
    pub fn new(client: reqwest::Client, config: MediaConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    /// Signs the request parameters: sorted `key=value` pairs joined by `&`,
    /// followed by the API secret, hashed with SHA-256.
    fn sign(&self, params: &[(&str, String)]) -> String {
        sign_params(params, &self.config.api_secret)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> MediaResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| MediaError::Upstream(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("media store answered {}", status),
        };
        Err(MediaError::Upstream(message))
    }
}

fn sign_params(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    hex::encode(Sha256::digest(format!("{joined}{secret}").as_bytes()))
}

//=========================================================================================
// `MediaStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl MediaStore for CloudinaryAdapter {
    /// Uploads an image after checking its type and size locally.
    async fn upload(&self, image: ImageUpload) -> MediaResult<StoredImage> {
        image.validate().map_err(MediaError::Rejected)?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("timestamp", timestamp.clone())]);

        let size = image.data.len() as u64;
        let part = Part::stream_with_length(reqwest::Body::from(image.data), size)
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| MediaError::Rejected(e.to_string()))?;
        let form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", part);

        let response = self
            .send(self.client.post(self.endpoint("upload")).multipart(form))
            .await?;
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Upstream(e.to_string()))?;

        info!(storage_id = %body.public_id, size, "Image uploaded");
        Ok(StoredImage {
            url: body.secure_url,
            storage_id: body.public_id,
        })
    }

    async fn delete(&self, storage_id: &str) -> MediaResult<()> {
        if storage_id.is_empty() {
            return Err(MediaError::Rejected("Public ID is required".to_string()));
        }

        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", storage_id.to_string()),
            ("timestamp", timestamp.clone()),
        ]);
        let params = [
            ("public_id", storage_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", self.config.api_key.clone()),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_string()),
        ];

        let response = self
            .send(self.client.post(self.endpoint("destroy")).form(&params))
            .await?;
        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Upstream(e.to_string()))?;

        if body.result != "ok" {
            return Err(MediaError::Upstream(format!(
                "Failed to delete photo: {}",
                body.result
            )));
        }
        debug!(storage_id, "Image deleted");
        Ok(())
    }
}
