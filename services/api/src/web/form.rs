//! services/api/src/web/form.rs
//!
//! Request body helpers: `multipart/form-data` collection and JSON bodies whose
//! rejections are reported in the API's own error shape.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::Multipart;
use axum::Json;
use neural_impulse_core::domain::ImageUpload;
use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, ImageUpload>,
}

impl FormData {
    /// Reads every part of the body. File parts with no content are dropped, so
    /// an empty file input behaves like an absent one. A body that is not
    /// `multipart/form-data` at all is a 400 `{"error"}`.
    pub async fn collect(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> ApiResult<Self> {
        let mut multipart =
            multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart data: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field.bytes().await.map_err(|e| {
                        ApiError::BadRequest(format!("Failed to read file bytes: {}", e))
                    })?;
                    if data.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        ImageUpload {
                            file_name,
                            content_type,
                            data,
                        },
                    );
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        ApiError::BadRequest(format!("Failed to read form field: {}", e))
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The field's value, or an empty string when it was not sent.
    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    /// A checkbox-style flag: only the literal `"true"` counts.
    pub fn flag(&self, name: &str) -> bool {
        self.text(name) == Some("true")
    }

    pub fn take_file(&mut self, name: &str) -> Option<ImageUpload> {
        self.files.remove(name)
    }
}

/// Unwraps a JSON body, turning axum's plain-text rejection into a 400 `{"error"}`.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
