// src/cloudinary.rs

use async_trait::async_trait;
use reqwest::{Client, multipart};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{errors::AppError, models::Photo, state::CloudinaryConfig};

const UPLOAD_FOLDER: &str = "products";

/// Image file taken from a multipart request, held in memory.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Third-party host for product photos.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<Photo, AppError>;

    async fn destroy(&self, public_id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryDeleteResponse {
    result: String,
}

pub struct CloudinaryClient {
    config: CloudinaryConfig,
    http: Client,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.config.cloud_name, action
        )
    }
}

/// Cloudinary request signature: parameters sorted by name, joined as
/// `k=v&k=v`, secret appended, SHA-1 hex.
pub fn sign_params(params: &BTreeMap<String, String>, api_secret: &str) -> String {
    let mut signature_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<String>>()
        .join("&");
    signature_string.push_str(api_secret);

    let mut hasher = Sha1::new();
    hasher.update(signature_string.as_bytes());
    hex::encode(hasher.finalize())
}

fn unix_timestamp() -> Result<u64, AppError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::InternalServerError("System clock error".to_string()))?
        .as_secs())
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, image: ImageUpload) -> Result<Photo, AppError> {
        let timestamp = unix_timestamp()?;

        // Only signed params go into the signature; api_key and file do not
        let mut params_to_sign = BTreeMap::new();
        params_to_sign.insert("folder".to_string(), UPLOAD_FOLDER.to_string());
        params_to_sign.insert("timestamp".to_string(), timestamp.to_string());
        let signature = sign_params(&params_to_sign, &self.config.api_secret);

        let part = multipart::Part::bytes(image.bytes)
            .file_name(image.filename.clone())
            .mime_str("image/*")
            .map_err(|e| {
                tracing::error!("Could not set MIME type for upload: {}", e);
                AppError::InternalServerError("Could not prepare file for upload".to_string())
            })?;

        // Form fields must match the signed params exactly
        let form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("folder", UPLOAD_FOLDER)
            .text("timestamp", timestamp.to_string())
            .text("signature", signature);

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Network error while uploading to Cloudinary: {}", e);
                AppError::UpstreamError("Failed to upload photos".to_string())
            })?;

        // Cloudinary reports errors in the body; log it, keep the client message generic
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            tracing::error!(
                "Cloudinary upload failed: status={}, body={}",
                status,
                error_text
            );
            return Err(AppError::UpstreamError(
                "Failed to upload photos".to_string(),
            ));
        }

        let uploaded = response
            .json::<CloudinaryUploadResponse>()
            .await
            .map_err(|e| {
                tracing::error!("Could not parse Cloudinary upload response: {}", e);
                AppError::UpstreamError("Failed to upload photos".to_string())
            })?;

        tracing::info!(
            "Uploaded '{}' to Cloudinary as {}",
            image.filename,
            uploaded.public_id
        );
        Ok(Photo {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), AppError> {
        let timestamp = unix_timestamp()?;

        let mut params_to_sign = BTreeMap::new();
        params_to_sign.insert("public_id".to_string(), public_id.to_string());
        params_to_sign.insert("timestamp".to_string(), timestamp.to_string());
        let signature = sign_params(&params_to_sign, &self.config.api_secret);

        // Destroy takes a urlencoded form: signed params plus key and signature
        let mut form_params = params_to_sign;
        form_params.insert("api_key".to_string(), self.config.api_key.clone());
        form_params.insert("signature".to_string(), signature);

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&form_params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    "Network error while deleting {} from Cloudinary: {:?}",
                    public_id,
                    e
                );
                AppError::UpstreamError("Failed to delete photo".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            tracing::error!(
                "Cloudinary destroy failed for {}: status={}, body={}",
                public_id,
                status,
                error_text
            );
            return Err(AppError::UpstreamError(
                "Failed to delete photo".to_string(),
            ));
        }

        let deleted = response
            .json::<CloudinaryDeleteResponse>()
            .await
            .map_err(|e| {
                tracing::error!("Could not parse Cloudinary destroy response: {}", e);
                AppError::UpstreamError("Failed to delete photo".to_string())
            })?;

        // "not found" means the photo is already gone, which is what we want.
        if deleted.result == "ok" || deleted.result == "not found" {
            tracing::info!(
                "Deleted {} from Cloudinary (result: {})",
                public_id,
                deleted.result
            );
            Ok(())
        } else {
            tracing::error!(
                "Unexpected Cloudinary destroy result for {}: {}",
                public_id,
                deleted.result
            );
            Err(AppError::UpstreamError(
                "Failed to delete photo".to_string(),
            ))
        }
    }
}
