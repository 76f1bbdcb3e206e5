use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::MediaConfig;
use crate::error::MediaError;

const SIGNATURE_ALGORITHM: &str = "sha256";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Hex SHA-256 signature over the signed upload parameters followed by the
/// API secret. Only `timestamp` is signed.
#[must_use]
pub fn sign_upload(timestamp: i64, api_secret: &str) -> String {
    let to_sign = format!("timestamp={timestamp}{api_secret}");
    format!("{:x}", Sha256::digest(to_sign.as_bytes()))
}

/// Uploads files to the media service and returns their public URLs.
#[derive(Debug, Clone)]
pub struct MediaClient {
    client: Client,
    config: MediaConfig,
    api_base: String,
}

impl MediaClient {
    /// # Errors
    ///
    /// Returns [`MediaError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: MediaConfig, api_base: &str, timeout_secs: u64) -> Result<Self, MediaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            config,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn upload_url(&self) -> String {
        format!("{}/v1_1/{}/auto/upload", self.api_base, self.config.cloud_name)
    }

    /// Uploads `bytes` signed with the current Unix time.
    ///
    /// # Errors
    ///
    /// See [`MediaClient::upload_at`].
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<String, MediaError> {
        self.upload_at(bytes, file_name, content_type, chrono::Utc::now().timestamp())
            .await
    }

    /// Uploads `bytes` signed with an explicit `timestamp` and returns the
    /// `secure_url` from the response.
    ///
    /// # Errors
    ///
    /// - [`MediaError::Http`] on transport failure or an unusable content type.
    /// - [`MediaError::UnexpectedStatus`] for any non-2xx response.
    /// - [`MediaError::Deserialize`] if the body is not JSON.
    /// - [`MediaError::MissingSecureUrl`] if the body has no `secure_url`.
    pub async fn upload_at(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: Option<&str>,
        timestamp: i64,
    ) -> Result<String, MediaError> {
        let size = bytes.len();
        let mut part = Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(mime) = content_type {
            part = part.mime_str(mime)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature_algorithm", SIGNATURE_ALGORITHM)
            .text("signature", sign_upload(timestamp, &self.config.api_secret));

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), file_name, "media upload rejected");
            return Err(MediaError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body).map_err(MediaError::Deserialize)?;
        let url = parsed
            .secure_url
            .filter(|u| !u.is_empty())
            .ok_or(MediaError::MissingSecureUrl)?;
        tracing::info!(file_name, size, url = %url, "media uploaded");
        Ok(url)
    }
}
