use reqwest::{Client, StatusCode, multipart};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::StorageConfig;

/// Errors from the external media host. The host is an opaque upload sink;
/// everything that goes wrong with it surfaces as one of these.
#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("media store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("media store rejected upload: status={status}, body={body}")]
    Rejected { status: StatusCode, body: String },

    #[error("media store returned no URL for the stored object")]
    MissingUrl,
}

#[derive(Debug, Deserialize)]
struct UploadReceipt {
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MediaStoreClient {
    client: Client,
    config: StorageConfig,
}

impl MediaStoreClient {
    pub fn new(config: StorageConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("Folio/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build media store HTTP client: {e}"))?;

        Ok(Self { client, config })
    }

    /// Upload one object and return its durable URL. Each call writes a
    /// fresh object; the caller controls naming and retry policy. Dropping
    /// the future (client disconnect) cancels the in-flight request.
    pub async fn upload(
        &self,
        folder: &str,
        object_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, MediaStoreError> {
        let url = format!(
            "{}/v1/{}/assets",
            self.config.base_url.trim_end_matches('/'),
            self.config.namespace
        );

        let part = multipart::Part::bytes(bytes)
            .file_name(object_name.to_string())
            .mime_str(content_type)
            .map_err(MediaStoreError::Transport)?;

        let form = multipart::Form::new()
            .text("folder", folder.to_string())
            .part("file", part);

        debug!(folder, object_name, "Uploading asset to media store");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Media store rejected upload");
            return Err(MediaStoreError::Rejected { status, body });
        }

        let receipt: UploadReceipt = response.json().await?;
        receipt
            .secure_url
            .or(receipt.url)
            .ok_or(MediaStoreError::MissingUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_prefers_secure_url() {
        let receipt: UploadReceipt = serde_json::from_str(
            r#"{"secure_url": "https://cdn/x.pdf", "url": "http://cdn/x.pdf"}"#,
        )
        .unwrap();
        assert_eq!(
            receipt.secure_url.or(receipt.url).as_deref(),
            Some("https://cdn/x.pdf")
        );
    }

    #[test]
    fn test_receipt_without_urls_is_an_error() {
        let receipt: UploadReceipt = serde_json::from_str("{}").unwrap();
        assert!(receipt.secure_url.or(receipt.url).is_none());
    }
}
