//! Object storage reached through presigned URLs.

use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Failure of a presigned PUT.
#[derive(Debug, Error)]
pub enum PutError {
    #[error("storage responded with status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),
}

/// Destination for presigned variant uploads.
#[async_trait]
pub trait PresignedStorage: Send + Sync {
    /// PUT `body` to the presigned `url` with the given content type.
    /// Non-2xx responses surface the HTTP status.
    async fn put(&self, url: &str, content_type: &str, body: Bytes) -> Result<(), PutError>;
}

/// Object storage reached directly over HTTP.
#[derive(Clone, Debug, Default)]
pub struct HttpObjectStorage {
    client: reqwest::Client,
}

impl HttpObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PresignedStorage for HttpObjectStorage {
    async fn put(&self, url: &str, content_type: &str, body: Bytes) -> Result<(), PutError> {
        let size_bytes = body.len();
        let start = Instant::now();

        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| PutError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                size_bytes,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "presigned upload failed"
            );
            return Err(PutError::Status(status.as_u16()));
        }

        tracing::debug!(
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "presigned upload complete"
        );

        Ok(())
    }
}
