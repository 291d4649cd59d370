//! HTTP client for the picflow origin API and the upload orchestrator.
//!
//! Provides a minimal origin client with configurable auth (Bearer token or
//! X-API-Key), generic GET/POST helpers, the presigned-PUT storage client,
//! and the `ImageUploader` that drives compression and delivery end to end.

pub mod api;
pub mod storage;
pub mod uploader;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use picflow_core::PipelineError;

/// Authentication strategy for the origin API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_API_VERSION: &str = "v0";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the origin client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth: Auth,
    /// API version used for paths (e.g. "v0"). Must match the origin.
    pub api_version: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Self {
        Self {
            base_url: base_url.into(),
            auth,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create config from environment: PICFLOW_API_URL (or API_URL),
    /// PICFLOW_API_KEY (or API_KEY) for X-API-Key auth, PICFLOW_API_TOKEN
    /// (or JWT_TOKEN) for Bearer auth, and optional PICFLOW_API_VERSION.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("PICFLOW_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let auth = if let Ok(token) = std::env::var("PICFLOW_API_TOKEN")
            .or_else(|_| std::env::var("JWT_TOKEN"))
        {
            Auth::Bearer(token)
        } else {
            let key = std::env::var("PICFLOW_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .context(
                    "Missing credentials. Set PICFLOW_API_KEY, API_KEY, PICFLOW_API_TOKEN, or JWT_TOKEN",
                )?;
            Auth::XApiKey(key)
        };

        let api_version = std::env::var("PICFLOW_API_VERSION")
            .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        let timeout = std::env::var("PICFLOW_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            base_url,
            auth,
            api_version,
            timeout,
        })
    }
}

/// HTTP client for the origin API.
#[derive(Clone, Debug)]
pub struct OriginClient {
    client: Client,
    base_url: String,
    auth: Auth,
    api_version: String,
}

impl OriginClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth: config.auth,
            api_version: config.api_version,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// API path prefix, e.g. "/api/v0".
    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.api_version)
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PipelineError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PipelineError::Network(format!("failed to parse origin response: {}", e)))
    }

    /// GET request, deserializing the JSON response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, PipelineError> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.get(&url));

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        Self::handle_response(response).await
    }

    /// POST a JSON body and deserialize the response.
    pub(crate) async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, PipelineError> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.post(&url).json(body));

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        Self::handle_response(response).await
    }
}

// Re-export the types callers need alongside the client.
pub use api::{ConfirmReceipt, OriginApi, UploadSession, UploadUrl, VariantUrl, VariantUrlList};
pub use storage::{HttpObjectStorage, PresignedStorage, PutError};
pub use uploader::ImageUploader;
