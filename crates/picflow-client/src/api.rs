//! Origin API endpoints and wire types.
//!
//! The origin issues presigned upload sessions, confirms completed uploads,
//! and serves presigned download URLs for stored variants. Wire JSON is
//! camelCase.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use picflow_core::{PipelineError, SizeName};

use crate::OriginClient;

/// Per-size presigned upload URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrl {
    pub size: SizeName,
    pub url: String,
}

/// Presigned upload session issued by the origin.
///
/// Consumed entirely within one pipeline run; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub image_id: String,
    pub file_key: String,
    pub upload_urls: Vec<UploadUrl>,
    pub expires_at: DateTime<Utc>,
}

impl UploadSession {
    /// Presigned URL for one size, if the origin issued it.
    pub fn url_for(&self, size: SizeName) -> Option<&str> {
        self.upload_urls
            .iter()
            .find(|u| u.size == size)
            .map(|u| u.url.as_str())
    }
}

/// Receipt returned by the confirm endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmReceipt {
    pub image_id: String,
    pub status: String,
    pub confirmed_count: u32,
}

/// Presigned download URL for one stored variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantUrl {
    pub image_id: String,
    pub size: SizeName,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Presigned download URLs for every stored variant of an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantUrlList {
    pub image_id: String,
    pub files: Vec<VariantUrl>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlsRequest<'a> {
    file_key: &'a str,
    sizes: &'a [SizeName],
    content_type: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest<'a> {
    image_id: &'a str,
}

/// Origin endpoints consumed by the pipeline.
#[async_trait]
pub trait OriginApi: Send + Sync {
    /// Request presigned upload URLs for the given sizes of one file key.
    async fn create_upload_session(
        &self,
        file_key: &str,
        sizes: &[SizeName],
        content_type: &str,
    ) -> Result<UploadSession, PipelineError>;

    /// Confirm that every variant of an image landed in storage.
    async fn confirm_upload(&self, image_id: &str) -> Result<ConfirmReceipt, PipelineError>;

    /// Presigned download URL for one variant.
    async fn variant_url(
        &self,
        image_id: &str,
        size: SizeName,
    ) -> Result<VariantUrl, PipelineError>;

    /// Presigned download URLs for all variants of an image.
    async fn all_variant_urls(&self, image_id: &str) -> Result<VariantUrlList, PipelineError>;
}

#[async_trait]
impl OriginApi for OriginClient {
    async fn create_upload_session(
        &self,
        file_key: &str,
        sizes: &[SizeName],
        content_type: &str,
    ) -> Result<UploadSession, PipelineError> {
        self.post_json(
            &format!("{}/files/upload", self.api_prefix()),
            &UploadUrlsRequest {
                file_key,
                sizes,
                content_type,
            },
        )
        .await
    }

    async fn confirm_upload(&self, image_id: &str) -> Result<ConfirmReceipt, PipelineError> {
        self.post_json(
            &format!("{}/files/confirm", self.api_prefix()),
            &ConfirmRequest { image_id },
        )
        .await
    }

    async fn variant_url(
        &self,
        image_id: &str,
        size: SizeName,
    ) -> Result<VariantUrl, PipelineError> {
        self.get(&format!("{}/files/{}/{}", self.api_prefix(), image_id, size))
            .await
    }

    async fn all_variant_urls(&self, image_id: &str) -> Result<VariantUrlList, PipelineError> {
        self.get(&format!("{}/files/{}", self.api_prefix(), image_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_session_wire_shape() {
        let json = r#"{
            "imageId": "img-123",
            "fileKey": "uploads/1722945600000-3f6e",
            "uploadUrls": [
                {"size": "large", "url": "https://bucket.example.com/large?sig=a"},
                {"size": "small", "url": "https://bucket.example.com/small?sig=b"}
            ],
            "expiresAt": "2026-08-07T12:00:00Z"
        }"#;

        let session: UploadSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.image_id, "img-123");
        assert_eq!(session.upload_urls.len(), 2);
        assert_eq!(
            session.url_for(SizeName::Large),
            Some("https://bucket.example.com/large?sig=a")
        );
        assert_eq!(session.url_for(SizeName::Medium), None);
    }

    #[test]
    fn test_upload_urls_request_wire_shape() {
        let request = UploadUrlsRequest {
            file_key: "uploads/1-a",
            sizes: &[SizeName::Large, SizeName::Small],
            content_type: "image/jpeg",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["fileKey"], "uploads/1-a");
        assert_eq!(json["sizes"][0], "large");
        assert_eq!(json["sizes"][1], "small");
        assert_eq!(json["contentType"], "image/jpeg");
    }

    #[test]
    fn test_confirm_receipt_wire_shape() {
        let json = r#"{"imageId": "img-123", "status": "confirmed", "confirmedCount": 3}"#;
        let receipt: ConfirmReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.image_id, "img-123");
        assert_eq!(receipt.confirmed_count, 3);
    }

    #[test]
    fn test_variant_url_optional_content_type() {
        let json = r#"{"imageId": "img-123", "size": "small", "url": "https://cdn.example.com/s"}"#;
        let variant: VariantUrl = serde_json::from_str(json).unwrap();
        assert_eq!(variant.size, SizeName::Small);
        assert_eq!(variant.content_type, None);

        let round = serde_json::to_value(&variant).unwrap();
        assert!(round.get("contentType").is_none());
    }
}
