//! Upload orchestration: compress, deliver, confirm.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use uuid::Uuid;

use picflow_core::constants::{JPEG_CONTENT_TYPE, UPLOAD_KEY_PREFIX};
use picflow_core::{CompressedVariant, PipelineError, PipelineResult, SizeName, SourceUri};
use picflow_processing::{ArtifactStore, CompressionEngine, LocalImageBackend};

use crate::api::{OriginApi, UploadSession, VariantUrl, VariantUrlList};
use crate::storage::{PresignedStorage, PutError};
use crate::{ClientConfig, HttpObjectStorage, OriginClient};

/// Drives the full pipeline for one image: probe, compress each requested
/// size, obtain a presigned upload session, PUT every variant in parallel,
/// and confirm completion with the origin.
///
/// Phases are strictly sequenced; within the upload phase the per-variant
/// PUTs run in parallel and are joined without cancelling siblings. Any
/// failure fails the whole run; nothing is retried and no partial result is
/// returned.
#[derive(Clone)]
pub struct ImageUploader {
    origin: Arc<dyn OriginApi>,
    storage: Arc<dyn PresignedStorage>,
    engine: CompressionEngine,
    store: Arc<dyn ArtifactStore>,
}

impl ImageUploader {
    pub fn new(
        origin: Arc<dyn OriginApi>,
        storage: Arc<dyn PresignedStorage>,
        engine: CompressionEngine,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            origin,
            storage,
            engine,
            store,
        }
    }

    /// Build an uploader for local sources from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Build an uploader for local sources against the configured origin.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let origin = Arc::new(OriginClient::new(config)?);
        let backend = Arc::new(LocalImageBackend::new());
        let engine = CompressionEngine::new(backend.clone(), backend.clone(), backend.clone());
        Ok(Self::new(
            origin,
            Arc::new(HttpObjectStorage::new()),
            engine,
            backend,
        ))
    }

    /// Compress and upload an image with the requested size variants.
    pub async fn upload(
        &self,
        source: &SourceUri,
        sizes: &[SizeName],
    ) -> Result<PipelineResult, PipelineError> {
        let start = Instant::now();

        let source_image = self.engine.probe(source).await?;
        let variants = self.engine.compress(&source_image, sizes).await?;

        let file_key = new_file_key();
        let session = self
            .origin
            .create_upload_session(&file_key, sizes, JPEG_CONTENT_TYPE)
            .await?;

        let outcomes = join_all(
            variants
                .iter()
                .map(|variant| self.upload_variant(&session, variant)),
        )
        .await;
        // All PUTs have settled; surface the first failure in request order.
        for outcome in outcomes {
            outcome?;
        }

        let receipt = self
            .origin
            .confirm_upload(&session.image_id)
            .await
            .map_err(|e| PipelineError::Confirm(e.to_string()))?;

        tracing::info!(
            image_id = %session.image_id,
            variants = sizes.len(),
            confirmed_count = receipt.confirmed_count,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "image upload complete"
        );

        Ok(PipelineResult {
            image_id: session.image_id,
            variants: sizes.to_vec(),
        })
    }

    /// Upload a profile picture (small variant only), returning the image
    /// id.
    pub async fn upload_profile_picture(
        &self,
        source: &SourceUri,
    ) -> Result<String, PipelineError> {
        let result = self.upload(source, &[SizeName::Small]).await?;
        Ok(result.image_id)
    }

    /// Upload a gallery image (all size variants), returning the image id.
    pub async fn upload_gallery_image(&self, source: &SourceUri) -> Result<String, PipelineError> {
        let result = self.upload(source, &SizeName::ALL).await?;
        Ok(result.image_id)
    }

    /// Presigned download URL for one variant of a stored image.
    pub async fn variant_url(
        &self,
        image_id: &str,
        size: SizeName,
    ) -> Result<VariantUrl, PipelineError> {
        self.origin.variant_url(image_id, size).await
    }

    /// Presigned download URLs for all variants of a stored image.
    pub async fn all_variant_urls(&self, image_id: &str) -> Result<VariantUrlList, PipelineError> {
        self.origin.all_variant_urls(image_id).await
    }

    async fn upload_variant(
        &self,
        session: &UploadSession,
        variant: &CompressedVariant,
    ) -> Result<(), PipelineError> {
        let url = session
            .url_for(variant.size)
            .ok_or(PipelineError::MissingPresignedUrl { size: variant.size })?;

        let blob = self.store.read(&variant.uri).await?;
        self.storage
            .put(url, JPEG_CONTENT_TYPE, blob)
            .await
            .map_err(|e| match e {
                PutError::Status(status) => PipelineError::StorageUpload {
                    size: variant.size,
                    status,
                },
                PutError::Network(message) => PipelineError::Network(message),
            })?;

        tracing::debug!(
            size = %variant.size,
            byte_size = variant.byte_size,
            "variant uploaded"
        );
        Ok(())
    }
}

/// Unique object-storage key for one upload run.
fn new_file_key() -> String {
    format!(
        "{}/{}-{}",
        UPLOAD_KEY_PREFIX,
        Utc::now().timestamp_millis(),
        Uuid::new_v4()
    )
}
