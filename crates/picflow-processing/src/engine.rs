//! Iterative budget-search compression engine.

use std::sync::Arc;

use futures::future::join_all;

use picflow_core::{
    CompressedVariant, Dimensions, PipelineError, SizeName, SourceImage, SourceUri,
};

use crate::ladder;
use crate::ops::EncodeOptions;
use crate::traits::{ArtifactStore, DimensionProber, ImageManipulator};

/// Compresses a source image into size-bounded variants.
///
/// Each requested size runs as its own sub-task over shared-nothing state.
/// Sub-tasks are joined without cancelling siblings; the first failure in
/// request order is surfaced after all of them settle.
#[derive(Clone)]
pub struct CompressionEngine {
    manipulator: Arc<dyn ImageManipulator>,
    store: Arc<dyn ArtifactStore>,
    prober: Arc<dyn DimensionProber>,
}

impl CompressionEngine {
    pub fn new(
        manipulator: Arc<dyn ImageManipulator>,
        store: Arc<dyn ArtifactStore>,
        prober: Arc<dyn DimensionProber>,
    ) -> Self {
        Self {
            manipulator,
            store,
            prober,
        }
    }

    /// Resolve a source URI into a [`SourceImage`] by probing its
    /// dimensions.
    pub async fn probe(&self, source: &SourceUri) -> Result<SourceImage, PipelineError> {
        let dims = self.prober.dimensions_of(source).await?;
        Ok(SourceImage {
            uri: source.clone(),
            width: dims.width,
            height: dims.height,
        })
    }

    /// Compress `source` into one variant per requested size, in request
    /// order. An empty request returns an empty vec without invoking the
    /// manipulator.
    pub async fn compress(
        &self,
        source: &SourceImage,
        sizes: &[SizeName],
    ) -> Result<Vec<CompressedVariant>, PipelineError> {
        let outcomes = join_all(
            sizes
                .iter()
                .map(|&size| self.compress_size(source, size)),
        )
        .await;

        // Every sub-task has settled; surface the first failure in request
        // order.
        let mut variants = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            variants.push(outcome?);
        }
        Ok(variants)
    }

    /// Probe and compress in one step.
    pub async fn compress_uri(
        &self,
        source: &SourceUri,
        sizes: &[SizeName],
    ) -> Result<Vec<CompressedVariant>, PipelineError> {
        let image = self.probe(source).await?;
        self.compress(&image, sizes).await
    }

    /// Compress the small, center-cropped variant used for profile
    /// pictures.
    pub async fn compress_profile_picture(
        &self,
        source: &SourceUri,
    ) -> Result<CompressedVariant, PipelineError> {
        let mut variants = self.compress_uri(source, &[SizeName::Small]).await?;
        // One requested size yields exactly one variant.
        Ok(variants.remove(0))
    }

    /// Compress every gallery variant.
    pub async fn compress_gallery_image(
        &self,
        source: &SourceUri,
    ) -> Result<Vec<CompressedVariant>, PipelineError> {
        self.compress_uri(source, &SizeName::ALL).await
    }

    async fn compress_size(
        &self,
        source: &SourceImage,
        size: SizeName,
    ) -> Result<CompressedVariant, PipelineError> {
        let profile = size.profile();
        let source_dims = Dimensions {
            width: source.width,
            height: source.height,
        };
        let mut previous: Option<Dimensions> = None;

        for (attempt, step) in ladder::steps().enumerate() {
            let plan = ladder::plan_attempt(profile, source_dims, previous, step);
            let artifact = self
                .manipulator
                .manipulate(
                    &source.uri,
                    &plan.operations,
                    EncodeOptions {
                        quality: plan.quality,
                    },
                )
                .await?;
            let byte_size = self.store.byte_size(&artifact.uri).await?;

            tracing::debug!(
                size = %size,
                attempt = attempt + 1,
                step = ?step,
                byte_size,
                max_bytes = profile.max_bytes,
                "compression attempt"
            );

            if byte_size <= profile.max_bytes {
                tracing::info!(
                    size = %size,
                    attempts = attempt + 1,
                    byte_size,
                    width = artifact.width,
                    height = artifact.height,
                    "variant within budget"
                );
                return Ok(CompressedVariant {
                    size,
                    uri: artifact.uri,
                    width: artifact.width,
                    height: artifact.height,
                    byte_size,
                });
            }

            previous = Some(Dimensions {
                width: artifact.width,
                height: artifact.height,
            });
        }

        tracing::warn!(
            size = %size,
            max_bytes = profile.max_bytes,
            "budget search exhausted"
        );
        Err(PipelineError::BudgetExceeded {
            size,
            max_bytes: profile.max_bytes,
        })
    }
}
