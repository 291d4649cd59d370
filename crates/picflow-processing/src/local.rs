//! In-process image backend.
//!
//! Decodes sources from the local filesystem, applies crop/resize with a
//! ratio-based filter choice, and encodes JPEG through mozjpeg. Artifacts
//! live in an in-memory map under `mem:{uuid}` handles and drop with the
//! backend; nothing is persisted past the pipeline run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use image::{imageops, DynamicImage, GenericImageView};
use uuid::Uuid;

use picflow_core::{ArtifactUri, Dimensions, ImageArtifact, PipelineError, SourceUri};

use crate::ops::{EncodeOptions, Operation};
use crate::traits::{ArtifactStore, DimensionProber, ImageManipulator};

#[derive(Clone, Default)]
pub struct LocalImageBackend {
    artifacts: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl LocalImageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_artifact(&self, data: Bytes) -> ArtifactUri {
        let uri = format!("mem:{}", Uuid::new_v4());
        self.artifacts.lock().unwrap().insert(uri.clone(), data);
        ArtifactUri::new(uri)
    }

    fn artifact(&self, uri: &ArtifactUri) -> Result<Bytes, PipelineError> {
        self.artifacts
            .lock()
            .unwrap()
            .get(uri.as_str())
            .cloned()
            .ok_or_else(|| PipelineError::Network(format!("artifact not found: {}", uri)))
    }
}

fn decode_source(path: &str) -> Result<DynamicImage, PipelineError> {
    image::ImageReader::open(path)
        .map_err(|e| PipelineError::Manipulation(format!("failed to open {}: {}", path, e)))?
        .with_guessed_format()
        .map_err(|e| PipelineError::Manipulation(format!("failed to read {}: {}", path, e)))?
        .decode()
        .map_err(|e| PipelineError::Manipulation(format!("failed to decode {}: {}", path, e)))
}

/// Ratio-based filter choice: cheaper filters for aggressive downscales.
fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> imageops::FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        imageops::FilterType::Triangle
    } else if max_ratio > 1.5 {
        imageops::FilterType::CatmullRom
    } else {
        imageops::FilterType::Lanczos3
    }
}

fn apply_operations(
    mut img: DynamicImage,
    operations: &[Operation],
) -> Result<DynamicImage, PipelineError> {
    for op in operations {
        img = match *op {
            Operation::Crop {
                x,
                y,
                width,
                height,
            } => {
                let (orig_width, orig_height) = img.dimensions();
                if x.saturating_add(width) > orig_width || y.saturating_add(height) > orig_height {
                    return Err(PipelineError::Manipulation(format!(
                        "crop region {}x{}+{}+{} exceeds image bounds {}x{}",
                        width, height, x, y, orig_width, orig_height
                    )));
                }
                img.crop_imm(x, y, width, height)
            }
            Operation::Resize { width, height } => {
                let (orig_width, orig_height) = img.dimensions();
                let filter = select_filter(orig_width, orig_height, width, height);
                img.resize_exact(width, height, filter)
            }
        };
    }
    Ok(img)
}

/// Encode to JPEG at `quality` in (0, 1].
fn encode_jpeg(img: &DynamicImage, quality: f32) -> Result<Vec<u8>, PipelineError> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality((quality * 100.0).clamp(1.0, 100.0));
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp
        .start_compress(Vec::new())
        .map_err(|e| PipelineError::Manipulation(format!("jpeg encoder failed to start: {}", e)))?;
    comp.write_scanlines(&rgb)
        .map_err(|e| PipelineError::Manipulation(format!("jpeg encode failed: {}", e)))?;
    comp.finish()
        .map_err(|e| PipelineError::Manipulation(format!("jpeg encode failed: {}", e)))
}

#[async_trait]
impl ImageManipulator for LocalImageBackend {
    async fn manipulate(
        &self,
        source: &SourceUri,
        operations: &[Operation],
        encode: EncodeOptions,
    ) -> Result<ImageArtifact, PipelineError> {
        let path = source.as_str().to_string();
        let ops = operations.to_vec();
        let start = Instant::now();

        let (data, width, height) = tokio::task::spawn_blocking(move || {
            let img = decode_source(&path)?;
            let img = apply_operations(img, &ops)?;
            let (width, height) = img.dimensions();
            let data = encode_jpeg(&img, encode.quality)?;
            Ok::<_, PipelineError>((data, width, height))
        })
        .await
        .map_err(|e| PipelineError::Manipulation(format!("manipulation task failed: {}", e)))??;

        let byte_size = data.len();
        let uri = self.insert_artifact(Bytes::from(data));

        tracing::debug!(
            source = %source,
            width,
            height,
            byte_size,
            quality = encode.quality,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "encoded jpeg artifact"
        );

        Ok(ImageArtifact { uri, width, height })
    }
}

#[async_trait]
impl ArtifactStore for LocalImageBackend {
    async fn byte_size(&self, uri: &ArtifactUri) -> Result<u64, PipelineError> {
        Ok(self.artifact(uri)?.len() as u64)
    }

    async fn read(&self, uri: &ArtifactUri) -> Result<Bytes, PipelineError> {
        self.artifact(uri)
    }
}

#[async_trait]
impl DimensionProber for LocalImageBackend {
    async fn dimensions_of(&self, source: &SourceUri) -> Result<Dimensions, PipelineError> {
        let path = source.as_str().to_string();

        tokio::task::spawn_blocking(move || {
            let (width, height) = image::ImageReader::open(&path)
                .map_err(|e| {
                    PipelineError::Dimension(format!("failed to open {}: {}", path, e))
                })?
                .with_guessed_format()
                .map_err(|e| {
                    PipelineError::Dimension(format!("failed to read {}: {}", path, e))
                })?
                .into_dimensions()
                .map_err(|e| {
                    PipelineError::Dimension(format!("failed to probe {}: {}", path, e))
                })?;
            Ok(Dimensions { width, height })
        })
        .await
        .map_err(|e| PipelineError::Dimension(format!("probe task failed: {}", e)))?
    }
}
