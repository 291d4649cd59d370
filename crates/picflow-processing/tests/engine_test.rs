//! Compression engine tests against a scripted manipulator backend.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use picflow_core::{
    ArtifactUri, Dimensions, ImageArtifact, PipelineError, SizeName, SourceImage, SourceUri,
};
use picflow_processing::engine::CompressionEngine;
use picflow_processing::ops::{EncodeOptions, Operation};
use picflow_processing::traits::{ArtifactStore, DimensionProber, ImageManipulator};

#[derive(Debug, Clone)]
struct RecordedCall {
    operations: Vec<Operation>,
    quality: f32,
}

/// Backend that fabricates artifacts with scripted byte sizes and records
/// every manipulator invocation.
#[derive(Clone)]
struct ScriptedBackend {
    source_dims: Dimensions,
    scripted_sizes: Arc<Mutex<VecDeque<u64>>>,
    default_byte_size: u64,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    artifacts: Arc<Mutex<HashMap<String, u64>>>,
}

impl ScriptedBackend {
    fn new(width: u32, height: u32, default_byte_size: u64) -> Self {
        Self {
            source_dims: Dimensions { width, height },
            scripted_sizes: Arc::new(Mutex::new(VecDeque::new())),
            default_byte_size,
            calls: Arc::new(Mutex::new(Vec::new())),
            artifacts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn script_byte_sizes(&self, sizes: &[u64]) {
        self.scripted_sizes.lock().unwrap().extend(sizes);
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn output_dims(&self, operations: &[Operation]) -> Dimensions {
        let mut dims = self.source_dims;
        for op in operations {
            dims = match *op {
                Operation::Crop { width, height, .. } => Dimensions { width, height },
                Operation::Resize { width, height } => Dimensions { width, height },
            };
        }
        dims
    }
}

#[async_trait]
impl ImageManipulator for ScriptedBackend {
    async fn manipulate(
        &self,
        _source: &SourceUri,
        operations: &[Operation],
        encode: EncodeOptions,
    ) -> Result<ImageArtifact, PipelineError> {
        self.calls.lock().unwrap().push(RecordedCall {
            operations: operations.to_vec(),
            quality: encode.quality,
        });

        let byte_size = self
            .scripted_sizes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_byte_size);

        let dims = self.output_dims(operations);
        let uri = format!("mem:test-{}", self.calls.lock().unwrap().len());
        self.artifacts.lock().unwrap().insert(uri.clone(), byte_size);

        Ok(ImageArtifact {
            uri: ArtifactUri::new(uri),
            width: dims.width,
            height: dims.height,
        })
    }
}

#[async_trait]
impl ArtifactStore for ScriptedBackend {
    async fn byte_size(&self, uri: &ArtifactUri) -> Result<u64, PipelineError> {
        self.artifacts
            .lock()
            .unwrap()
            .get(uri.as_str())
            .copied()
            .ok_or_else(|| PipelineError::Network(format!("artifact not found: {}", uri)))
    }

    async fn read(&self, uri: &ArtifactUri) -> Result<Bytes, PipelineError> {
        let size = self.byte_size(uri).await?;
        Ok(Bytes::from(vec![0u8; size.min(64) as usize]))
    }
}

#[async_trait]
impl DimensionProber for ScriptedBackend {
    async fn dimensions_of(&self, _source: &SourceUri) -> Result<Dimensions, PipelineError> {
        Ok(self.source_dims)
    }
}

fn engine_with(backend: &ScriptedBackend) -> CompressionEngine {
    let shared = Arc::new(backend.clone());
    CompressionEngine::new(shared.clone(), shared.clone(), shared)
}

fn source_image(width: u32, height: u32) -> SourceImage {
    SourceImage {
        uri: SourceUri::new("photos/source.jpg"),
        width,
        height,
    }
}

fn assert_quality(call: &RecordedCall, expected: f32) {
    assert!(
        (call.quality - expected).abs() < 1e-6,
        "expected quality {}, got {}",
        expected,
        call.quality
    );
}

#[tokio::test]
async fn test_empty_request_makes_no_manipulator_calls() {
    let backend = ScriptedBackend::new(2000, 1500, 1_000);
    let engine = engine_with(&backend);

    let variants = engine.compress(&source_image(2000, 1500), &[]).await.unwrap();
    assert!(variants.is_empty());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_first_attempt_within_budget_is_single_call_per_size() {
    let backend = ScriptedBackend::new(2000, 1500, 1_000);
    let engine = engine_with(&backend);

    let variants = engine
        .compress(&source_image(2000, 1500), &SizeName::ALL)
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 3);
    let sizes: Vec<SizeName> = variants.iter().map(|v| v.size).collect();
    assert_eq!(sizes, vec![SizeName::Large, SizeName::Medium, SizeName::Small]);
    for variant in &variants {
        assert!(variant.byte_size <= variant.size.profile().max_bytes);
    }
}

#[tokio::test]
async fn test_result_preserves_request_order() {
    let backend = ScriptedBackend::new(2000, 1500, 1_000);
    let engine = engine_with(&backend);

    let variants = engine
        .compress(&source_image(2000, 1500), &[SizeName::Small, SizeName::Large])
        .await
        .unwrap();

    let sizes: Vec<SizeName> = variants.iter().map(|v| v.size).collect();
    assert_eq!(sizes, vec![SizeName::Small, SizeName::Large]);
}

#[tokio::test]
async fn test_quality_ladder_stops_at_first_success() {
    let backend = ScriptedBackend::new(4000, 3000, 1_000);
    backend.script_byte_sizes(&[7_000_000, 5_000_000]);
    let engine = engine_with(&backend);

    let variants = engine
        .compress(&source_image(4000, 3000), &[SizeName::Large])
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 2);
    assert_eq!(variants[0].byte_size, 5_000_000);

    let calls = backend.calls();
    assert_quality(&calls[0], 0.9);
    assert!(calls[0].operations.is_empty());
    assert_quality(&calls[1], 0.85);
    assert!(calls[1].operations.is_empty());
}

#[tokio::test]
async fn test_byte_size_equal_to_budget_succeeds() {
    let backend = ScriptedBackend::new(4000, 3000, 1_000);
    backend.script_byte_sizes(&[6_291_456]);
    let engine = engine_with(&backend);

    let variants = engine
        .compress(&source_image(4000, 3000), &[SizeName::Large])
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 1);
    assert_eq!(variants[0].byte_size, 6_291_456);
}

#[tokio::test]
async fn test_exhaustion_fails_after_exactly_twelve_calls() {
    // Every attempt lands over the 6 MiB budget.
    let backend = ScriptedBackend::new(4000, 3000, 10_000_000);
    let engine = engine_with(&backend);

    let err = engine
        .compress(&source_image(4000, 3000), &[SizeName::Large])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::BudgetExceeded {
            size: SizeName::Large,
            ..
        }
    ));
    assert_eq!(backend.call_count(), 12);

    let calls = backend.calls();
    // 1 initial + 6 quality steps, all full frame.
    for (call, expected) in calls[..7]
        .iter()
        .zip([0.9, 0.85, 0.8, 0.75, 0.7, 0.65, 0.6])
    {
        assert_quality(call, expected);
        assert!(call.operations.is_empty());
    }
    // 5 scale steps at quality 0.6, each compounding on the previous
    // attempt's dimensions.
    let expected_resizes = [
        (3600, 2700),
        (2880, 2160),
        (2016, 1512),
        (1210, 907),
        (605, 454),
    ];
    for (call, (width, height)) in calls[7..].iter().zip(expected_resizes) {
        assert_quality(call, 0.6);
        assert_eq!(call.operations, vec![Operation::Resize { width, height }]);
    }
}

#[tokio::test]
async fn test_small_variant_crops_before_resizing() {
    let backend = ScriptedBackend::new(1920, 1080, 1_000);
    let engine = engine_with(&backend);

    engine
        .compress(&source_image(1920, 1080), &[SizeName::Small])
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(
        calls[0].operations,
        vec![
            Operation::Crop {
                x: 420,
                y: 0,
                width: 1080,
                height: 1080
            },
            Operation::Resize {
                width: 256,
                height: 256
            },
        ]
    );
}

#[tokio::test]
async fn test_small_exhaustion_keeps_crop_on_scale_steps() {
    // Every attempt lands over the 512 KiB budget.
    let backend = ScriptedBackend::new(1920, 1080, 600_000);
    let engine = engine_with(&backend);

    let err = engine
        .compress(&source_image(1920, 1080), &[SizeName::Small])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::BudgetExceeded {
            size: SizeName::Small,
            ..
        }
    ));
    assert_eq!(backend.call_count(), 12);

    let calls = backend.calls();
    for call in &calls[7..] {
        assert!(matches!(call.operations[0], Operation::Crop { .. }));
        assert_eq!(call.operations.len(), 2);
    }
    // First scale step shrinks the 256x256 thumbnail, not the source.
    assert_eq!(
        calls[7].operations[1],
        Operation::Resize {
            width: 230,
            height: 230
        }
    );
}

#[tokio::test]
async fn test_compress_uri_probes_dimensions() {
    let backend = ScriptedBackend::new(1000, 800, 1_000);
    let engine = engine_with(&backend);

    engine
        .compress_uri(&SourceUri::new("photos/source.jpg"), &[SizeName::Medium])
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(
        calls[0].operations,
        vec![Operation::Resize {
            width: 600,
            height: 480
        }]
    );
}

#[tokio::test]
async fn test_compress_profile_picture_is_small_only() {
    let backend = ScriptedBackend::new(1000, 1000, 1_000);
    let engine = engine_with(&backend);

    let variant = engine
        .compress_profile_picture(&SourceUri::new("photos/me.jpg"))
        .await
        .unwrap();

    assert_eq!(variant.size, SizeName::Small);
    assert_eq!(backend.call_count(), 1);
    assert_eq!(
        backend.calls()[0].operations[0],
        Operation::Crop {
            x: 0,
            y: 0,
            width: 1000,
            height: 1000
        }
    );
}

#[tokio::test]
async fn test_compress_gallery_image_covers_all_sizes() {
    let backend = ScriptedBackend::new(2000, 1500, 1_000);
    let engine = engine_with(&backend);

    let variants = engine
        .compress_gallery_image(&SourceUri::new("photos/trip.jpg"))
        .await
        .unwrap();

    let sizes: Vec<SizeName> = variants.iter().map(|v| v.size).collect();
    assert_eq!(sizes, SizeName::ALL.to_vec());
}
