use crate::{
    backend::InferenceBackend,
    cancel::Cancellation,
    config::{ClassifierConfig, ModelSettings},
    error::{ClassifyError, Stage},
    metrics::PipelineMetrics,
    ranking::{LabelConfidence, ResultRanker},
    store::ModelStore,
};
use preprocess::{
    EncodeFormat, INTERMEDIATE_SIZE, MAX_SOURCE_SIZE, PixelImage, crop_center, crop_center_square,
    decode, pack_bgr, resize_down_to_max, resize_exact, save_diagnostic,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Classifies one encoded image per call.
///
/// decode -> fit within 1600px -> centered square -> 256x256 -> centered
/// input-size crop -> B,G,R tensor -> graph -> thresholded ranking.
///
/// Calls share nothing mutable except the optional model cache, so one
/// pipeline can serve concurrent requests when the backend is `Sync`.
pub struct ClassificationPipeline<B: InferenceBackend> {
    settings: ModelSettings,
    store: ModelStore<B>,
    ranker: ResultRanker,
    preprocessed_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    metrics: PipelineMetrics,
    requests: AtomicU64,
}

impl<B: InferenceBackend> ClassificationPipeline<B> {
    pub fn new(backend: B, config: &ClassifierConfig) -> Self {
        Self {
            settings: config.settings.clone(),
            store: ModelStore::from_config(backend, config),
            ranker: ResultRanker::new(config.settings.threshold),
            preprocessed_dir: config.preprocessed_dir.clone(),
            timeout: config.timeout,
            metrics: PipelineMetrics::new("inference"),
            requests: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn store(&self) -> &ModelStore<B> {
        &self.store
    }

    /// Classify with the configured timeout, if any.
    pub fn classify(&self, bytes: &[u8]) -> Result<Vec<LabelConfidence>, ClassifyError> {
        let cancellation = self
            .timeout
            .map(Cancellation::with_timeout)
            .unwrap_or_default();
        self.classify_with(bytes, &cancellation)
    }

    pub fn classify_with(
        &self,
        bytes: &[u8],
        cancellation: &Cancellation,
    ) -> Result<Vec<LabelConfidence>, ClassifyError> {
        let request = self.requests.fetch_add(1, Ordering::Relaxed);
        let span = tracing::info_span!("classify", request, encoded_bytes = bytes.len());
        let _enter = span.enter();

        let start = Instant::now();
        let result = self.run_stages(request, bytes, cancellation);
        let elapsed = start.elapsed();

        match &result {
            Ok(predictions) => {
                self.metrics.record_success(elapsed, predictions.len());
                tracing::debug!(
                    predictions = predictions.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Image classified"
                );
            }
            Err(e) => {
                self.metrics.record_failure(e.stage());
                tracing::warn!(
                    stage = %e.stage(),
                    status = e.status_code(),
                    error = %e,
                    "Classification failed"
                );
            }
        }

        result
    }

    /// Decode and run the geometry, returning the image that would be packed.
    pub fn prepare(
        &self,
        bytes: &[u8],
        cancellation: &Cancellation,
    ) -> Result<PixelImage, ClassifyError> {
        cancellation.check(Stage::Decode)?;
        let decoded = decode(bytes).map_err(ClassifyError::Decode)?;

        cancellation.check(Stage::ResizeToMax)?;
        let resized = resize_down_to_max(decoded, MAX_SOURCE_SIZE);

        cancellation.check(Stage::CropSquare)?;
        let square = crop_center_square(&resized);
        drop(resized);

        cancellation.check(Stage::ResizeIntermediate)?;
        let intermediate =
            resize_exact(&square, INTERMEDIATE_SIZE).map_err(|source| ClassifyError::Preprocess {
                stage: Stage::ResizeIntermediate,
                source,
            })?;

        cancellation.check(Stage::CropInput)?;
        let (width, height) = self.settings.input_size();
        crop_center(&intermediate, width, height).map_err(|source| ClassifyError::Preprocess {
            stage: Stage::CropInput,
            source,
        })
    }

    fn run_stages(
        &self,
        request: u64,
        bytes: &[u8],
        cancellation: &Cancellation,
    ) -> Result<Vec<LabelConfidence>, ClassifyError> {
        let input = self.prepare(bytes, cancellation)?;
        self.save_preprocessed(request, &input);

        cancellation.check(Stage::LoadModel)?;
        let model = self.store.load()?;

        cancellation.check(Stage::Pack)?;
        let tensor = pack_bgr(
            &input,
            self.settings.input_width,
            self.settings.input_height,
            self.settings.input_channels,
        )
        .map_err(|source| ClassifyError::Preprocess {
            stage: Stage::Pack,
            source,
        })?;

        cancellation.check(Stage::Infer)?;
        let probabilities = {
            let _infer_span = tracing::info_span!("model_inference").entered();
            self.store
                .backend()
                .run(
                    &model.graph,
                    &self.settings.input_tensor_name,
                    &self.settings.output_tensor_name,
                    &tensor,
                )
                .map_err(ClassifyError::Inference)?
        };

        cancellation.check(Stage::Rank)?;
        self.ranker
            .rank(&probabilities, &model.labels)
            .map_err(ClassifyError::Inference)
    }

    /// Best effort: a failed write is logged and never fails the request.
    fn save_preprocessed(&self, request: u64, image: &PixelImage) {
        let Some(dir) = &self.preprocessed_dir else {
            return;
        };

        let stem = format!("preprocessed-{}-{}", std::process::id(), request);
        if let Err(e) = save_diagnostic(image, dir, &stem, EncodeFormat::Jpeg) {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "Failed to save preprocessed image"
            );
        }
    }
}
