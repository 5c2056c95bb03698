//! Umbrella crate for the PetPortrait caption pipeline.
//!
//! Stitches the three stage crates together so callers go from an uploaded
//! photo to a caption with a single entry point:
//!
//! 1. [`preprocess`] decodes the base64 payload and normalizes it to a
//!    bounded JPEG (on the blocking pool),
//! 2. [`vision`] runs label and web detection concurrently,
//! 3. [`caption`] turns the detected concepts into a caption and hashtags.
//!
//! Each remote call is attempted exactly once and nothing is persisted, so a
//! request can be dropped at any point.

pub mod config;

pub use {caption, preprocess, vision};

pub use caption::{
    AnthropicClient, CaptionConfig, CaptionError, CaptionInitError, CaptionResult,
    CaptionSynthesizer, ContentBlock, GenerationRequest, TextGenerator,
};
pub use config::{ConfigLoadError, PipelineConfig};
pub use preprocess::{DecodeError, NormalizedImage, PreprocessConfig, RawImage};
pub use vision::{
    Annotation, Feature, GoogleVisionClient, ImageAnnotator, RawAnnotation, VisionAnalyzer,
    VisionAuth, VisionConfig, VisionError, VisionInitError, VisionSignal,
};

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// Where a request is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Preprocessing,
    Analyzing,
    Synthesizing,
    Done,
    /// Terminal failure; carries [`PipelineError::kind`].
    Failed(&'static str),
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Idle => f.write_str("idle"),
            PipelineStage::Preprocessing => f.write_str("preprocessing"),
            PipelineStage::Analyzing => f.write_str("analyzing"),
            PipelineStage::Synthesizing => f.write_str("synthesizing"),
            PipelineStage::Done => f.write_str("done"),
            PipelineStage::Failed(kind) => write!(f, "failed({kind})"),
        }
    }
}

/// Errors that can end a caption request.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Decode(DecodeError),
    Vision(VisionError),
    Generation(CaptionError),
    /// The caller's cancellation signal fired while `stage` was running.
    Cancelled { stage: PipelineStage },
    /// The blocking preprocess task panicked or was shut down.
    Worker(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Decode(err) => write!(f, "image decode failure: {err}"),
            PipelineError::Vision(err) => write!(f, "image analysis failure: {err}"),
            PipelineError::Generation(err) => write!(f, "caption generation failure: {err}"),
            PipelineError::Cancelled { stage } => write!(f, "request cancelled during {stage}"),
            PipelineError::Worker(msg) => write!(f, "preprocess worker failed: {msg}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Decode(err) => Some(err),
            PipelineError::Vision(err) => Some(err),
            PipelineError::Generation(err) => Some(err),
            PipelineError::Cancelled { .. } | PipelineError::Worker(_) => None,
        }
    }
}

impl From<DecodeError> for PipelineError {
    fn from(value: DecodeError) -> Self {
        PipelineError::Decode(value)
    }
}

impl From<VisionError> for PipelineError {
    fn from(value: VisionError) -> Self {
        PipelineError::Vision(value)
    }
}

impl From<CaptionError> for PipelineError {
    fn from(value: CaptionError) -> Self {
        PipelineError::Generation(value)
    }
}

impl PipelineError {
    /// Stage that was running when the request failed.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Decode(_) | PipelineError::Worker(_) => PipelineStage::Preprocessing,
            PipelineError::Vision(_) => PipelineStage::Analyzing,
            PipelineError::Generation(_) => PipelineStage::Synthesizing,
            PipelineError::Cancelled { stage } => *stage,
        }
    }

    /// Short identifier for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Decode(_) => "decode",
            PipelineError::Vision(_) => "vision",
            PipelineError::Generation(_) => "generation",
            PipelineError::Cancelled { .. } => "cancelled",
            PipelineError::Worker(_) => "worker",
        }
    }

    /// True for failures caused by the uploaded photo itself.
    pub fn is_client_input(&self) -> bool {
        matches!(
            self,
            PipelineError::Decode(_) | PipelineError::Vision(VisionError::ImageRejected(_))
        )
    }
}

/// Startup failures: nothing can be served until these are fixed.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
    #[error("vision client: {0}")]
    Vision(#[from] VisionInitError),
    #[error("caption client: {0}")]
    Caption(#[from] CaptionInitError),
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    /// `result` is a [`PipelineError::Decode`] or [`PipelineError::Worker`] on failure.
    fn record_preprocess(&self, latency: Duration, result: Result<(), &PipelineError>);
    fn record_vision(&self, latency: Duration, result: Result<(), &VisionError>);
    fn record_caption(&self, latency: Duration, result: Result<(), &CaptionError>);
}

struct MetricsSpan<'a> {
    recorder: &'a dyn PipelineMetrics,
    start: Instant,
}

impl<'a> MetricsSpan<'a> {
    fn start(recorder: Option<&'a Arc<dyn PipelineMetrics>>) -> Option<Self> {
        recorder.map(|recorder| Self {
            recorder: recorder.as_ref(),
            start: Instant::now(),
        })
    }

    fn record_preprocess<T>(self, result: &Result<T, PipelineError>) {
        self.recorder
            .record_preprocess(self.start.elapsed(), result.as_ref().map(|_| ()));
    }

    fn record_vision<T>(self, result: &Result<T, VisionError>) {
        self.recorder
            .record_vision(self.start.elapsed(), result.as_ref().map(|_| ()));
    }

    fn record_caption<T>(self, result: &Result<T, CaptionError>) {
        self.recorder
            .record_caption(self.start.elapsed(), result.as_ref().map(|_| ()));
    }
}

/// Current stage of one request, readable after the request future is dropped.
struct StageTracker(Mutex<PipelineStage>);

impl StageTracker {
    fn new() -> Self {
        Self(Mutex::new(PipelineStage::Idle))
    }

    fn advance(&self, next: PipelineStage) {
        let mut guard = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!(from = %*guard, to = %next, "pipeline_stage");
        *guard = next;
    }

    fn current(&self) -> PipelineStage {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Photo in, caption out.
///
/// Built once at startup and shared behind an `Arc`; holds no per-request
/// state.
#[derive(Clone)]
pub struct CaptionPipeline {
    preprocess: PreprocessConfig,
    analyzer: VisionAnalyzer,
    synthesizer: CaptionSynthesizer,
    metrics: Option<Arc<dyn PipelineMetrics>>,
}

impl fmt::Debug for CaptionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptionPipeline")
            .field("preprocess", &self.preprocess)
            .field("analyzer", &self.analyzer)
            .field("synthesizer", &self.synthesizer)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl CaptionPipeline {
    pub fn new(
        preprocess: PreprocessConfig,
        analyzer: VisionAnalyzer,
        synthesizer: CaptionSynthesizer,
    ) -> Self {
        Self {
            preprocess,
            analyzer,
            synthesizer,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn preprocess_config(&self) -> &PreprocessConfig {
        &self.preprocess
    }

    /// Runs the full pipeline for one uploaded photo.
    pub async fn generate(&self, image_base64: &str) -> Result<CaptionResult, PipelineError> {
        self.generate_until(image_base64, std::future::pending::<()>())
            .await
    }

    /// Like [`generate`](Self::generate), but gives up with
    /// [`PipelineError::Cancelled`] as soon as `cancel` completes.
    ///
    /// In-flight remote calls are dropped. A preprocess job already on the
    /// blocking pool runs to completion and its output is discarded.
    pub async fn generate_until<F>(
        &self,
        image_base64: &str,
        cancel: F,
    ) -> Result<CaptionResult, PipelineError>
    where
        F: Future<Output = ()>,
    {
        let start = Instant::now();
        let tracker = StageTracker::new();

        let result = tokio::select! {
            biased;
            _ = cancel => Err(PipelineError::Cancelled { stage: tracker.current() }),
            result = self.run(image_base64, &tracker) => result,
        };

        let elapsed_micros = start.elapsed().as_micros();
        match &result {
            Ok(caption) => {
                tracker.advance(PipelineStage::Done);
                info!(
                    hashtags = caption.hashtags.len(),
                    elapsed_micros, "caption_pipeline_success"
                );
            }
            Err(err) => {
                tracker.advance(PipelineStage::Failed(err.kind()));
                warn!(
                    error = %err,
                    kind = err.kind(),
                    stage = %err.stage(),
                    elapsed_micros,
                    "caption_pipeline_failure"
                );
            }
        }
        result
    }

    async fn run(
        &self,
        image_base64: &str,
        tracker: &StageTracker,
    ) -> Result<CaptionResult, PipelineError> {
        tracker.advance(PipelineStage::Preprocessing);
        let span = MetricsSpan::start(self.metrics.as_ref());
        let image = self.preprocess_blocking(image_base64).await;
        if let Some(span) = span {
            span.record_preprocess(&image);
        }
        let image = image?;

        tracker.advance(PipelineStage::Analyzing);
        let span = MetricsSpan::start(self.metrics.as_ref());
        let signal = self.analyzer.analyze(&image).await;
        if let Some(span) = span {
            span.record_vision(&signal);
        }
        let signal = signal?;

        tracker.advance(PipelineStage::Synthesizing);
        let span = MetricsSpan::start(self.metrics.as_ref());
        let caption = self.synthesizer.synthesize(&signal).await;
        if let Some(span) = span {
            span.record_caption(&caption);
        }
        caption.map_err(PipelineError::from)
    }

    async fn preprocess_blocking(&self, image_base64: &str) -> Result<NormalizedImage, PipelineError> {
        let input = image_base64.to_owned();
        let cfg = self.preprocess.clone();
        tokio::task::spawn_blocking(move || preprocess::preprocess(&input, &cfg))
            .await
            .map_err(|err| PipelineError::Worker(err.to_string()))?
            .map_err(PipelineError::Decode)
    }
}
