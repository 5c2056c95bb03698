use crate::config::ServerConfig;
use crate::telemetry::PrometheusMetrics;
use metrics_exporter_prometheus::PrometheusHandle;
use petportrait::{CaptionPipeline, InitError};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Caption pipeline and its remote clients, built once at startup
    pub pipeline: Arc<CaptionPipeline>,

    /// Prometheus render handle, present when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Loads the pipeline config, resolves credentials and builds the clients.
    pub fn new(config: ServerConfig) -> Result<Self, InitError> {
        let pipeline_config = config.load_pipeline_config()?;
        let mut pipeline = pipeline_config.build_pipeline()?;
        if config.metrics_enabled {
            pipeline = pipeline.with_metrics(Arc::new(PrometheusMetrics));
        }
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// State around an already built pipeline.
    pub fn with_pipeline(config: ServerConfig, pipeline: CaptionPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            metrics: None,
        }
    }

    pub fn with_metrics_handle(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("pipeline", &self.pipeline)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}
