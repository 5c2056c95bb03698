//! Canned text generator for tests and offline runs.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CaptionError;
use crate::types::{ContentBlock, GenerationRequest};
use crate::TextGenerator;

/// Replies with a fixed response and remembers the last request.
#[derive(Debug)]
pub struct StubGenerator {
    response: Result<Vec<ContentBlock>, CaptionError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl StubGenerator {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self::with_response(Ok(blocks))
    }

    /// Single text block reply.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(vec![ContentBlock::text(text)])
    }

    pub fn failing(err: CaptionError) -> Self {
        Self::with_response(Err(err))
    }

    fn with_response(response: Result<Vec<ContentBlock>, CaptionError>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<ContentBlock>, CaptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }
        self.response.clone()
    }
}
