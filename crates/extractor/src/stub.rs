//! Deterministic stand-in for the model provider, for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::{CompletionClient, CompletionRequest, UpstreamError};

#[derive(Debug, Clone)]
pub struct ScriptedClient {
    reply: Result<String, UpstreamError>,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
}

impl ScriptedClient {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_result(Ok(text.into()))
    }

    pub fn failing(error: UpstreamError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(reply: Result<String, UpstreamError>) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().clone()
    }
}

impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());
        self.reply.clone()
    }
}
