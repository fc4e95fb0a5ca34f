//! Shared test helpers for engine unit tests.

use async_trait::async_trait;
use policydraft_core::error::ProviderError;
use policydraft_core::message::Message;
use policydraft_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A mock provider that returns scripted completions and a fixed embedding,
/// recording every request it receives.
///
/// Panics if more completions are requested than replies were scripted.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    fail: bool,
    embedding: Vec<f32>,
    completions: Mutex<Vec<ProviderRequest>>,
    embeddings: Mutex<Vec<EmbeddingRequest>>,
}

impl ScriptedProvider {
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fail: false,
            embedding: vec![1.0, 0.0, 0.0],
            completions: Mutex::new(Vec::new()),
            embeddings: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_replies(Vec::<String>::new())
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    pub fn completions(&self) -> Vec<ProviderRequest> {
        self.completions.lock().unwrap().clone()
    }

    pub fn embedding_calls(&self) -> usize {
        self.embeddings.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.completions.lock().unwrap().push(request);
        if self.fail {
            return Err(ProviderError::Network("service unavailable".into()));
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedProvider: no more replies");

        Ok(ProviderResponse {
            message: Message::assistant(reply),
            usage: None,
            model: "mock-model".into(),
        })
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        let count = request.inputs.len();
        self.embeddings.lock().unwrap().push(request);
        if self.fail {
            return Err(ProviderError::Network("service unavailable".into()));
        }

        Ok(EmbeddingResponse {
            embeddings: vec![self.embedding.clone(); count],
            model: "mock-embedding".into(),
            usage: None,
        })
    }
}
