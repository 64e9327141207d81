//! Generative-language client layer.
//!
//! **Why this exists**: intent classification and empathy refinement both
//! call an external LLM. Everything above this layer talks to the
//! `LlmClient` trait so the pipeline can run keyword-only (no keys), against
//! Gemini (production), or against a scripted mock (tests) without caring
//! which. Failures here are always recoverable upstream: callers degrade to
//! keyword scoring or template text, never to a user-visible error.

pub mod gemini;
pub mod parse;
pub mod prompts;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("no API key configured")]
    MissingApiKey,

    /// Every configured key answered 429/401/403 this request.
    #[error("all configured API keys exhausted (quota or auth)")]
    QuotaExhausted,

    #[error("cannot reach generative-language endpoint: {0}")]
    Connection(String),

    #[error("generative-language request timed out: {0}")]
    Timeout(String),

    #[error("generative-language HTTP error: {0}")]
    Http(String),

    #[error("malformed LLM response: {0}")]
    MalformedResponse(String),
}

// ---------------------------------------------------------------------------
// Client trait
// ---------------------------------------------------------------------------

/// One text-in, text-out generation call.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// Mock
// ---------------------------------------------------------------------------

/// Mock LLM client for testing — replays a script, then a fallback response.
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Option<String>,
    call_count: AtomicUsize,
}

impl MockLlmClient {
    /// Always answers `response`.
    pub fn new(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(response.to_string()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Always fails with a connection error.
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Answers from `script` in order, then falls back to `new`-style
    /// behavior (or failure when constructed via `failing`).
    pub fn with_script(mut self, script: Vec<Result<String, LlmError>>) -> Self {
        self.script = Mutex::new(script.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let scripted = self
            .script
            .lock()
            .map(|mut q| q.pop_front())
            .unwrap_or_default();
        match scripted {
            Some(result) => result,
            None => match &self.fallback {
                Some(text) => Ok(text.clone()),
                None => Err(LlmError::Connection("mock: no scripted response".into())),
            },
        }
    }
}
