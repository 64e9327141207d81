//! Gemini HTTP client with API-key rotation.
//!
//! Calls `POST {base}/v1beta/models/{model}:generateContent?key={key}` and
//! extracts the first candidate's text. Quota and auth failures (429/401/403)
//! rotate to the next configured key after a fixed sleep; each key is tried
//! at most once per request, then the call fails with `QuotaExhausted`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{LlmClient, LlmError};
use crate::config::GeminiConfig;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Sleep between key rotations. The original backoff was a bare fixed sleep;
/// kept as-is.
const ROTATION_DELAY: Duration = Duration::from_millis(500);

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    keys: Vec<String>,
    /// Index of the key to try first. Survives across requests so a request
    /// that rotated leaves the working key active for the next one.
    active_key: AtomicUsize,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, LlmError> {
        if config.api_keys.is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            keys: config.api_keys.clone(),
            active_key: AtomicUsize::new(0),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Advance to the next key, wrapping. Returns the new index.
    fn rotate_key(&self, from_index: usize) -> usize {
        let next = (from_index + 1) % self.keys.len();
        self.active_key.store(next, Ordering::Relaxed);
        next
    }
}

// ---------------------------------------------------------------------------
// Wire types (generateContent)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let max_attempts = self.keys.len();
        for attempt in 0..max_attempts {
            let key_index = self.active_key.load(Ordering::Relaxed) % self.keys.len();
            let response = self
                .client
                .post(self.endpoint())
                .query(&[("key", self.keys[key_index].as_str())])
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    if e.is_connect() {
                        LlmError::Connection(e.to_string())
                    } else if e.is_timeout() {
                        LlmError::Timeout(e.to_string())
                    } else {
                        LlmError::Http(e.to_string())
                    }
                })?;

            let status = response.status();
            if status.as_u16() == 429 || status.as_u16() == 401 || status.as_u16() == 403 {
                tracing::warn!(
                    status = status.as_u16(),
                    key_index,
                    attempt,
                    "API key rejected, rotating"
                );
                self.rotate_key(key_index);
                if attempt + 1 < max_attempts {
                    tokio::time::sleep(ROTATION_DELAY).await;
                }
                continue;
            }
            if !status.is_success() {
                return Err(LlmError::Http(format!("status {status}")));
            }

            let parsed: GenerateContentResponse = response
                .json()
                .await
                .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
            return parsed
                .first_text()
                .ok_or_else(|| LlmError::MalformedResponse("no candidate text".into()));
        }

        Err(LlmError::QuotaExhausted)
    }
}
