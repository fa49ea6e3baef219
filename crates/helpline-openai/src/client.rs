// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat completion and embedding APIs.
//!
//! Handles request construction, bearer authentication, streaming SSE
//! responses, and transient error retry. A configurable base URL covers
//! the hosted API and any OpenAI-compatible local server.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use helpline_core::HelplineError;

use crate::sse::{self};
use crate::types::{
    ApiErrorResponse, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse,
    EmbeddingRequest, EmbeddingResponse,
};

/// HTTP client for an OpenAI-compatible API.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 502, 503).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl OpenAiClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `api_key` - bearer token for authentication
    /// * `base_url` - API base, e.g. `https://api.openai.com/v1`
    pub fn new(api_key: &str, base_url: impl Into<String>) -> Result<Self, HelplineError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                HelplineError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| HelplineError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Sends a non-streaming chat request and returns the full response.
    ///
    /// On transient errors, retries once after a 1-second delay.
    pub async fn complete_chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, HelplineError> {
        let mut req = request.clone();
        req.stream = false;
        let url = format!("{}/chat/completions", self.base_url);

        let body = self.post_with_retry(&url, &req).await?;
        serde_json::from_str(&body).map_err(|e| HelplineError::Provider {
            message: format!("failed to parse completion response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Sends a streaming chat request and returns a stream of chunks.
    ///
    /// On transient errors before the stream opens, retries once after a
    /// 1-second delay. Errors after the stream opens surface as stream
    /// items.
    pub async fn stream_chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<
        Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, HelplineError>> + Send>>,
        HelplineError,
    > {
        let mut req = request.clone();
        req.stream = true;
        let url = format!("{}/chat/completions", self.base_url);

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying streaming request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&req)
                .send()
                .await
                .map_err(|e| HelplineError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "streaming response received");

            if status.is_success() {
                return Ok(sse::parse_chunk_stream(response));
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(api_error(status, &body));
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Err(last_error.unwrap_or_else(|| HelplineError::Provider {
            message: "streaming request failed after retries".into(),
            source: None,
        }))
    }

    /// Requests embeddings for a batch of inputs.
    pub async fn embeddings(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, HelplineError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = self.post_with_retry(&url, request).await?;
        serde_json::from_str(&body).map_err(|e| HelplineError::Provider {
            message: format!("failed to parse embedding response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// POST a JSON body, retrying once on transient status codes, and
    /// return the success body.
    async fn post_with_retry<T: serde::Serialize>(
        &self,
        url: &str,
        request: &T,
    ) -> Result<String, HelplineError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(url)
                .json(request)
                .send()
                .await
                .map_err(|e| HelplineError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "response received");

            if status.is_success() {
                return response.text().await.map_err(|e| HelplineError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(api_error(status, &body));
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Err(last_error.unwrap_or_else(|| HelplineError::Provider {
            message: "request failed after retries".into(),
            source: None,
        }))
    }
}

/// Build a provider error from an API error body, falling back to the raw
/// body when it isn't the documented error shape.
fn api_error(status: reqwest::StatusCode, body: &str) -> HelplineError {
    let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(body) {
        match api_err.error.type_ {
            Some(type_) => format!("API error ({type_}): {}", api_err.error.message),
            None => format!("API error: {}", api_err.error.message),
        }
    } else {
        format!("API returned {status}: {body}")
    };
    HelplineError::Provider {
        message,
        source: None,
    }
}

/// Status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
