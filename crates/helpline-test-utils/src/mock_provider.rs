// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion providers for deterministic testing.
//!
//! [`MockProvider`] returns pre-configured responses, enabling fast,
//! CI-runnable tests without external API calls. [`FailingProvider`] and
//! [`StreamAbortProvider`] exercise the failure paths.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use helpline_core::{
    ChatMessage, CompletionProvider, FragmentStream, HelplineError, TokenUsage,
};

/// Fragment size (in chars) used when a mock response is streamed.
const FRAGMENT_CHARS: usize = 4;

/// A mock completion provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default "mock reply" text is returned.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    async fn next_response(&self) -> String {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn chat(
        &self,
        _messages: &[ChatMessage],
        _system_prompt: Option<&str>,
    ) -> Result<(String, TokenUsage), HelplineError> {
        let text = self.next_response().await;
        Ok((
            text,
            TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
            },
        ))
    }

    async fn stream_chat(
        &self,
        _messages: &[ChatMessage],
        _system_prompt: Option<&str>,
    ) -> Result<FragmentStream, HelplineError> {
        let text = self.next_response().await;
        let fragments: Vec<Result<String, HelplineError>> =
            split_fragments(&text).into_iter().map(Ok).collect();
        Ok(Box::pin(stream::iter(fragments)))
    }
}

/// A provider whose every call fails, for exercising fatal-turn paths.
pub struct FailingProvider;

impl FailingProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FailingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for FailingProvider {
    async fn chat(
        &self,
        _messages: &[ChatMessage],
        _system_prompt: Option<&str>,
    ) -> Result<(String, TokenUsage), HelplineError> {
        Err(HelplineError::Provider {
            message: "mock provider configured to fail".into(),
            source: None,
        })
    }

    async fn stream_chat(
        &self,
        _messages: &[ChatMessage],
        _system_prompt: Option<&str>,
    ) -> Result<FragmentStream, HelplineError> {
        Err(HelplineError::Provider {
            message: "mock provider configured to fail".into(),
            source: None,
        })
    }
}

/// A provider whose stream opens successfully, yields the given fragments,
/// then fails mid-flight. Exercises the partial-accumulation policy.
pub struct StreamAbortProvider {
    fragments: Vec<String>,
}

impl StreamAbortProvider {
    pub fn new(fragments: Vec<String>) -> Self {
        Self { fragments }
    }
}

#[async_trait]
impl CompletionProvider for StreamAbortProvider {
    async fn chat(
        &self,
        _messages: &[ChatMessage],
        _system_prompt: Option<&str>,
    ) -> Result<(String, TokenUsage), HelplineError> {
        Err(HelplineError::Provider {
            message: "stream-abort provider does not support blocking chat".into(),
            source: None,
        })
    }

    async fn stream_chat(
        &self,
        _messages: &[ChatMessage],
        _system_prompt: Option<&str>,
    ) -> Result<FragmentStream, HelplineError> {
        let mut items: Vec<Result<String, HelplineError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        items.push(Err(HelplineError::Provider {
            message: "stream aborted mid-flight".into(),
            source: None,
        }));
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Split text into char chunks so streamed replies arrive in several
/// fragments, like a real token stream.
fn split_fragments(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![];
    }
    chars
        .chunks(FRAGMENT_CHARS)
        .map(|c| c.iter().collect())
        .collect()
}
