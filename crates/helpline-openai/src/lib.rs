// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider for the Helpline chat backend.
//!
//! [`OpenAiProvider`] implements both [`CompletionProvider`] and
//! [`EmbeddingProvider`] on top of [`OpenAiClient`]. The configurable base
//! URL also covers OpenAI-compatible local model servers.

pub mod client;
pub mod sse;
pub mod types;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use helpline_config::model::LlmConfig;
use helpline_core::{
    ChatMessage, CompletionProvider, EmbeddingProvider, FragmentStream, HelplineError,
    TokenUsage,
};

pub use client::OpenAiClient;
use types::{ApiChatMessage, ChatCompletionRequest, EmbeddingRequest};

/// Completion + embedding provider over an OpenAI-compatible API.
pub struct OpenAiProvider {
    client: OpenAiClient,
    chat_model: String,
    embedding_model: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiProvider {
    /// Build a provider from config. Requires an API key.
    pub fn new(config: &LlmConfig) -> Result<Self, HelplineError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                HelplineError::Config(
                    "llm.api_key is required (set HELPLINE_LLM_API_KEY)".into(),
                )
            })?;
        let client = OpenAiClient::new(api_key, config.base_url.clone())?;
        debug!(
            chat_model = config.chat_model.as_str(),
            embedding_model = config.embedding_model.as_str(),
            "openai provider initialized"
        );
        Ok(Self {
            client,
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_request(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        stream: bool,
    ) -> ChatCompletionRequest {
        let mut api_messages = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = system_prompt {
            api_messages.push(ApiChatMessage {
                role: "system".into(),
                content: system.to_string(),
            });
        }
        api_messages.extend(messages.iter().map(|m| ApiChatMessage {
            role: m.role.as_str().to_string(),
            content: m.content.clone(),
        }));

        ChatCompletionRequest {
            model: self.chat_model.clone(),
            messages: api_messages,
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            stream,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<(String, TokenUsage), HelplineError> {
        let request = self.build_request(messages, system_prompt, false);
        let response = self.client.complete_chat(&request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| HelplineError::Provider {
                message: "completion response contained no choices".into(),
                source: None,
            })?;

        let usage = response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok((text, usage))
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<FragmentStream, HelplineError> {
        let request = self.build_request(messages, system_prompt, true);
        let chunks = self.client.stream_chat(&request).await?;

        let fragments = chunks.filter_map(|item| {
            futures::future::ready(match item {
                Ok(chunk) => chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.delta.content)
                    .filter(|text| !text.is_empty())
                    .map(Ok),
                Err(e) => Some(Err(e)),
            })
        });

        Ok(Box::pin(fragments))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, HelplineError> {
        let input = vec![text.to_string()];
        let mut vectors = self.embed_batch(&input).await?;
        vectors.pop().ok_or_else(|| HelplineError::Embedding {
            message: "embedding response was empty".into(),
            source: None,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, HelplineError> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            input: texts.to_vec(),
        };
        let response =
            self.client
                .embeddings(&request)
                .await
                .map_err(|e| HelplineError::Embedding {
                    message: "embedding request failed".into(),
                    source: Some(Box::new(e)),
                })?;

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}
