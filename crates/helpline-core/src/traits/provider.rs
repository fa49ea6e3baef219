// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion capability consumed by the orchestrator and the intent
//! classifier's LLM fallback stage.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::HelplineError;
use crate::types::{ChatMessage, TokenUsage};

/// A finite, non-restartable stream of assistant text fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, HelplineError>> + Send>>;

/// Uniform blocking and streaming chat interface over an LLM backend.
///
/// Concrete backends are selected once at startup by the binary's provider
/// factory; callers never branch on a provider name at call time.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends the conversation and waits for the full reply.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<(String, TokenUsage), HelplineError>;

    /// Sends the conversation and returns a stream of reply fragments.
    ///
    /// The stream ends when the backend finishes generating. It is not
    /// restartable; callers accumulate fragments themselves.
    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<FragmentStream, HelplineError>;
}
