// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn orchestration core for the Helpline chat backend.
//!
//! [`ChatOrchestrator`] coordinates one conversation turn end to end:
//! intent classification and knowledge retrieval run concurrently, their
//! results feed scene-selected prompt assembly, the LLM generates the
//! reply (blocking or streaming), and the memory window plus the durable
//! audit trail are updated afterwards.
//!
//! Failure policy is centralized here: retrieval failure degrades to an
//! empty document set, classification is non-fatal by construction,
//! persistence failure is logged after the reply already succeeded, and
//! only a completion-call failure aborts the turn -- no reply is ever
//! fabricated.

pub mod session;

use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use helpline_config::model::MemoryConfig;
use helpline_core::{
    CacheStore, ChatMessage, CompletionProvider, ConversationStore, HelplineError, IntentResult,
    RetrievedDocument, SourceRef, TokenUsage, TurnEvent, TurnRecord, TurnResult,
};
use helpline_intent::IntentClassifier;
use helpline_prompt::{build_system_prompt, scene_for_intent};
use helpline_rag::RagRetriever;

use crate::session::SessionHandle;

/// Capacity of the per-turn fragment channel. Bounded so a slow stream
/// consumer applies backpressure instead of growing an unbounded buffer.
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// The conversational orchestration core.
///
/// All collaborators are injected at construction; per-session state (the
/// memory window and the turn lock serializing turns on one session id)
/// lives in a concurrent map keyed by session id.
pub struct ChatOrchestrator {
    classifier: Arc<IntentClassifier>,
    retriever: Arc<RagRetriever>,
    provider: Arc<dyn CompletionProvider>,
    store: Arc<dyn ConversationStore>,
    cache: Arc<dyn CacheStore>,
    sessions: DashMap<String, Arc<SessionHandle>>,
    memory_max_turns: usize,
    memory_ttl: Duration,
}

impl ChatOrchestrator {
    pub fn new(
        classifier: Arc<IntentClassifier>,
        retriever: Arc<RagRetriever>,
        provider: Arc<dyn CompletionProvider>,
        store: Arc<dyn ConversationStore>,
        cache: Arc<dyn CacheStore>,
        memory_config: &MemoryConfig,
    ) -> Self {
        Self {
            classifier,
            retriever,
            provider,
            store,
            cache,
            sessions: DashMap::new(),
            memory_max_turns: memory_config.max_turns,
            memory_ttl: Duration::from_secs(memory_config.ttl_secs),
        }
    }

    /// Process one turn, returning once the full reply is computed.
    pub async fn process_turn(
        &self,
        session_id: Option<String>,
        user_message: &str,
        user_id: Option<String>,
    ) -> Result<TurnResult, HelplineError> {
        if user_message.trim().is_empty() {
            return Err(HelplineError::Internal("empty user message".into()));
        }

        let session_id = resolve_session_id(session_id);
        let handle = self.session_handle(&session_id);
        // Turns on one session are serialized for the whole pipeline:
        // memory read-modify-write is not atomic on its own.
        let _turn_guard = handle.turn_lock.clone().lock_owned().await;
        let started = Instant::now();

        let (intent, documents) = self.classify_and_retrieve(user_message).await;
        debug!(
            session_id = session_id.as_str(),
            intent = intent.intent.as_str(),
            confidence = intent.confidence,
            documents = documents.len(),
            "turn inputs ready"
        );

        let system_prompt = assemble_system_prompt(&intent, &documents);

        let mut messages = handle.memory.recent(None).await;
        messages.push(ChatMessage::user(user_message));

        // The one fatal step: no reply can be fabricated if generation
        // fails, so the error surfaces to the caller untouched.
        let (reply, usage) = self.provider.chat(&messages, Some(&system_prompt)).await?;

        let latency_ms = started.elapsed().as_millis() as u64;

        handle.memory.append_user(user_message).await;
        handle.memory.append_assistant(&reply).await;

        self.persist_turn(
            &session_id,
            user_id,
            user_message,
            &reply,
            &intent,
            &documents,
            usage,
            latency_ms,
        )
        .await;

        info!(
            session_id = session_id.as_str(),
            intent = intent.intent.as_str(),
            latency_ms,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "turn complete"
        );

        Ok(TurnResult {
            session_id,
            reply,
            intent: intent.intent,
            intent_confidence: intent.confidence,
            sources: documents.iter().map(|d| d.source.clone()).collect(),
            usage,
            latency_ms,
        })
    }

    /// Process one turn, yielding reply fragments as they are generated.
    ///
    /// The returned stream emits zero or more [`TurnEvent::Delta`] frames
    /// and exactly one terminal frame. Memory update and persistence run
    /// after the upstream ends -- on normal exhaustion, mid-flight
    /// failure, or consumer cancellation alike, using whatever text
    /// accumulated (a turn that produced nothing records nothing).
    pub async fn stream_turn(
        &self,
        session_id: Option<String>,
        user_message: &str,
        user_id: Option<String>,
    ) -> Result<Pin<Box<dyn Stream<Item = TurnEvent> + Send>>, HelplineError> {
        if user_message.trim().is_empty() {
            return Err(HelplineError::Internal("empty user message".into()));
        }

        let session_id = resolve_session_id(session_id);
        let handle = self.session_handle(&session_id);
        let turn_guard = handle.turn_lock.clone().lock_owned().await;
        let started = Instant::now();

        let (intent, documents) = self.classify_and_retrieve(user_message).await;
        let system_prompt = assemble_system_prompt(&intent, &documents);

        let mut messages = handle.memory.recent(None).await;
        messages.push(ChatMessage::user(user_message));

        // Failure to open the stream is fatal, exactly like a failed
        // blocking call.
        let mut upstream = self
            .provider
            .stream_chat(&messages, Some(&system_prompt))
            .await?;

        let (tx, rx) = mpsc::channel::<TurnEvent>(STREAM_CHANNEL_CAPACITY);
        let store = self.store.clone();
        let user_message = user_message.to_string();
        let stream_session_id = session_id.clone();

        tokio::spawn(async move {
            // Hold the turn lock until finalization is done.
            let _turn_guard = turn_guard;

            let mut full_reply = String::new();
            let mut stream_error: Option<String> = None;
            let mut consumer_gone = false;

            while let Some(item) = upstream.next().await {
                match item {
                    Ok(fragment) => {
                        full_reply.push_str(&fragment);
                        if tx.send(TurnEvent::Delta { text: fragment }).await.is_err() {
                            // Consumer dropped the stream (client
                            // disconnect). Stop pulling fragments promptly;
                            // the partial turn is still recorded below.
                            consumer_gone = true;
                            break;
                        }
                    }
                    Err(e) => {
                        error!(
                            session_id = stream_session_id.as_str(),
                            error = %e,
                            "stream failed mid-flight"
                        );
                        stream_error = Some(e.to_string());
                        break;
                    }
                }
            }

            let latency_ms = started.elapsed().as_millis() as u64;

            // Record the possibly-truncated assistant turn. A turn that
            // yielded no text leaves no dangling user message behind.
            if !full_reply.is_empty() {
                handle.memory.append_user(&user_message).await;
                handle.memory.append_assistant(&full_reply).await;

                let record = TurnRecord {
                    session_id: stream_session_id.clone(),
                    user_id,
                    user_message,
                    assistant_reply: full_reply.clone(),
                    intent: intent.clone(),
                    sources: source_refs(&documents),
                    usage: TokenUsage::default(),
                    latency_ms,
                };
                if let Err(e) = store.record_turn(&record).await {
                    error!(
                        session_id = stream_session_id.as_str(),
                        error = %e,
                        "turn persistence failed (reply already streamed)"
                    );
                }
            }

            if let Some(message) = stream_error {
                let _ = tx.send(TurnEvent::Error { message }).await;
            } else if !consumer_gone {
                let result = TurnResult {
                    session_id: stream_session_id.clone(),
                    reply: full_reply,
                    intent: intent.intent,
                    intent_confidence: intent.confidence,
                    sources: documents.iter().map(|d| d.source.clone()).collect(),
                    usage: TokenUsage::default(),
                    latency_ms,
                };
                let _ = tx.send(TurnEvent::Completed { result }).await;
                info!(
                    session_id = stream_session_id.as_str(),
                    latency_ms, "streamed turn complete"
                );
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    /// The current memory window for a session (not the durable store).
    pub async fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.session_handle(session_id).memory.history().await
    }

    /// End a conversation: clear the memory window, drop the session
    /// handle, and mark the durable record closed. Idempotent.
    pub async fn end_conversation(&self, session_id: &str) -> Result<(), HelplineError> {
        let handle = self.session_handle(session_id);
        handle.memory.clear().await;
        self.sessions.remove(session_id);
        self.store.close_conversation(session_id).await?;
        info!(session_id, "conversation closed");
        Ok(())
    }

    /// Run classification and retrieval concurrently and join them with
    /// independent-failure semantics: the classifier cannot fail by
    /// construction, and a retrieval failure degrades to no context.
    async fn classify_and_retrieve(
        &self,
        user_message: &str,
    ) -> (IntentResult, Vec<RetrievedDocument>) {
        let (intent, retrieval) = tokio::join!(
            self.classifier.classify(user_message, true),
            self.retriever.retrieve(user_message, None, None, true),
        );

        let documents = match retrieval {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "retrieval failed, continuing without context");
                vec![]
            }
        };

        (intent, documents)
    }

    #[allow(clippy::too_many_arguments)]
    async fn persist_turn(
        &self,
        session_id: &str,
        user_id: Option<String>,
        user_message: &str,
        reply: &str,
        intent: &IntentResult,
        documents: &[RetrievedDocument],
        usage: TokenUsage,
        latency_ms: u64,
    ) {
        let record = TurnRecord {
            session_id: session_id.to_string(),
            user_id,
            user_message: user_message.to_string(),
            assistant_reply: reply.to_string(),
            intent: intent.clone(),
            sources: source_refs(documents),
            usage,
            latency_ms,
        };
        // The reply was already produced; audit durability is best-effort
        // and never fails the turn.
        if let Err(e) = self.store.record_turn(&record).await {
            error!(session_id, error = %e, "turn persistence failed");
        }
    }

    fn session_handle(&self, session_id: &str) -> Arc<SessionHandle> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Arc::new(SessionHandle::new(
                    session_id,
                    self.cache.clone(),
                    self.memory_max_turns,
                    self.memory_ttl,
                ))
            })
            .clone()
    }
}

fn resolve_session_id(session_id: Option<String>) -> String {
    session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn assemble_system_prompt(intent: &IntentResult, documents: &[RetrievedDocument]) -> String {
    let scene = scene_for_intent(intent.intent);
    build_system_prompt(scene, documents, chrono::Local::now().date_naive())
}

fn source_refs(documents: &[RetrievedDocument]) -> Vec<SourceRef> {
    documents
        .iter()
        .map(|d| SourceRef {
            source: d.source.clone(),
            score: d.score,
        })
        .collect()
}

#[cfg(test)]
mod tests;
