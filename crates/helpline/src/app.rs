// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component wiring shared by the serve and shell subcommands.
//!
//! All capability implementations are selected and constructed here, once,
//! at startup; the orchestrator receives references at construction rather
//! than reaching into globals.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use helpline_cache::TtlCache;
use helpline_config::model::LlmConfig;
use helpline_config::HelplineConfig;
use helpline_core::{
    CacheStore, CompletionProvider, EmbeddingProvider, HelplineError, VectorIndex,
};
use helpline_intent::IntentClassifier;
use helpline_openai::OpenAiProvider;
use helpline_orchestrator::ChatOrchestrator;
use helpline_quality::QualityEvaluator;
use helpline_rag::{MemoryVectorIndex, RagRetriever};
use helpline_storage::SqliteStore;

/// Completion and embedding capabilities produced by the provider factory.
pub struct ProviderSet {
    pub completion: Arc<dyn CompletionProvider>,
    pub embedding: Arc<dyn EmbeddingProvider>,
}

/// Build the provider variant named in config. Selection happens exactly
/// once here; callers hold trait objects and never branch on the name
/// again.
pub fn build_providers(config: &LlmConfig) -> Result<ProviderSet, HelplineError> {
    match config.provider.as_str() {
        // `openai` covers the hosted API and any OpenAI-compatible local
        // server via `llm.base_url`.
        "openai" => {
            let provider = Arc::new(OpenAiProvider::new(config)?);
            Ok(ProviderSet {
                completion: provider.clone(),
                embedding: provider,
            })
        }
        other => Err(HelplineError::Config(format!(
            "unknown llm provider: {other}"
        ))),
    }
}

/// The assembled application: orchestrator plus the handles the
/// subcommands need for lifecycle management.
pub struct App {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub quality: Arc<QualityEvaluator>,
    pub store: Arc<SqliteStore>,
}

impl App {
    /// Construct every component from configuration.
    pub async fn build(config: &HelplineConfig) -> Result<Self, HelplineError> {
        let store = Arc::new(SqliteStore::open(&config.storage).await?);
        let cache: Arc<dyn CacheStore> = Arc::new(TtlCache::new());

        let providers = build_providers(&config.llm)?;

        let index: Arc<dyn VectorIndex> = Arc::new(MemoryVectorIndex::new());
        let retriever = Arc::new(RagRetriever::new(
            providers.embedding,
            index,
            cache.clone(),
            config.rag.top_k,
            config.rag.score_threshold,
            Duration::from_secs(config.cache.retrieval_ttl_secs),
        ));

        let classifier_llm = config
            .intent
            .llm_fallback
            .then(|| providers.completion.clone());
        let classifier = Arc::new(IntentClassifier::new(
            cache.clone(),
            classifier_llm,
            Duration::from_secs(config.cache.intent_ttl_secs),
        ));

        let orchestrator = Arc::new(ChatOrchestrator::new(
            classifier,
            retriever,
            providers.completion,
            store.clone(),
            cache,
            &config.memory,
        ));
        let quality = Arc::new(QualityEvaluator::new(store.clone()));

        info!(
            provider = config.llm.provider.as_str(),
            chat_model = config.llm.chat_model.as_str(),
            "application components wired"
        );

        Ok(Self {
            orchestrator,
            quality,
            store,
        })
    }

    /// Flush and release the durable store.
    pub async fn shutdown(&self) -> Result<(), HelplineError> {
        self.store.close().await
    }
}
