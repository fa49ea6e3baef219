// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Helpline chat backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Helpline configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HelplineConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// HTTP/WebSocket server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Knowledge-base retrieval settings.
    #[serde(default)]
    pub rag: RagConfig,

    /// Conversation memory window settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Result cache TTL settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Intent classifier settings.
    #[serde(default)]
    pub intent: IntentConfig,

    /// Durable store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the service.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "helpline".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP/WebSocket server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the gateway to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// LLM provider configuration.
///
/// `provider` selects the backend variant once at startup via the binary's
/// factory. `base_url` also covers OpenAI-compatible local servers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Provider variant name. Currently `openai`.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API key. `None` requires an environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat completion model identifier.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model identifier.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f64 {
    0.7
}

/// Knowledge-base retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RagConfig {
    /// Number of documents to request from the index.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum similarity score; candidates below are dropped before ranking.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_score_threshold() -> f64 {
    0.5
}

/// Conversation memory window configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Sliding window size in turns (one turn = user + assistant entries).
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// TTL of the cached window in seconds, refreshed on every write.
    #[serde(default = "default_memory_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            ttl_secs: default_memory_ttl_secs(),
        }
    }
}

fn default_max_turns() -> usize {
    10
}

fn default_memory_ttl_secs() -> u64 {
    3600
}

/// Result cache TTLs.
///
/// Short by design: the same text may classify differently as rules evolve,
/// and retrieval results go stale as the knowledge base changes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// TTL for cached intent classifications, in seconds.
    #[serde(default = "default_result_ttl_secs")]
    pub intent_ttl_secs: u64,

    /// TTL for cached retrieval results, in seconds.
    #[serde(default = "default_result_ttl_secs")]
    pub retrieval_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            intent_ttl_secs: default_result_ttl_secs(),
            retrieval_ttl_secs: default_result_ttl_secs(),
        }
    }
}

fn default_result_ttl_secs() -> u64 {
    300
}

/// Intent classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IntentConfig {
    /// Enable the LLM fallback stage when the rule stage finds nothing.
    #[serde(default = "default_llm_fallback")]
    pub llm_fallback: bool,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            llm_fallback: default_llm_fallback(),
        }
    }
}

fn default_llm_fallback() -> bool {
    true
}

/// Durable store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("helpline").join("helpline.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("helpline.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}
