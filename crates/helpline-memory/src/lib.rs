// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session sliding-window conversation memory.
//!
//! The active window lives in the fast cache under `conv:{session_id}`
//! with a TTL refreshed on every write. A process-local copy acts as a
//! fallback whenever the cache is unavailable: cross-process sharing is
//! sacrificed before turn availability. Truncation is strict FIFO -- the
//! window keeps the most recent `max_turns * 2` entries, no summarization.
//!
//! Append is read-modify-write and is NOT atomic across concurrent callers
//! for the same session; the orchestrator serializes turns per session id.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use helpline_core::{CacheStore, ChatMessage, Role};

/// Sliding-window memory for one conversation session.
pub struct ConversationMemory {
    session_id: String,
    max_turns: usize,
    ttl: Duration,
    cache_key: String,
    cache: Arc<dyn CacheStore>,
    /// Process-local fallback copy, authoritative when the cache is down.
    local: Mutex<Vec<ChatMessage>>,
}

impl ConversationMemory {
    pub fn new(
        session_id: impl Into<String>,
        cache: Arc<dyn CacheStore>,
        max_turns: usize,
        ttl: Duration,
    ) -> Self {
        let session_id = session_id.into();
        let cache_key = format!("conv:{session_id}");
        Self {
            session_id,
            max_turns,
            ttl,
            cache_key,
            cache,
            local: Mutex::new(Vec::new()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The current window, oldest first. Cache miss, cache failure, and
    /// undecodable cache payloads all fall back to the local copy.
    pub async fn history(&self) -> Vec<ChatMessage> {
        match self.cache.get(&self.cache_key).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<ChatMessage>>(&json) {
                Ok(history) => return history,
                Err(e) => {
                    warn!(
                        session_id = self.session_id.as_str(),
                        error = %e,
                        "memory window in cache was undecodable, using local copy"
                    );
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(
                    session_id = self.session_id.as_str(),
                    error = %e,
                    "memory cache read failed, using local copy"
                );
            }
        }
        self.local.lock().await.clone()
    }

    /// Append one entry: fetch, push, truncate to the newest
    /// `max_turns * 2` entries, write back with a fresh TTL, and update
    /// the local fallback regardless of the cache outcome.
    pub async fn append(&self, role: Role, content: impl Into<String>) {
        let mut history = self.history().await;
        history.push(ChatMessage {
            role,
            content: content.into(),
        });

        let max_entries = self.max_turns * 2;
        if history.len() > max_entries {
            let drop = history.len() - max_entries;
            history.drain(..drop);
            debug!(
                session_id = self.session_id.as_str(),
                max_entries, "trimmed memory window"
            );
        }

        self.save(history).await;
    }

    pub async fn append_user(&self, content: impl Into<String>) {
        self.append(Role::User, content).await;
    }

    pub async fn append_assistant(&self, content: impl Into<String>) {
        self.append(Role::Assistant, content).await;
    }

    /// The last `(n or max_turns) * 2` entries, or fewer if the window is
    /// shorter.
    pub async fn recent(&self, n_turns: Option<usize>) -> Vec<ChatMessage> {
        let n = n_turns.unwrap_or(self.max_turns) * 2;
        let history = self.history().await;
        if history.len() > n {
            history[history.len() - n..].to_vec()
        } else {
            history
        }
    }

    /// Drop the window from cache and empty the local copy. Idempotent.
    pub async fn clear(&self) {
        if let Err(e) = self.cache.delete(&self.cache_key).await {
            warn!(
                session_id = self.session_id.as_str(),
                error = %e,
                "memory cache delete failed"
            );
        }
        self.local.lock().await.clear();
        debug!(session_id = self.session_id.as_str(), "memory cleared");
    }

    /// The window as plain text, one line per entry, for summary prompts.
    pub async fn history_text(&self) -> String {
        self.history()
            .await
            .iter()
            .map(|m| {
                let speaker = match m.role {
                    Role::User => "用户",
                    _ => "客服",
                };
                format!("{speaker}: {}", m.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn save(&self, history: Vec<ChatMessage>) {
        *self.local.lock().await = history.clone();

        let json = match serde_json::to_string(&history) {
            Ok(json) => json,
            Err(e) => {
                warn!(
                    session_id = self.session_id.as_str(),
                    error = %e,
                    "memory window failed to serialize"
                );
                return;
            }
        };
        if let Err(e) = self.cache.set(&self.cache_key, &json, self.ttl).await {
            warn!(
                session_id = self.session_id.as_str(),
                error = %e,
                "memory cache write failed, serving from local copy"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpline_cache::TtlCache;
    use helpline_test_utils::FailingCache;

    fn memory_with(cache: Arc<dyn CacheStore>, max_turns: usize) -> ConversationMemory {
        ConversationMemory::new("test-session", cache, max_turns, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn append_then_history_returns_messages_in_order() {
        let mem = memory_with(Arc::new(TtlCache::new()), 10);
        mem.append_user("你好").await;
        mem.append_assistant("您好，请问有什么可以帮助您？").await;

        let history = mem.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "你好");
        assert_eq!(history[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn sliding_window_keeps_newest_entries() {
        let mem = memory_with(Arc::new(TtlCache::new()), 3);
        for i in 0..5 {
            mem.append_user(format!("用户消息{i}")).await;
            mem.append_assistant(format!("助手回复{i}")).await;
        }

        // 5 pairs with max_turns=3: exactly 6 entries survive, and the
        // first two pairs were dropped.
        let recent = mem.recent(Some(20)).await;
        assert_eq!(recent.len(), 6);
        assert_eq!(recent[0].content, "用户消息2");
        assert_eq!(recent[5].content, "助手回复4");
    }

    #[tokio::test]
    async fn window_length_law() {
        // After k pairs with max_turns = m, length == min(2k, 2m).
        for (k, m) in [(1usize, 3usize), (3, 3), (7, 3), (2, 5)] {
            let mem = memory_with(Arc::new(TtlCache::new()), m);
            for i in 0..k {
                mem.append_user(format!("Q{i}")).await;
                mem.append_assistant(format!("A{i}")).await;
            }
            assert_eq!(mem.history().await.len(), (2 * k).min(2 * m), "k={k} m={m}");
        }
    }

    #[tokio::test]
    async fn odd_length_window_is_tolerated() {
        // Mid-turn the window holds a user message without its pair.
        let mem = memory_with(Arc::new(TtlCache::new()), 10);
        mem.append_user("只有用户消息").await;
        assert_eq!(mem.history().await.len(), 1);
        assert_eq!(mem.recent(None).await.len(), 1);
    }

    #[tokio::test]
    async fn recent_truncates_by_turns() {
        let mem = memory_with(Arc::new(TtlCache::new()), 10);
        for i in 0..4 {
            mem.append_user(format!("Q{i}")).await;
            mem.append_assistant(format!("A{i}")).await;
        }
        let recent = mem.recent(Some(1)).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "Q3");
        assert_eq!(recent[1].content, "A3");
    }

    #[tokio::test]
    async fn clear_then_history_is_empty() {
        let mem = memory_with(Arc::new(TtlCache::new()), 10);
        mem.append_user("消息1").await;
        mem.append_assistant("回复1").await;
        mem.clear().await;
        assert!(mem.history().await.is_empty());
        // Clearing twice is a no-op.
        mem.clear().await;
        assert!(mem.history().await.is_empty());
    }

    #[tokio::test]
    async fn cache_unavailability_degrades_to_local_copy() {
        let mem = memory_with(Arc::new(FailingCache::new()), 10);
        mem.append_user("请问如何退款？").await;
        mem.append_assistant("您可以在订单页面申请退款。").await;

        let history = mem.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "请问如何退款？");
    }

    #[tokio::test]
    async fn windows_are_isolated_per_session() {
        let cache: Arc<dyn CacheStore> = Arc::new(TtlCache::new());
        let a = ConversationMemory::new("sess-a", cache.clone(), 10, Duration::from_secs(60));
        let b = ConversationMemory::new("sess-b", cache, 10, Duration::from_secs(60));
        a.append_user("A 的消息").await;
        assert_eq!(a.history().await.len(), 1);
        assert!(b.history().await.is_empty());
    }

    #[tokio::test]
    async fn history_text_formats_speakers() {
        let mem = memory_with(Arc::new(TtlCache::new()), 10);
        mem.append_user("请问如何退款？").await;
        mem.append_assistant("您可以在订单页面申请退款。").await;
        let text = mem.history_text().await;
        assert!(text.contains("用户: 请问如何退款？"));
        assert!(text.contains("客服: 您可以在订单页面申请退款。"));
    }
}
