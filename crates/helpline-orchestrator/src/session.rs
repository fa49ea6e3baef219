// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session state owned by the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use helpline_core::CacheStore;
use helpline_memory::ConversationMemory;

/// State for one conversation session: the memory window plus the async
/// mutex that serializes whole turns on this session id.
///
/// The memory's read-modify-write append is not atomic across concurrent
/// callers, so concurrent turns on one session would race and lose
/// updates; holding `turn_lock` for the full turn (through streaming
/// finalization) is what provides the ordering guarantee.
pub struct SessionHandle {
    /// Serializes turns. `Arc` so a streaming turn can hold the guard in
    /// its finalization task.
    pub turn_lock: Arc<Mutex<()>>,
    pub memory: ConversationMemory,
}

impl SessionHandle {
    pub fn new(
        session_id: &str,
        cache: Arc<dyn CacheStore>,
        max_turns: usize,
        ttl: Duration,
    ) -> Self {
        Self {
            turn_lock: Arc::new(Mutex::new(())),
            memory: ConversationMemory::new(session_id, cache, max_turns, ttl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpline_cache::TtlCache;

    #[tokio::test]
    async fn turn_lock_serializes() {
        let handle = SessionHandle::new(
            "sess-1",
            Arc::new(TtlCache::new()),
            10,
            Duration::from_secs(60),
        );
        let guard = handle.turn_lock.clone().lock_owned().await;
        assert!(handle.turn_lock.try_lock().is_err());
        drop(guard);
        assert!(handle.turn_lock.try_lock().is_ok());
    }
}
