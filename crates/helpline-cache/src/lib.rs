// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process TTL cache implementing the [`CacheStore`] capability.
//!
//! Backs intent/retrieval result caching and the conversation memory
//! window on single-node deployments. Entries expire lazily on read; a
//! full sweep runs opportunistically once enough writes accumulate, so the
//! map does not grow without bound under write-heavy load.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use helpline_core::{CacheStore, HelplineError};

/// Number of writes between opportunistic full sweeps.
const SWEEP_EVERY_WRITES: u64 = 1024;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Thread-safe in-process key-value cache with per-entry TTL.
pub struct TtlCache {
    entries: DashMap<String, Entry>,
    writes: std::sync::atomic::AtomicU64,
}

impl TtlCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            writes: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry.
    fn sweep(&self) {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, "cache sweep removed expired entries");
        }
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for TtlCache {
    async fn get(&self, key: &str) -> Result<Option<String>, HelplineError> {
        // The read guard must drop before the expired entry is removed, or
        // the removal would deadlock against our own shard lock.
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), HelplineError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        let writes = self
            .writes
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        if writes % SWEEP_EVERY_WRITES == SWEEP_EVERY_WRITES - 1 {
            self.sweep();
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), HelplineError> {
        self.entries.remove(key);
        Ok(())
    }
}
