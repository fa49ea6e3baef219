// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A cache whose every operation fails, simulating a down fast store.
//!
//! Callers are required to treat cache failures as misses, so every
//! component should keep working (with degraded sharing) against this.

use std::time::Duration;

use async_trait::async_trait;

use helpline_core::{CacheStore, HelplineError};

/// Cache stand-in for total fast-store unavailability.
pub struct FailingCache;

impl FailingCache {
    pub fn new() -> Self {
        Self
    }

    fn err() -> HelplineError {
        HelplineError::Cache {
            message: "mock cache configured to fail".into(),
            source: None,
        }
    }
}

impl Default for FailingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, HelplineError> {
        Err(Self::err())
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), HelplineError> {
        Err(Self::err())
    }

    async fn delete(&self, _key: &str) -> Result<(), HelplineError> {
        Err(Self::err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_operation_fails() {
        let cache = FailingCache::new();
        assert!(cache.get("k").await.is_err());
        assert!(cache.set("k", "v", Duration::from_secs(1)).await.is_err());
        assert!(cache.delete("k").await.is_err());
    }
}
