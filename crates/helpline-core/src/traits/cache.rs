// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value cache capability with TTL expiry.
//!
//! Values are JSON strings; callers own serialization. Implementations may
//! fail (a remote cache can be down); every caller MUST treat a failure as
//! a cache miss and continue -- cache unavailability never fails a turn.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::HelplineError;

/// Fast expiring key-value store shared across sessions.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, HelplineError>;

    /// Stores `value` under `key`, replacing any previous value and
    /// resetting the expiry deadline to now + `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), HelplineError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), HelplineError>;
}
