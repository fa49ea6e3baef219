// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`ConversationStore`] capability.

use async_trait::async_trait;
use tracing::debug;

use helpline_config::model::StorageConfig;
use helpline_core::{Conversation, ConversationStore, HelplineError, MessageRecord, TurnRecord};

use crate::database::Database;
use crate::queries;

/// SQLite-backed conversation store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the store at the configured path, running migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, HelplineError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = config.database_path.as_str(), "sqlite store opened");
        Ok(Self { db })
    }

    /// Checkpoint and release the underlying connection.
    pub async fn close(&self) -> Result<(), HelplineError> {
        self.db.close().await
    }

    /// The underlying database handle (for maintenance tooling).
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn record_turn(&self, turn: &TurnRecord) -> Result<(), HelplineError> {
        queries::turns::record_turn(&self.db, turn).await
    }

    async fn get_conversation(
        &self,
        session_id: &str,
    ) -> Result<Option<Conversation>, HelplineError> {
        queries::conversations::get_conversation(&self.db, session_id).await
    }

    async fn close_conversation(&self, session_id: &str) -> Result<(), HelplineError> {
        queries::conversations::close_conversation(&self.db, session_id).await
    }

    async fn messages_since(&self, cutoff: &str) -> Result<Vec<MessageRecord>, HelplineError> {
        queries::messages::messages_since(&self.db, cutoff).await
    }

    async fn conversations_since(
        &self,
        cutoff: &str,
    ) -> Result<Vec<Conversation>, HelplineError> {
        queries::conversations::conversations_since(&self.db, cutoff).await
    }
}
