// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation read and lifecycle operations.

use rusqlite::{params, OptionalExtension, Row};

use helpline_core::{Conversation, ConversationStatus, HelplineError, Intent};

use crate::database::{map_tr_err, now_iso, Database};

const CONVERSATION_COLUMNS: &str =
    "id, session_id, user_id, status, primary_intent, turn_count, total_tokens, started_at, updated_at";

pub(crate) fn conversation_from_row(row: &Row<'_>) -> Result<Conversation, rusqlite::Error> {
    let status: String = row.get(3)?;
    let primary_intent: String = row.get(4)?;
    Ok(Conversation {
        id: row.get(0)?,
        session_id: row.get(1)?,
        user_id: row.get(2)?,
        status: ConversationStatus::from_str_value(&status),
        primary_intent: Intent::from_str_value(&primary_intent),
        turn_count: row.get(5)?,
        total_tokens: row.get(6)?,
        started_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Get the conversation aggregate for a session id.
pub async fn get_conversation(
    db: &Database,
    session_id: &str,
) -> Result<Option<Conversation>, HelplineError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE session_id = ?1"
            );
            let result = conn
                .query_row(&sql, params![session_id], conversation_from_row)
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark a conversation closed. A no-op for absent or already-closed rows.
pub async fn close_conversation(db: &Database, session_id: &str) -> Result<(), HelplineError> {
    let session_id = session_id.to_string();
    let now = now_iso();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET status = 'closed', updated_at = ?1
                 WHERE session_id = ?2 AND status != 'closed'",
                params![now, session_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Conversations started at or after `cutoff`, newest first.
pub async fn conversations_since(
    db: &Database,
    cutoff: &str,
) -> Result<Vec<Conversation>, HelplineError> {
    let cutoff = cutoff.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE started_at >= ?1 ORDER BY started_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![cutoff], conversation_from_row)?;
            let mut conversations = Vec::new();
            for row in rows {
                conversations.push(row?);
            }
            Ok(conversations)
        })
        .await
        .map_err(map_tr_err)
}
