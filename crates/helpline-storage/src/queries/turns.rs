// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn persistence: one transaction per completed turn.
//!
//! The transaction creates the conversation row if absent, inserts the
//! user/assistant message pair, and bumps the conversation aggregates.
//! Concurrent create-if-absent for one session id is resolved by the
//! UNIQUE(session_id) constraint plus retry-as-fetch, not a lock.

use rusqlite::{params, OptionalExtension};

use helpline_core::{HelplineError, TurnRecord};

use crate::database::{map_tr_err, now_iso, Database};

/// Persist one completed turn atomically.
pub async fn record_turn(db: &Database, turn: &TurnRecord) -> Result<(), HelplineError> {
    let turn = turn.clone();
    let sources_json =
        serde_json::to_string(&turn.sources).map_err(|e| HelplineError::Storage {
            source: Box::new(e),
        })?;
    let new_conversation_id = uuid::Uuid::new_v4().to_string();
    let user_message_id = uuid::Uuid::new_v4().to_string();
    let assistant_message_id = uuid::Uuid::new_v4().to_string();
    let now = now_iso();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing: Option<String> = tx
                .query_row(
                    "SELECT id FROM conversations WHERE session_id = ?1",
                    params![turn.session_id],
                    |row| row.get(0),
                )
                .optional()?;

            let conversation_id = match existing {
                Some(id) => id,
                None => {
                    let inserted = tx.execute(
                        "INSERT INTO conversations
                         (id, session_id, user_id, status, primary_intent,
                          turn_count, total_tokens, started_at, updated_at)
                         VALUES (?1, ?2, ?3, 'active', ?4, 0, 0, ?5, ?5)",
                        params![
                            new_conversation_id,
                            turn.session_id,
                            turn.user_id,
                            turn.intent.intent.as_str(),
                            now,
                        ],
                    );
                    match inserted {
                        Ok(_) => new_conversation_id.clone(),
                        // Another writer created the row first; fetch theirs.
                        Err(rusqlite::Error::SqliteFailure(e, _))
                            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                        {
                            tx.query_row(
                                "SELECT id FROM conversations WHERE session_id = ?1",
                                params![turn.session_id],
                                |row| row.get(0),
                            )?
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            };

            tx.execute(
                "INSERT INTO messages
                 (id, conversation_id, session_id, role, content, intent,
                  intent_confidence, sources, prompt_tokens, completion_tokens,
                  latency_ms, created_at)
                 VALUES (?1, ?2, ?3, 'user', ?4, ?5, ?6, '[]', ?7, 0, NULL, ?8)",
                params![
                    user_message_id,
                    conversation_id,
                    turn.session_id,
                    turn.user_message,
                    turn.intent.intent.as_str(),
                    turn.intent.confidence,
                    turn.usage.prompt_tokens,
                    now,
                ],
            )?;

            tx.execute(
                "INSERT INTO messages
                 (id, conversation_id, session_id, role, content, intent,
                  intent_confidence, sources, prompt_tokens, completion_tokens,
                  latency_ms, created_at)
                 VALUES (?1, ?2, ?3, 'assistant', ?4, NULL, NULL, ?5, 0, ?6, ?7, ?8)",
                params![
                    assistant_message_id,
                    conversation_id,
                    turn.session_id,
                    turn.assistant_reply,
                    sources_json,
                    turn.usage.completion_tokens,
                    turn.latency_ms as i64,
                    now,
                ],
            )?;

            tx.execute(
                "UPDATE conversations
                 SET turn_count = turn_count + 1,
                     total_tokens = total_tokens + ?1,
                     updated_at = ?2
                 WHERE id = ?3",
                params![
                    i64::from(turn.usage.prompt_tokens + turn.usage.completion_tokens),
                    now,
                    conversation_id,
                ],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
