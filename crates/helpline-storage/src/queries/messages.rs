// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message read operations.

use rusqlite::{params, Row};

use helpline_core::{HelplineError, Intent, MessageRecord, Role, SourceRef};

use crate::database::{map_tr_err, Database};

const MESSAGE_COLUMNS: &str = "id, session_id, role, content, intent, intent_confidence, \
     sources, prompt_tokens, completion_tokens, latency_ms, created_at";

fn message_from_row(row: &Row<'_>) -> Result<MessageRecord, rusqlite::Error> {
    let role: String = row.get(2)?;
    let intent: Option<String> = row.get(4)?;
    let sources_json: String = row.get(6)?;
    let latency_ms: Option<i64> = row.get(9)?;
    // Sources were written by us; anything undecodable reads as empty
    // rather than failing the whole query.
    let sources: Vec<SourceRef> = serde_json::from_str(&sources_json).unwrap_or_default();
    Ok(MessageRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: Role::from_str_value(&role),
        content: row.get(3)?,
        intent: intent.as_deref().map(Intent::from_str_value),
        intent_confidence: row.get(5)?,
        sources,
        prompt_tokens: row.get(7)?,
        completion_tokens: row.get(8)?,
        latency_ms: latency_ms.map(|v| v as u64),
        created_at: row.get(10)?,
    })
}

/// Messages created at or after `cutoff`, in creation order.
pub async fn messages_since(
    db: &Database,
    cutoff: &str,
) -> Result<Vec<MessageRecord>, HelplineError> {
    let cutoff = cutoff.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE created_at >= ?1 ORDER BY created_at ASC, rowid ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![cutoff], message_from_row)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::turns::record_turn;
    use helpline_core::{ClassifyMethod, IntentResult, TokenUsage, TurnRecord};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_turn(session_id: &str, user_message: &str) -> TurnRecord {
        TurnRecord {
            session_id: session_id.to_string(),
            user_id: None,
            user_message: user_message.to_string(),
            assistant_reply: format!("回复：{user_message}"),
            intent: IntentResult::new(
                helpline_core::Intent::Inquiry,
                0.8,
                "规则匹配 1 个关键词",
                ClassifyMethod::Rule,
            ),
            sources: vec![],
            usage: TokenUsage::default(),
            latency_ms: 10,
        }
    }

    #[tokio::test]
    async fn messages_come_back_in_creation_order() {
        let (db, _dir) = setup_db().await;
        record_turn(&db, &make_turn("sess-1", "第一条")).await.unwrap();
        record_turn(&db, &make_turn("sess-1", "第二条")).await.unwrap();

        let messages = messages_since(&db, "2000-01-01T00:00:00.000Z").await.unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "第一条");
        assert_eq!(messages[1].content, "回复：第一条");
        assert_eq!(messages[2].content, "第二条");
        assert_eq!(messages[3].content, "回复：第二条");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn future_cutoff_returns_nothing() {
        let (db, _dir) = setup_db().await;
        record_turn(&db, &make_turn("sess-1", "消息")).await.unwrap();
        let messages = messages_since(&db, "2999-01-01T00:00:00.000Z").await.unwrap();
        assert!(messages.is_empty());
        db.close().await.unwrap();
    }
}
