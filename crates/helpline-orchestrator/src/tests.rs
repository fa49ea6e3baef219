// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end orchestrator tests over mock capabilities and a real SQLite
//! store.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tempfile::tempdir;

use helpline_cache::TtlCache;
use helpline_config::model::{MemoryConfig, StorageConfig};
use helpline_core::{
    CacheStore, CompletionProvider, ConversationStatus, ConversationStore, EmbeddingProvider,
    HelplineError, IndexEntry, Intent, Role, TurnEvent, VectorIndex,
};
use helpline_intent::IntentClassifier;
use helpline_rag::{MemoryVectorIndex, RagRetriever};
use helpline_storage::SqliteStore;
use helpline_test_utils::{
    FailingEmbedding, FailingProvider, MockEmbedding, MockProvider, StreamAbortProvider,
};

use crate::ChatOrchestrator;

struct Fixture {
    orchestrator: ChatOrchestrator,
    store: Arc<SqliteStore>,
    _dir: tempfile::TempDir,
}

async fn fixture(
    provider: Arc<dyn CompletionProvider>,
    embedding: Arc<dyn EmbeddingProvider>,
) -> Fixture {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("orchestrator.db");
    let store = Arc::new(
        SqliteStore::open(&StorageConfig {
            database_path: db_path.to_str().unwrap().to_string(),
            wal_mode: true,
        })
        .await
        .unwrap(),
    );

    let cache: Arc<dyn CacheStore> = Arc::new(TtlCache::new());

    let index = Arc::new(MemoryVectorIndex::new());
    index
        .upsert(vec![IndexEntry {
            id: "refund-guide".into(),
            vector: MockEmbedding::vector_for("请问如何退款？"),
            content: "退款流程：进入订单页面点击申请退款。".into(),
            metadata: serde_json::json!({ "source": "manual.pdf" }),
        }])
        .await
        .unwrap();

    let retriever = Arc::new(RagRetriever::new(
        embedding,
        index,
        cache.clone(),
        5,
        0.9,
        Duration::from_secs(300),
    ));
    let classifier = Arc::new(IntentClassifier::new(
        cache.clone(),
        None,
        Duration::from_secs(300),
    ));

    let orchestrator = ChatOrchestrator::new(
        classifier,
        retriever,
        provider,
        store.clone(),
        cache,
        &MemoryConfig {
            max_turns: 10,
            ttl_secs: 3600,
        },
    );

    Fixture {
        orchestrator,
        store,
        _dir: dir,
    }
}

#[tokio::test]
async fn blocking_turn_returns_fully_populated_result() {
    let provider = Arc::new(MockProvider::with_responses(vec![
        "您好，退款流程如下：进入订单页面申请退款。".to_string(),
    ]));
    let f = fixture(provider, Arc::new(MockEmbedding::new())).await;

    let result = f
        .orchestrator
        .process_turn(Some("sess-1".into()), "请问如何退款？", None)
        .await
        .unwrap();

    assert_eq!(result.session_id, "sess-1");
    assert_eq!(result.reply, "您好，退款流程如下：进入订单页面申请退款。");
    assert_eq!(result.intent, Intent::Inquiry);
    assert!(result.intent_confidence >= 0.75);
    assert_eq!(result.sources, vec!["manual.pdf".to_string()]);
    assert_eq!(result.usage.prompt_tokens, 10);
    assert_eq!(result.usage.completion_tokens, 20);

    // Memory holds the completed pair.
    let window = f.orchestrator.history("sess-1").await;
    assert_eq!(window.len(), 2);
    assert_eq!(window[0].role, Role::User);
    assert_eq!(window[1].role, Role::Assistant);

    // The audit trail recorded the turn.
    let conv = f.store.get_conversation("sess-1").await.unwrap().unwrap();
    assert_eq!(conv.turn_count, 1);
    assert_eq!(conv.primary_intent, Intent::Inquiry);
}

#[tokio::test]
async fn session_id_is_generated_when_absent() {
    let provider = Arc::new(MockProvider::new());
    let f = fixture(provider, Arc::new(MockEmbedding::new())).await;

    let result = f
        .orchestrator
        .process_turn(None, "你好", None)
        .await
        .unwrap();
    assert_eq!(result.session_id.len(), 36, "expected a uuid session id");
}

#[tokio::test]
async fn empty_message_is_rejected_before_the_pipeline() {
    let provider = Arc::new(MockProvider::new());
    let f = fixture(provider, Arc::new(MockEmbedding::new())).await;

    assert!(f
        .orchestrator
        .process_turn(Some("sess-1".into()), "   ", None)
        .await
        .is_err());
    assert!(f
        .orchestrator
        .stream_turn(Some("sess-1".into()), "", None)
        .await
        .is_err());
}

#[tokio::test]
async fn retrieval_failure_degrades_to_empty_sources() {
    let provider = Arc::new(MockProvider::with_responses(vec!["您好。".to_string()]));
    let f = fixture(provider, Arc::new(FailingEmbedding::new())).await;

    let result = f
        .orchestrator
        .process_turn(Some("sess-1".into()), "请问如何退款？", None)
        .await
        .unwrap();

    // The turn succeeds with best-effort inputs and an empty source list.
    assert_eq!(result.reply, "您好。");
    assert!(result.sources.is_empty());
}

#[tokio::test]
async fn completion_failure_is_fatal_and_leaves_no_trace() {
    let f = fixture(
        Arc::new(FailingProvider::new()),
        Arc::new(MockEmbedding::new()),
    )
    .await;

    let result = f
        .orchestrator
        .process_turn(Some("sess-1".into()), "请问如何退款？", None)
        .await;
    assert!(matches!(result, Err(HelplineError::Provider { .. })));

    // Nothing was appended to memory and nothing persisted.
    assert!(f.orchestrator.history("sess-1").await.is_empty());
    assert!(f.store.get_conversation("sess-1").await.unwrap().is_none());
}

#[tokio::test]
async fn streaming_turn_emits_deltas_then_completed() {
    let reply = "您好，退款请进入订单页面操作。";
    let provider = Arc::new(MockProvider::with_responses(vec![reply.to_string()]));
    let f = fixture(provider, Arc::new(MockEmbedding::new())).await;

    let mut stream = f
        .orchestrator
        .stream_turn(Some("sess-s".into()), "请问如何退款？", None)
        .await
        .unwrap();

    let mut accumulated = String::new();
    let mut terminal = None;
    while let Some(event) = stream.next().await {
        match event {
            TurnEvent::Delta { text } => accumulated.push_str(&text),
            other => terminal = Some(other),
        }
    }

    assert_eq!(accumulated, reply);
    match terminal.expect("stream must end with a terminal frame") {
        TurnEvent::Completed { result } => {
            assert_eq!(result.reply, reply);
            assert_eq!(result.session_id, "sess-s");
            assert_eq!(result.intent, Intent::Inquiry);
        }
        other => panic!("expected Completed, got {other:?}"),
    }

    // Finalization ran: memory pair present, turn persisted.
    let window = f.orchestrator.history("sess-s").await;
    assert_eq!(window.len(), 2);
    assert_eq!(window[1].content, reply);
    let conv = f.store.get_conversation("sess-s").await.unwrap().unwrap();
    assert_eq!(conv.turn_count, 1);
}

#[tokio::test]
async fn aborted_stream_records_partial_reply() {
    let provider = Arc::new(StreamAbortProvider::new(vec![
        "您好".to_string(),
        "，正在为".to_string(),
    ]));
    let f = fixture(provider, Arc::new(MockEmbedding::new())).await;

    let mut stream = f
        .orchestrator
        .stream_turn(Some("sess-abort".into()), "请问如何退款？", None)
        .await
        .unwrap();

    let mut deltas = 0;
    let mut saw_error = false;
    while let Some(event) = stream.next().await {
        match event {
            TurnEvent::Delta { .. } => deltas += 1,
            TurnEvent::Error { .. } => saw_error = true,
            TurnEvent::Completed { .. } => panic!("aborted stream must not complete"),
        }
    }
    assert_eq!(deltas, 2);
    assert!(saw_error);

    // The truncated assistant turn is still recorded (partial-persist
    // policy), so memory and audit reflect what the user actually saw.
    let window = f.orchestrator.history("sess-abort").await;
    assert_eq!(window.len(), 2);
    assert_eq!(window[1].content, "您好，正在为");

    let messages = f
        .store
        .messages_since("2000-01-01T00:00:00.000Z")
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "您好，正在为");
}

#[tokio::test]
async fn stream_that_yields_nothing_records_nothing() {
    let provider = Arc::new(StreamAbortProvider::new(vec![]));
    let f = fixture(provider, Arc::new(MockEmbedding::new())).await;

    let mut stream = f
        .orchestrator
        .stream_turn(Some("sess-empty".into()), "请问如何退款？", None)
        .await
        .unwrap();

    let mut saw_error = false;
    while let Some(event) = stream.next().await {
        if matches!(event, TurnEvent::Error { .. }) {
            saw_error = true;
        }
    }
    assert!(saw_error);

    // No dangling user message without its assistant pair.
    assert!(f.orchestrator.history("sess-empty").await.is_empty());
    assert!(f
        .store
        .get_conversation("sess-empty")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn concurrent_turns_on_one_session_do_not_lose_updates() {
    let provider = Arc::new(MockProvider::with_responses(vec![
        "第一个回复".to_string(),
        "第二个回复".to_string(),
    ]));
    let f = fixture(provider, Arc::new(MockEmbedding::new())).await;

    let a = f
        .orchestrator
        .process_turn(Some("sess-c".into()), "请问价格是多少？", None);
    let b = f
        .orchestrator
        .process_turn(Some("sess-c".into()), "可以介绍一下功能吗？", None);
    let (ra, rb) = tokio::join!(a, b);
    ra.unwrap();
    rb.unwrap();

    // Both turns' messages survive, as adjacent user/assistant pairs in
    // submission order.
    let window = f.orchestrator.history("sess-c").await;
    assert_eq!(window.len(), 4);
    for pair in window.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }

    let conv = f.store.get_conversation("sess-c").await.unwrap().unwrap();
    assert_eq!(conv.turn_count, 2);
}

#[tokio::test]
async fn end_conversation_clears_memory_and_closes_record() {
    let provider = Arc::new(MockProvider::with_responses(vec!["您好。".to_string()]));
    let f = fixture(provider, Arc::new(MockEmbedding::new())).await;

    f.orchestrator
        .process_turn(Some("sess-end".into()), "你好", None)
        .await
        .unwrap();
    assert_eq!(f.orchestrator.history("sess-end").await.len(), 2);

    f.orchestrator.end_conversation("sess-end").await.unwrap();
    assert!(f.orchestrator.history("sess-end").await.is_empty());
    let conv = f.store.get_conversation("sess-end").await.unwrap().unwrap();
    assert_eq!(conv.status, ConversationStatus::Closed);

    // Ending again is a no-op.
    f.orchestrator.end_conversation("sess-end").await.unwrap();
}

#[tokio::test]
async fn chitchat_turn_classifies_and_persists_intent() {
    let provider = Arc::new(MockProvider::with_responses(vec![
        "您好，请问有什么可以帮助您？".to_string(),
    ]));
    let f = fixture(provider, Arc::new(MockEmbedding::new())).await;

    let result = f
        .orchestrator
        .process_turn(Some("sess-hi".into()), "你好，在吗", None)
        .await
        .unwrap();
    assert_eq!(result.intent, Intent::Chitchat);

    let messages = f
        .store
        .messages_since("2000-01-01T00:00:00.000Z")
        .await
        .unwrap();
    assert_eq!(messages[0].intent, Some(Intent::Chitchat));
}
