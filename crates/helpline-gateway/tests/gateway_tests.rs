// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway integration tests: the axum router over a real orchestrator
//! with mock provider/embedding capabilities and a temporary SQLite store.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use helpline_cache::TtlCache;
use helpline_config::model::{MemoryConfig, StorageConfig};
use helpline_core::CacheStore;
use helpline_gateway::{build_router, GatewayState};
use helpline_intent::IntentClassifier;
use helpline_orchestrator::ChatOrchestrator;
use helpline_quality::QualityEvaluator;
use helpline_rag::{MemoryVectorIndex, RagRetriever};
use helpline_storage::SqliteStore;
use helpline_test_utils::{MockEmbedding, MockProvider};

async fn test_state(responses: Vec<String>) -> (GatewayState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gateway.db");
    let store = Arc::new(
        SqliteStore::open(&StorageConfig {
            database_path: db_path.to_str().unwrap().to_string(),
            wal_mode: true,
        })
        .await
        .unwrap(),
    );

    let cache: Arc<dyn CacheStore> = Arc::new(TtlCache::new());
    let retriever = Arc::new(RagRetriever::new(
        Arc::new(MockEmbedding::new()),
        Arc::new(MemoryVectorIndex::new()),
        cache.clone(),
        5,
        0.5,
        Duration::from_secs(300),
    ));
    let classifier = Arc::new(IntentClassifier::new(
        cache.clone(),
        None,
        Duration::from_secs(300),
    ));

    let orchestrator = Arc::new(ChatOrchestrator::new(
        classifier,
        retriever,
        Arc::new(MockProvider::with_responses(responses)),
        store.clone(),
        cache,
        &MemoryConfig {
            max_turns: 10,
            ttl_secs: 3600,
        },
    ));

    let state = GatewayState {
        orchestrator,
        quality: Arc::new(QualityEvaluator::new(store)),
    };
    (state, dir)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_responds_ok() {
    let (state, _dir) = test_state(vec![]).await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn chat_endpoint_returns_turn_result() {
    let (state, _dir) = test_state(vec!["您好，请问有什么可以帮助您？".to_string()]).await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"message": "你好，在吗", "session_id": "sess-http"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["session_id"], "sess-http");
    assert_eq!(json["reply"], "您好，请问有什么可以帮助您？");
    assert_eq!(json["intent"], "chitchat");
}

#[tokio::test]
async fn chat_endpoint_rejects_empty_message() {
    let (state, _dir) = test_state(vec![]).await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"message": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_endpoint_returns_window() {
    let (state, _dir) = test_state(vec!["回复".to_string()]).await;
    let app = build_router(state.clone());

    // Run one turn first.
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"message": "咨询一下价格", "session_id": "sess-h"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/history/sess-h")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["role"], "user");
    assert_eq!(json[1]["role"], "assistant");
}

#[tokio::test]
async fn end_conversation_endpoint_closes_session() {
    let (state, _dir) = test_state(vec!["回复".to_string()]).await;
    let app = build_router(state);

    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"message": "咨询一下价格", "session_id": "sess-e"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/conversations/sess-e/end")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The memory window is gone.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/history/sess-e")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn quality_endpoint_reports_metrics() {
    let (state, _dir) = test_state(vec!["回复".to_string()]).await;
    let app = build_router(state);

    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"message": "咨询一下价格", "session_id": "sess-q"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/quality?days=7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["period_days"], 7);
    assert_eq!(json["total_conversations"], 1);
    assert_eq!(json["total_messages"], 2);
}
