// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket handler for streaming turns.
//!
//! Client -> Server (JSON):
//! ```json
//! {"content": "请问如何退款？", "session_id": "optional-session-id"}
//! ```
//!
//! Server -> Client (JSON), one frame per turn event:
//! ```json
//! {"type": "delta", "text": "部分回复"}
//! {"type": "completed", "result": {...}}
//! {"type": "error", "message": "..."}
//! ```

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, warn};

use helpline_core::TurnEvent;

use crate::server::GatewayState;

/// WebSocket message from client.
#[derive(Debug, Deserialize)]
struct WsIncoming {
    content: String,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle one WebSocket connection: each incoming text frame starts one
/// streaming turn whose events are forwarded as JSON frames. The consumer
/// controls backpressure by how fast it drains frames; dropping the
/// connection mid-turn cancels fragment delivery while the orchestrator
/// still finalizes the partial turn.
async fn handle_socket(mut socket: WebSocket, state: GatewayState) {
    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) => {
                let incoming: WsIncoming = match serde_json::from_str(&text) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(error = %e, "invalid WebSocket message");
                        let _ = send_event(
                            &mut socket,
                            &TurnEvent::Error {
                                message: "invalid message format".into(),
                            },
                        )
                        .await;
                        continue;
                    }
                };

                if incoming.content.trim().is_empty() {
                    let _ = send_event(
                        &mut socket,
                        &TurnEvent::Error {
                            message: "message must not be empty".into(),
                        },
                    )
                    .await;
                    continue;
                }

                let stream = state
                    .orchestrator
                    .stream_turn(incoming.session_id, &incoming.content, incoming.user_id)
                    .await;

                let mut stream = match stream {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = send_event(
                            &mut socket,
                            &TurnEvent::Error {
                                message: e.to_string(),
                            },
                        )
                        .await;
                        continue;
                    }
                };

                while let Some(event) = stream.next().await {
                    if send_event(&mut socket, &event).await.is_err() {
                        debug!("WebSocket client went away mid-turn");
                        return;
                    }
                }
            }
            Message::Close(_) => break,
            _ => {} // Ignore binary and ping/pong (handled by the protocol layer).
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &TurnEvent) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).unwrap_or_else(|_| {
        r#"{"type":"error","message":"event serialization failed"}"#.to_string()
    });
    socket.send(Message::Text(json.into())).await
}
