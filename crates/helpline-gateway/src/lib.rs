// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the Helpline chat backend.
//!
//! Thin transport layer over the orchestrator: a blocking chat endpoint,
//! a WebSocket streaming endpoint, the memory-window history endpoint,
//! conversation close, and the quality report. Authentication and rate
//! limiting are deployment concerns handled in front of this service.

pub mod handlers;
pub mod server;
pub mod ws;

pub use server::{build_router, start_server, GatewayState, ServerConfig};
