// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Helpline chat backend.
//!
//! The audit trail lives in two tables: `conversations` (one row per
//! session id with running aggregates) and `messages` (immutable log,
//! creation-time ordered). Schema is managed by embedded refinery
//! migrations; all access goes through tokio-rusqlite's single background
//! connection thread.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteStore;
