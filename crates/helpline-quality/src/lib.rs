// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate quality metrics over persisted turns.
//!
//! Reads the durable audit trail, never the hot path: latency
//! distribution, knowledge-base hit rate, intent mix, and conversation
//! volume over a trailing window. SQLite has no percentile aggregate, so
//! p95 is computed in-process from the ordered latency list.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use helpline_core::{ConversationStore, HelplineError, Role};

/// Aggregate metrics for a trailing period.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub period_days: i64,
    pub total_conversations: usize,
    pub total_messages: usize,
    /// Average turns per conversation, one decimal place.
    pub avg_turns_per_conversation: f64,
    pub avg_latency_ms: u64,
    pub p95_latency_ms: u64,
    /// Share of assistant messages that carried retrieval sources.
    pub rag_hit_rate: f64,
    /// Message count per intent category string.
    pub intent_distribution: HashMap<String, usize>,
}

/// Evaluator over the conversation audit trail.
pub struct QualityEvaluator {
    store: Arc<dyn ConversationStore>,
}

impl QualityEvaluator {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Metrics over the last `days` days.
    pub async fn overall_metrics(&self, days: i64) -> Result<QualityReport, HelplineError> {
        let cutoff = (chrono::Utc::now() - chrono::Duration::days(days))
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string();

        let conversations = self.store.conversations_since(&cutoff).await?;
        let messages = self.store.messages_since(&cutoff).await?;

        let total_conversations = conversations.len();
        let total_messages = messages.len();

        let latencies: Vec<u64> = messages.iter().filter_map(|m| m.latency_ms).collect();
        let (avg_latency_ms, p95_latency_ms) = latency_stats(&latencies);

        let assistant_total = messages.iter().filter(|m| m.role == Role::Assistant).count();
        let assistant_with_sources = messages
            .iter()
            .filter(|m| m.role == Role::Assistant && !m.sources.is_empty())
            .count();
        let rag_hit_rate = round3(assistant_with_sources as f64 / assistant_total.max(1) as f64);

        let mut intent_distribution: HashMap<String, usize> = HashMap::new();
        for message in &messages {
            if let Some(intent) = message.intent {
                *intent_distribution
                    .entry(intent.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }

        let avg_turns_per_conversation = round1(
            total_messages as f64 / total_conversations.max(1) as f64 / 2.0,
        );

        debug!(
            period_days = days,
            total_conversations, total_messages, "quality metrics computed"
        );

        Ok(QualityReport {
            period_days: days,
            total_conversations,
            total_messages,
            avg_turns_per_conversation,
            avg_latency_ms,
            p95_latency_ms,
            rag_hit_rate,
            intent_distribution,
        })
    }
}

/// Average and p95 of a latency sample. Empty samples report zero.
fn latency_stats(latencies: &[u64]) -> (u64, u64) {
    if latencies.is_empty() {
        return (0, 0);
    }
    let avg = latencies.iter().sum::<u64>() / latencies.len() as u64;

    let mut sorted = latencies.to_vec();
    sorted.sort_unstable();
    let rank = ((sorted.len() as f64) * 0.95).ceil() as usize;
    let p95 = sorted[rank.clamp(1, sorted.len()) - 1];
    (avg, p95)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
