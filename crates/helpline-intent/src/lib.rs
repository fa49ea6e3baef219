// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-stage intent classification for the Helpline chat backend.
//!
//! Stage 1 is a keyword rule table (fast, no LLM call); stage 2 is an
//! optional LLM fallback for messages the rules cannot cover. Results are
//! cached for a short TTL. Classification is non-fatal by construction:
//! every failure path yields a low-confidence result.

pub mod classifier;
pub mod rules;

pub use classifier::{parse_llm_response, rule_match, IntentClassifier, ParseOutcome};
