// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates and system-prompt assembly for the Helpline chat backend.
//!
//! Everything in this crate is a pure function of its inputs (scene,
//! retrieved documents, date) -- deterministic by construction so prompt
//! output can be asserted byte-for-byte in tests.

pub mod assemble;
pub mod scenes;

pub use assemble::{
    build_intent_prompt, build_summary_prompt, build_system_prompt, scene_prompt,
};
pub use scenes::{scene_for_intent, Scene};
