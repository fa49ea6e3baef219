// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Helpline: deterministic mock implementations of the
//! capability traits, including always-failing variants for exercising
//! degradation and fatal-error paths.

pub mod failing_cache;
pub mod mock_embedding;
pub mod mock_provider;

pub use failing_cache::FailingCache;
pub use mock_embedding::{FailingEmbedding, MockEmbedding, MOCK_DIM};
pub use mock_provider::{FailingProvider, MockProvider, StreamAbortProvider};
