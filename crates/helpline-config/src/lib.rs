// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Helpline chat backend.
//!
//! Layered loading via Figment: compiled defaults, XDG TOML hierarchy, and
//! `HELPLINE_*` environment variables, deserialized into typed model
//! structs that reject unknown keys.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::HelplineConfig;
