// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the database handle.

pub mod conversations;
pub mod messages;
pub mod turns;
