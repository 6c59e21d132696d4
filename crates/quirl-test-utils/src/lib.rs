// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test support for the Quirl workspace: mock adapters and a full-stack
//! harness wiring the engine against a temp-directory SQLite database.

pub mod harness;
pub mod mock_channel;
pub mod mock_generator;

pub use harness::{ADMIN_ID, TestHarness, command, photo, selection, text, user};
pub use mock_channel::MockChannel;
pub use mock_generator::{GenerateCall, MockGenerator};
