// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Quirl collaborator boundaries.
//!
//! The workflow engine only ever talks to the messaging transport, the
//! persistence layer, and the artifact generator through these traits.
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod generator;
pub mod storage;

pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use generator::GeneratorAdapter;
pub use storage::StorageAdapter;
