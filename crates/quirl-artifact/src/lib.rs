// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! QR artifact generation and delivery for the Quirl bot.
//!
//! [`QrGenerator`] implements the deterministic rendering contract;
//! [`ArtifactPipeline`] orchestrates generate -> deliver -> cleanup with
//! RAII release of the transient file on every exit path.

pub mod generator;
pub mod pipeline;

pub use generator::QrGenerator;
pub use pipeline::{ArtifactPipeline, MIN_SIZE};
