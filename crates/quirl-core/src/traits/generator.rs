// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generator adapter trait for the artifact renderer.

use async_trait::async_trait;

use crate::artifact::ArtifactHandle;
use crate::error::QuirlError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Style;

/// Adapter for the deterministic artifact generator.
///
/// Given the same `(content, style, size)` inputs the generator must produce
/// the same image: colored fill on a white background, fixed error
/// correction, nearest-neighbor resize to the exact requested square size.
#[async_trait]
pub trait GeneratorAdapter: PluginAdapter {
    /// Renders an artifact to transient storage and returns its handle.
    ///
    /// The backing storage is released when the handle drops, on every
    /// caller exit path.
    async fn generate(
        &self,
        content: &str,
        style: Style,
        size: u32,
    ) -> Result<ArtifactHandle, QuirlError>;
}
