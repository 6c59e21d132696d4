// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! QR code renderer implementing [`GeneratorAdapter`].
//!
//! Deterministic: medium error correction, quiet-zone border of 4 modules,
//! colored fill on a white background, nearest-neighbor resize to the exact
//! requested square size.

use async_trait::async_trait;
use image::{Rgb, RgbImage, imageops};
use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;

use quirl_core::artifact::ArtifactHandle;
use quirl_core::types::Style;
use quirl_core::{AdapterType, GeneratorAdapter, HealthStatus, PluginAdapter, QuirlError};

/// Quiet-zone width in modules around the symbol.
const QUIET_ZONE: u32 = 4;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Maps a style choice to its RGB fill color.
fn fill_color(style: Style) -> Rgb<u8> {
    match style {
        Style::Black => Rgb([0, 0, 0]),
        Style::Red => Rgb([255, 0, 0]),
        Style::Green => Rgb([0, 128, 0]),
        Style::Blue => Rgb([0, 0, 255]),
        Style::Yellow => Rgb([255, 255, 0]),
        Style::Pink => Rgb([255, 192, 203]),
        Style::Purple => Rgb([128, 0, 128]),
        Style::Gray => Rgb([128, 128, 128]),
        Style::Brown => Rgb([165, 42, 42]),
    }
}

/// QR code generator backed by the `qrcode` and `image` crates.
pub struct QrGenerator;

impl QrGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for QrGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the QR symbol to a PNG temp file. Blocking; run off the async
/// runtime.
fn render(content: &str, style: Style, size: u32) -> Result<ArtifactHandle, QuirlError> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::M).map_err(
        |e| QuirlError::Generation {
            message: format!("QR encoding failed: {e}"),
            source: Some(Box::new(e)),
        },
    )?;

    let modules = code.width() as u32;
    let colors = code.to_colors();
    let fill = fill_color(style);

    // Paint dark modules onto a white canvas with the quiet zone around.
    let dim = modules + 2 * QUIET_ZONE;
    let mut img = RgbImage::from_pixel(dim, dim, WHITE);
    for y in 0..modules {
        for x in 0..modules {
            if colors[(y * modules + x) as usize] == Color::Dark {
                img.put_pixel(x + QUIET_ZONE, y + QUIET_ZONE, fill);
            }
        }
    }

    let resized = imageops::resize(&img, size, size, imageops::FilterType::Nearest);

    let file = tempfile::Builder::new()
        .prefix("quirl-qr-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| QuirlError::Generation {
            message: format!("failed to create temp file: {e}"),
            source: Some(Box::new(e)),
        })?;

    resized
        .save_with_format(file.path(), image::ImageFormat::Png)
        .map_err(|e| QuirlError::Generation {
            message: format!("failed to write PNG: {e}"),
            source: Some(Box::new(e)),
        })?;

    debug!(modules, size, %style, "QR artifact rendered");
    Ok(ArtifactHandle::new(file.into_temp_path()))
}

#[async_trait]
impl PluginAdapter for QrGenerator {
    fn name(&self) -> &str {
        "qrcode"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, QuirlError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), QuirlError> {
        Ok(())
    }
}

#[async_trait]
impl GeneratorAdapter for QrGenerator {
    async fn generate(
        &self,
        content: &str,
        style: Style,
        size: u32,
    ) -> Result<ArtifactHandle, QuirlError> {
        let content = content.to_string();
        // Rendering large sizes is CPU and memory heavy; keep it off the
        // async worker threads.
        tokio::task::spawn_blocking(move || render(&content, style, size))
            .await
            .map_err(|e| QuirlError::Internal(format!("render task panicked: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generates_png_of_exact_requested_size() {
        let generator = QrGenerator::new();
        let handle = generator
            .generate("https://example.com", Style::Red, 300)
            .await
            .unwrap();

        let (w, h) = image::image_dimensions(handle.path()).unwrap();
        assert_eq!((w, h), (300, 300));
    }

    #[tokio::test]
    async fn temp_file_removed_after_handle_drops() {
        let generator = QrGenerator::new();
        let handle = generator.generate("hello", Style::Black, 100).await.unwrap();
        let path = handle.path().to_path_buf();
        assert!(path.exists());
        drop(handle);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn oversized_content_fails_with_generation_error() {
        let generator = QrGenerator::new();
        // Far beyond QR version 40 capacity.
        let content = "x".repeat(10_000);
        let err = generator
            .generate(&content, Style::Black, 300)
            .await
            .unwrap_err();
        assert!(matches!(err, QuirlError::Generation { .. }));
    }

    #[tokio::test]
    async fn same_inputs_render_identical_artifacts() {
        let generator = QrGenerator::new();
        let a = generator.generate("determinism", Style::Blue, 150).await.unwrap();
        let b = generator.generate("determinism", Style::Blue, 150).await.unwrap();
        let bytes_a = std::fs::read(a.path()).unwrap();
        let bytes_b = std::fs::read(b.path()).unwrap();
        assert_eq!(bytes_a, bytes_b);
    }

    #[test]
    fn every_style_has_a_distinct_fill() {
        use strum::IntoEnumIterator;
        let mut seen = std::collections::HashSet::new();
        for style in Style::iter() {
            assert!(seen.insert(fill_color(style).0), "duplicate fill for {style}");
        }
    }
}
