// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A recording generator adapter for tests.

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use quirl_core::artifact::ArtifactHandle;
use quirl_core::types::{AdapterType, HealthStatus, Style};
use quirl_core::{GeneratorAdapter, PluginAdapter, QuirlError};

/// One recorded call to [`GeneratorAdapter::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCall {
    pub content: String,
    pub style: Style,
    pub size: u32,
}

/// Generator that writes a placeholder file and records its inputs.
pub struct MockGenerator {
    calls: Mutex<Vec<GenerateCall>>,
    fail: AtomicBool,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail with a generation error.
    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<GenerateCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock"
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
impl GeneratorAdapter for MockGenerator {
    async fn generate(
        &self,
        content: &str,
        style: Style,
        size: u32,
    ) -> Result<ArtifactHandle, QuirlError> {
        self.calls.lock().unwrap().push(GenerateCall {
            content: content.to_string(),
            style,
            size,
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(QuirlError::generation("mock generator failure"));
        }
        let mut file = tempfile::NamedTempFile::new()
            .map_err(|e| QuirlError::generation(format!("temp file: {e}")))?;
        file.write_all(b"mock-png")
            .map_err(|e| QuirlError::generation(format!("write: {e}")))?;
        Ok(ArtifactHandle::new(file.into_temp_path()))
    }
}
