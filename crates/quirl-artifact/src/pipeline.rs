// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Artifact pipeline: generate, deliver, and release transient storage.
//!
//! The pipeline owns the artifact lifecycle. The rendered file lives in an
//! RAII [`ArtifactHandle`](quirl_core::artifact::ArtifactHandle), so the
//! backing storage is released on every exit path -- success, delivery
//! failure, and generation failure alike.

use std::sync::Arc;

use tracing::{debug, warn};

use quirl_core::types::{ChatRef, MediaSource, OutboundBody, OutboundMessage, Style};
use quirl_core::{ChannelAdapter, GeneratorAdapter, QuirlError};

/// Inclusive lower bound on artifact size, fixed by the workflow.
pub const MIN_SIZE: u32 = 100;

/// Orchestrates one generate-and-deliver round for a conversation.
pub struct ArtifactPipeline {
    generator: Arc<dyn GeneratorAdapter>,
    channel: Arc<dyn ChannelAdapter>,
    max_size: u32,
}

impl ArtifactPipeline {
    pub fn new(
        generator: Arc<dyn GeneratorAdapter>,
        channel: Arc<dyn ChannelAdapter>,
        max_size: u32,
    ) -> Self {
        Self {
            generator,
            channel,
            max_size,
        }
    }

    /// Inclusive upper bound on artifact size.
    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Whether `size` is inside the accepted `[MIN_SIZE, max_size]` range.
    pub fn size_in_range(&self, size: u32) -> bool {
        (MIN_SIZE..=self.max_size).contains(&size)
    }

    /// Renders the artifact and delivers it to `chat` with a descriptive
    /// caption.
    ///
    /// Callers guard the size already; the re-check here is defense in
    /// depth. Errors are returned for the caller to surface to the user --
    /// the session is cleared by the caller regardless of outcome.
    pub async fn produce_and_deliver(
        &self,
        chat: ChatRef,
        content: &str,
        style: Style,
        size: u32,
    ) -> Result<(), QuirlError> {
        if !self.size_in_range(size) {
            return Err(QuirlError::Validation(format!(
                "size must be between {MIN_SIZE} and {} px",
                self.max_size
            )));
        }

        let handle = self.generator.generate(content, style, size).await?;
        debug!(%style, size, "artifact generated");

        let result = self
            .channel
            .send(OutboundMessage {
                chat,
                body: OutboundBody::Photo {
                    source: MediaSource::Path(handle.path().to_path_buf()),
                    caption: Some(format!("Your QR code (size={size}px, style={style})")),
                },
            })
            .await;

        // The handle drops here, removing the temp file whether or not
        // delivery succeeded.
        if let Err(ref e) = result {
            warn!(error = %e, "artifact delivery failed");
        }
        result.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use quirl_core::artifact::ArtifactHandle;
    use quirl_core::types::{
        AdapterType, ChannelCapabilities, FileRef, HealthStatus, InboundEvent, MembershipStatus,
        MessageId, UserId,
    };
    use quirl_core::PluginAdapter;

    struct StubGenerator {
        fail: AtomicBool,
        last_path: Mutex<Option<PathBuf>>,
    }

    impl StubGenerator {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
                last_path: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl PluginAdapter for StubGenerator {
        fn name(&self) -> &str {
            "stub-generator"
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
    impl GeneratorAdapter for StubGenerator {
        async fn generate(
            &self,
            _content: &str,
            _style: Style,
            _size: u32,
        ) -> Result<ArtifactHandle, QuirlError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(QuirlError::generation("stub failure"));
            }
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(b"png-bytes").unwrap();
            let handle = ArtifactHandle::new(file.into_temp_path());
            *self.last_path.lock().unwrap() = Some(handle.path().to_path_buf());
            Ok(handle)
        }
    }

    struct StubChannel {
        fail_send: AtomicBool,
        sent: Mutex<Vec<OutboundMessage>>,
    }

    impl StubChannel {
        fn new() -> Self {
            Self {
                fail_send: AtomicBool::new(false),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PluginAdapter for StubChannel {
        fn name(&self) -> &str {
            "stub-channel"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Channel
        }
        async fn health_check(&self) -> Result<HealthStatus, QuirlError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), QuirlError> {
            Ok(())
        }
    }

    #[async_trait]
    impl ChannelAdapter for StubChannel {
        fn capabilities(&self) -> ChannelCapabilities {
            ChannelCapabilities {
                supports_menus: false,
                supports_photos: true,
                supports_videos: false,
                supports_documents: false,
                max_message_length: None,
            }
        }
        async fn connect(&mut self) -> Result<(), QuirlError> {
            Ok(())
        }
        async fn send(&self, msg: OutboundMessage) -> Result<MessageId, QuirlError> {
            if self.fail_send.load(Ordering::SeqCst) {
                return Err(QuirlError::channel("stub delivery failure"));
            }
            self.sent.lock().unwrap().push(msg);
            Ok(MessageId("1".into()))
        }
        async fn receive(&self) -> Result<InboundEvent, QuirlError> {
            Err(QuirlError::channel("stub has no inbound"))
        }
        async fn resolve_media(&self, file_ref: &FileRef) -> Result<String, QuirlError> {
            Ok(file_ref.0.clone())
        }
        async fn membership(
            &self,
            _channel: &str,
            _user: UserId,
        ) -> Result<MembershipStatus, QuirlError> {
            Ok(MembershipStatus::Member)
        }
    }

    fn make_pipeline(
        generator: Arc<StubGenerator>,
        channel: Arc<StubChannel>,
    ) -> ArtifactPipeline {
        ArtifactPipeline::new(generator, channel, 16000)
    }

    #[tokio::test]
    async fn delivers_photo_with_caption() {
        let generator = Arc::new(StubGenerator::new());
        let channel = Arc::new(StubChannel::new());
        let pipeline = make_pipeline(generator.clone(), channel.clone());

        pipeline
            .produce_and_deliver(ChatRef(1), "hello", Style::Red, 300)
            .await
            .unwrap();

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        match &sent[0].body {
            OutboundBody::Photo { caption, .. } => {
                let caption = caption.as_deref().unwrap();
                assert!(caption.contains("size=300px"));
                assert!(caption.contains("style=red"));
            }
            other => panic!("expected photo body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn boundary_sizes() {
        let generator = Arc::new(StubGenerator::new());
        let channel = Arc::new(StubChannel::new());
        let pipeline = make_pipeline(generator.clone(), channel.clone());

        for size in [100, 16000] {
            assert!(
                pipeline
                    .produce_and_deliver(ChatRef(1), "x", Style::Black, size)
                    .await
                    .is_ok()
            );
        }
        for size in [99, 16001] {
            let err = pipeline
                .produce_and_deliver(ChatRef(1), "x", Style::Black, size)
                .await
                .unwrap_err();
            assert!(matches!(err, QuirlError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn temp_storage_released_after_successful_delivery() {
        let generator = Arc::new(StubGenerator::new());
        let channel = Arc::new(StubChannel::new());
        let pipeline = make_pipeline(generator.clone(), channel.clone());

        pipeline
            .produce_and_deliver(ChatRef(1), "x", Style::Black, 200)
            .await
            .unwrap();

        let path = generator.last_path.lock().unwrap().clone().unwrap();
        assert!(!path.exists(), "temp file should be removed after delivery");
    }

    #[tokio::test]
    async fn temp_storage_released_after_delivery_failure() {
        let generator = Arc::new(StubGenerator::new());
        let channel = Arc::new(StubChannel::new());
        channel.fail_send.store(true, Ordering::SeqCst);
        let pipeline = make_pipeline(generator.clone(), channel.clone());

        let err = pipeline
            .produce_and_deliver(ChatRef(1), "x", Style::Black, 200)
            .await
            .unwrap_err();
        assert!(matches!(err, QuirlError::Channel { .. }));

        let path = generator.last_path.lock().unwrap().clone().unwrap();
        assert!(!path.exists(), "temp file should be removed after failure");
    }

    #[tokio::test]
    async fn generation_failure_propagates_without_delivery() {
        let generator = Arc::new(StubGenerator::new());
        generator.fail.store(true, Ordering::SeqCst);
        let channel = Arc::new(StubChannel::new());
        let pipeline = make_pipeline(generator.clone(), channel.clone());

        let err = pipeline
            .produce_and_deliver(ChatRef(1), "x", Style::Black, 200)
            .await
            .unwrap_err();
        assert!(matches!(err, QuirlError::Generation { .. }));
        assert!(channel.sent.lock().unwrap().is_empty());
    }
}
