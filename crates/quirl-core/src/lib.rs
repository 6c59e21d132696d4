// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Quirl bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Quirl workspace. The workflow engine
//! talks to its collaborators (messaging transport, persistence, artifact
//! generator) exclusively through the traits defined here.

pub mod artifact;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use artifact::ArtifactHandle;
pub use error::QuirlError;
pub use types::{AdapterType, ChatRef, HealthStatus, MessageId, Style, UserId};

// Re-export all adapter traits at crate root.
pub use traits::{ChannelAdapter, GeneratorAdapter, PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn quirl_error_variants_construct() {
        let _config = QuirlError::Config("test".into());
        let _storage = QuirlError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = QuirlError::channel("test");
        let _generation = QuirlError::generation("test");
        let _validation = QuirlError::Validation("test".into());
        let _gate = QuirlError::GateDenied {
            channel: "@club".into(),
        };
        let _auth = QuirlError::Unauthorized;
        let _timeout = QuirlError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = QuirlError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips() {
        for variant in [
            AdapterType::Channel,
            AdapterType::Storage,
            AdapterType::Generator,
        ] {
            let s = variant.to_string();
            assert_eq!(AdapterType::from_str(&s).unwrap(), variant);
        }
    }

    #[test]
    fn adapter_type_serialization() {
        let channel = AdapterType::Channel;
        let json = serde_json::to_string(&channel).expect("should serialize");
        let parsed: AdapterType = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(channel, parsed);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Compile-time check that every adapter trait is reachable from the
        // public API.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_generator_adapter<T: GeneratorAdapter>() {}
    }
}
