// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mandatory-channel gate policy.
//!
//! When the `gate_channel` setting is set, every workflow entry point
//! re-checks membership against the live channel. Lookup failures deny:
//! an unreachable or misconfigured gate channel must not silently open
//! the gate.

use std::sync::Arc;

use tracing::warn;

use quirl_core::types::UserId;
use quirl_core::{ChannelAdapter, StorageAdapter};

/// Settings key holding the gate channel (`@username` or numeric chat id).
/// Empty or absent means the gate is open.
pub const GATE_CHANNEL_KEY: &str = "gate_channel";

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    /// Denied, with the channel the user must join. Empty when the
    /// channel could not be determined.
    Denied { channel: String },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }
}

/// Checks the mandatory-channel gate for workflow entry points.
pub struct GatePolicy {
    storage: Arc<dyn StorageAdapter>,
    channel: Arc<dyn ChannelAdapter>,
}

impl GatePolicy {
    pub fn new(storage: Arc<dyn StorageAdapter>, channel: Arc<dyn ChannelAdapter>) -> Self {
        Self { storage, channel }
    }

    /// Decides whether `user` may proceed. Always consults the live
    /// channel; membership is never cached.
    pub async fn check(&self, user: UserId) -> GateDecision {
        let gate_channel = match self.storage.get_setting(GATE_CHANNEL_KEY).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "gate channel lookup failed; denying");
                return GateDecision::Denied {
                    channel: String::new(),
                };
            }
        };

        let Some(gate_channel) = gate_channel.filter(|c| !c.trim().is_empty()) else {
            return GateDecision::Allowed;
        };

        match self.channel.membership(&gate_channel, user).await {
            Ok(status) if status.grants_access() => GateDecision::Allowed,
            Ok(_) => GateDecision::Denied {
                channel: gate_channel,
            },
            Err(e) => {
                warn!(%user, channel = %gate_channel, error = %e, "membership check failed; denying");
                GateDecision::Denied {
                    channel: gate_channel,
                }
            }
        }
    }
}
