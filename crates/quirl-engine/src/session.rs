// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory per-user conversation sessions.
//!
//! Sessions are volatile: a restart drops every user back to [`SessionState::Idle`].
//! Only durable facts (users, logs, settings) live in storage.

use dashmap::DashMap;

use quirl_core::types::{Style, UserId};

/// Where a user currently is in the QR workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingContent,
    AwaitingStyle,
    AwaitingSize,
}

/// Mutable per-user conversation data.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: SessionState,
    /// Collected content: raw text or a resolved media location.
    pub content: Option<String>,
    pub style: Option<Style>,
}

impl Session {
    /// Resets to idle and drops collected inputs.
    pub fn clear(&mut self) {
        *self = Session::default();
    }
}

/// Concurrent session map keyed by user id.
///
/// A user with no entry is indistinguishable from one in the idle state.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: DashMap<UserId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for `user`, idle when never seen.
    pub fn state(&self, user: UserId) -> SessionState {
        self.inner.get(&user).map(|s| s.state).unwrap_or_default()
    }

    /// Runs `f` with mutable access to the user's session, creating it on
    /// first touch.
    pub fn with_mut<R>(&self, user: UserId, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut entry = self.inner.entry(user).or_default();
        f(entry.value_mut())
    }

    /// Snapshot of the user's session (empty default when never seen).
    pub fn snapshot(&self, user: UserId) -> Session {
        self.inner
            .get(&user)
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    /// Drops the user back to idle.
    pub fn clear(&self, user: UserId) {
        self.inner.remove(&user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_is_idle() {
        let store = SessionStore::new();
        assert_eq!(store.state(UserId(1)), SessionState::Idle);
    }

    #[test]
    fn with_mut_creates_and_mutates() {
        let store = SessionStore::new();
        store.with_mut(UserId(1), |s| {
            s.state = SessionState::AwaitingStyle;
            s.content = Some("hello".into());
        });
        assert_eq!(store.state(UserId(1)), SessionState::AwaitingStyle);
        assert_eq!(store.snapshot(UserId(1)).content.as_deref(), Some("hello"));
    }

    #[test]
    fn clear_resets_to_idle() {
        let store = SessionStore::new();
        store.with_mut(UserId(1), |s| {
            s.state = SessionState::AwaitingSize;
            s.content = Some("x".into());
            s.style = Some(Style::Red);
        });
        store.clear(UserId(1));
        let session = store.snapshot(UserId(1));
        assert_eq!(session.state, SessionState::Idle);
        assert!(session.content.is_none());
        assert!(session.style.is_none());
    }

    #[test]
    fn sessions_are_isolated_per_user() {
        let store = SessionStore::new();
        store.with_mut(UserId(1), |s| s.state = SessionState::AwaitingContent);
        store.with_mut(UserId(2), |s| s.state = SessionState::AwaitingSize);
        assert_eq!(store.state(UserId(1)), SessionState::AwaitingContent);
        assert_eq!(store.state(UserId(2)), SessionState::AwaitingSize);
    }
}
