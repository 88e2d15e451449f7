//! Per-client session state
//!
//! The upstream widget kept collection id, token, and the bootstrap attempt
//! counter in a process-wide singleton, which made concurrent widgets race
//! on each other's state. Here the session is an explicit object owned by
//! one [`RatingsClient`](crate::RatingsClient); nothing is process-global.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
struct SessionState {
    collection_id: Option<String>,
    token: Option<String>,
    fetch_attempts: u32,
}

/// Mutable session state for one ratings client
///
/// Invariants: `collection_id` is set only after a successful bootstrap
/// response and never cleared; `token` is set only by a login with a
/// non-empty token; `fetch_attempts` counts every bootstrap request issued
/// over the session's lifetime and is never reset.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// The acquired collection id, if any acquisition has succeeded
    pub fn collection_id(&self) -> Option<String> {
        self.lock().collection_id.clone()
    }

    /// The authenticated token, if a login has succeeded
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    /// Total bootstrap attempts issued over the session's lifetime
    pub fn fetch_attempts(&self) -> u32 {
        self.lock().fetch_attempts
    }

    pub(crate) fn set_collection_id(&self, collection_id: &str) {
        self.lock().collection_id = Some(collection_id.to_string());
    }

    pub(crate) fn set_token(&self, token: &str) {
        self.lock().token = Some(token.to_string());
    }

    /// Record one bootstrap attempt and return the new lifetime total
    pub(crate) fn record_fetch_attempt(&self) -> u32 {
        let mut state = self.lock();
        state.fetch_attempts += 1;
        state.fetch_attempts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        // State updates are infallible; a poisoned lock holds valid data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
