//! Acquisition state machine
//!
//! The retry/fallback control flow of collection acquisition is factored
//! into a pure transition function over enumerated states, so the bounded
//! retry budget and the creation fallback can be tested without network
//! timing. The driver loop in [`RatingsClient`](super::RatingsClient)
//! performs the actual requests and sleeps.
//!
//! Transition table, for a policy of `max_attempts` bootstrap requests:
//!
//! | after attempt n | outcome | next state |
//! |---|---|---|
//! | any | success | `Resolved` |
//! | n == 1, n < max | failure | `CreatingFallback` (create, then refetch immediately) |
//! | 1 < n < max | failure | `Retrying` (fixed delay, then refetch) |
//! | n >= max | failure | `Abandoned` |

/// Outcome of a single bootstrap attempt, as seen by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttemptOutcome {
    /// The bootstrap request returned a usable payload
    Success,
    /// The bootstrap request failed transiently (transport error or non-2xx)
    Failure,
}

/// States of the acquisition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AcquireState {
    /// A bootstrap request is (about to be) in flight; `attempt` is 1-based
    Fetching {
        /// The attempt number being issued
        attempt: u32,
    },
    /// First attempt failed; create the collection, then refetch without delay
    CreatingFallback {
        /// The attempt number of the refetch that follows
        next_attempt: u32,
    },
    /// A mid-budget attempt failed; wait the fixed delay, then refetch
    Retrying {
        /// The attempt number of the refetch that follows
        next_attempt: u32,
    },
    /// Bootstrap succeeded and the collection is resolved
    Resolved,
    /// The attempt budget is spent
    Abandoned {
        /// Total attempts made before giving up
        attempts: u32,
    },
}

/// Compute the state following a completed bootstrap attempt
///
/// `attempt` is the 1-based number of the attempt that just finished.
/// Never returns `Fetching`; that is the entry state re-entered by the
/// driver after a fallback or retry.
pub(crate) fn after_attempt(attempt: u32, outcome: AttemptOutcome, max_attempts: u32) -> AcquireState {
    match outcome {
        AttemptOutcome::Success => AcquireState::Resolved,
        AttemptOutcome::Failure if attempt >= max_attempts => {
            AcquireState::Abandoned { attempts: attempt }
        }
        AttemptOutcome::Failure if attempt == 1 => AcquireState::CreatingFallback {
            next_attempt: attempt + 1,
        },
        AttemptOutcome::Failure => AcquireState::Retrying {
            next_attempt: attempt + 1,
        },
    }
}
