//! Configuration types for fyre-ratings

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bootstrap retry behavior for collection acquisition
///
/// The acquisition state machine issues at most `max_attempts` bootstrap
/// requests per `acquire` call, sleeping `retry_delay` between the second
/// and later attempts. The delay is fixed, not exponential; the service's
/// collection creation just needs a moment to become visible.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum bootstrap attempts per acquisition (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between retried bootstrap attempts (default: 2000 ms)
    #[serde(default = "default_retry_delay")]
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
        }
    }
}

/// Metadata about the embedding page, stamped into the collection-creation payload
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Document title of the embedding page
    #[serde(default)]
    pub title: String,

    /// Canonical URL of the embedding page
    #[serde(default)]
    pub url: String,
}

/// Main configuration for [`RatingsClient`](crate::RatingsClient)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Livefyre network domain (default: "client-solutions.fyre.co")
    #[serde(default = "default_network")]
    pub network: String,

    /// Explicit base URL for the bootstrap host
    ///
    /// When `None`, the host is derived as `http://bootstrap.<network>`.
    /// Overrides exist mainly so tests can point both service roles at a
    /// single mock server.
    #[serde(default)]
    pub bootstrap_base: Option<String>,

    /// Explicit base URL for the quill (write) host
    ///
    /// When `None`, the host is derived as `http://quill.<network>`.
    #[serde(default)]
    pub quill_base: Option<String>,

    /// Embedding-page metadata used when creating a collection
    #[serde(default)]
    pub page: PageMetadata,

    /// Bootstrap retry policy
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Per-request HTTP timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// Reproduce the upstream widget's silent-hang behavior on retry exhaustion
    ///
    /// The original client never resolved or rejected an acquisition once
    /// its attempt budget was spent. With this flag set, `acquire` pends
    /// forever after exhaustion instead of returning
    /// [`Error::AcquisitionExhausted`]. Off by default; intended for parity
    /// testing against the upstream widget only.
    #[serde(default)]
    pub legacy_silent_exhaustion: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: default_network(),
            bootstrap_base: None,
            quill_base: None,
            page: PageMetadata::default(),
            retry: RetryPolicy::default(),
            request_timeout: default_request_timeout(),
            legacy_silent_exhaustion: false,
        }
    }
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `retry.max_attempts` is zero or the
    /// network domain is empty.
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::Config {
                message: "retry.max_attempts must be at least 1".to_string(),
            });
        }
        if self.network.is_empty() {
            return Err(Error::Config {
                message: "network must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn default_network() -> String {
    "client-solutions.fyre.co".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(2000)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}
