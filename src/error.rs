//! Error types for fyre-ratings
//!
//! The taxonomy separates programmer errors (unknown endpoint, bad arity,
//! posting without a login) from service failures. Programmer errors fail
//! fast and are never retried; transient service failures during bootstrap
//! feed the bounded retry policy of the acquisition state machine.

use thiserror::Error;

/// Result type alias for fyre-ratings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fyre-ratings
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (invalid retry policy, empty network, client build failure)
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description of the configuration issue
        message: String,
    },

    /// Endpoint name not present in the template table
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// Placeholder count of a template does not match the supplied arguments
    #[error("endpoint {endpoint} takes {expected} argument(s), got {supplied}")]
    ArgumentCountMismatch {
        /// The endpoint whose template was being resolved
        endpoint: String,
        /// Number of placeholders in the template
        expected: usize,
        /// Number of arguments supplied by the caller
        supplied: usize,
    },

    /// `login` was called with an empty token
    #[error("login requires a non-empty token")]
    EmptyToken,

    /// An operation needs an acquired collection, but none has been resolved yet
    #[error("no collection acquired yet; call acquire first")]
    NotAcquired,

    /// `post_rating` was called before a successful `login`
    #[error("must be authenticated to post a rating")]
    Unauthenticated,

    /// Bootstrap endpoint answered with a non-success status
    #[error("bootstrap request returned HTTP {status}")]
    Bootstrap {
        /// The HTTP status returned by the bootstrap endpoint
        status: u16,
    },

    /// Collection creation was rejected with a status other than 409
    #[error("collection creation failed with HTTP {status}")]
    CreationFailed {
        /// The HTTP status returned by the creation endpoint
        status: u16,
    },

    /// Rating submission was rejected by the service
    #[error("rating submission rejected with HTTP {status}")]
    RatingRejected {
        /// The HTTP status returned by the rating endpoint
        status: u16,
    },

    /// All bootstrap attempts failed and the acquisition gave up
    #[error("collection acquisition exhausted after {attempts} attempt(s)")]
    AcquisitionExhausted {
        /// Number of bootstrap attempts that were made
        attempts: u32,
    },

    /// Transport-level error from the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A resolved endpoint string was not a valid URL
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The service answered with a body the client could not interpret
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if the error is transient and the bootstrap retry policy applies
    ///
    /// Transient errors are transport failures and non-success bootstrap
    /// statuses. Everything else is permanent: programmer errors fail fast
    /// and definitive service rejections are surfaced as-is.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Bootstrap { .. } | Error::Network(_) => true,
            Error::Config { .. }
            | Error::UnknownEndpoint(_)
            | Error::ArgumentCountMismatch { .. }
            | Error::EmptyToken
            | Error::NotAcquired
            | Error::Unauthenticated
            | Error::CreationFailed { .. }
            | Error::RatingRejected { .. }
            | Error::AcquisitionExhausted { .. }
            | Error::InvalidUrl(_)
            | Error::UnexpectedResponse(_)
            | Error::Serialization(_) => false,
        }
    }
}
