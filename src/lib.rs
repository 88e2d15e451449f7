//! # fyre-ratings
//!
//! Async client for the Livefyre ratings service: resolves a per-article
//! ratings collection (creating it if absent), authenticates a user token
//! against it, fetches existing ratings, and posts new ones. Embedding
//! applications get a drop-in client without implementing the service's
//! bootstrap/collection protocol themselves.
//!
//! The core is the collection-acquisition workflow: a bounded retry state
//! machine that reconciles "the collection may not exist yet" with
//! "collection creation is not guaranteed to be visible immediately". The
//! first failed bootstrap attempt triggers an idempotent create-then-refetch
//! fallback; later failures wait a fixed delay before refetching; the
//! budget defaults to three attempts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fyre_ratings::{Config, RatingsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RatingsClient::new(Config::default())?;
//!
//!     // Resolve (or create) the collection and fetch existing ratings
//!     let acquired = client.acquire("site-123", "my-article").await?;
//!     println!("collection {}: {}", acquired.collection_id, acquired.content);
//!
//!     // Authenticate and post a rating
//!     let prior = client.login("lftoken-abc").await?;
//!     if prior.is_none() {
//!         client.post_rating(5).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Ratings client and acquisition state machine
pub mod client;
/// Configuration types
pub mod config;
/// Endpoint templates and URL resolution
pub mod endpoints;
/// Error types
pub mod error;
/// Per-client session state
pub mod session;
/// Pluggable collection-meta signing
pub mod signer;
/// Wire types for the ratings service
pub mod types;

// Re-export commonly used types
pub use client::RatingsClient;
pub use config::{Config, PageMetadata, RetryPolicy};
pub use endpoints::EndpointResolver;
pub use error::{Error, Result};
pub use session::Session;
pub use signer::{CollectionSigner, NoOpSigner};
pub use types::{
    AcquiredCollection, BootstrapResponse, CollectionMeta, CollectionSettings,
    CreateCollectionBody, HasPostedData, HasPostedResponse, RatingSubmission, RatingsSection,
};
