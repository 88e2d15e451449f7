//! Collection-meta signing
//!
//! Production deployments of the ratings service expect the collection
//! metadata to be signed before creation. Signing is a deployment concern
//! (keys live server-side), so it is modeled as a pluggable collaborator:
//! the client invokes the configured [`CollectionSigner`] on every creation
//! request, and the default [`NoOpSigner`] submits the metadata unsigned.

use crate::types::{CollectionMeta, CreateCollectionBody};
use crate::Result;
use async_trait::async_trait;

/// Trait for turning collection metadata into a creation request body
///
/// Implementations may call out to a signing service, which is why the
/// method is async.
///
/// # Examples
///
/// ```
/// use fyre_ratings::{CollectionMeta, CollectionSigner, CreateCollectionBody, NoOpSigner};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let signer = NoOpSigner;
/// let meta = CollectionMeta::ratings("art-1", "Title", "http://example.com/a");
/// let body = signer.sign(meta).await?;
/// assert!(!body.signed);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait CollectionSigner: Send + Sync {
    /// Produce the creation request body for the given metadata
    ///
    /// # Errors
    ///
    /// Implementations return an error if signing fails; the creation
    /// request is then not issued.
    async fn sign(&self, meta: CollectionMeta) -> Result<CreateCollectionBody>;
}

/// Signer that submits collection metadata unsigned
///
/// This matches the upstream widget's behavior and is suitable for
/// development networks that accept unsigned creation payloads.
pub struct NoOpSigner;

#[async_trait]
impl CollectionSigner for NoOpSigner {
    async fn sign(&self, meta: CollectionMeta) -> Result<CreateCollectionBody> {
        Ok(CreateCollectionBody {
            signed: false,
            collection_meta: meta,
        })
    }
}
