//! Wire types for the ratings service
//!
//! Field names follow the service's camelCase JSON. The ratings content
//! itself is treated as opaque JSON; this crate only plucks out the
//! collection id and hands the rest to the caller.

use serde::{Deserialize, Serialize};

/// Bootstrap init response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResponse {
    /// Settings of the resolved collection
    pub collection_settings: CollectionSettings,

    /// Ratings section of the payload
    #[serde(default)]
    pub ratings: RatingsSection,
}

/// Collection settings inside a bootstrap response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSettings {
    /// Opaque collection identifier
    pub collection_id: String,
}

/// Ratings section of a bootstrap response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingsSection {
    /// Existing ratings content, opaque to this crate
    #[serde(default)]
    pub content: serde_json::Value,
}

/// Result of a successful collection acquisition
#[derive(Debug, Clone)]
pub struct AcquiredCollection {
    /// The resolved collection id, also stored in the session
    pub collection_id: String,

    /// Existing ratings content returned by bootstrap
    pub content: serde_json::Value,
}

/// Collection metadata submitted when creating a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMeta {
    /// The article the collection aggregates ratings for
    pub article_id: String,

    /// Title of the embedding page
    pub title: String,

    /// Canonical URL of the embedding page
    pub url: String,

    /// Collection type; always `"ratings"` for this crate
    #[serde(rename = "type")]
    pub kind: String,
}

impl CollectionMeta {
    /// Metadata for a ratings collection on the given article
    pub fn ratings(article_id: &str, title: &str, url: &str) -> Self {
        Self {
            article_id: article_id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            kind: "ratings".to_string(),
        }
    }
}

/// Body of a collection-create request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionBody {
    /// Whether `collection_meta` carries a signature
    pub signed: bool,

    /// The collection metadata, signed or plain
    pub collection_meta: CollectionMeta,
}

/// Has-posted lookup response body
#[derive(Debug, Clone, Deserialize)]
pub struct HasPostedResponse {
    /// Payload wrapper
    #[serde(default)]
    pub data: HasPostedData,
}

/// Payload of a has-posted response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HasPostedData {
    /// The user's prior rating, absent if they have not rated yet
    #[serde(default)]
    pub rating: Option<serde_json::Value>,
}

/// Body of a rating submission
///
/// The service takes the rating dimensions as a JSON-encoded string field,
/// with `default` naming the single dimension configured at
/// collection-creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingSubmission {
    /// JSON-encoded `{"default": <score>}` string
    pub rating: String,
}

impl RatingSubmission {
    /// Build a submission for a score on the `default` dimension
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`](crate::Error::Serialization) if the
    /// score cannot be encoded, which does not happen for integer scores.
    pub fn new(score: u32) -> crate::Result<Self> {
        let rating = serde_json::to_string(&serde_json::json!({ "default": score }))?;
        Ok(Self { rating })
    }
}
