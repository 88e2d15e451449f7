//! Ratings client: acquisition driver, collection creation, login, posting
//!
//! [`RatingsClient`] is the root object of the crate. It owns the HTTP
//! client (with a cookie store, so the credentialed session travels with
//! every request), the endpoint resolver, the per-client [`Session`], and
//! the configured [`CollectionSigner`].
//!
//! The acquisition control flow lives here as a driver loop over the pure
//! state machine in the `acquire` submodule: issue a bootstrap request,
//! classify the outcome, and either resolve, create-then-refetch, back off
//! and refetch, or give up.

mod acquire;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::endpoints::EndpointResolver;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::signer::{CollectionSigner, NoOpSigner};
use crate::types::{
    AcquiredCollection, BootstrapResponse, CollectionMeta, HasPostedResponse, RatingSubmission,
};
use acquire::{after_attempt, AcquireState, AttemptOutcome};
use reqwest::StatusCode;
use std::sync::Arc;

/// Client for one ratings widget instance
///
/// One client holds one [`Session`]; concurrent widgets get their own
/// clients and do not interfere with each other's collection id, token, or
/// attempt counter.
pub struct RatingsClient {
    config: Config,
    http: reqwest::Client,
    endpoints: EndpointResolver,
    session: Session,
    signer: Arc<dyn CollectionSigner>,
}

impl RatingsClient {
    /// Create a client with the default (unsigned) collection signer
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid or the
    /// HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_signer(config, Arc::new(NoOpSigner))
    }

    /// Create a client with a custom collection signer
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid or the
    /// HTTP client cannot be constructed.
    pub fn with_signer(config: Config, signer: Arc<dyn CollectionSigner>) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .user_agent("fyre-ratings")
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {e}"),
            })?;
        let endpoints = EndpointResolver::from_config(&config);
        Ok(Self {
            config,
            http,
            endpoints,
            session: Session::new(),
            signer,
        })
    }

    /// The client's session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The client's endpoint resolver
    pub fn endpoints(&self) -> &EndpointResolver {
        &self.endpoints
    }

    /// Resolve the ratings collection for a (site, article) pair
    ///
    /// Issues up to `retry.max_attempts` bootstrap requests. If the first
    /// attempt fails, the collection is created (idempotently) and the
    /// bootstrap is refetched immediately; later failures wait the fixed
    /// `retry.retry_delay` before refetching. On success the collection id
    /// is stored in the session and the existing ratings content is
    /// returned.
    ///
    /// Attempts are strictly sequential, one request in flight at a time,
    /// and there is no cancellation: callers wanting a deadline wrap this
    /// future in their own timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AcquisitionExhausted`] once the attempt budget is
    /// spent (unless `legacy_silent_exhaustion` is set, in which case the
    /// future never completes), or [`Error::CreationFailed`] if the
    /// creation fallback was definitively rejected.
    pub async fn acquire(&self, site_id: &str, article_id: &str) -> Result<AcquiredCollection> {
        let max_attempts = self.config.retry.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let lifetime_attempts = self.session.record_fetch_attempt();
            tracing::debug!(
                site_id,
                article_id,
                attempt,
                lifetime_attempts,
                "issuing bootstrap request"
            );

            let (outcome, payload) = match self.fetch_bootstrap(site_id, article_id).await {
                Ok(response) => (AttemptOutcome::Success, Some(response)),
                Err(e) if e.is_transient() => {
                    tracing::warn!(site_id, article_id, attempt, error = %e, "bootstrap attempt failed");
                    (AttemptOutcome::Failure, None)
                }
                Err(e) => return Err(e),
            };

            match (after_attempt(attempt, outcome, max_attempts), payload) {
                (AcquireState::Resolved, Some(response)) => {
                    let collection_id = response.collection_settings.collection_id;
                    self.session.set_collection_id(&collection_id);
                    tracing::info!(site_id, article_id, %collection_id, attempt, "collection resolved");
                    return Ok(AcquiredCollection {
                        collection_id,
                        content: response.ratings.content,
                    });
                }
                (AcquireState::CreatingFallback { next_attempt }, _) => {
                    tracing::debug!(
                        site_id,
                        article_id,
                        next_attempt,
                        "collection may not exist yet, creating before refetch"
                    );
                    match self.create_collection(site_id, article_id).await {
                        Ok(()) => {}
                        Err(e @ Error::CreationFailed { .. }) => return Err(e),
                        Err(e) if e.is_transient() => {
                            // Creation is idempotent; an unsettled create is
                            // resolved by the refetch either way.
                            tracing::warn!(site_id, article_id, error = %e, "collection create did not settle, refetching anyway");
                        }
                        Err(e) => return Err(e),
                    }
                }
                (AcquireState::Retrying { next_attempt }, _) => {
                    let delay = self.config.retry.retry_delay;
                    tracing::debug!(
                        site_id,
                        article_id,
                        next_attempt,
                        delay_ms = delay.as_millis() as u64,
                        "waiting before bootstrap refetch"
                    );
                    tokio::time::sleep(delay).await;
                }
                (AcquireState::Abandoned { attempts }, _) => {
                    tracing::error!(site_id, article_id, attempts, "bootstrap attempts exhausted");
                    if self.config.legacy_silent_exhaustion {
                        // Upstream parity: the original widget neither
                        // resolved nor rejected past this point.
                        std::future::pending::<()>().await;
                    }
                    return Err(Error::AcquisitionExhausted { attempts });
                }
                // The machine resolves exactly when a payload is in hand;
                // Fetching is only ever the entry state.
                (AcquireState::Resolved, None) | (AcquireState::Fetching { .. }, _) => {}
            }
        }
    }

    /// Create the ratings collection for a (site, article) pair
    ///
    /// Idempotent: an HTTP 409 (collection already exists) is a successful
    /// no-op. The collection metadata passes through the configured
    /// [`CollectionSigner`] before submission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreationFailed`] for any rejection status other
    /// than 409.
    pub async fn create_collection(&self, site_id: &str, article_id: &str) -> Result<()> {
        let meta =
            CollectionMeta::ratings(article_id, &self.config.page.title, &self.config.page.url);
        let body = self.signer.sign(meta).await?;
        let url = self.endpoints.collection_create(site_id)?;

        tracing::debug!(site_id, article_id, signed = body.signed, "creating ratings collection");
        let response = self.http.post(url).json(&body).send().await?;
        let status = response.status();

        if status == StatusCode::CONFLICT {
            tracing::debug!(site_id, article_id, "collection already exists");
            return Ok(());
        }
        if !status.is_success() {
            return Err(Error::CreationFailed {
                status: status.as_u16(),
            });
        }
        tracing::info!(site_id, article_id, "collection created");
        Ok(())
    }

    /// Authenticate a token against the acquired collection
    ///
    /// Stores the token in the session, then looks up whether this user
    /// already posted a rating. Returns the prior rating value if present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyToken`] for an empty token and
    /// [`Error::NotAcquired`] if no collection has been acquired yet; in
    /// both cases no request is issued.
    pub async fn login(&self, token: &str) -> Result<Option<serde_json::Value>> {
        if token.is_empty() {
            return Err(Error::EmptyToken);
        }
        let collection_id = self.session.collection_id().ok_or(Error::NotAcquired)?;
        self.session.set_token(token);

        let url = self.endpoints.has_posted(&collection_id, token)?;
        tracing::debug!(%collection_id, "checking for a prior rating");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedResponse(format!(
                "has-posted lookup returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: HasPostedResponse = response.json().await?;
        Ok(body.data.rating)
    }

    /// Post a rating for the authenticated session
    ///
    /// The score goes to the single `default` rating dimension configured
    /// at collection-creation time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] if no login has succeeded (no
    /// request is issued), or [`Error::RatingRejected`] if the service
    /// turns the submission down.
    pub async fn post_rating(&self, score: u32) -> Result<()> {
        let token = self.session.token().ok_or(Error::Unauthenticated)?;
        let collection_id = self.session.collection_id().ok_or(Error::NotAcquired)?;

        let submission = RatingSubmission::new(score)?;
        let url = self.endpoints.post_rating(&collection_id, &token)?;
        tracing::debug!(%collection_id, score, "posting rating");
        let response = self.http.post(url).json(&submission).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::RatingRejected {
                status: status.as_u16(),
            });
        }
        tracing::info!(%collection_id, score, "rating posted");
        Ok(())
    }

    /// Issue one bootstrap request and parse the payload
    async fn fetch_bootstrap(&self, site_id: &str, article_id: &str) -> Result<BootstrapResponse> {
        let url = self.endpoints.bootstrap_init(site_id, article_id)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Bootstrap {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}
