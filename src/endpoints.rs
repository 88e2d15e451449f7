//! Endpoint templates and URL resolution
//!
//! The ratings service splits its API across two hosts: `bootstrap.<network>`
//! serves reads (collection init, has-posted lookup) and `quill.<network>`
//! takes writes (collection creation, rating submission). Endpoints are kept
//! as named templates with ordered `{}` placeholders, resolved positionally.
//!
//! [`EndpointResolver::resolve`] is the generic, runtime-checked entry point.
//! The typed builder methods ([`bootstrap_init`](EndpointResolver::bootstrap_init)
//! and friends) carry statically correct arity and are what the client uses
//! internally; they also parse the result into a [`Url`] so malformed
//! arguments surface before a request is issued.

use crate::config::Config;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use url::Url;

/// Named endpoints of the ratings service
const ENDPOINT_NAMES: [&str; 4] = [
    "bootstrap-init",
    "collection-create",
    "post-rating",
    "has-posted",
];

/// Resolves named endpoint templates into fully-qualified URLs
///
/// Pure and side-effect free; holds only the host strings derived from
/// [`Config`].
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    network: String,
    bootstrap_base: String,
    quill_base: String,
}

impl EndpointResolver {
    /// Build a resolver from configuration
    ///
    /// Hosts default to `http://bootstrap.<network>` and
    /// `http://quill.<network>` unless overridden in the config.
    pub fn from_config(config: &Config) -> Self {
        let bootstrap_base = config
            .bootstrap_base
            .clone()
            .unwrap_or_else(|| format!("http://bootstrap.{}", config.network));
        let quill_base = config
            .quill_base
            .clone()
            .unwrap_or_else(|| format!("http://quill.{}", config.network));
        Self {
            network: config.network.clone(),
            bootstrap_base,
            quill_base,
        }
    }

    /// Resolve a named endpoint template with positional arguments
    ///
    /// Each `{}` placeholder is substituted left-to-right with the
    /// corresponding argument.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEndpoint`] if `name` is not a known endpoint,
    /// or [`Error::ArgumentCountMismatch`] unless the argument count equals
    /// the template's placeholder count. Both are programmer errors, never
    /// retried.
    pub fn resolve(&self, name: &str, args: &[&str]) -> Result<String> {
        let template = self
            .template(name)
            .ok_or_else(|| Error::UnknownEndpoint(name.to_string()))?;

        let expected = template.matches("{}").count();
        if expected != args.len() {
            return Err(Error::ArgumentCountMismatch {
                endpoint: name.to_string(),
                expected,
                supplied: args.len(),
            });
        }

        let mut resolved = template;
        for arg in args {
            resolved = resolved.replacen("{}", arg, 1);
        }
        Ok(resolved)
    }

    /// GET URL for the bootstrap init of a (site, article) pair
    ///
    /// The article id is base64-encoded into the path segment, as the
    /// service expects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the arguments produce an unparseable URL.
    pub fn bootstrap_init(&self, site_id: &str, article_id: &str) -> Result<Url> {
        let encoded = STANDARD.encode(article_id);
        let resolved = self.resolve("bootstrap-init", &[&self.network, site_id, &encoded])?;
        Ok(Url::parse(&resolved)?)
    }

    /// POST URL for creating a site's collection
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the arguments produce an unparseable URL.
    pub fn collection_create(&self, site_id: &str) -> Result<Url> {
        let resolved = self.resolve("collection-create", &[site_id])?;
        Ok(Url::parse(&resolved)?)
    }

    /// POST URL for submitting a rating to a collection
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the arguments produce an unparseable URL.
    pub fn post_rating(&self, collection_id: &str, token: &str) -> Result<Url> {
        let resolved = self.resolve("post-rating", &[collection_id, token])?;
        Ok(Url::parse(&resolved)?)
    }

    /// GET URL for the has-posted lookup of a (collection, token) pair
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the arguments produce an unparseable URL.
    pub fn has_posted(&self, collection_id: &str, token: &str) -> Result<Url> {
        let resolved = self.resolve("has-posted", &[collection_id, token])?;
        Ok(Url::parse(&resolved)?)
    }

    /// The names of all known endpoints
    pub fn endpoint_names() -> &'static [&'static str] {
        &ENDPOINT_NAMES
    }

    fn template(&self, name: &str) -> Option<String> {
        match name {
            "bootstrap-init" => Some(format!("{}/bs3/v3.1/{{}}/{{}}/{{}}/init", self.bootstrap_base)),
            "collection-create" => Some(format!(
                "{}/api/v3.0/site/{{}}/collection/create/",
                self.quill_base
            )),
            "post-rating" => Some(format!(
                "{}/api/v3.0/collection/{{}}/post/rating/?lftoken={{}}",
                self.quill_base
            )),
            "has-posted" => Some(format!(
                "{}/api/v3.0/collection/{{}}/posted/rating/?lftoken={{}}",
                self.bootstrap_base
            )),
            _ => None,
        }
    }
}
