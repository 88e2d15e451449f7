//! Network-flow tests for the ratings client, backed by wiremock
//!
//! Both service hosts (bootstrap and quill) are pointed at a single mock
//! server per test via the config's base overrides.

use crate::config::{Config, PageMetadata, RetryPolicy};
use crate::error::Error;
use crate::signer::CollectionSigner;
use crate::types::{CollectionMeta, CreateCollectionBody};
use crate::RatingsClient;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE: &str = "site-1";
const ARTICLE: &str = "article-1";
// base64("article-1") with the standard alphabet
const ARTICLE_B64: &str = "YXJ0aWNsZS0x";

fn bootstrap_path() -> String {
    format!("/bs3/v3.1/client-solutions.fyre.co/{SITE}/{ARTICLE_B64}/init")
}

fn create_path() -> String {
    format!("/api/v3.0/site/{SITE}/collection/create/")
}

fn bootstrap_body(collection_id: &str) -> serde_json::Value {
    json!({
        "collectionSettings": { "collectionId": collection_id },
        "ratings": { "content": [{ "author": "someone", "value": 4 }] }
    })
}

fn test_config(uri: &str) -> Config {
    Config {
        bootstrap_base: Some(uri.to_string()),
        quill_base: Some(uri.to_string()),
        page: PageMetadata {
            title: "Test Page".to_string(),
            url: "http://example.com/article-1".to_string(),
        },
        retry: RetryPolicy {
            max_attempts: 3,
            retry_delay: Duration::from_millis(200),
        },
        ..Config::default()
    }
}

fn test_client(uri: &str) -> RatingsClient {
    RatingsClient::new(test_config(uri)).unwrap()
}

#[tokio::test]
async fn acquire_resolves_on_first_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(bootstrap_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(bootstrap_body("col-1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let acquired = client.acquire(SITE, ARTICLE).await.unwrap();

    assert_eq!(acquired.collection_id, "col-1");
    assert_eq!(acquired.content[0]["value"], 4);
    assert_eq!(client.session().collection_id().as_deref(), Some("col-1"));
    assert_eq!(client.session().fetch_attempts(), 1);
}

#[tokio::test]
async fn first_failure_creates_collection_exactly_once_then_refetches() {
    let server = MockServer::start().await;

    // First bootstrap attempt fails, second succeeds
    Mock::given(method("GET"))
        .and(path(bootstrap_path()))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(bootstrap_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(bootstrap_body("col-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(create_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let start = std::time::Instant::now();
    let acquired = client.acquire(SITE, ARTICLE).await.unwrap();

    assert_eq!(acquired.collection_id, "col-1");
    assert_eq!(client.session().fetch_attempts(), 2);
    // The creation fallback refetches immediately, without the retry delay
    assert!(
        start.elapsed() < Duration::from_millis(200),
        "creation fallback should not wait the retry delay, waited {:?}",
        start.elapsed()
    );

    // Creation happens between the first and second bootstrap attempts
    let requests = server.received_requests().await.unwrap();
    let paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(paths, vec![bootstrap_path(), create_path(), bootstrap_path()]);
}

#[tokio::test]
async fn two_failures_then_success_waits_exactly_one_delay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(bootstrap_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(bootstrap_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(bootstrap_body("col-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(create_path()))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let start = std::time::Instant::now();
    let acquired = client.acquire(SITE, ARTICLE).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(acquired.collection_id, "col-1");
    assert_eq!(client.session().fetch_attempts(), 3);
    // One fixed delay after the second failure; the creation fallback after
    // the first failure is immediate. Upper bound is generous for CI.
    assert!(
        elapsed >= Duration::from_millis(200),
        "should wait the retry delay once, waited {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(2),
        "should not wait more than one delay, waited {elapsed:?}"
    );
}

#[tokio::test]
async fn exhausted_attempts_return_terminal_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(bootstrap_path()))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(create_path()))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.retry.retry_delay = Duration::from_millis(20);
    let client = RatingsClient::new(config).unwrap();

    let err = client.acquire(SITE, ARTICLE).await.unwrap_err();
    assert!(matches!(err, Error::AcquisitionExhausted { attempts: 3 }));
    assert_eq!(client.session().fetch_attempts(), 3);
    assert!(client.session().collection_id().is_none());
}

#[tokio::test]
async fn legacy_silent_exhaustion_never_completes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(bootstrap_path()))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(create_path()))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.retry.retry_delay = Duration::from_millis(20);
    config.legacy_silent_exhaustion = true;
    let client = RatingsClient::new(config).unwrap();

    // All three attempts fail well inside the window; the acquisition must
    // then neither resolve nor reject.
    let result = tokio::time::timeout(Duration::from_millis(500), client.acquire(SITE, ARTICLE)).await;
    assert!(result.is_err(), "legacy acquisition should stay pending");
    assert_eq!(client.session().fetch_attempts(), 3);
}

#[tokio::test]
async fn create_collection_conflict_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(create_path()))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.create_collection(SITE, ARTICLE).await.unwrap();
}

#[tokio::test]
async fn create_collection_server_error_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(create_path()))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.create_collection(SITE, ARTICLE).await.unwrap_err();
    assert!(matches!(err, Error::CreationFailed { status: 500 }));
}

#[tokio::test]
async fn fatal_creation_failure_aborts_acquisition() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(bootstrap_path()))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(create_path()))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.acquire(SITE, ARTICLE).await.unwrap_err();

    assert!(matches!(err, Error::CreationFailed { status: 500 }));
    // No refetch after the fatal creation failure
    assert_eq!(client.session().fetch_attempts(), 1);
}

#[tokio::test]
async fn create_collection_sends_unsigned_ratings_meta() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(create_path()))
        .and(body_json(json!({
            "signed": false,
            "collectionMeta": {
                "articleId": ARTICLE,
                "title": "Test Page",
                "url": "http://example.com/article-1",
                "type": "ratings"
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.create_collection(SITE, ARTICLE).await.unwrap();
}

struct MarkingSigner;

#[async_trait]
impl CollectionSigner for MarkingSigner {
    async fn sign(&self, meta: CollectionMeta) -> crate::Result<CreateCollectionBody> {
        Ok(CreateCollectionBody {
            signed: true,
            collection_meta: meta,
        })
    }
}

#[tokio::test]
async fn custom_signer_output_reaches_the_creation_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(create_path()))
        .and(body_json(json!({
            "signed": true,
            "collectionMeta": {
                "articleId": ARTICLE,
                "title": "Test Page",
                "url": "http://example.com/article-1",
                "type": "ratings"
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        RatingsClient::with_signer(test_config(&server.uri()), Arc::new(MarkingSigner)).unwrap();
    client.create_collection(SITE, ARTICLE).await.unwrap();
}

async fn acquired_client(server: &MockServer) -> RatingsClient {
    Mock::given(method("GET"))
        .and(path(bootstrap_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(bootstrap_body("col-1")))
        .mount(server)
        .await;
    let client = test_client(&server.uri());
    client.acquire(SITE, ARTICLE).await.unwrap();
    client
}

#[tokio::test]
async fn login_returns_prior_rating_and_stores_token() {
    let server = MockServer::start().await;
    let client = acquired_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v3.0/collection/col-1/posted/rating/"))
        .and(query_param("lftoken", "tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "rating": 4 } })))
        .expect(1)
        .mount(&server)
        .await;

    let prior = client.login("tok1").await.unwrap();
    assert_eq!(prior, Some(json!(4)));
    assert_eq!(client.session().token().as_deref(), Some("tok1"));
}

#[tokio::test]
async fn login_reports_absence_when_user_has_not_rated() {
    let server = MockServer::start().await;
    let client = acquired_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v3.0/collection/col-1/posted/rating/"))
        .and(query_param("lftoken", "tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let prior = client.login("tok1").await.unwrap();
    assert!(prior.is_none());
}

#[tokio::test]
async fn login_with_empty_token_issues_no_request() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    let err = client.login("").await.unwrap_err();
    assert!(matches!(err, Error::EmptyToken));
    assert!(client.session().token().is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn login_before_acquisition_issues_no_request() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    let err = client.login("tok1").await.unwrap_err();
    assert!(matches!(err, Error::NotAcquired));
    assert!(client.session().token().is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn post_rating_before_login_issues_no_request() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    let err = client.post_rating(5).await.unwrap_err();
    assert!(matches!(err, Error::Unauthenticated));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn post_rating_submits_default_dimension_score() {
    let server = MockServer::start().await;
    let client = acquired_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v3.0/collection/col-1/posted/rating/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v3.0/collection/col-1/post/rating/"))
        .and(query_param("lftoken", "tok1"))
        .and(body_json(json!({ "rating": "{\"default\":5}" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.login("tok1").await.unwrap();
    client.post_rating(5).await.unwrap();
}

#[tokio::test]
async fn rejected_rating_surfaces_status() {
    let server = MockServer::start().await;
    let client = acquired_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v3.0/collection/col-1/posted/rating/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v3.0/collection/col-1/post/rating/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    client.login("tok1").await.unwrap();
    let err = client.post_rating(5).await.unwrap_err();
    assert!(matches!(err, Error::RatingRejected { status: 400 }));
}

#[tokio::test]
async fn fetch_attempts_accumulate_across_acquisitions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(bootstrap_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(bootstrap_body("col-1")))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.acquire(SITE, ARTICLE).await.unwrap();
    client.acquire(SITE, ARTICLE).await.unwrap();

    // The lifetime counter keeps accumulating; the retry budget does not.
    assert_eq!(client.session().fetch_attempts(), 2);
}
