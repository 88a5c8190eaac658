//! Public key cache tests, against a mock key server

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use smartapp::cache::public_key::{PublicKeyCache, PublicKeySource};
use smartapp::errors::KeyFetchError;
use smartapp::http::keyserver::{KeyServerClient, RetryOptions};
use smartapp::utils::CooldownOptions;

use crate::common::PUBLIC_KEY;

fn cache() -> PublicKeyCache {
    let retry = RetryOptions {
        max_attempts: 5,
        cooldown: CooldownOptions {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        },
    };
    let client = KeyServerClient::new(Duration::from_secs(5)).unwrap().with_retry(retry);
    PublicKeyCache::new(client, 32)
}

async fn requests_to(server: &MockServer, key_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == key_path)
        .count()
}

#[tokio::test]
async fn test_key_is_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/key-succeeds"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PUBLIC_KEY))
        .mount(&server)
        .await;

    let cache = cache();
    let first = cache.retrieve(&server.uri(), "key-succeeds").await.unwrap();
    let second = cache.retrieve(&server.uri(), "key-succeeds").await.unwrap();

    assert_eq!(first, PUBLIC_KEY);
    assert_eq!(second, PUBLIC_KEY);
    assert_eq!(requests_to(&server, "/key-succeeds").await, 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_transient_failure_is_retried_then_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/key-retry"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/key-retry"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PUBLIC_KEY))
        .with_priority(2)
        .mount(&server)
        .await;

    let cache = cache();
    let pem = cache.retrieve(&server.uri(), "key-retry").await.unwrap();
    assert_eq!(pem, PUBLIC_KEY);
    assert_eq!(requests_to(&server, "/key-retry").await, 2);

    cache.retrieve(&server.uri(), "key-retry").await.unwrap();
    assert_eq!(requests_to(&server, "/key-retry").await, 2);
}

#[tokio::test]
async fn test_permanent_failure_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/key-fails"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let cache = cache();
    let err = cache.retrieve(&server.uri(), "key-fails").await.unwrap_err();
    assert!(
        matches!(err, KeyFetchError::StatusError { status, .. } if status.as_u16() == 503),
        "{:?}",
        err
    );
    assert_eq!(requests_to(&server, "/key-fails").await, 5);
    assert!(cache.is_empty());

    // Nothing was cached, so the next lookup goes back to the server
    assert!(cache.retrieve(&server.uri(), "key-fails").await.is_err());
    assert_eq!(requests_to(&server, "/key-fails").await, 10);
}

#[tokio::test]
async fn test_unreachable_key_server() {
    // Nothing listens on the discard port
    let cache = cache();
    let err = cache
        .retrieve("http://127.0.0.1:9", "key-unreachable")
        .await
        .unwrap_err();
    assert!(err.is_retryable(), "{:?}", err);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_non_retryable_error_is_not_retried() {
    // A retry would sleep for the base delay first
    let retry = RetryOptions {
        max_attempts: 5,
        cooldown: CooldownOptions {
            base_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        },
    };
    let client = KeyServerClient::new(Duration::from_secs(5)).unwrap().with_retry(retry);

    let started = std::time::Instant::now();
    let err = client.fetch("not a url", "key-malformed").await.unwrap_err();

    assert!(!err.is_retryable(), "{:?}", err);
    assert!(matches!(err, KeyFetchError::HttpError(ref e) if e.is_builder()), "{:?}", err);
    assert!(started.elapsed() < Duration::from_secs(5));
}
