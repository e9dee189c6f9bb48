use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use snip_cache::{BestEffortCache, CachePolicy, MokaUrlCache, UrlCache};
use snip_core::Repository;
use snip_gateway::{App, AppState};
use snip_generator::RandomGenerator;
use snip_redirector::RedirectorService;
use snip_shortener::{ShortenerConfig, ShortenerService};
use snip_storage::InMemoryRepository;
use snip_test_infra::doubles::{
    CountingRepository, RacingRepository, UnavailableCache, UnavailableRepository,
};
use std::sync::Arc;
use tower::ServiceExt;

const BASE_URL: &str = "https://sn.ip";

fn app<R, C>(repository: R, cache: C) -> Router
where
    R: Repository + Clone,
    C: UrlCache + Clone,
{
    let policy = CachePolicy::default();
    let shortener = ShortenerService::new(
        repository.clone(),
        RandomGenerator::default(),
        BestEffortCache::new(cache.clone(), policy),
        ShortenerConfig::default(),
    );
    let redirector = RedirectorService::new(repository, BestEffortCache::new(cache, policy));
    App::router(AppState::new(
        Arc::new(shortener),
        Arc::new(redirector),
        BASE_URL,
    ))
}

fn shorten_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/shorten")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn response_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn shorten(app: &Router, long_url: &str) -> Value {
    let response = app
        .clone()
        .oneshot(shorten_request(json!({ "long_url": long_url }).to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response.into_body()).await
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(InMemoryRepository::new(), MokaUrlCache::new());

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response.into_body()).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn shorten_returns_code_and_short_url() {
    let app = app(InMemoryRepository::new(), MokaUrlCache::new());

    let body = shorten(&app, "https://example.com/some/long/path?q=1").await;

    let code = body["short_code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
    assert_eq!(body["short_url"], format!("{BASE_URL}/{code}"));
    assert_eq!(body["long_url"], "https://example.com/some/long/path?q=1");
}

#[tokio::test]
async fn short_code_redirects_to_long_url() {
    let app = app(InMemoryRepository::new(), MokaUrlCache::new());
    let body = shorten(&app, "https://example.com/target").await;
    let code = body["short_code"].as_str().unwrap();

    let response = app.oneshot(get(&format!("/{code}"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/target"
    );
}

#[tokio::test]
async fn redirect_after_shorten_is_served_from_cache() {
    let repo = CountingRepository::new(InMemoryRepository::new());
    let app = app(repo.clone(), MokaUrlCache::new());
    let body = shorten(&app, "https://example.com").await;
    let code = body["short_code"].as_str().unwrap();

    let response = app.oneshot(get(&format!("/{code}"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(repo.gets(), 0);
}

#[tokio::test]
async fn repeated_shortens_of_one_url_yield_distinct_codes() {
    let app = app(InMemoryRepository::new(), MokaUrlCache::new());

    let first = shorten(&app, "https://example.com").await;
    let second = shorten(&app, "https://example.com").await;

    assert_ne!(first["short_code"], second["short_code"]);
}

#[tokio::test]
async fn unknown_code_is_404() {
    let app = app(InMemoryRepository::new(), MokaUrlCache::new());

    for uri in ["/abc123", "/______"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response_json(response.into_body()).await;
        assert_eq!(body["error"], "Not Found");
    }
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = app(InMemoryRepository::new(), MokaUrlCache::new());

    let response = app.oneshot(get("/a/b/c")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(response.into_body()).await["error"], "Not Found");
}

#[tokio::test]
async fn invalid_bodies_are_400() {
    let app = app(InMemoryRepository::new(), MokaUrlCache::new());
    let bodies = [
        "{not json".to_string(),
        json!({}).to_string(),
        json!({ "long_url": 42 }).to_string(),
        json!({ "long_url": "" }).to_string(),
        json!({ "long_url": "   " }).to_string(),
    ];

    for body in bodies {
        let response = app.clone().oneshot(shorten_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response.into_body()).await;
        assert_eq!(body["error"], "Bad Request");
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn url_that_cannot_be_a_location_header_is_400() {
    let repo = CountingRepository::new(InMemoryRepository::new());
    let app = app(repo.clone(), MokaUrlCache::new());

    let response = app
        .oneshot(shorten_request(
            json!({ "long_url": "https://example.com/a\nb" }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(repo.inserts(), 0);
}

#[tokio::test]
async fn every_accepted_url_redirects_verbatim() {
    let app = app(InMemoryRepository::new(), MokaUrlCache::new());
    let long_url = "https://example.com/caf\u{e9}?q=a b&r=\"x\"";
    let body = shorten(&app, long_url).await;
    let code = body["short_code"].as_str().unwrap();

    let response = app.oneshot(get(&format!("/{code}"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION].as_bytes(),
        long_url.as_bytes()
    );
}

#[tokio::test]
async fn missing_content_type_is_400() {
    let app = app(InMemoryRepository::new(), MokaUrlCache::new());
    let request = Request::builder()
        .method("POST")
        .uri("/api/shorten")
        .body(Body::from(json!({ "long_url": "https://example.com" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_key_is_retried_transparently() {
    let repo = RacingRepository::new(InMemoryRepository::new(), 1);
    let app = app(repo, MokaUrlCache::new());

    let body = shorten(&app, "https://example.com").await;
    let code = body["short_code"].as_str().unwrap();

    let response = app.oneshot(get(&format!("/{code}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn cache_outage_does_not_affect_results() {
    let cache = UnavailableCache::new();
    let app = app(InMemoryRepository::new(), cache.clone());

    let body = shorten(&app, "https://example.com").await;
    let code = body["short_code"].as_str().unwrap();
    let found = app.clone().oneshot(get(&format!("/{code}"))).await.unwrap();
    let missing = app.oneshot(get("/zzzzzz")).await.unwrap();

    assert_eq!(found.status(), StatusCode::FOUND);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(cache.calls() > 0);
}

#[tokio::test]
async fn store_outage_is_503_never_404() {
    let app = app(UnavailableRepository, MokaUrlCache::new());

    let shorten = app
        .clone()
        .oneshot(shorten_request(json!({ "long_url": "https://example.com" }).to_string()))
        .await
        .unwrap();
    let redirect = app.oneshot(get("/abc123")).await.unwrap();

    assert_eq!(shorten.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(redirect.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response_json(redirect.into_body()).await["error"],
        "Service Unavailable"
    );
}
