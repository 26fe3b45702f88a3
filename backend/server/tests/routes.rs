//! Gateway routes exercised through `oneshot`, backed either by an unreachable API (catalog
//! content only) or by a local axum stand-in.
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    routing::get,
};
use catalog::Catalog;
use http_body_util::BodyExt;
use resolver::config::Config as ResolverConfig;
use serde_json::{Value, json};
use server::{build_router, config::Config, state::AppState};
use tokio::net::TcpListener;
use tower::ServiceExt;

const TOKEN: &str = "s3cret";

async fn unreachable() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{addr}")
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}

fn gateway(api_base: &str, admin_token: Option<&str>) -> Router {
    let config = Config {
        port: 0,
        admin_token: admin_token.map(str::to_string),
        resolver: ResolverConfig {
            contact_fallback_delay: Duration::from_millis(10),
            ..ResolverConfig::with_api_base(api_base)
        },
    };

    build_router(AppState::with_config(config))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

    send(router, request).await
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(router, request).await
}

async fn invalidate(router: &Router, uri: &str, token: Option<&str>) -> StatusCode {
    let mut request = Request::builder().method(Method::POST).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    send(router, request.body(Body::empty()).unwrap()).await.0
}

#[tokio::test]
async fn test_pillars_fall_back_to_catalog() {
    let router = gateway(&unreachable().await, None);

    let (status, body) = get_json(&router, "/content/pillars").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::to_value(&Catalog::embedded().pillars).unwrap());
}

#[tokio::test]
async fn test_pillar_lookup_by_slug() {
    let router = gateway(&unreachable().await, None);

    let (status, body) = get_json(&router, "/content/pillars/AI%20+%20Data%20Services").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "AI + Data Services");

    let (status, body) = get_json(&router, "/content/pillars/cybersecurity-services").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["serviceDetails"].as_array().map(Vec::len), Some(17));

    let (status, body) = get_json(&router, "/content/pillars/quantum").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Pillar quantum not found");
}

#[tokio::test]
async fn test_service_lookup_by_slug() {
    let router = gateway(&unreachable().await, None);

    let (status, body) = get_json(
        &router,
        "/content/pillars/cybersecurity-services/services/soc-as-a-service",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "SOC-as-a-Service");

    let (status, _) = get_json(
        &router,
        "/content/pillars/cybersecurity-services/services/cloud-migration",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_insight_lookup_by_slug() {
    let router = gateway(&unreachable().await, None);

    let (status, body) = get_json(&router, "/content/insights/popia-compliance-checklist").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "Guide");
}

#[tokio::test]
async fn test_lists_merge_remote_content() {
    let api = Router::new().route(
        "/api/partners",
        get(|| async { Json(json!([{ "name": "microsoft", "category": "Cloud" }, { "name": "Okta" }])) }),
    );
    let router = gateway(&serve(api).await, None);

    let (status, body) = get_json(&router, "/content/partners").await;
    let partners = body.as_array().unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(partners.len(), Catalog::embedded().partners.len() + 1);
    assert_eq!(partners[0]["category"], "Cloud");
    assert_eq!(partners[0]["logo"], "/images/partners/microsoft.svg");
    assert_eq!(partners.last().unwrap()["name"], "Okta");
}

#[tokio::test]
async fn test_employees_and_photos_are_empty_without_api() {
    let router = gateway(&unreachable().await, None);

    assert_eq!(get_json(&router, "/content/employees").await.1, json!([]));
    assert_eq!(get_json(&router, "/content/photos").await.1, json!([]));
}

#[tokio::test]
async fn test_status_never_fails() {
    let router = gateway(&unreachable().await, None);

    let (status, body) = get_json(&router, "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
}

#[tokio::test]
async fn test_contact_simulated_when_api_down() {
    let router = gateway(&unreachable().await, None);

    let (status, body) = post_json(
        &router,
        "/contact",
        json!({ "name": "Sipho", "email": "sipho@example.com", "message": "Hi" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "delivered": false, "outcome": "simulated" }));
}

#[tokio::test]
async fn test_contact_validation_errors() {
    let router = gateway(&unreachable().await, None);

    let (status, body) = post_json(
        &router,
        "/contact",
        json!({ "name": "Sipho", "email": "sipho", "message": "Hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Please enter a valid email address");

    let (status, _) = post_json(&router, "/contact", json!({ "name": "Sipho" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalidation_requires_token() {
    let disabled = gateway(&unreachable().await, None);
    assert_eq!(
        invalidate(&disabled, "/cache/invalidate", Some(TOKEN)).await,
        StatusCode::FORBIDDEN
    );

    let router = gateway(&unreachable().await, Some(TOKEN));
    assert_eq!(
        invalidate(&router, "/cache/invalidate", None).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        invalidate(&router, "/cache/invalidate", Some("wrong")).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        invalidate(&router, "/cache/invalidate", Some(TOKEN)).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        invalidate(&router, "/cache/invalidate/services", Some(TOKEN)).await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_invalidation_refetches_kind() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let api = Router::new().route(
        "/api/insights",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!([{ "title": "Zero Trust in Practice", "category": "Blog" }]))
            }
        }),
    );
    let router = gateway(&serve(api).await, Some(TOKEN));

    get_json(&router, "/content/insights").await;
    get_json(&router, "/content/insights").await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    assert_eq!(
        invalidate(&router, "/cache/invalidate/insights", Some(TOKEN)).await,
        StatusCode::NO_CONTENT
    );

    let (_, body) = get_json(&router, "/content/insights/zero-trust-in-practice").await;
    assert_eq!(body["category"], "Blog");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
