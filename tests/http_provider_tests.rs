/// HTTP settings provider tests
///
/// Runs the provider against a fake cluster served by axum on a random port.
/// Run with: cargo test --test http_provider_tests

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use shardroute::{
    ClusterConfig, HttpSettingsProvider, IndexSettings, RoutingError, SettingsProvider,
    ShardRouter,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const EXPECTED_FILTER: &str =
    "index.number_of_shards,index.routing_partition_size,index.number_of_routing_shards";

#[derive(Clone, Default)]
struct FakeCluster {
    hits: Arc<AtomicUsize>,
}

async fn index_settings(
    State(cluster): State<FakeCluster>,
    Path((index, filter)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    cluster.hits.fetch_add(1, Ordering::SeqCst);

    if filter != EXPECTED_FILTER {
        return (StatusCode::BAD_REQUEST, "unexpected settings filter").into_response();
    }

    match index.as_str() {
        "logs" => Json(json!({
            "logs": {"settings": {"index": {
                "number_of_shards": "3",
                "routing_partition_size": "2"
            }}}
        }))
        .into_response(),
        "defaults" => Json(json!({"defaults": {"settings": {}}})).into_response(),
        "zero" => Json(json!({
            "zero": {"settings": {"index": {"number_of_shards": "0"}}}
        }))
        .into_response(),
        "secured" => {
            let authorized = headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                == Some("Basic ZWxhc3RpYzpzZWNyZXQ=");
            if authorized {
                Json(json!({
                    "secured": {"settings": {"index": {"number_of_shards": "2"}}}
                }))
                .into_response()
            } else {
                StatusCode::UNAUTHORIZED.into_response()
            }
        }
        "forbidden" => StatusCode::FORBIDDEN.into_response(),
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "garbage" => "not json".into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"slow": {"settings": {}}})).into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"type": "index_not_found_exception"}, "status": 404})),
        )
            .into_response(),
    }
}

async fn spawn_cluster() -> (String, FakeCluster) {
    let cluster = FakeCluster::default();
    let app = Router::new()
        .route("/:index/_settings/:filter", get(index_settings))
        .with_state(cluster.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), cluster)
}

fn provider_for(base_url: &str) -> HttpSettingsProvider {
    HttpSettingsProvider::new(ClusterConfig::new(base_url)).unwrap()
}

#[tokio::test]
async fn test_fetches_string_encoded_settings() {
    let (url, _) = spawn_cluster().await;
    let settings = provider_for(&url).fetch_settings("logs").await.unwrap();
    assert_eq!(settings, IndexSettings::new(3, 2));
}

#[tokio::test]
async fn test_omitted_fields_take_defaults() {
    let (url, _) = spawn_cluster().await;
    let settings = provider_for(&url).fetch_settings("defaults").await.unwrap();
    assert_eq!(settings, IndexSettings::new(5, 1));
}

#[tokio::test]
async fn test_unknown_index_is_missing() {
    let (url, _) = spawn_cluster().await;
    let err = provider_for(&url).fetch_settings("ghost").await.unwrap_err();
    assert_eq!(err, RoutingError::missing("ghost"));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let (url, _) = spawn_cluster().await;
    let err = provider_for(&url).fetch_settings("broken").await.unwrap_err();
    assert!(matches!(err, RoutingError::SettingsUnavailable { .. }), "{err:?}");
}

#[tokio::test]
async fn test_undecodable_body_is_unavailable() {
    let (url, _) = spawn_cluster().await;
    let err = provider_for(&url).fetch_settings("garbage").await.unwrap_err();
    assert!(matches!(err, RoutingError::SettingsUnavailable { .. }), "{err:?}");
}

#[tokio::test]
async fn test_basic_auth_is_sent() {
    let (url, _) = spawn_cluster().await;

    let anonymous = provider_for(&url).fetch_settings("secured").await.unwrap_err();
    assert!(matches!(anonymous, RoutingError::Config(_)), "{anonymous:?}");
    assert!(!anonymous.is_retryable());

    let config = ClusterConfig::new(&url).credentials("elastic", "secret");
    let provider = HttpSettingsProvider::new(config).unwrap();
    assert_eq!(
        provider.fetch_settings("secured").await.unwrap(),
        IndexSettings::new(2, 1)
    );
}

#[tokio::test]
async fn test_forbidden_is_not_retryable() {
    let (url, _) = spawn_cluster().await;
    let config = ClusterConfig::new(&url).credentials("reader", "wrong");
    let provider = HttpSettingsProvider::new(config).unwrap();

    let err = provider.fetch_settings("forbidden").await.unwrap_err();
    assert!(matches!(err, RoutingError::Config(_)), "{err:?}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_credentials_from_url() {
    let (url, _) = spawn_cluster().await;
    let with_credentials = url.replacen("http://", "http://elastic:secret@", 1);

    let provider = HttpSettingsProvider::new(ClusterConfig::from_url(&with_credentials).unwrap()).unwrap();
    assert_eq!(provider.fetch_settings("secured").await.unwrap().number_of_shards, 2);
}

#[tokio::test]
async fn test_request_timeout_is_unavailable() {
    let (url, _) = spawn_cluster().await;
    let config = ClusterConfig::new(&url).request_timeout(Duration::from_millis(100));
    let provider = HttpSettingsProvider::new(config).unwrap();

    let err = provider.fetch_settings("slow").await.unwrap_err();
    assert!(err.is_retryable(), "{err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = provider_for(&format!("http://{}", addr))
        .fetch_settings("logs")
        .await
        .unwrap_err();
    assert!(matches!(err, RoutingError::SettingsUnavailable { .. }), "{err:?}");
}

#[tokio::test]
async fn test_router_over_http_fetches_once() {
    let (url, cluster) = spawn_cluster().await;
    let router = ShardRouter::new(Arc::new(provider_for(&url)));

    for i in 0..20 {
        let shard = router
            .shard_number("logs", &format!("doc-{}", i), "tenant-a")
            .await
            .unwrap();
        assert!(shard < 3);
    }
    assert_eq!(cluster.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_router_rejects_zero_shards_from_cluster() {
    let (url, _) = spawn_cluster().await;
    let router = ShardRouter::new(Arc::new(provider_for(&url)));

    let err = router.shard_number("zero", "a", "a").await.unwrap_err();
    assert!(matches!(err, RoutingError::InvalidSettings { .. }), "{err:?}");
}
