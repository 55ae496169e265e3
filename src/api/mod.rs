use axum::body::Body;
use axum::extract::{DefaultBodyLimit, OriginalUri, State};
use axum::http::{
    header::{HeaderName, ACCEPT, CONTENT_TYPE, ORIGIN},
    Request, StatusCode,
};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span};

use crate::core::time::now_rfc3339;
use crate::state::AppState;

pub mod error;
pub mod rate_limit;
pub mod summarize;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
static INDEX_HTML: &str = include_str!("../../static/index.html");

pub fn router(state: AppState) -> Router {
    let allowed_headers = [
        ACCEPT,
        CONTENT_TYPE,
        ORIGIN,
        HeaderName::from_static("x-requested-with"),
        HeaderName::from_static("x-request-id"),
    ];

    let cors = if state.config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(allowed_headers)
            .allow_methods(Any)
            .allow_credentials(false)
    } else {
        let origins = state
            .config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect::<Vec<_>>();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_headers(allowed_headers)
            .allow_methods(Any)
            .allow_credentials(true)
    };

    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let request_id = req
                .headers()
                .get(&REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();
            info_span!(
                "http.request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
                request_id = %request_id
            )
        })
        .on_request(|_req: &Request<Body>, _span: &tracing::Span| {
            info!("request.start");
        })
        .on_response(
            |res: &Response, latency: std::time::Duration, _span: &tracing::Span| {
                info!(status = %res.status(), latency_ms = %latency.as_millis(), "request.end");
            },
        )
        .on_failure(|err, latency: std::time::Duration, _span: &tracing::Span| {
            error!(error = %err, latency_ms = %latency.as_millis(), "request.failure");
        });

    let summarize_routes = Router::new()
        .route("/api/summarize", post(summarize::summarize))
        .route_layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit::enforce,
        ));

    let body_limit = state.config.max_content_length;

    Router::new()
        .merge(summarize_routes)
        .route("/api/health", get(health))
        .route("/api/stats", get(stats))
        .route("/", get(root))
        .fallback(fallback_404)
        .with_state(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(trace)
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER.clone()))
        .layer(SetRequestIdLayer::new(
            REQUEST_ID_HEADER.clone(),
            MakeRequestUuid,
        ))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let summarizer = state.engine.summarizer();
    match summarizer.ensure_loaded().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "model_loaded": summarizer.is_model_loaded(),
                "redis": state.store_status(),
                "timestamp": now_rfc3339(),
            })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "unhealthy", "error": err})),
        ),
    }
}

async fn stats(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let Some(store) = state.store.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "Redis not available"})),
        );
    };

    let collected = async {
        let cache_keys = store.size().await?;
        let info = store.info().await?;
        Ok::<_, crate::store::StoreError>((cache_keys, info))
    }
    .await;

    match collected {
        Ok((cache_keys, info)) => (
            StatusCode::OK,
            Json(json!({
                "backend": store.name(),
                "cache_keys": cache_keys,
                "memory_used": info.memory_used,
                "connected_clients": info.connected_clients,
            })),
        ),
        Err(err) => {
            error!("[STATS] store diagnostics failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": err.to_string()})),
            )
        }
    }
}

async fn root() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn fallback_404(uri: OriginalUri) -> impl IntoResponse {
    let path = uri.0.path().to_string();
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "message": "The requested resource does not exist",
                "path": path
            }
        })),
    )
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::extract::ConnectInfo;
    use axum::http::Method;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::services::summary::testing::{sample_text, FailingLoader, StaticLoader};
    use crate::services::summary::ModelLoader;
    use crate::store::testing::UnreachableStore;
    use crate::store::{MemoryStore, SharedStore};

    fn app(store: Option<SharedStore>, loader: Arc<dyn ModelLoader>) -> Router {
        router(AppState::new(Config::default(), store, loader))
    }

    fn summarize_request(body: Value, client: [u8; 4]) -> Request<Body> {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/api/summarize")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((client, 40000))));
        request
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn identical_requests_hit_cache_on_second_call() {
        let loader = Arc::new(StaticLoader::new("A compact summary."));
        let app = app(Some(Arc::new(MemoryStore::new())), loader.clone());
        let body = json!({"text": sample_text(50), "length": "short"});

        let (status, first) = send(&app, summarize_request(body.clone(), [10, 0, 0, 1])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["success"], true);
        assert_eq!(first["data"]["cached"], false);
        assert_eq!(first["data"]["original_word_count"], 50);

        let (status, second) = send(&app, summarize_request(body, [10, 0, 0, 1])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["data"]["cached"], true);
        assert_eq!(second["data"]["summary"], first["data"]["summary"]);
        assert_eq!(loader.model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn eleventh_request_in_window_is_rate_limited() {
        let loader = Arc::new(StaticLoader::new("Summary."));
        let app = app(Some(Arc::new(MemoryStore::new())), loader);
        let body = json!({"text": sample_text(30)});

        for _ in 0..10 {
            let (status, _) = send(&app, summarize_request(body.clone(), [10, 0, 0, 2])).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, rejected) = send(&app, summarize_request(body.clone(), [10, 0, 0, 2])).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(rejected["error"], "Rate limit exceeded");
        assert_eq!(rejected["message"], "Max 10 requests per 60s");

        let (status, _) = send(&app, summarize_request(body, [10, 0, 0, 3])).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_attempts_count_against_the_window() {
        let loader = Arc::new(StaticLoader::new("Summary."));
        let app = app(Some(Arc::new(MemoryStore::new())), loader);

        for _ in 0..10 {
            let (status, _) =
                send(&app, summarize_request(json!({"text": "short"}), [10, 0, 0, 4])).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        let (status, _) = send(
            &app,
            summarize_request(json!({"text": sample_text(30)}), [10, 0, 0, 4]),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn unreachable_store_fails_open_without_caching() {
        let loader = Arc::new(StaticLoader::new("Still works."));
        let app = app(Some(Arc::new(UnreachableStore)), loader.clone());
        let body = json!({"text": sample_text(30)});

        for _ in 0..12 {
            let (status, value) =
                send(&app, summarize_request(body.clone(), [10, 0, 0, 5])).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(value["data"]["cached"], false);
        }
        assert_eq!(loader.model.calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn validation_and_body_errors_return_400() {
        let app = app(None, Arc::new(StaticLoader::new("unused")));

        let (status, value) =
            send(&app, summarize_request(json!({"text": "only a few words"}), [10, 0, 0, 6])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Text too short (minimum 30 words)");

        let (status, value) = send(
            &app,
            summarize_request(json!({"text": sample_text(30), "length": "huge"}), [10, 0, 0, 6]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Invalid length option");

        let (status, value) = send(&app, summarize_request(json!({}), [10, 0, 0, 6])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "No JSON data provided");
    }

    #[tokio::test]
    async fn model_failure_returns_500_with_message() {
        let app = app(None, Arc::new(FailingLoader::default()));
        let (status, value) =
            send(&app, summarize_request(json!({"text": sample_text(30)}), [10, 0, 0, 7])).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Internal server error");
        assert!(value["message"]
            .as_str()
            .unwrap_or_default()
            .contains("model unavailable"));
    }

    #[tokio::test]
    async fn health_reports_model_and_store_state() {
        let app_without_store = app(None, Arc::new(StaticLoader::new("ok")));
        let (status, value) = send(&app_without_store, get_request("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["model_loaded"], true);
        assert_eq!(value["redis"], "disconnected");

        let app_with_store = app(
            Some(Arc::new(MemoryStore::new())),
            Arc::new(StaticLoader::new("ok")),
        );
        let (_, value) = send(&app_with_store, get_request("/api/health")).await;
        assert_eq!(value["redis"], "connected");

        let broken = app(None, Arc::new(FailingLoader::default()));
        let (status, value) = send(&broken, get_request("/api/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(value["status"], "unhealthy");
    }

    #[tokio::test]
    async fn stats_reflect_store_availability() {
        let without_store = app(None, Arc::new(StaticLoader::new("ok")));
        let (status, value) = send(&without_store, get_request("/api/stats")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(value["error"], "Redis not available");

        let store: SharedStore = Arc::new(MemoryStore::new());
        let with_store = app(Some(store), Arc::new(StaticLoader::new("ok")));
        send(
            &with_store,
            summarize_request(json!({"text": sample_text(30)}), [10, 0, 0, 8]),
        )
        .await;
        let (status, value) = send(&with_store, get_request("/api/stats")).await;
        assert_eq!(status, StatusCode::OK);
        // one rate-limit counter plus one cached summary
        assert_eq!(value["cache_keys"], 2);
        assert_eq!(value["connected_clients"], 1);

        let failing = app(Some(Arc::new(UnreachableStore)), Arc::new(StaticLoader::new("ok")));
        let (status, _) = send(&failing, get_request("/api/stats")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn serves_index_and_unknown_routes() {
        let app = app(None, Arc::new(StaticLoader::new("ok")));

        let response = app.clone().oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, value) = send(&app, get_request("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["error"]["path"], "/api/nope");
    }
}
