use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::services::rate_limiter::{RateDecision, RateLimiter};

use super::error::ApiError;

const UNKNOWN_CLIENT: &str = "unknown";

/// Route layer: counts every attempt against the caller's window before the
/// handler sees the request.
pub async fn enforce(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Response {
    let client = client_id(&request);
    match limiter.allow(&client).await {
        RateDecision::Allowed => next.run(request).await,
        RateDecision::Rejected => ApiError::RateLimited {
            max_requests: limiter.max_requests(),
            window_secs: limiter.window().as_secs(),
        }
        .into_response(),
    }
}

fn client_id(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
