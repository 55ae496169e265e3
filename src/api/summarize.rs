use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::validation::{validate, ERR_INVALID_LENGTH};
use crate::models::summary::{SummaryLength, SummaryRequest};
use crate::state::AppState;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
struct SummarizeBody {
    #[serde(default)]
    text: String,
    #[serde(default)]
    length: Option<String>,
}

pub async fn summarize(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = parse_request(&body)?;
    let result = state
        .engine
        .generate_summary(&request)
        .await
        .map_err(ApiError::Model)?;

    Ok((
        StatusCode::OK,
        Json(json!({"success": true, "data": result})),
    ))
}

fn parse_request(body: &[u8]) -> Result<SummaryRequest, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::MissingBody)?;
    match &value {
        Value::Object(map) if !map.is_empty() => {}
        _ => return Err(ApiError::MissingBody),
    }

    let body: SummarizeBody =
        serde_json::from_value(value).map_err(|e| ApiError::MalformedRequest(e.to_string()))?;

    let text = body.text.trim().to_string();
    let length = body
        .length
        .unwrap_or_else(|| SummaryLength::default().as_str().to_string())
        .trim()
        .to_lowercase();

    if let Some(first) = validate(&text, &length).into_iter().next() {
        return Err(ApiError::Validation(first));
    }
    let length = SummaryLength::parse(&length)
        .ok_or_else(|| ApiError::Validation(ERR_INVALID_LENGTH.to_string()))?;

    Ok(SummaryRequest { text, length })
}
