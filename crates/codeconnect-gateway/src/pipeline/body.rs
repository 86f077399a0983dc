use std::error::Error as StdError;

use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde_json::Value;

use codeconnect_core::error::GatewayError;

use super::Stage;
use crate::app_state::AppState;
use crate::error::ApiError;
use crate::policy::OriginDecision;

/// Body as seen by the body-parse stage.
#[derive(Debug, Clone, Default)]
pub struct ParsedBody {
    /// Parsed JSON when the request declared a JSON content type.
    pub json: Option<Value>,
    pub len: usize,
}

/// Stage 2: buffer the body within the configured limit and validate JSON.
/// The raw bytes are put back so downstream sees the body unchanged.
pub async fn body_stage(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.extensions().get::<OriginDecision>().is_none() {
        return super::order_violation(Stage::BodyParse, Stage::OriginPolicy);
    }

    let limit = state.cfg().body_limit_bytes;
    let (mut parts, body) = req.into_parts();

    let bytes = match body::to_bytes(body, limit).await {
        Ok(b) => b,
        Err(e) if is_length_limit(&e) => {
            tracing::debug!(path = %parts.uri.path(), limit, "request body over limit");
            return ApiError(GatewayError::PayloadTooLarge).into_response();
        }
        Err(e) => {
            return ApiError(GatewayError::BadRequest(format!("failed to read body: {e}")))
                .into_response();
        }
    };

    let json = if !bytes.is_empty() && is_json(&parts.headers) {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(v) => Some(v),
            Err(e) => {
                return ApiError(GatewayError::BadRequest(format!("malformed JSON body: {e}")))
                    .into_response();
            }
        }
    } else {
        None
    };

    parts.extensions.insert(ParsedBody {
        json,
        len: bytes.len(),
    });
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
