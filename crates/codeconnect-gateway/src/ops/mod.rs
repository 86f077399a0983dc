//! Built-in health responders.
//!
//! - `/`       : `{"msg":"API is up and running"}`
//! - `/health` : `{"msg":"API is healthy"}`
//!
//! Both are static and never resolve auth.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub const ROOT_MSG: &str = "API is up and running";
pub const HEALTH_MSG: &str = "API is healthy";

pub fn root() -> Response {
    (StatusCode::OK, Json(json!({ "msg": ROOT_MSG }))).into_response()
}

pub fn health() -> Response {
    (StatusCode::OK, Json(json!({ "msg": HEALTH_MSG }))).into_response()
}
