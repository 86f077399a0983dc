//! The request pipeline as an explicit, ordered list of stages.
//!
//! | # | Stage | Requires | Attaches |
//! |---|-------|----------|----------|
//! | 1 | origin policy | - | CORS headers, `OriginDecision` |
//! | 2 | body parse | `OriginDecision` | `ParsedBody` (body re-attached) |
//! | 3 | auth attach | `ParsedBody` | `AuthResolver` (never rejects) |
//! | 4 | dispatch | `AuthResolver` | - |
//!
//! Each stage checks its predecessor's marker and answers 500 if the order
//! was broken, so the order is enforced at runtime rather than implied by
//! layer registration.

pub mod auth;
pub mod body;
pub mod origin;

use axum::{
    extract::Request,
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use codeconnect_core::error::GatewayError;

use crate::app_state::AppState;
use crate::error::ApiError;

pub use body::ParsedBody;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OriginPolicy,
    BodyParse,
    AuthAttach,
    Dispatch,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [
        Stage::OriginPolicy,
        Stage::BodyParse,
        Stage::AuthAttach,
        Stage::Dispatch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::OriginPolicy => "origin_policy",
            Stage::BodyParse => "body_parse",
            Stage::AuthAttach => "auth_attach",
            Stage::Dispatch => "dispatch",
        }
    }

    pub fn predecessor(self) -> Option<Stage> {
        let idx = Self::ORDER.iter().position(|s| *s == self)?;
        idx.checked_sub(1).map(|i| Self::ORDER[i])
    }
}

/// Wrap `router` (whose handlers are the dispatch stage) with stages 1-3.
///
/// `ServiceBuilder` applies layers outermost first, so this reads in
/// execution order.
pub fn apply(router: Router, state: &AppState) -> Router {
    let stages = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                let origin = req
                    .headers()
                    .get(axum::http::header::ORIGIN)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    origin = %origin,
                )
            }),
        )
        // 1. origin policy
        .layer(state.origin_policy().cors_layer())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            origin::origin_stage,
        ))
        // 2. body parse
        .layer(middleware::from_fn_with_state(
            state.clone(),
            body::body_stage,
        ))
        // 3. auth attach
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_stage,
        ));

    router.layer(stages)
}

/// Answer for a request that reached `stage` without passing `missing`.
pub fn order_violation(stage: Stage, missing: Stage) -> Response {
    tracing::error!(
        stage = stage.name(),
        missing = missing.name(),
        "pipeline order violated"
    );
    ApiError(GatewayError::Internal(format!(
        "{} ran before {}",
        stage.name(),
        missing.name()
    )))
    .into_response()
}
