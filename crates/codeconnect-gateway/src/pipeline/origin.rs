use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

/// Stage 1: record the origin decision. Headers and preflights are produced
/// by the policy's `CorsLayer`, which wraps this stage.
///
/// A rejected origin is not a server fault: the request runs, the browser
/// withholds the response from the caller.
pub async fn origin_stage(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let decision = state
        .origin_policy()
        .evaluate(req.headers().get(header::ORIGIN));

    if let Some(origin) = decision.origin().filter(|_| decision.is_rejected()) {
        tracing::warn!(
            %origin,
            path = %req.uri().path(),
            method = %req.method(),
            "cors policy rejected origin"
        );
    }

    req.extensions_mut().insert(decision);
    next.run(req).await
}
