use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{ParsedBody, Stage};
use crate::app_state::AppState;
use crate::auth::AuthResolver;

/// Stage 3: attach the deferred auth resolver. Never rejects.
pub async fn auth_stage(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if req.extensions().get::<ParsedBody>().is_none() {
        return super::order_violation(Stage::AuthAttach, Stage::BodyParse);
    }

    let resolver = AuthResolver::from_headers(state.identity(), req.headers());
    req.extensions_mut().insert(resolver);
    next.run(req).await
}
