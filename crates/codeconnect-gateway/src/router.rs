//! Axum router wiring.
//!
//! Every path goes through the same pipeline and lands in the dispatcher,
//! which owns the route table.

use axum::Router;

use crate::{app_state::AppState, dispatch, pipeline};

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .fallback(dispatch::dispatch)
        .with_state(state.clone());
    pipeline::apply(router, &state)
}
