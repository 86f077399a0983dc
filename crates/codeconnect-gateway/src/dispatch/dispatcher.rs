use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::Method,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use codeconnect_core::error::{GatewayError, Result};

use super::table::{RouteKind, RouteTable};
use crate::app_state::AppState;
use crate::auth::AuthResolver;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::ops;
use crate::pipeline::{self, Stage};
use crate::policy::OriginDecision;

/// A group of handlers mounted under one prefix (chat, sessions, event
/// bridge). Receives the request unmodified apart from the extensions the
/// pipeline attached.
#[async_trait]
pub trait HandlerGroup: Send + Sync {
    fn name(&self) -> &'static str;
    async fn handle(&self, ctx: RequestContext, req: Request) -> Result<Response>;
}

pub type StaticBundle = ServeDir<ServeFile>;

/// Route table plus the handler groups registered against it.
pub struct Dispatcher {
    table: RouteTable,
    groups: DashMap<RouteKind, Arc<dyn HandlerGroup>>,
    static_bundle: Option<StaticBundle>,
}

impl Dispatcher {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            groups: DashMap::new(),
            static_bundle: None,
        }
    }

    pub fn register(&self, route: RouteKind, group: Arc<dyn HandlerGroup>) {
        self.groups.insert(route, group);
    }

    pub fn set_static_bundle(&mut self, bundle: StaticBundle) {
        self.static_bundle = Some(bundle);
    }

    pub fn serves_static_bundle(&self) -> bool {
        self.static_bundle.is_some()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Group routes in the table with nothing registered.
    pub fn unregistered_routes(&self) -> Vec<RouteKind> {
        self.table
            .group_routes()
            .filter(|k| !self.groups.contains_key(k))
            .collect()
    }

    fn group(&self, route: RouteKind) -> Option<Arc<dyn HandlerGroup>> {
        self.groups.get(&route).map(|g| Arc::clone(g.value()))
    }

    async fn unmatched(&self, req: Request) -> Response {
        let is_read = matches!(*req.method(), Method::GET | Method::HEAD);
        if let (Some(bundle), true) = (&self.static_bundle, is_read) {
            return match bundle.clone().oneshot(req).await {
                Ok(resp) => resp.into_response(),
                Err(never) => match never {},
            };
        }
        let path = req.uri().path().to_string();
        ApiError(GatewayError::NotFound(path)).into_response()
    }
}

/// Final pipeline stage: route the request.
pub async fn dispatch(State(state): State<AppState>, req: Request) -> Response {
    let Some(auth) = req.extensions().get::<AuthResolver>().cloned() else {
        return pipeline::order_violation(Stage::Dispatch, Stage::AuthAttach);
    };
    let origin = req
        .extensions()
        .get::<OriginDecision>()
        .cloned()
        .unwrap_or(OriginDecision::Absent);

    let dispatcher = state.dispatcher();
    let is_get = matches!(*req.method(), Method::GET | Method::HEAD);

    match dispatcher.table().resolve(req.uri().path()) {
        Some(RouteKind::Root) if is_get => ops::root(),
        Some(RouteKind::Health) if is_get => ops::health(),
        Some(route) if route.is_group() => {
            let Some(group) = dispatcher.group(route) else {
                return ApiError(GatewayError::Internal(format!(
                    "no handler group for {}",
                    route.as_str()
                )))
                .into_response();
            };
            let path = req.uri().path().to_string();
            let ctx = RequestContext::new(origin, auth, route);
            let origin_for_log = ctx.origin().unwrap_or("-").to_string();

            match group.handle(ctx, req).await {
                Ok(resp) => resp,
                Err(e) => {
                    if e.client_code().http_status() >= 500 {
                        tracing::error!(group = group.name(), %path, origin = %origin_for_log, error = %e, "handler group failed");
                    } else {
                        tracing::debug!(group = group.name(), %path, origin = %origin_for_log, error = %e, "handler group refused request");
                    }
                    ApiError(e).into_response()
                }
            }
        }
        _ => dispatcher.unmatched(req).await,
    }
}
