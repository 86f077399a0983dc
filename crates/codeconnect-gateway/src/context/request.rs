use codeconnect_core::identity::AuthState;

use crate::auth::AuthResolver;
use crate::dispatch::RouteKind;
use crate::policy::OriginDecision;

/// Ephemeral state for one request: declared origin, deferred auth and the
/// matched route. Never shared across requests.
#[derive(Clone)]
pub struct RequestContext {
    pub origin: OriginDecision,
    pub auth: AuthResolver,
    pub route: RouteKind,
}

impl RequestContext {
    pub fn new(origin: OriginDecision, auth: AuthResolver, route: RouteKind) -> Self {
        Self {
            origin,
            auth,
            route,
        }
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.origin()
    }

    /// Resolve the caller's identity. Handlers decide what `Unauthenticated`
    /// means for them.
    pub async fn resolve_auth(&self) -> AuthState {
        self.auth.resolve().await
    }
}
