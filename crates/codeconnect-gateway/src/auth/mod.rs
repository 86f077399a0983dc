//! Authentication gate.
//!
//! The gate attaches an `AuthResolver` to every request and never rejects.
//! Identity is looked up only when a handler calls `resolve()`, and at most
//! once per request.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use tokio::sync::OnceCell;

use codeconnect_core::error::Result;
use codeconnect_core::identity::{AuthState, Identity};

pub use self::http::HttpIdentityProvider;

/// Session cookie set by the identity provider's browser SDK.
pub const SESSION_COOKIE: &str = "__session";

/// Verifies bearer tokens against an identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify `token`. Any error means the caller is unauthenticated.
    async fn verify(&self, token: &str) -> Result<Identity>;
}

/// Deferred, memoized identity lookup for one request.
#[derive(Clone)]
pub struct AuthResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    provider: Arc<dyn IdentityProvider>,
    token: Option<String>,
    resolved: OnceCell<AuthState>,
}

impl AuthResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>, token: Option<String>) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                provider,
                token,
                resolved: OnceCell::new(),
            }),
        }
    }

    pub fn from_headers(provider: Arc<dyn IdentityProvider>, headers: &HeaderMap) -> Self {
        Self::new(provider, extract_token(headers))
    }

    /// Whether the request carried any credential at all.
    pub fn has_credentials(&self) -> bool {
        self.inner.token.is_some()
    }

    pub async fn resolve(&self) -> AuthState {
        self.inner
            .resolved
            .get_or_init(|| async {
                let Some(token) = self.inner.token.as_deref() else {
                    return AuthState::Unauthenticated;
                };
                match self.inner.provider.verify(token).await {
                    Ok(identity) => AuthState::Authenticated(identity),
                    Err(e) => {
                        tracing::debug!(error = %e, "token verification failed");
                        AuthState::Unauthenticated
                    }
                }
            })
            .await
            .clone()
    }
}

/// `Authorization: Bearer` first, then the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty());
    if let Some(t) = bearer {
        return Some(t.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
