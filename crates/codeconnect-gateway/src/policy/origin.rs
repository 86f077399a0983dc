use std::sync::Arc;

use axum::http::{header::HeaderValue, request::Parts, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use codeconnect_core::error::{GatewayError, Result};

use crate::config::CorsConfig;

/// Methods a browser may use cross-origin.
const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::PUT,
    Method::PATCH,
    Method::POST,
    Method::DELETE,
];

/// Compiled origin policy. Construct once at startup, then share.
#[derive(Debug, Clone)]
pub enum OriginPolicy {
    /// Exact-match allow list; credentials per config.
    AllowList {
        origins: Arc<[String]>,
        allow_credentials: bool,
    },
    /// Any origin, never credentialed.
    AllowAny,
}

/// Per-request outcome of the origin check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    /// No `Origin` header (server-to-server, CLI tools).
    Absent,
    Allowed(String),
    /// Request still runs; the browser is denied the response.
    Rejected(String),
}

impl OriginDecision {
    pub fn origin(&self) -> Option<&str> {
        match self {
            OriginDecision::Absent => None,
            OriginDecision::Allowed(o) | OriginDecision::Rejected(o) => Some(o),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, OriginDecision::Rejected(_))
    }
}

impl OriginPolicy {
    pub fn from_config(cfg: &CorsConfig) -> Result<Self> {
        cfg.validate()?;
        if cfg.allow_any {
            if cfg.allow_credentials {
                return Err(GatewayError::Config(
                    "allow-any origin policy cannot be credentialed".into(),
                ));
            }
            return Ok(OriginPolicy::AllowAny);
        }
        Ok(OriginPolicy::AllowList {
            origins: cfg.allowed_origins.clone().into(),
            allow_credentials: cfg.allow_credentials,
        })
    }

    pub fn allows_credentials(&self) -> bool {
        match self {
            OriginPolicy::AllowList {
                allow_credentials, ..
            } => *allow_credentials,
            OriginPolicy::AllowAny => false,
        }
    }

    /// Whether a present `Origin` value may read the response.
    pub fn permits(&self, origin: &str) -> bool {
        match self {
            OriginPolicy::AllowAny => true,
            OriginPolicy::AllowList { origins, .. } => origins.iter().any(|o| o == origin),
        }
    }

    pub fn evaluate(&self, origin: Option<&HeaderValue>) -> OriginDecision {
        let Some(raw) = origin else {
            return OriginDecision::Absent;
        };
        match raw.to_str() {
            Ok(o) if self.permits(o) => OriginDecision::Allowed(o.to_string()),
            Ok(o) => OriginDecision::Rejected(o.to_string()),
            Err(_) => OriginDecision::Rejected(String::from_utf8_lossy(raw.as_bytes()).into_owned()),
        }
    }

    /// Header-producing layer for this policy; answers preflights itself.
    pub fn cors_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods(ALLOWED_METHODS)
            .allow_headers(AllowHeaders::mirror_request());

        match self {
            OriginPolicy::AllowAny => layer.allow_origin(AllowOrigin::any()),
            OriginPolicy::AllowList {
                allow_credentials, ..
            } => {
                let policy = self.clone();
                layer
                    .allow_origin(AllowOrigin::predicate(
                        move |origin: &HeaderValue, _parts: &Parts| {
                            origin.to_str().map(|o| policy.permits(o)).unwrap_or(false)
                        },
                    ))
                    .allow_credentials(*allow_credentials)
            }
        }
    }
}
