//! Shared application state.
//!
//! Built once from the resolved config and the injected collaborators.
//! Handlers read config from here, never from the environment.

use std::sync::Arc;
use std::time::Duration;

use tower_http::services::{ServeDir, ServeFile};

use codeconnect_core::error::{GatewayError, Result};
use codeconnect_core::events::FunctionTable;

use crate::auth::{HttpIdentityProvider, IdentityProvider};
use crate::bridge::{EventBridge, EventRuntime, HttpEventRuntime};
use crate::config::{self, GatewayConfig};
use crate::dispatch::{Dispatcher, HandlerGroup, RouteKind, RouteTable};
use crate::policy::OriginPolicy;
use crate::services::{UnavailableGroup, UpstreamGroup};

/// External collaborators the gateway delegates to.
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub event_runtime: Arc<dyn EventRuntime>,
    pub functions: FunctionTable,
    pub chat: Arc<dyn HandlerGroup>,
    pub sessions: Arc<dyn HandlerGroup>,
}

impl Collaborators {
    /// HTTP-backed collaborators described by `cfg`.
    pub fn from_config(cfg: &GatewayConfig) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.relay_timeout_ms);

        let chat: Arc<dyn HandlerGroup> = match &cfg.upstreams.chat {
            Some(url) => Arc::new(UpstreamGroup::new("chat", url.clone(), timeout)?),
            None => Arc::new(UnavailableGroup::new("chat")),
        };
        let sessions: Arc<dyn HandlerGroup> = match &cfg.upstreams.sessions {
            Some(url) => Arc::new(UpstreamGroup::new("sessions", url.clone(), timeout)?),
            None => Arc::new(UnavailableGroup::new("sessions")),
        };

        Ok(Self {
            identity: Arc::new(HttpIdentityProvider::new(&cfg.identity, timeout)?),
            event_runtime: Arc::new(HttpEventRuntime::new(&cfg.events, timeout)?),
            functions: config::load_functions(&cfg.events)?,
            chat,
            sessions,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    dispatcher: Arc<Dispatcher>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    origin_policy: OriginPolicy,
    identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can exit cleanly on misconfiguration.
    pub fn new(cfg: GatewayConfig, collaborators: Collaborators) -> Result<Self> {
        cfg.validate()?;

        // 1) Compile origin policy
        let origin_policy = OriginPolicy::from_config(&cfg.cors)?;

        // 2) Register handler groups
        let mut dispatcher = Dispatcher::new(RouteTable::standard());
        let bridge = EventBridge::new(collaborators.event_runtime, collaborators.functions);
        tracing::info!(functions = ?bridge.functions().names(), "event functions registered");
        dispatcher.register(RouteKind::EventBridge, Arc::new(bridge));
        dispatcher.register(RouteKind::Chat, collaborators.chat);
        dispatcher.register(RouteKind::Sessions, collaborators.sessions);

        let missing = dispatcher.unregistered_routes();
        if !missing.is_empty() {
            return Err(GatewayError::Config(format!(
                "route table references unregistered handler groups: {:?}",
                missing
            )));
        }

        // 3) Static client bundle (production only)
        if cfg.mode.serves_static_bundle() {
            if cfg.static_dir.is_dir() {
                let index = cfg.static_dir.join("index.html");
                dispatcher.set_static_bundle(
                    ServeDir::new(&cfg.static_dir).fallback(ServeFile::new(index)),
                );
                tracing::info!(path = %cfg.static_dir.display(), "serving client bundle");
            } else {
                tracing::warn!(path = %cfg.static_dir.display(), "client bundle directory not found; static serving disabled");
            }
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                origin_policy,
                identity: collaborators.identity,
            }),
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn origin_policy(&self) -> &OriginPolicy {
        &self.inner.origin_policy
    }

    pub fn identity(&self) -> Arc<dyn IdentityProvider> {
        Arc::clone(&self.inner.identity)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }
}
