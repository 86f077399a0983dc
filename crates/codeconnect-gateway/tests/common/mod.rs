//! Fakes and builders shared by gateway integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};

use codeconnect_core::error::{GatewayError, Result};
use codeconnect_core::events::FunctionTable;
use codeconnect_core::identity::Identity;
use codeconnect_gateway::{
    app_state::{AppState, Collaborators},
    auth::IdentityProvider,
    bridge::{EventRuntime, Invocation, RuntimeReply},
    config::{self, GatewayConfig},
    context::RequestContext,
    dispatch::HandlerGroup,
    router,
};

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub fn base_vars() -> HashMap<String, String> {
    [
        ("PORT", "3000"),
        ("APP_ENV", "test"),
        ("DB_URL", "mongodb://127.0.0.1:27017/codeconnect"),
        ("CLIENT_URL", "http://localhost:5173,https://codeconnect.example.com"),
        ("IDENTITY_SECRET_KEY", "sk_test_123"),
        ("IDENTITY_VERIFY_URL", "http://127.0.0.1:9/verify"),
        ("EVENT_RUNTIME_URL", "http://127.0.0.1:9/runtime"),
        ("EVENT_SIGNING_KEY", "signkey_test_123"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn config_with(overrides: &[(&str, &str)]) -> GatewayConfig {
    let mut vars = base_vars();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    config::from_map(&vars).expect("test config must parse")
}

/// Accepts the token `valid-token` as user `user_42`.
pub struct FakeIdentity;

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify(&self, token: &str) -> Result<Identity> {
        if token == "valid-token" {
            Ok(Identity {
                user_id: "user_42".into(),
                session_id: Some("sess_1".into()),
            })
        } else {
            Err(GatewayError::Unauthenticated)
        }
    }
}

/// Records every invocation and echoes a fixed reply.
#[derive(Default)]
pub struct RecordingRuntime {
    pub calls: Mutex<Vec<(Invocation, Vec<String>)>>,
}

#[async_trait]
impl EventRuntime for RecordingRuntime {
    async fn invoke(&self, invocation: Invocation, functions: &FunctionTable) -> Result<RuntimeReply> {
        let names = functions.names().into_iter().map(str::to_string).collect();
        self.calls.lock().unwrap().push((invocation, names));
        Ok(RuntimeReply {
            status: 200,
            content_type: Some("application/json".into()),
            body: bytes::Bytes::from_static(br#"{"ok":true}"#),
        })
    }
}

pub struct DownRuntime;

#[async_trait]
impl EventRuntime for DownRuntime {
    async fn invoke(&self, _invocation: Invocation, _functions: &FunctionTable) -> Result<RuntimeReply> {
        Err(GatewayError::Relay("connection refused".into()))
    }
}

/// What a handler group saw for one request.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path_and_query: String,
    pub body: Vec<u8>,
    pub authorization: Option<String>,
    pub user: Option<String>,
}

/// Protected group that records requests and answers with the caller id.
#[derive(Default)]
pub struct RecordingGroup {
    pub seen: Mutex<Vec<Seen>>,
}

#[async_trait]
impl HandlerGroup for RecordingGroup {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn handle(&self, ctx: RequestContext, req: Request) -> Result<Response> {
        let auth = ctx.resolve_auth().await;
        let (parts, b) = req.into_parts();
        let bytes = body::to_bytes(b, usize::MAX).await.unwrap();
        self.seen.lock().unwrap().push(Seen {
            method: parts.method.to_string(),
            path_and_query: parts.uri.path_and_query().unwrap().to_string(),
            body: bytes.to_vec(),
            authorization: parts
                .headers
                .get("authorization")
                .map(|v| v.to_str().unwrap().to_string()),
            user: auth.user_id().map(str::to_string),
        });

        let Some(user) = auth.user_id() else {
            return Err(GatewayError::Unauthenticated);
        };
        Ok((StatusCode::OK, Json(json!({ "user": user }))).into_response())
    }
}

pub struct Harness {
    pub app: Router,
    pub chat: Arc<RecordingGroup>,
    pub sessions: Arc<RecordingGroup>,
    pub runtime: Arc<RecordingRuntime>,
}

pub fn harness(overrides: &[(&str, &str)]) -> Harness {
    let cfg = config_with(overrides);
    let chat = Arc::new(RecordingGroup::default());
    let sessions = Arc::new(RecordingGroup::default());
    let runtime = Arc::new(RecordingRuntime::default());

    let collaborators = Collaborators {
        identity: Arc::new(FakeIdentity),
        event_runtime: runtime.clone(),
        functions: FunctionTable::builtin(),
        chat: chat.clone(),
        sessions: sessions.clone(),
    };
    let state = AppState::new(cfg, collaborators).expect("state must build");

    Harness {
        app: router::build_router(state),
        chat,
        sessions,
        runtime,
    }
}

pub fn app_with_runtime(runtime: Arc<dyn EventRuntime>) -> Router {
    let collaborators = Collaborators {
        identity: Arc::new(FakeIdentity),
        event_runtime: runtime,
        functions: FunctionTable::builtin(),
        chat: Arc::new(RecordingGroup::default()),
        sessions: Arc::new(RecordingGroup::default()),
    };
    let state = AppState::new(config_with(&[]), collaborators).expect("state must build");
    router::build_router(state)
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_string(resp: Response) -> String {
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn get(uri: &str) -> Request {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
