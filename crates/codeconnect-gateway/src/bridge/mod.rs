//! Event-function bridge.
//!
//! Everything under `/api/event-bridge` is relayed to the external event
//! orchestration runtime together with the registered function table. The
//! gateway does not interpret payloads: the caller's body bytes reach the
//! runtime unchanged, so signatures computed over them still verify. A
//! runtime that cannot be reached becomes a 502 for that caller only.

pub mod runtime;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    extract::Request,
    http::{self, header, StatusCode},
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::Serialize;
use serde_json::value::RawValue;

use codeconnect_core::error::{GatewayError, Result};
use codeconnect_core::events::FunctionTable;

use crate::context::RequestContext;
use crate::dispatch::HandlerGroup;
use crate::pipeline::ParsedBody;

pub use runtime::HttpEventRuntime;

/// One relayed invocation as handed to the runtime.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Caller body exactly as received.
    pub body: Bytes,
    /// The body stage accepted `body` as JSON.
    pub json: bool,
}

impl Invocation {
    /// First forwarded header named `name` (lowercase).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Body in its envelope form. Every variant carries the original bytes
    /// without loss.
    pub fn payload(&self) -> Payload {
        if self.body.is_empty() {
            return Payload::Empty;
        }
        let Ok(text) = std::str::from_utf8(&self.body) else {
            return Payload::Base64(STANDARD.encode(&self.body));
        };
        if self.json {
            // RawValue drops surrounding whitespace; only embed when nothing is lost.
            if let Ok(raw) = RawValue::from_string(text.to_string()) {
                if raw.get().len() == text.len() {
                    return Payload::Json(raw);
                }
            }
        }
        Payload::Text(text.to_string())
    }
}

/// Relayed body as embedded in the runtime envelope.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Empty,
    /// JSON text embedded verbatim.
    Json(Box<RawValue>),
    Text(String),
    Base64(String),
}

impl Payload {
    pub fn encoding(&self) -> &'static str {
        match self {
            Payload::Empty => "none",
            Payload::Json(_) => "json",
            Payload::Text(_) => "text",
            Payload::Base64(_) => "base64",
        }
    }
}

/// What the runtime answered; passed back to the caller verbatim.
#[derive(Debug, Clone)]
pub struct RuntimeReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: bytes::Bytes,
}

/// External event orchestration runtime.
#[async_trait]
pub trait EventRuntime: Send + Sync {
    async fn invoke(&self, invocation: Invocation, functions: &FunctionTable) -> Result<RuntimeReply>;
}

pub struct EventBridge {
    runtime: Arc<dyn EventRuntime>,
    functions: Arc<FunctionTable>,
}

impl EventBridge {
    pub fn new(runtime: Arc<dyn EventRuntime>, functions: FunctionTable) -> Self {
        Self {
            runtime,
            functions: Arc::new(functions),
        }
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }
}

#[async_trait]
impl HandlerGroup for EventBridge {
    fn name(&self) -> &'static str {
        "event_bridge"
    }

    async fn handle(&self, _ctx: RequestContext, req: Request) -> Result<Response> {
        let json = req
            .extensions()
            .get::<ParsedBody>()
            .is_some_and(|p| p.json.is_some());
        let (parts, body) = req.into_parts();
        let raw = body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| GatewayError::Internal(format!("re-reading buffered body: {e}")))?;

        let headers = parts
            .headers
            .iter()
            .filter(|(name, _)| {
                **name != header::AUTHORIZATION && **name != header::COOKIE && **name != header::HOST
            })
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let invocation = Invocation {
            method: parts.method.as_str().to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers,
            body: raw,
            json,
        };

        let reply = self.runtime.invoke(invocation, &self.functions).await?;

        let status = StatusCode::from_u16(reply.status).map_err(|_| {
            GatewayError::Relay(format!("runtime answered invalid status {}", reply.status))
        })?;
        let mut builder = http::Response::builder().status(status);
        if let Some(ct) = &reply.content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder
            .body(Body::from(reply.body))
            .map_err(|e| GatewayError::Internal(format!("building bridge response: {e}")))
    }
}
