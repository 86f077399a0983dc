use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use tracing::instrument;

use codeconnect_core::error::{GatewayError, Result};
use codeconnect_core::events::FunctionTable;

use super::{EventRuntime, Invocation, Payload, RuntimeReply};
use crate::config::{EventsConfig, Secret};
use crate::relay;

/// Header carrying the caller's signature over the raw request body.
pub const SIGNATURE_HEADER: &str = "x-inngest-signature";

/// Event runtime reached over HTTP.
///
/// Each invocation is POSTed as
/// `{"method","path","query","headers","payload_encoding","payload","signature","functions"}`
/// with the signing key as bearer credential.
///
/// The bearer only proves the envelope came from this gateway. The bridge
/// accepts unauthenticated callers, so the runtime must check `signature`
/// (copied from [`SIGNATURE_HEADER`]) against the reconstructed payload bytes
/// before acting on an invocation.
pub struct HttpEventRuntime {
    url: String,
    signing_key: Secret,
    client: Client,
}

impl HttpEventRuntime {
    pub fn new(cfg: &EventsConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: cfg.runtime_url.clone(),
            signing_key: cfg.signing_key.clone(),
            client: relay::build_client(timeout)?,
        })
    }
}

/// Serialized with `serde_json` directly so a `RawValue` payload is written
/// byte for byte.
#[derive(Serialize)]
struct Envelope<'a> {
    method: &'a str,
    path: &'a str,
    query: Option<&'a str>,
    headers: &'a [(String, String)],
    payload_encoding: &'static str,
    payload: &'a Payload,
    signature: Option<&'a str>,
    functions: &'a FunctionTable,
}

#[async_trait]
impl EventRuntime for HttpEventRuntime {
    #[instrument(skip_all, fields(path = %invocation.path))]
    async fn invoke(&self, invocation: Invocation, functions: &FunctionTable) -> Result<RuntimeReply> {
        let payload = invocation.payload();
        let envelope = Envelope {
            method: &invocation.method,
            path: &invocation.path,
            query: invocation.query.as_deref(),
            headers: &invocation.headers,
            payload_encoding: payload.encoding(),
            payload: &payload,
            signature: invocation.header(SIGNATURE_HEADER),
            functions,
        };

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(self.signing_key.expose())
            .json(&envelope)
            .send()
            .await
            .map_err(|e| GatewayError::Relay(format!("event runtime: {e}")))?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .bytes()
            .await
            .map_err(|e| GatewayError::Relay(format!("event runtime body: {e}")))?;

        Ok(RuntimeReply {
            status,
            content_type,
            body,
        })
    }
}
