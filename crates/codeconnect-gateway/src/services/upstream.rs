use std::time::Duration;

use async_trait::async_trait;
use axum::{body, extract::Request, http::HeaderValue, response::Response};
use reqwest::Client;
use tracing::instrument;

use codeconnect_core::error::{GatewayError, Result};

use crate::context::RequestContext;
use crate::dispatch::HandlerGroup;
use crate::relay::{self, AUTH_USER_HEADER};

/// Protected handler group relayed to an HTTP upstream.
///
/// Requires an authenticated caller. The original path and query are kept;
/// the verified user id travels in `x-auth-user-id`.
pub struct UpstreamGroup {
    name: &'static str,
    base_url: String,
    client: Client,
}

impl UpstreamGroup {
    pub fn new(name: &'static str, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            name,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: relay::build_client(timeout)?,
        })
    }
}

#[async_trait]
impl HandlerGroup for UpstreamGroup {
    fn name(&self) -> &'static str {
        self.name
    }

    #[instrument(skip_all, fields(group = self.name))]
    async fn handle(&self, ctx: RequestContext, req: Request) -> Result<Response> {
        let auth = ctx.resolve_auth().await;
        let Some(user_id) = auth.user_id() else {
            return Err(GatewayError::Unauthenticated);
        };
        let user_header = HeaderValue::from_str(user_id)
            .map_err(|_| GatewayError::Internal("user id is not a valid header value".into()))?;

        let (parts, body) = req.into_parts();
        let bytes = body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| GatewayError::Internal(format!("re-reading buffered body: {e}")))?;

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.base_url, path_and_query);

        let mut headers = relay::outbound_headers(&parts.headers);
        headers.insert(AUTH_USER_HEADER, user_header);

        let resp = self
            .client
            .request(parts.method.clone(), url)
            .headers(headers)
            .body(bytes)
            .send()
            .await
            .map_err(|e| GatewayError::Relay(format!("{} upstream: {e}", self.name)))?;

        relay::into_response(resp).await
    }
}
