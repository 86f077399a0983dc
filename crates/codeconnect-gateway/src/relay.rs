//! Outbound HTTP plumbing shared by the event bridge, upstream handler groups
//! and the identity provider.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::Response,
};
use reqwest::Client;

use codeconnect_core::error::{GatewayError, Result};

/// Header carrying the verified user id to upstream handler groups.
pub const AUTH_USER_HEADER: &str = "x-auth-user-id";

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::Config(format!("failed to build http client: {e}")))
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Request headers safe to pass to an upstream.
///
/// Drops hop-by-hop headers, `host`, `content-length` (recomputed) and any
/// caller-supplied identity header.
pub fn outbound_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name)
            || name == header::HOST
            || name == header::CONTENT_LENGTH
            || name.as_str() == AUTH_USER_HEADER
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Convert an upstream reply into a gateway response.
///
/// Upstream `access-control-*` headers are dropped so the gateway's origin
/// policy stays the only source of CORS headers.
pub async fn into_response(resp: reqwest::Response) -> Result<Response> {
    let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut headers = HeaderMap::with_capacity(resp.headers().len());
    for (name, value) in resp.headers() {
        if is_hop_by_hop(name)
            || name == header::CONTENT_LENGTH
            || name.as_str().starts_with("access-control-")
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    let body = resp
        .bytes()
        .await
        .map_err(|e| GatewayError::Relay(format!("reading upstream body: {e}")))?;

    let mut out = Response::new(Body::from(body));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    Ok(out)
}
