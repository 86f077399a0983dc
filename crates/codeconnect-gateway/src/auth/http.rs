//! Identity provider reached over HTTP.
//!
//! POSTs `{"token": ..}` to the verification endpoint with the provider secret
//! as bearer credential. A 2xx reply carries the identity; anything else is
//! treated as an invalid token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::instrument;

use codeconnect_core::error::{GatewayError, Result};
use codeconnect_core::identity::Identity;

use super::IdentityProvider;
use crate::config::{IdentityConfig, Secret};
use crate::relay;

pub struct HttpIdentityProvider {
    verify_url: String,
    secret_key: Secret,
    client: Client,
}

impl HttpIdentityProvider {
    pub fn new(cfg: &IdentityConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            verify_url: cfg.verify_url.clone(),
            secret_key: cfg.secret_key.clone(),
            client: relay::build_client(timeout)?,
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip_all)]
    async fn verify(&self, token: &str) -> Result<Identity> {
        let resp = self
            .client
            .post(&self.verify_url)
            .bearer_auth(self.secret_key.expose())
            .json(&json!({ "token": token }))
            .send()
            .await
            .map_err(|e| GatewayError::Relay(format!("identity provider: {e}")))?;

        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "identity provider rejected token");
            return Err(GatewayError::Unauthenticated);
        }

        resp.json::<Identity>()
            .await
            .map_err(|e| GatewayError::Relay(format!("identity provider reply: {e}")))
    }
}
