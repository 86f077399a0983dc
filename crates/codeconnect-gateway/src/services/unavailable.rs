use async_trait::async_trait;
use axum::{extract::Request, response::Response};

use codeconnect_core::error::{GatewayError, Result};

use crate::context::RequestContext;
use crate::dispatch::HandlerGroup;

/// Placeholder for a group with no upstream in this deployment.
pub struct UnavailableGroup {
    name: &'static str,
}

impl UnavailableGroup {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl HandlerGroup for UnavailableGroup {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, _ctx: RequestContext, _req: Request) -> Result<Response> {
        Err(GatewayError::Unavailable(format!(
            "{} handlers are not configured",
            self.name
        )))
    }
}
