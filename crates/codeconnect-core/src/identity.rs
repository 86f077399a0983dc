//! Identity types produced by auth resolution.

use serde::{Deserialize, Serialize};

/// A verified caller identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Outcome of resolving auth for a request.
///
/// Verification failures are folded into `Unauthenticated`; callers decide
/// whether that is fatal for their route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Authenticated(Identity),
    Unauthenticated,
}

impl AuthState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(id) => Some(id),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity().map(|id| id.user_id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}
