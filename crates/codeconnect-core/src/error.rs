//! Shared error type across codeconnect crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Missing or invalid configuration.
    Config,
    /// Storage unreachable or unusable.
    Storage,
    /// Invalid input / malformed body.
    BadRequest,
    /// Body exceeds the configured limit.
    PayloadTooLarge,
    /// No verified identity for a protected route.
    Unauthenticated,
    /// No route for the path.
    NotFound,
    /// A downstream collaborator could not be reached.
    BadGateway,
    /// A handler group is not available in this deployment.
    Unavailable,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Config => "CONFIG",
            ClientCode::Storage => "STORAGE",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::Unauthenticated => "UNAUTHENTICATED",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::BadGateway => "BAD_GATEWAY",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status code for this error class.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::BadRequest => 400,
            ClientCode::Unauthenticated => 401,
            ClientCode::NotFound => 404,
            ClientCode::PayloadTooLarge => 413,
            ClientCode::BadGateway => 502,
            ClientCode::Unavailable => 503,
            ClientCode::Config | ClientCode::Storage | ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Unified error type used by core and gateway.
///
/// `Config` and `Storage` are startup-time and fatal; the rest are scoped to a
/// single request.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("storage connection failed: {0}")]
    Storage(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("relay failed: {0}")]
    Relay(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            GatewayError::Config(_) => ClientCode::Config,
            GatewayError::Storage(_) => ClientCode::Storage,
            GatewayError::BadRequest(_) => ClientCode::BadRequest,
            GatewayError::PayloadTooLarge => ClientCode::PayloadTooLarge,
            GatewayError::Unauthenticated => ClientCode::Unauthenticated,
            GatewayError::NotFound(_) => ClientCode::NotFound,
            GatewayError::Relay(_) => ClientCode::BadGateway,
            GatewayError::Unavailable(_) => ClientCode::Unavailable,
            GatewayError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Relay, storage and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Relay(_) => "upstream unavailable".into(),
            GatewayError::Storage(_) | GatewayError::Internal(_) | GatewayError::Config(_) => {
                "internal error".into()
            }
            other => other.to_string(),
        }
    }

    /// Startup-time errors terminate the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GatewayError::Config(_) | GatewayError::Storage(_))
    }
}
