use std::fmt;
use std::path::PathBuf;

use codeconnect_core::env::EnvironmentMode;
use codeconnect_core::error::{GatewayError, Result};
use url::Url;

/// Fully resolved gateway configuration.
///
/// Built once at startup and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub mode: EnvironmentMode,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub identity: IdentityConfig,
    pub events: EventsConfig,
    pub upstreams: UpstreamConfig,
    pub static_dir: PathBuf,
    pub body_limit_bytes: usize,
    pub relay_timeout_ms: u64,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(GatewayError::Config("PORT must be a positive integer".into()));
        }
        if !(1024..=10 * 1024 * 1024).contains(&self.body_limit_bytes) {
            return Err(GatewayError::Config(
                "BODY_LIMIT_BYTES must be between 1024 and 10485760".into(),
            ));
        }
        if !(1000..=300_000).contains(&self.relay_timeout_ms) {
            return Err(GatewayError::Config(
                "RELAY_TIMEOUT_MS must be between 1000 and 300000".into(),
            ));
        }

        self.cors.validate()?;
        self.storage.validate()?;
        self.identity.validate()?;
        self.events.validate()?;
        self.upstreams.validate()?;

        Ok(())
    }
}

/// Cross-origin settings.
///
/// `allow_any` excludes both `allow_credentials` and an origin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_any: bool,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.allow_any && self.allow_credentials {
            return Err(GatewayError::Config(
                "CORS_ALLOW_ANY cannot be combined with CORS_CREDENTIALS".into(),
            ));
        }
        if self.allow_any && !self.allowed_origins.is_empty() {
            return Err(GatewayError::Config(
                "CORS_ALLOW_ANY cannot be combined with a CLIENT_URL origin list".into(),
            ));
        }
        if !self.allow_any && self.allowed_origins.is_empty() {
            return Err(GatewayError::Config(
                "CLIENT_URL must list at least one origin unless CORS_ALLOW_ANY=true".into(),
            ));
        }
        for o in &self.allowed_origins {
            validate_origin(o)?;
        }
        Ok(())
    }
}

/// An origin is `scheme://host[:port]` with no path, query or fragment.
pub fn validate_origin(origin: &str) -> Result<()> {
    let bad = || GatewayError::Config(format!("invalid origin in CLIENT_URL: {origin}"));
    let url = Url::parse(origin).map_err(|_| bad())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(bad());
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(bad());
    }
    if origin.ends_with('/') {
        return Err(bad());
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: Secret,
    pub connect_timeout_ms: u64,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60_000).contains(&self.connect_timeout_ms) {
            return Err(GatewayError::Config(
                "STORAGE_CONNECT_TIMEOUT_MS must be between 100 and 60000".into(),
            ));
        }
        Url::parse(self.url.expose())
            .map_err(|e| GatewayError::Config(format!("DB_URL is not a valid URL: {e}")))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub verify_url: String,
    pub secret_key: Secret,
}

impl IdentityConfig {
    pub fn validate(&self) -> Result<()> {
        validate_http_url("IDENTITY_VERIFY_URL", &self.verify_url)
    }
}

#[derive(Debug, Clone)]
pub struct EventsConfig {
    pub runtime_url: String,
    pub signing_key: Secret,
    pub functions_file: Option<PathBuf>,
}

impl EventsConfig {
    pub fn validate(&self) -> Result<()> {
        validate_http_url("EVENT_RUNTIME_URL", &self.runtime_url)
    }
}

/// Optional HTTP upstreams for the chat and session handler groups.
#[derive(Debug, Clone, Default)]
pub struct UpstreamConfig {
    pub chat: Option<String>,
    pub sessions: Option<String>,
}

impl UpstreamConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(u) = &self.chat {
            validate_http_url("CHAT_UPSTREAM_URL", u)?;
        }
        if let Some(u) = &self.sessions {
            validate_http_url("SESSIONS_UPSTREAM_URL", u)?;
        }
        Ok(())
    }
}

fn validate_http_url(key: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw).map_err(|e| GatewayError::Config(format!("{key} is invalid: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GatewayError::Config(format!("{key} must be an http(s) URL")));
    }
    Ok(())
}

/// Credential string whose `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}
