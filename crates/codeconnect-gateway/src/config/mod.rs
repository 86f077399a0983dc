//! Gateway config loader (strict parsing).
//!
//! Values come from the process environment (optionally seeded from `.env`).
//! Parsing works over an explicit map so tests never touch ambient state.

pub mod schema;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use codeconnect_core::env::EnvironmentMode;
use codeconnect_core::error::{GatewayError, Result};
use codeconnect_core::events::{FunctionDescriptor, FunctionTable};

pub use schema::{
    CorsConfig, EventsConfig, GatewayConfig, IdentityConfig, Secret, StorageConfig,
    UpstreamConfig,
};

const DEFAULT_STATIC_DIR: &str = "../frontend/dist";
const DEFAULT_BODY_LIMIT_BYTES: usize = 100 * 1024;
const DEFAULT_STORAGE_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_RELAY_TIMEOUT_MS: u64 = 30_000;

/// Read `.env` (if present) and the process environment.
pub fn load_from_env() -> Result<GatewayConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(GatewayError::Config(format!("failed to read .env: {e}"))),
    }
    let vars: HashMap<String, String> = std::env::vars().collect();
    from_map(&vars)
}

pub fn from_map(vars: &HashMap<String, String>) -> Result<GatewayConfig> {
    let get = |key: &str| {
        vars.get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };
    let required = |key: &str| {
        get(key)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Config(format!("missing required variable {key}")))
    };

    let port = parse_num::<u16>("PORT", &required("PORT")?)?;

    let mode = match get("APP_ENV") {
        Some(v) => v.parse::<EnvironmentMode>()?,
        None => EnvironmentMode::default(),
    };

    let allow_any = parse_bool("CORS_ALLOW_ANY", get("CORS_ALLOW_ANY"), false)?;
    let allow_credentials = parse_bool("CORS_CREDENTIALS", get("CORS_CREDENTIALS"), !allow_any)?;
    let allowed_origins = get("CLIENT_URL")
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let cfg = GatewayConfig {
        port,
        mode,
        cors: CorsConfig {
            allowed_origins: dedup(allowed_origins),
            allow_any,
            allow_credentials,
        },
        storage: StorageConfig {
            url: Secret::new(required("DB_URL")?),
            connect_timeout_ms: match get("STORAGE_CONNECT_TIMEOUT_MS") {
                Some(v) => parse_num("STORAGE_CONNECT_TIMEOUT_MS", v)?,
                None => DEFAULT_STORAGE_CONNECT_TIMEOUT_MS,
            },
        },
        identity: IdentityConfig {
            verify_url: required("IDENTITY_VERIFY_URL")?,
            secret_key: Secret::new(required("IDENTITY_SECRET_KEY")?),
        },
        events: EventsConfig {
            runtime_url: required("EVENT_RUNTIME_URL")?,
            signing_key: Secret::new(required("EVENT_SIGNING_KEY")?),
            functions_file: get("EVENT_FUNCTIONS_FILE").map(PathBuf::from),
        },
        upstreams: UpstreamConfig {
            chat: get("CHAT_UPSTREAM_URL").map(trim_url),
            sessions: get("SESSIONS_UPSTREAM_URL").map(trim_url),
        },
        static_dir: PathBuf::from(get("STATIC_DIR").unwrap_or(DEFAULT_STATIC_DIR)),
        body_limit_bytes: match get("BODY_LIMIT_BYTES") {
            Some(v) => parse_num("BODY_LIMIT_BYTES", v)?,
            None => DEFAULT_BODY_LIMIT_BYTES,
        },
        relay_timeout_ms: match get("RELAY_TIMEOUT_MS") {
            Some(v) => parse_num("RELAY_TIMEOUT_MS", v)?,
            None => DEFAULT_RELAY_TIMEOUT_MS,
        },
    };

    cfg.validate()?;
    Ok(cfg)
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| GatewayError::Config(format!("{key} must be a number, got {raw:?}")))
}

fn parse_bool(key: &str, raw: Option<&str>, default: bool) -> Result<bool> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(GatewayError::Config(format!(
            "{key} must be true or false, got {other:?}"
        ))),
    }
}

fn trim_url(raw: &str) -> String {
    raw.trim_end_matches('/').to_string()
}

fn dedup(origins: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(origins.len());
    for o in origins {
        if !out.contains(&o) {
            out.push(o);
        }
    }
    out
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FunctionsFile {
    version: u32,
    functions: Vec<FunctionDescriptor>,
}

/// Resolve the event function table: the YAML override if configured,
/// otherwise the built-in table.
pub fn load_functions(cfg: &EventsConfig) -> Result<FunctionTable> {
    match &cfg.functions_file {
        Some(path) => load_functions_from_file(path),
        None => Ok(FunctionTable::builtin()),
    }
}

pub fn load_functions_from_file(path: &Path) -> Result<FunctionTable> {
    let s = fs::read_to_string(path).map_err(|e| {
        GatewayError::Config(format!("read {} failed: {e}", path.display()))
    })?;
    load_functions_from_str(&s)
}

pub fn load_functions_from_str(s: &str) -> Result<FunctionTable> {
    let file: FunctionsFile = serde_yaml::from_str(s)
        .map_err(|e| GatewayError::Config(format!("invalid functions yaml: {e}")))?;
    if file.version != 1 {
        return Err(GatewayError::Config(format!(
            "unsupported functions file version: {}",
            file.version
        )));
    }
    FunctionTable::new(file.functions)
}
