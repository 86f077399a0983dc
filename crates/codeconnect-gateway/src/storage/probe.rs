//! Reachability probe for a URL-addressed storage backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use url::Url;

use codeconnect_core::error::{GatewayError, Result};

use super::{Storage, StorageConnector};
use crate::config::StorageConfig;

/// Confirms the storage host accepts TCP connections within the timeout.
#[derive(Debug, Clone)]
pub struct TcpProbeConnector {
    target: ProbeTarget,
    timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProbeTarget {
    scheme: String,
    host: String,
    port: u16,
}

impl ProbeTarget {
    fn describe(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "mongodb" => Some(27017),
        "postgres" | "postgresql" => Some(5432),
        "mysql" => Some(3306),
        "redis" => Some(6379),
        _ => None,
    }
}

impl TcpProbeConnector {
    pub fn from_config(cfg: &StorageConfig) -> Result<Self> {
        Self::from_url(
            cfg.url.expose(),
            Duration::from_millis(cfg.connect_timeout_ms),
        )
    }

    pub fn from_url(raw: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(raw)
            .map_err(|e| GatewayError::Config(format!("DB_URL is not a valid URL: {e}")))?;
        let scheme = url.scheme().to_string();
        if scheme.ends_with("+srv") {
            return Err(GatewayError::Config(format!(
                "DB_URL uses {scheme}, whose hosts come from a DNS SRV lookup the startup probe \
                 does not perform; list host:port explicitly with a plain {} URL",
                scheme.trim_end_matches("+srv")
            )));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| GatewayError::Config("DB_URL has no host".into()))?
            .to_string();
        let port = url
            .port()
            .or_else(|| default_port(&scheme))
            .ok_or_else(|| {
                GatewayError::Config(format!(
                    "DB_URL scheme {scheme} has no default port; specify one explicitly"
                ))
            })?;

        Ok(Self {
            target: ProbeTarget { scheme, host, port },
            timeout,
        })
    }

    pub fn target(&self) -> String {
        self.target.describe()
    }
}

#[async_trait]
impl StorageConnector for TcpProbeConnector {
    async fn connect(&self) -> Result<Arc<dyn Storage>> {
        let addr = (self.target.host.as_str(), self.target.port);
        let fut = TcpStream::connect(addr);
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(_stream)) => Ok(Arc::new(ProbedStorage {
                target: self.target.clone(),
            })),
            Ok(Err(e)) => Err(GatewayError::Storage(format!(
                "{}: {e}",
                self.target.describe()
            ))),
            Err(_) => Err(GatewayError::Storage(format!(
                "{}: timed out after {:?}",
                self.target.describe(),
                self.timeout
            ))),
        }
    }
}

struct ProbedStorage {
    target: ProbeTarget,
}

#[async_trait]
impl Storage for ProbedStorage {
    fn describe(&self) -> String {
        self.target.describe()
    }

    async fn close(&self) {
        tracing::info!(storage = %self.target.describe(), "storage released");
    }
}
