//! Storage collaborator seam.
//!
//! The persistence layer itself is external. The gateway only needs to know
//! that storage is reachable before it binds, and to release it on shutdown.

pub mod probe;

use std::sync::Arc;

use async_trait::async_trait;

use codeconnect_core::error::Result;

pub use probe::TcpProbeConnector;

/// A confirmed, shareable storage connection.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Credential-free description for logs.
    fn describe(&self) -> String;
    async fn close(&self);
}

/// Establishes the storage connection at startup.
#[async_trait]
pub trait StorageConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn Storage>>;
}
