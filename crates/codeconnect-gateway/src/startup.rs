//! Startup sequencing.
//!
//! `Uninitialized -> ConnectingStorage -> Listening` on success,
//! `Uninitialized -> ConnectingStorage -> Failed` otherwise. The socket is
//! bound only after storage confirms a usable connection. There is no retry
//! loop; restart policy belongs to the process supervisor.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;

use codeconnect_core::error::{GatewayError, Result};

use crate::storage::{Storage, StorageConnector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupState {
    Uninitialized,
    ConnectingStorage,
    Listening(SocketAddr),
    /// Terminal.
    Failed,
}

/// Binds the listening socket.
#[async_trait]
pub trait SocketBinder: Send + Sync {
    async fn bind(&self, addr: SocketAddr) -> std::io::Result<TcpListener>;
}

pub struct TokioBinder;

#[async_trait]
impl SocketBinder for TokioBinder {
    async fn bind(&self, addr: SocketAddr) -> std::io::Result<TcpListener> {
        TcpListener::bind(addr).await
    }
}

/// Everything needed to start serving.
pub struct Ready {
    pub listener: TcpListener,
    pub local_addr: SocketAddr,
    pub storage: Arc<dyn Storage>,
}

pub struct StartupSequencer {
    state: StartupState,
    storage: Arc<dyn StorageConnector>,
    binder: Arc<dyn SocketBinder>,
}

impl StartupSequencer {
    pub fn new(storage: Arc<dyn StorageConnector>, binder: Arc<dyn SocketBinder>) -> Self {
        Self {
            state: StartupState::Uninitialized,
            storage,
            binder,
        }
    }

    pub fn state(&self) -> StartupState {
        self.state
    }

    /// Connect storage, then bind `addr`. Runs at most once.
    pub async fn start(&mut self, addr: SocketAddr) -> Result<Ready> {
        if self.state != StartupState::Uninitialized {
            return Err(GatewayError::Internal(format!(
                "startup already attempted (state: {:?})",
                self.state
            )));
        }

        self.state = StartupState::ConnectingStorage;
        tracing::info!("connecting to storage");

        let storage = match self.storage.connect().await {
            Ok(s) => s,
            Err(e) => {
                self.state = StartupState::Failed;
                tracing::error!(error = %e, "storage connection failed; not binding");
                return Err(e);
            }
        };
        tracing::info!(storage = %storage.describe(), "storage connected");

        let listener = match self.binder.bind(addr).await {
            Ok(l) => l,
            Err(e) => {
                self.state = StartupState::Failed;
                storage.close().await;
                tracing::error!(%addr, error = %e, "failed to bind listener");
                return Err(GatewayError::Internal(format!("bind {addr} failed: {e}")));
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(a) => a,
            Err(e) => {
                self.state = StartupState::Failed;
                storage.close().await;
                return Err(GatewayError::Internal(format!(
                    "listener address unavailable: {e}"
                )));
            }
        };

        self.state = StartupState::Listening(local_addr);
        Ok(Ready {
            listener,
            local_addr,
            storage,
        })
    }
}

/// Serve until `shutdown` resolves, drain in-flight requests, then release
/// storage.
pub async fn serve<F>(ready: Ready, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let Ready {
        listener,
        local_addr,
        storage,
    } = ready;

    tracing::info!(addr = %local_addr, "server running");
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| GatewayError::Internal(format!("server failed: {e}")));

    storage.close().await;
    served
}

/// Resolves on ctrl-c or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received; draining");
}
