//! codeconnect gateway
//!
//! Boot order: config -> collaborators -> storage -> bind -> serve.
//! Any failure before bind exits non-zero without opening a socket.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use codeconnect_core::error::Result;
use codeconnect_gateway::{
    app_state::{AppState, Collaborators},
    config, router,
    startup::{self, StartupSequencer, TokioBinder},
    storage::TcpProbeConnector,
};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, fatal = e.is_fatal(), "error starting the server");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_from_env()?;
    tracing::info!(port = cfg.port, mode = %cfg.mode, "configuration loaded");

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let storage = Arc::new(TcpProbeConnector::from_config(&cfg.storage)?);
    let collaborators = Collaborators::from_config(&cfg)?;

    let state = AppState::new(cfg, collaborators)?;
    let app = router::build_router(state);

    let mut sequencer = StartupSequencer::new(storage, Arc::new(TokioBinder));
    let ready = sequencer.start(addr).await?;

    startup::serve(ready, app, startup::shutdown_signal()).await
}
