use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{error, info};

use kakaku_service::config::ServiceConfig;
use kakaku_service::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    kakaku_core::init_tracing("kakaku_service");

    let config = ServiceConfig::from_env();

    // Nothing binds until both artifacts are loaded and the schema
    // self-check has passed.
    let state = match AppState::load(&config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialize application state; refusing to start");
            return Err(e.into());
        }
    };

    let app = kakaku_service::app(Arc::new(state));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(bind_addr = %config.bind_addr, "Prediction service starting");

    axum::serve(listener, app).await?;
    Ok(())
}
