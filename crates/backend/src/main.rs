pub mod dashboards;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod state;
pub mod system;

use std::sync::Arc;

use dashboards::d400_client_report::MockDataProvider;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tokio::net::TcpListener;

    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    let provider = MockDataProvider::new(config.report.seed, config.report.clients.clone());
    tracing::info!(
        "Mock data provider ready: {} clients, seed {}",
        config.report.clients.len(),
        config.report.seed
    );

    let state = AppState::new(Arc::new(provider), &config);
    tracing::info!("Serving static files from {}", state.static_dir.display());
    let app = routes::configure_routes(state);

    let addr = config.bind_address();
    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    config.server.port
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
