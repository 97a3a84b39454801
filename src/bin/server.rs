//! Dispatch HTTP Server Binary
//!
//! Entry point for the depot dispatch REST API server. It loads the
//! repository configuration, sets up the HTTP router, and starts serving.
//!
//! # Usage
//!
//! ```bash
//! # Run with the local (in-memory) repository (default)
//! cargo run --bin fleetops-server --features "local-repo,http-server"
//!
//! # Run against a remote backend
//! FLEET_BACKEND_URL=https://backend.example.com \
//!   cargo run --bin fleetops-server --features "remote-repo,http-server"
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `FLEET_BACKEND_URL`: Remote backend base URL (remote-repo feature)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use fleetops_rust::db::{FullRepository, RepositoryConfig, RepositoryFactory};
use fleetops_rust::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting dispatch HTTP server");

    // Pick the backend from fleetops.toml when present; otherwise the
    // in-memory repository keeps the server usable for development.
    let repository: Arc<dyn FullRepository> = match RepositoryConfig::from_default_location() {
        Ok(config) => {
            let repo_type = config.repository_type().map_err(|e| anyhow::anyhow!(e))?;
            info!("Using {} repository from configuration", repo_type);
            RepositoryFactory::create_from_config(&config)?
        }
        Err(err) => {
            warn!("No repository configuration found ({}), using local repository", err);
            RepositoryFactory::create_local()
        }
    };

    let state = AppState::new(repository);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
