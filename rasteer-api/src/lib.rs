//! HTTP control plane for rasteer
//!
//! Exposes the broadcast job controls (pause/resume/trigger/status),
//! CRUD for the topology records, and the observed-neighbor listings.

pub mod rest;

use axum::Router;
use rasteer_engine::SchedulerHandle;
use rasteer_neigh::NeighborTable;
use rasteer_store::Db;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

pub struct ApiServer {
    listen_addr: SocketAddr,
    db: Db,
    scheduler: SchedulerHandle,
    neighbors: Arc<dyn NeighborTable>,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub scheduler: SchedulerHandle,
    pub neighbors: Arc<dyn NeighborTable>,
}

impl ApiServer {
    pub fn new(
        listen_addr: SocketAddr,
        db: Db,
        scheduler: SchedulerHandle,
        neighbors: Arc<dyn NeighborTable>,
    ) -> Self {
        Self {
            listen_addr,
            db,
            scheduler,
            neighbors,
        }
    }

    pub async fn run(self, shutdown: watch::Receiver<bool>) -> std::io::Result<()> {
        let state = AppState {
            db: self.db,
            scheduler: self.scheduler,
            neighbors: self.neighbors,
        };

        let app = Router::new()
            .nest("/api", rest::router())
            .layer(tower_http::cors::CorsLayer::permissive())
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(self.listen_addr).await?;
        info!("control API listening on {}", self.listen_addr);

        let mut shutdown = shutdown;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
    }
}
