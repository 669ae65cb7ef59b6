use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::Router;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use super::api;
use crate::{config::WebConfig, vehicle::Vehicle};

use anyhow::{Context, Result};

pub struct WebServer {
    vehicle: Vehicle,
    config: WebConfig,
    running: Arc<AtomicBool>,
}

/// Builds the full application: API routes, dashboard files and middleware.
pub fn router(vehicle: Vehicle, config: &WebConfig) -> Router {
    let app = Router::new()
        .merge(api::routes(vehicle))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http());

    if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

impl WebServer {
    pub fn new(vehicle: Vehicle, config: WebConfig) -> Self {
        Self {
            vehicle,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        let static_dir = PathBuf::from(&self.config.static_dir);
        if !static_dir.exists() {
            warn!(
                "Static directory does not exist at {:?}, dashboard will not be served",
                static_dir
            );
        }

        let app = router(self.vehicle.clone(), &self.config);

        self.running.store(true, Ordering::SeqCst);

        let host = &self.config.host;
        let port = self.config.port;
        let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
            .await
            .context(format!("Failed to bind to port {}", port))?;
        info!("Starting web server on http://{}:{}", host, port);

        let running = self.running.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                while running.load(Ordering::SeqCst) {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            })
            .await
            .context("Failed to serve")?;

        info!("Web server stopped");
        Ok(())
    }

    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
