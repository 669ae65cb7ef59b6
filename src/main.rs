use std::time::Duration;

use anyhow::Result;

use agrovision::config::Config;
use agrovision::simulation::SimulationEngine;
use agrovision::ticker::Ticker;
use agrovision::util::{get_vehicle_id, setup_logging};
use agrovision::vehicle::Vehicle;
use agrovision::web::server::WebServer;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    setup_logging(&config.general.log_level)?;
    info!("Application starting...");

    let vehicle_id = get_vehicle_id(&config.general);
    info!("Vehicle id: {}", vehicle_id);
    let vehicle = Vehicle::new(vehicle_id, SimulationEngine::new(&config.simulation));

    // Create a shutdown signal channel
    let (shutdown_tx, _) = broadcast::channel(1);

    let ticker = Ticker::new(
        vehicle.clone(),
        Duration::from_millis(config.simulation.tick_interval_ms),
    );
    let web_server = WebServer::new(vehicle, config.web.clone());

    let ticker_handle = spawn_ticker(ticker, shutdown_tx.subscribe());
    let web_handle = spawn_web_server(web_server, shutdown_tx.subscribe());

    let shutdown_signal = async {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, stopping services...");
                if let Err(e) = shutdown_tx.send(()) {
                    error!("Failed to send shutdown signal: {}", e);
                }
            }
            Err(err) => {
                error!("Failed to listen for shutdown signal: {}", err);
            }
        }
    };

    let results = tokio::join!(ticker_handle, web_handle, shutdown_signal);

    for (result, name) in [results.0, results.1]
        .into_iter()
        .zip(["Simulation ticker", "Web server"])
    {
        if let Err(e) = result {
            error!("{} join error: {}", name, e);
        }
    }

    info!("All services stopped, shutting down");

    Ok(())
}

fn spawn_ticker(
    ticker: Ticker,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = ticker.start() => {
                if let Err(e) = result {
                    error!("Simulation ticker error: {}", e);
                }
            }
            _ = shutdown.recv() => {
                info!("Shutting down simulation ticker...");
                ticker.stop().await;
            }
        }
    })
}

fn spawn_web_server(
    server: WebServer,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let serve = server.start();
        tokio::pin!(serve);
        tokio::select! {
            result = &mut serve => {
                if let Err(e) = result {
                    error!("Web server error: {}", e);
                }
            }
            _ = shutdown.recv() => {
                info!("Shutting down web server...");
                server.stop().await;
                // Let in-flight requests drain.
                if let Err(e) = serve.await {
                    error!("Web server error: {}", e);
                }
            }
        }
    })
}
