use anyhow::{anyhow, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::config::GeneralConfig;

/// Returns the configured vehicle id, or a fresh UUID when none is set.
pub fn get_vehicle_id(config: &GeneralConfig) -> String {
    let configured = config.vehicle_id.trim();
    if configured.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        configured.to_string()
    }
}

pub fn setup_logging(log_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse()?)
                .add_directive("tower_http=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
