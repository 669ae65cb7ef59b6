use std::path::Path;

use anyhow::{ensure, Result};
use config::{Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub web: WebConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    /// Empty means a random id is generated at startup.
    pub vehicle_id: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            vehicle_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub cors: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: "static".to_string(),
            cors: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    /// Fixed RNG seed for reproducible runs. None = seeded from entropy.
    pub seed: Option<u64>,
    pub home_lat: f64,
    pub home_lon: f64,
    pub detection_probability: f64,
    /// Maximum number of detections retained; the oldest are evicted first.
    pub detection_capacity: usize,
    pub weather: WeatherConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            seed: None,
            home_lat: -6.2088,
            home_lon: 106.8456,
            detection_probability: 0.05,
            detection_capacity: 10_000,
            weather: WeatherConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub temperature: f64,
    pub wind_speed: f64,
    pub condition: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            temperature: 28.0,
            wind_speed: 12.0,
            condition: "Clear".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let env = std::env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let config_path = format!("config/{}.toml", env);
        let fallback_path = format!("/etc/agrovision/{}.toml", env);

        let path = if Path::new(&config_path).exists() {
            config_path
        } else {
            fallback_path
        };
        Self::load_from(&path)
    }

    /// Loads `path` if it exists, then applies `AGROVISION__SECTION__KEY`
    /// environment overrides on top of the built-in defaults.
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("AGROVISION")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.web.port > 0, "web.port must be non-zero");
        self.simulation.validate()
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.tick_interval_ms > 0,
            "simulation.tick_interval_ms must be greater than zero"
        );
        ensure!(
            (0.0..=1.0).contains(&self.detection_probability),
            "simulation.detection_probability must be within [0, 1], got {}",
            self.detection_probability
        );
        ensure!(
            self.detection_capacity > 0,
            "simulation.detection_capacity must be greater than zero"
        );
        ensure!(
            self.home_lat.is_finite() && self.home_lon.is_finite(),
            "simulation home position must be finite"
        );
        Ok(())
    }
}
