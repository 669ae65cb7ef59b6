use serde::Serialize;

use crate::config::WeatherConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Loiter,
    Mission,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Target {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub lat: f64,
    pub lon: f64,
    /// Tick at which the detection was emitted.
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    pub temperature: f64,
    pub wind_speed: f64,
    pub condition: String,
}

impl From<WeatherConfig> for Weather {
    fn from(config: WeatherConfig) -> Self {
        Self {
            temperature: config.temperature,
            wind_speed: config.wind_speed,
            condition: config.condition,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VehicleState {
    // Flight data
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub speed: f64,
    pub heading: f64,
    pub battery: f64,

    // Mission
    pub payload_active: bool,
    pub mode: Mode,
    pub target: Option<Target>,

    pub tick_count: u64,
}

impl VehicleState {
    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            altitude: 0.0,
            speed: 0.0,
            heading: 0.0,
            battery: 100.0,
            payload_active: false,
            mode: Mode::Loiter,
            target: None,
            tick_count: 0,
        }
    }

    /// Degree-space distance to the current target, if any.
    pub fn distance_to_target(&self) -> Option<f64> {
        self.target
            .map(|t| ((t.lat - self.lat).powi(2) + (t.lon - self.lon).powi(2)).sqrt())
    }
}

/// Display subset of [`VehicleState`], rounded for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub battery: f64,
    pub speed: f64,
    pub heading: f64,
    pub payload_active: bool,
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatus {
    pub connection: &'static str,
    pub gps_satellites: u32,
    pub detections: Vec<Detection>,
    pub weather: Weather,
}
