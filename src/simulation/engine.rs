use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::detections::DetectionLog;
use super::error::SimulationError;
use super::state::{Detection, Mode, Snapshot, SystemStatus, Target, VehicleState, Weather};
use crate::config::SimulationConfig;
use crate::util::round_to;

// Battery drain per tick, in percent.
const DRAIN_IDLE: f64 = 0.1;
const DRAIN_PAYLOAD: f64 = 0.3;

// Navigation works in raw degree space; the step is not scaled by `speed`.
const ARRIVAL_THRESHOLD_DEG: f64 = 1e-4;
const MISSION_STEP_DEG: f64 = 0.00015;
const LOITER_DRIFT_DEG: f64 = 0.00005;
const LOITER_FREQUENCY: f64 = 0.1;
const LOITER_TURN_DEG: f64 = 1.0;

const ALTITUDE_BASELINE_M: f64 = 50.0;
const ALTITUDE_AMPLITUDE_M: f64 = 5.0;
const ALTITUDE_FREQUENCY: f64 = 0.05;

const CRUISE_SPEED_MS: f64 = 10.0;
const SPEED_JITTER_MS: f64 = 1.0;

const DETECTION_JITTER_DEG: f64 = 1e-4;
const RECENT_DETECTIONS: usize = 5;

const CONNECTION_STATUS: &str = "CONNECTED";
const GPS_SATELLITES: u32 = 12;

/// Owns the simulated vehicle and moves it forward one tick at a time.
#[derive(Debug)]
pub struct SimulationEngine {
    state: VehicleState,
    detections: DetectionLog,
    weather: Weather,
    detection_probability: f64,
    rng: StdRng,
    battery_depleted: bool,
}

impl SimulationEngine {
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: VehicleState::at(config.home_lat, config.home_lon),
            detections: DetectionLog::with_capacity(config.detection_capacity),
            weather: config.weather.clone().into(),
            detection_probability: sanitize_probability(config.detection_probability),
            rng,
            battery_depleted: false,
        }
    }

    /// Runs one simulation tick.
    pub fn advance(&mut self) {
        self.state.tick_count += 1;
        let tick = self.state.tick_count as f64;

        self.drain_battery();
        self.navigate(tick);

        self.state.altitude =
            ALTITUDE_BASELINE_M + (tick * ALTITUDE_FREQUENCY).sin() * ALTITUDE_AMPLITUDE_M;
        // Decorative only, position updates ignore it.
        self.state.speed = CRUISE_SPEED_MS + jitter(&mut self.rng, SPEED_JITTER_MS);

        if self.rng.gen_bool(self.detection_probability) {
            self.emit_detection();
        }
    }

    fn drain_battery(&mut self) {
        if self.state.battery <= 0.0 {
            return;
        }
        let drain = if self.state.payload_active {
            DRAIN_PAYLOAD
        } else {
            DRAIN_IDLE
        };
        self.state.battery = (self.state.battery - drain).max(0.0);

        if self.state.battery == 0.0 && !self.battery_depleted {
            self.battery_depleted = true;
            warn!("Battery depleted at tick {}", self.state.tick_count);
        }
    }

    fn navigate(&mut self, tick: f64) {
        match self.state.target {
            Some(target) => {
                let d_lat = target.lat - self.state.lat;
                let d_lon = target.lon - self.state.lon;
                let distance = d_lat.hypot(d_lon);

                if distance < ARRIVAL_THRESHOLD_DEG {
                    info!(
                        "Reached target ({:.6}, {:.6}) at tick {}, holding position",
                        target.lat, target.lon, self.state.tick_count
                    );
                    self.state.target = None;
                    self.set_mode(Mode::Loiter);
                } else {
                    self.set_mode(Mode::Mission);
                    self.state.lat += d_lat / distance * MISSION_STEP_DEG;
                    self.state.lon += d_lon / distance * MISSION_STEP_DEG;
                    self.state.heading = normalize_heading(d_lon.atan2(d_lat).to_degrees());
                }
            }
            None => {
                self.set_mode(Mode::Loiter);
                let phase = tick * LOITER_FREQUENCY;
                self.state.lat += phase.sin() * LOITER_DRIFT_DEG;
                self.state.lon += phase.cos() * LOITER_DRIFT_DEG;
                self.state.heading = normalize_heading(self.state.heading + LOITER_TURN_DEG);
            }
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.state.mode != mode {
            debug!(
                "Mode {:?} -> {:?} at tick {}",
                self.state.mode, mode, self.state.tick_count
            );
            self.state.mode = mode;
        }
    }

    fn emit_detection(&mut self) {
        let detection = Detection {
            lat: self.state.lat + jitter(&mut self.rng, DETECTION_JITTER_DEG),
            lon: self.state.lon + jitter(&mut self.rng, DETECTION_JITTER_DEG),
            timestamp: self.state.tick_count,
        };
        info!(
            "Detection at ({:.6}, {:.6}), tick {}",
            detection.lat, detection.lon, detection.timestamp
        );
        self.detections.push(detection);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lat: self.state.lat,
            lon: self.state.lon,
            altitude: round_to(self.state.altitude, 2),
            battery: round_to(self.state.battery, 1),
            speed: round_to(self.state.speed, 1),
            heading: self.state.heading,
            payload_active: self.state.payload_active,
            mode: self.state.mode,
        }
    }

    pub fn system_status(&self) -> SystemStatus {
        SystemStatus {
            connection: CONNECTION_STATUS,
            gps_satellites: GPS_SATELLITES,
            detections: self.detections.recent(RECENT_DETECTIONS),
            weather: self.weather.clone(),
        }
    }

    pub fn set_payload(&mut self, active: bool) {
        if self.state.payload_active != active {
            info!("Payload {}", if active { "active" } else { "standby" });
        }
        self.state.payload_active = active;
    }

    /// Sets a navigation target. Mode is reconciled on the next tick.
    ///
    /// Coordinates are not range checked against Earth limits; values outside
    /// them are accepted and logged.
    pub fn set_target(
        &mut self,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Target, SimulationError> {
        let lat = lat.ok_or(SimulationError::MissingCoordinate("lat"))?;
        let lon = lon.ok_or(SimulationError::MissingCoordinate("lon"))?;
        ensure_finite("lat", lat)?;
        ensure_finite("lon", lon)?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            warn!("Target ({}, {}) is outside Earth coordinate range", lat, lon);
        }

        let target = Target { lat, lon };
        if let Some(previous) = self.state.target.replace(target) {
            debug!(
                "Overwriting target ({:.6}, {:.6})",
                previous.lat, previous.lon
            );
        }
        info!("Navigation target set to ({:.6}, {:.6})", lat, lon);
        Ok(target)
    }

    pub fn is_battery_depleted(&self) -> bool {
        self.battery_depleted
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn detections(&self) -> &DetectionLog {
        &self.detections
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

/// Non-finite probabilities disable detections instead of panicking in `gen_bool`.
fn sanitize_probability(probability: f64) -> f64 {
    if probability.is_finite() {
        probability.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn ensure_finite(name: &'static str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidCoordinate { name, value })
    }
}

/// Uniform noise in `[-amplitude, amplitude)`.
fn jitter(rng: &mut StdRng, amplitude: f64) -> f64 {
    if amplitude > 0.0 {
        rng.gen_range(-amplitude..amplitude)
    } else {
        0.0
    }
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_heading(degrees: f64) -> f64 {
    let heading = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if heading >= 360.0 {
        0.0
    } else {
        heading
    }
}
