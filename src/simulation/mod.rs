pub mod detections;
pub mod engine;
pub mod error;
pub mod state;

#[cfg(test)]
mod tests;

pub use detections::DetectionLog;
pub use engine::SimulationEngine;
pub use error::SimulationError;
pub use state::{Detection, Mode, Snapshot, SystemStatus, Target, VehicleState, Weather};
