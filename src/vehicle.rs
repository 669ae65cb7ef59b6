use anyhow::{anyhow, Result};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::simulation::{Detection, SimulationEngine, Snapshot, SystemStatus, Target};

/// Shared handle to the simulated vehicle. Every call holds the lock for its
/// whole duration, so a tick is never observed half-applied.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub vehicle_id: String,
    engine: Arc<RwLock<SimulationEngine>>,
}

impl Vehicle {
    pub fn new(vehicle_id: impl Into<String>, engine: SimulationEngine) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            engine: Arc::new(RwLock::new(engine)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, SimulationEngine>> {
        self.engine.read().map_err(|e| anyhow!("Lock error: {}", e))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, SimulationEngine>> {
        self.engine.write().map_err(|e| anyhow!("Lock error: {}", e))
    }

    pub fn advance(&self) -> Result<u64> {
        let mut engine = self.write()?;
        engine.advance();
        Ok(engine.state().tick_count)
    }

    pub fn get_state_snapshot(&self) -> Result<Snapshot> {
        Ok(self.read()?.snapshot())
    }

    pub fn get_system_status(&self) -> Result<SystemStatus> {
        Ok(self.read()?.system_status())
    }

    pub fn set_payload(&self, active: bool) -> Result<()> {
        self.write()?.set_payload(active);
        Ok(())
    }

    pub fn set_target(&self, lat: Option<f64>, lon: Option<f64>) -> Result<Target> {
        Ok(self.write()?.set_target(lat, lon)?)
    }

    /// Copy of every retained detection, oldest first.
    pub fn detections(&self) -> Result<Vec<Detection>> {
        Ok(self.read()?.detections().iter().copied().collect())
    }

    pub fn tick_count(&self) -> Result<u64> {
        Ok(self.read()?.state().tick_count)
    }
}
