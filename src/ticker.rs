use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::vehicle::Vehicle;

/// Advances the simulation on a fixed wall-clock period.
pub struct Ticker {
    vehicle: Vehicle,
    period: Duration,
    running: Arc<AtomicBool>,
}

impl Ticker {
    pub fn new(vehicle: Vehicle, period: Duration) -> Self {
        Self {
            vehicle,
            period,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        info!("Simulation ticker started, period {:?}", self.period);
        self.running.store(true, Ordering::SeqCst);

        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.running.load(Ordering::SeqCst) {
            interval.tick().await;
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            let tick = self.vehicle.advance()?;
            debug!("Tick {}", tick);
        }

        info!("Simulation ticker stopped");
        Ok(())
    }

    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::simulation::SimulationEngine;

    fn vehicle() -> Vehicle {
        let engine = SimulationEngine::new(&SimulationConfig {
            seed: Some(1),
            ..Default::default()
        });
        Vehicle::new("ticker-test", engine)
    }

    #[tokio::test]
    async fn advances_until_stopped() -> Result<()> {
        let vehicle = vehicle();
        let ticker = Arc::new(Ticker::new(vehicle.clone(), Duration::from_millis(10)));

        let handle = {
            let ticker = ticker.clone();
            tokio::spawn(async move { ticker.start().await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(ticker.is_running());
        ticker.stop().await;
        handle.await??;

        let ticks = vehicle.tick_count()?;
        assert!(ticks >= 1, "expected at least one tick, got {}", ticks);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(vehicle.tick_count()?, ticks);
        Ok(())
    }

    #[tokio::test]
    async fn first_tick_waits_one_period() -> Result<()> {
        let vehicle = vehicle();
        let ticker = Arc::new(Ticker::new(vehicle.clone(), Duration::from_secs(60)));

        let handle = {
            let ticker = ticker.clone();
            tokio::spawn(async move { ticker.start().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(vehicle.tick_count()?, 0);

        handle.abort();
        Ok(())
    }
}
