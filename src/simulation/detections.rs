use std::collections::VecDeque;

use tracing::debug;

use super::state::Detection;

/// Bounded, insertion-ordered store of detections. Once full, each push
/// evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct DetectionLog {
    entries: VecDeque<Detection>,
    capacity: usize,
    evicted: u64,
}

impl DetectionLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            evicted: 0,
        }
    }

    pub fn push(&mut self, detection: Detection) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.evicted += 1;
            debug!(
                "Detection log full ({} entries), evicted oldest (total evicted: {})",
                self.capacity, self.evicted
            );
        }
        self.entries.push_back(detection);
    }

    /// The last `n` detections, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Detection> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
