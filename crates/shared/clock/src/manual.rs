use chrono::Duration;
use parking_lot::RwLock;
use sentinel_core::Timestamp;
use std::sync::Arc;

use crate::Clock;

/// Clock that only moves when told to.
///
/// Clones share the same time line, so a test can hold one handle and
/// the engine another.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<RwLock<Timestamp>>,
}

impl ManualClock {
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// Jump to an absolute time (may move backwards, for replays)
    pub fn set(&self, time: Timestamp) {
        *self.now.write() = time;
    }

    /// Advance by a duration
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.write();
        *now += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.read()
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
