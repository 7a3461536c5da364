//! Sentinel Clock Infrastructure
//!
//! Time source abstraction for the engine. Instructions, audit records and
//! session bookkeeping are stamped through a [`Clock`] so that tests can run
//! against a deterministic time line.
//!
//! ```ignore
//! use sentinel_clock::{Clock, ManualClock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::starting_at(session_open);
//! clock.advance(Duration::minutes(15));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

use sentinel_core::Timestamp;

/// Port for time abstraction
///
/// - Real system time for production
/// - Manually advanced time for deterministic tests and replays
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
