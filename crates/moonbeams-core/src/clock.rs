//! Clock abstraction for determinism.

use chrono::{DateTime, TimeDelta, Utc};

/// Abstraction over wall-clock time.
///
/// Every deadline in the service (grace delay, keep-alive, sleep timer) is
/// computed from this clock, so tests can drive time by hand.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the time left until `deadline`, negative once it has passed.
    fn until(&self, deadline: DateTime<Utc>) -> TimeDelta {
        deadline - self.now()
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
