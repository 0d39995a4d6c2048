use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

/// Injectable time source.
///
/// Cache TTLs and tier decay are pure functions of the current time, so every
/// component that needs "now" takes a clock instead of calling `Utc::now()`
/// directly. Tests drive a `ManualClock`; production uses `SystemClock`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for deterministic tests.
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.write().expect("clock lock poisoned");
        *now = *now + delta;
    }

    /// Set the clock to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.write().expect("clock lock poisoned");
        *now = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock poisoned")
    }
}
