//! Deterministic clocks for event timestamps.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mathviz_core::event::Clock;

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// The instant every fixture uses unless a test needs its own.
    #[must_use]
    pub fn lesson_start() -> Self {
        Self(
            Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }

    /// The clock as the shared trait object sessions hold.
    #[must_use]
    pub fn shared(self) -> Arc<dyn Clock> {
        Arc::new(self)
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::lesson_start()
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
