//! Domain event abstractions and the clock used to stamp them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Abstraction over system time so event timestamps are deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name, e.g. `playback.advanced`.
    pub event_type: String,
    /// Aggregate (session) this event belongs to.
    pub aggregate_id: Uuid,
    /// Monotonically increasing version within the aggregate stream.
    pub sequence_number: i64,
    /// Correlation ID of the command that produced the event.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Builds metadata for the next event of an aggregate.
    #[must_use]
    pub fn next(
        event_type: &str,
        aggregate_id: Uuid,
        sequence_number: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            aggregate_id,
            sequence_number,
            correlation_id,
            occurred_at: clock.now(),
        }
    }
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct StoppedClock(DateTime<Utc>);

    impl Clock for StoppedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_next_metadata_stamps_clock_time_and_fresh_event_id() {
        // Arrange
        let at = Utc.with_ymd_and_hms(2026, 1, 3, 9, 0, 0).unwrap();
        let clock = StoppedClock(at);
        let session_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        // Act
        let first = EventMetadata::next("playback.started", session_id, 4, correlation_id, &clock);
        let second = EventMetadata::next("playback.started", session_id, 5, correlation_id, &clock);

        // Assert
        assert_eq!(first.occurred_at, at);
        assert_eq!(first.sequence_number, 4);
        assert_eq!(first.aggregate_id, session_id);
        assert_eq!(first.event_type, "playback.started");
        assert_ne!(first.event_id, second.event_id);
    }
}
