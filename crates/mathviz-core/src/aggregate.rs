//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An aggregate whose state changes only by applying its own events.
///
/// Command methods validate, record an event and apply it in one step, so a
/// failed command leaves no trace and a successful one is fully applied
/// before anyone can observe it.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events produced since the last drain.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Removes and returns the pending events.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;
}
