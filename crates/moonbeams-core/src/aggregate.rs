//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for the in-memory state machines that record domain events.
///
/// Every transition goes through `apply`, so the uncommitted events are an
/// exact log of how the current state was reached.
pub trait AggregateRoot: Send {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded since the last drain.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Removes and returns the recorded events.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;
}
