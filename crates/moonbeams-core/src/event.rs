//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name, e.g. `narration.unit_submitted`.
    pub event_type: String,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Monotonically increasing version within the aggregate.
    pub sequence_number: i64,
    /// Correlation ID of the command (or wakeup) that led here.
    pub correlation_id: Uuid,
    /// Causation ID linking this event to its direct cause.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Builds metadata for a new event whose cause is the correlated command.
    #[must_use]
    pub fn new(
        event_type: &str,
        aggregate_id: Uuid,
        sequence_number: i64,
        correlation_id: Uuid,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            aggregate_id,
            sequence_number,
            correlation_id,
            causation_id: correlation_id,
            occurred_at,
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
