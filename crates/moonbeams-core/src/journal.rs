//! In-memory event journal.
//!
//! Recorded events are kept for diagnostics only; nothing survives a
//! restart.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::event::DomainEvent;

/// Stored representation of a domain event.
#[derive(Debug, Clone, Serialize)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Event type name.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Sequence number within the aggregate.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Causation ID linking to the causing command.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Converts a domain event into its stored form.
    pub fn from_event<E: DomainEvent>(event: &E) -> Self {
        let meta = event.metadata();
        Self {
            event_id: meta.event_id,
            aggregate_id: meta.aggregate_id,
            event_type: event.event_type().to_owned(),
            payload: event.to_payload(),
            sequence_number: meta.sequence_number,
            correlation_id: meta.correlation_id,
            causation_id: meta.causation_id,
            occurred_at: meta.occurred_at,
        }
    }
}

/// Append-only sink for stored events.
pub trait EventJournal: Send + Sync {
    /// Appends events in order.
    fn append(&self, events: &[StoredEvent]);

    /// Returns up to `limit` of the most recent events, oldest first.
    fn recent(&self, limit: usize) -> Vec<StoredEvent>;
}

/// Journal that keeps only the newest `capacity` events.
#[derive(Debug)]
pub struct BoundedJournal {
    capacity: usize,
    events: Mutex<VecDeque<StoredEvent>>,
}

impl BoundedJournal {
    /// Default number of retained events.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a journal retaining at most `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }
}

impl Default for BoundedJournal {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl EventJournal for BoundedJournal {
    fn append(&self, events: &[StoredEvent]) {
        let mut guard = self
            .events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for event in events {
            if guard.len() == self.capacity {
                guard.pop_front();
            }
            guard.push_back(event.clone());
        }
    }

    fn recent(&self, limit: usize) -> Vec<StoredEvent> {
        let guard = self
            .events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let skip = guard.len().saturating_sub(limit);
        guard.iter().skip(skip).cloned().collect()
    }
}
