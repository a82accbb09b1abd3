//! Command abstractions.

use uuid::Uuid;

/// Trait that all listener-initiated commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging).
    fn command_type(&self) -> &'static str;

    /// Correlation ID linking the command to the events it causes.
    fn correlation_id(&self) -> Uuid;
}
