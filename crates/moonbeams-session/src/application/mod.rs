//! Application layer: the sleep timer controller and the coordinator.

pub mod command_handlers;
pub mod coordinator;
pub mod query_handlers;
