//! Application layer: drives the playback aggregate against the engine.

pub mod command_handlers;
pub mod query_handlers;
