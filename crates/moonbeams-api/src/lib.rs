//! Moonbeams API — HTTP surface, coordinator runtime and infrastructure
//! adapters for the bedtime narration service.

pub mod config;
pub mod engine;
pub mod error;
pub mod routes;
pub mod runtime;
pub mod state;
pub mod story_client;
pub mod telemetry;
