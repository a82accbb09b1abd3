//! Domain model for the bedtime session.

pub mod aggregates;
pub mod commands;
pub mod countdown;
pub mod events;
