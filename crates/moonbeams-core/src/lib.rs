//! Moonbeams Core — shared domain abstractions.
//!
//! This crate defines the traits and types that the narration and session
//! contexts share: time, commands, events, aggregates, the wakeup schedule,
//! and the collaborator boundaries (narration engine, story source). It
//! contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod engine;
pub mod error;
pub mod event;
pub mod journal;
pub mod schedule;
pub mod story;
