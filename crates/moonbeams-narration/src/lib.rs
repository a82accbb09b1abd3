//! Moonbeams — narration playback bounded context.
//!
//! Responsible for turning a story into speakable units, feeding them to
//! the narration engine one at a time, pause/resume/stop, and the
//! keep-alive prod that stops engines from dozing off between sentences.

pub mod application;
pub mod domain;
