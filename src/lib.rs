//! cuesync - align a transcript with recognized speech
//!
//! Matches each transcript line against a timestamped word stream produced by
//! speech recognition and emits strictly ordered subtitle cues, falling back
//! to estimated timings where recognition and transcript disagree.

pub mod align;
pub mod cli;
pub mod config;
pub mod debug_dump;
pub mod error;
pub mod recognize;
pub mod setup;
pub mod subtitle;
pub mod text;
pub mod timing;
pub mod transcript;
pub mod workflow;
