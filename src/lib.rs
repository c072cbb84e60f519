//! CalmMind — personalised guided meditation sessions.
//!
//! A user picks how they feel and what they want to feel; the
//! [`pipeline`] writes a title and script, narrates it and records the
//! session; the [`session`] view then hands the result to a
//! [`playback`] controller that follows either the real audio or a
//! simulated one-second clock.

pub mod catalog;
pub mod config;
pub mod identity;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod playback;
pub mod progress;
pub mod session;
pub mod store;
pub mod tts;
