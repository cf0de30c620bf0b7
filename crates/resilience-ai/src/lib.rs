//! Impact simulation engine for country resilience scoring.
//!
//! The crate turns a free-text crisis headline into a bounded set of
//! country/aspect score deltas, merges them onto a public-data baseline,
//! and derives comparative summaries. HTTP serving, persistence, and the
//! hosted language model behind scenario interpretation are collaborators
//! reached through the traits in [`simulation`].

pub mod config;
pub mod error;
pub mod simulation;
pub mod telemetry;
