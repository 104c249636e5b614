//! Ringing escalation: a time-driven ramp of stimulus intensity.
//!
//! Split the way the timer engines in this codebase usually are: a pure,
//! thread-agnostic state machine ([`RingingSession`]) that computes what
//! should happen on each tick, and an async driver ([`EscalationEngine`])
//! that owns the background loop, the capabilities, and cancellation.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Ringing -> Idle
//! ```
//!
//! At most one session is active at a time; a second `start` while ringing
//! is a no-op.

pub mod engine;
pub mod session;

#[cfg(test)]
mod engine_tests;

pub use engine::EscalationEngine;
pub use session::{RingingSession, TickOutcome};
