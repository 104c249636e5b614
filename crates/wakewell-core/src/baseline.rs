//! Adaptive baseline intensity model.
//!
//! The starting haptic intensity for a new ringing session adapts to how
//! long the user took to dismiss previous sessions: slow responders get a
//! stronger start next time, fast responders a gentler one. The three-way
//! thresholding (>15 s, <5 s, else unchanged) is deliberately coarse so
//! the baseline does not oscillate on noise near a boundary.

use std::sync::Arc;
use std::time::Duration;

use crate::storage::{KeyValueStore, BASELINE_KEY};

/// Starting intensity when no response has ever been recorded.
pub const DEFAULT_BASE_INTENSITY: f32 = 0.15;

/// Lower clamp for the persisted baseline.
pub const MIN_BASE_INTENSITY: f32 = 0.10;

/// Upper clamp for the persisted baseline.
pub const MAX_BASE_INTENSITY: f32 = 0.80;

/// Responses slower than this raise the baseline.
const SLOW_RESPONSE_SECS: f64 = 15.0;

/// Responses faster than this lower the baseline.
const FAST_RESPONSE_SECS: f64 = 5.0;

const SLOW_STEP: f32 = 0.10;
const FAST_STEP: f32 = 0.05;

/// Pure update rule, applied once per completed session.
pub fn adapt(base: f32, response_time: Duration) -> f32 {
    let secs = response_time.as_secs_f64();
    let next = if secs > SLOW_RESPONSE_SECS {
        base + SLOW_STEP
    } else if secs < FAST_RESPONSE_SECS {
        base - FAST_STEP
    } else {
        base
    };
    next.clamp(MIN_BASE_INTENSITY, MAX_BASE_INTENSITY)
}

/// Persisted baseline scalar under [`BASELINE_KEY`].
///
/// Single-writer-then-reader: the engine writes at session stop and reads
/// at the next session start; nothing touches the key concurrently.
#[derive(Clone)]
pub struct BaselineStore {
    kv: Arc<dyn KeyValueStore>,
}

impl BaselineStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Current baseline, or the default when unset or unreadable.
    pub fn load(&self) -> f32 {
        match self.kv.read(BASELINE_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<f32>() {
                Ok(v) => v.clamp(MIN_BASE_INTENSITY, MAX_BASE_INTENSITY),
                Err(_) => {
                    tracing::warn!(%raw, "unparseable baseline value, using default");
                    DEFAULT_BASE_INTENSITY
                }
            },
            Ok(None) => DEFAULT_BASE_INTENSITY,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read baseline, using default");
                DEFAULT_BASE_INTENSITY
            }
        }
    }

    /// Apply one session's response time and persist. Returns the new
    /// baseline; a failed write is logged and the value still returned so
    /// the in-memory session stays coherent.
    pub fn record(&self, response_time: Duration) -> f32 {
        let next = adapt(self.load(), response_time);
        if let Err(e) = self.kv.write(BASELINE_KEY, &next.to_string()) {
            tracing::warn!(error = %e, "failed to persist baseline");
        }
        next
    }
}
