//! Pure per-session escalation state.
//!
//! No clocks, no capabilities: the driver feeds in elapsed time and
//! applies the returned effects. This keeps the felt-acceleration curve
//! and the audio-start decision testable without any timing machinery.

use std::time::Duration;
use uuid::Uuid;

use crate::storage::EscalationConfig;

/// Effects one tick asks the driver to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Haptic pulse to emit, at the intensity current when the tick fired.
    pub pulse_intensity: f32,
    /// Sound to start looping (at zero volume, fade-in to follow).
    /// Produced at most once per session.
    pub start_sound: Option<String>,
}

/// Escalation state for a single ringing alarm.
#[derive(Debug, Clone)]
pub struct RingingSession {
    alarm_id: Uuid,
    sound_id: String,
    intensity: f32,
    sound_started: bool,
}

impl RingingSession {
    /// Begin a session at the given baseline intensity.
    pub fn new(alarm_id: Uuid, sound_id: String, base_intensity: f32) -> Self {
        Self {
            alarm_id,
            sound_id,
            intensity: base_intensity.clamp(0.0, 1.0),
            sound_started: false,
        }
    }

    pub fn alarm_id(&self) -> Uuid {
        self.alarm_id
    }

    /// Current haptic intensity (0.0-1.0).
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn sound_started(&self) -> bool {
        self.sound_started
    }

    /// Advance one tick at `elapsed` time since the session started.
    ///
    /// The pulse fires at the pre-step intensity, then intensity takes an
    /// exponential step toward 1.0: slow at first, then urgent, never
    /// reaching the maximum in finitely many ticks.
    pub fn tick(&mut self, elapsed: Duration, cfg: &EscalationConfig) -> TickOutcome {
        let pulse_intensity = self.intensity;
        self.intensity += (1.0 - self.intensity) * cfg.intensity_gain;

        let start_sound = if !self.sound_started && elapsed.as_secs_f64() > cfg.sound_delay_secs {
            self.sound_started = true;
            Some(self.sound_id.clone())
        } else {
            None
        };

        TickOutcome {
            pulse_intensity,
            start_sound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cfg() -> EscalationConfig {
        EscalationConfig::default()
    }

    fn session(base: f32) -> RingingSession {
        RingingSession::new(Uuid::new_v4(), "default".to_string(), base)
    }

    #[test]
    fn pulse_fires_at_pre_step_intensity() {
        let mut s = session(0.15);
        let out = s.tick(Duration::ZERO, &cfg());
        assert_eq!(out.pulse_intensity, 0.15);
        assert!(s.intensity() > 0.15);
    }

    #[test]
    fn sound_starts_once_after_delay() {
        let mut s = session(0.15);
        let out = s.tick(Duration::from_secs(14), &cfg());
        assert_eq!(out.start_sound, None);

        let out = s.tick(Duration::from_secs(16), &cfg());
        assert_eq!(out.start_sound.as_deref(), Some("default"));
        assert!(s.sound_started());

        let out = s.tick(Duration::from_secs(18), &cfg());
        assert_eq!(out.start_sound, None);
    }

    #[test]
    fn base_intensity_is_clamped_to_unit_range() {
        assert_eq!(session(-0.5).intensity(), 0.0);
        assert_eq!(session(1.5).intensity(), 1.0);
    }

    proptest! {
        #[test]
        fn intensity_monotonically_approaches_one(
            base in 0.1f32..=0.8,
            ticks in 1usize..200,
        ) {
            let mut s = session(base);
            let mut prev = s.intensity();
            for i in 0..ticks {
                s.tick(Duration::from_secs_f64(1.5 * i as f64), &cfg());
                let cur = s.intensity();
                prop_assert!(cur >= prev);
                prop_assert!(cur < 1.0);
                prev = cur;
            }
        }
    }
}
