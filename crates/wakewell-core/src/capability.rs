//! External capability boundaries.
//!
//! The core never vibrates hardware, plays samples, or talks to the
//! platform notifier itself. Each capability is an explicitly-owned
//! service object injected at construction (`Arc<dyn Trait>`), exposing
//! only the narrow surface the core drives. All calls are best-effort:
//! an implementation that can do nothing simply does nothing, and the
//! escalation state machine keeps running regardless.

use std::sync::atomic::{AtomicU64, Ordering};

/// Haptic output. Fire-and-forget; failures are non-fatal and ignored.
pub trait Haptics: Send + Sync {
    /// Emit one pulse at the given intensity (0.0-1.0).
    fn pulse(&self, intensity: f32);

    /// Stop any ongoing vibration immediately.
    fn silence(&self);
}

/// Opaque handle to one looping audio player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioHandle(u64);

impl AudioHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Audio output. The core drives volume through its own timed fade steps
/// rather than trusting the capability to fade natively.
pub trait AudioOutput: Send + Sync {
    /// Begin looping the given catalog sound. `None` when the asset is
    /// missing or playback cannot start; the session continues
    /// haptics-only in that case.
    fn start_loop(&self, sound_id: &str) -> Option<AudioHandle>;

    /// Set player volume (0.0-1.0).
    fn set_volume(&self, handle: AudioHandle, volume: f32);

    /// Stop playback and release the player.
    fn stop(&self, handle: AudioHandle);
}

/// Platform reminder scheduling. Registration ids equal the alarm's id
/// string so cancellation-by-id is exact and collision-free.
pub trait ReminderScheduler: Send + Sync {
    /// Register a reminder firing at hour:minute, repeating when asked.
    fn schedule(&self, id: &str, hour: u32, minute: u32, repeats: bool);

    /// Cancel any pending reminder registered under `id`.
    fn cancel(&self, id: &str);
}

/// Haptics that do nothing (no hardware, or permission denied).
#[derive(Debug, Default)]
pub struct NoopHaptics;

impl Haptics for NoopHaptics {
    fn pulse(&self, _intensity: f32) {}
    fn silence(&self) {}
}

/// Audio output with no player available; every loop fails to start.
#[derive(Debug, Default)]
pub struct NoopAudio;

impl AudioOutput for NoopAudio {
    fn start_loop(&self, _sound_id: &str) -> Option<AudioHandle> {
        None
    }
    fn set_volume(&self, _handle: AudioHandle, _volume: f32) {}
    fn stop(&self, _handle: AudioHandle) {}
}

/// Scheduler that accepts everything and schedules nothing.
#[derive(Debug, Default)]
pub struct NoopScheduler;

impl ReminderScheduler for NoopScheduler {
    fn schedule(&self, _id: &str, _hour: u32, _minute: u32, _repeats: bool) {}
    fn cancel(&self, _id: &str) {}
}

static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Mint a process-unique audio handle. Intended for capability
/// implementations that track players themselves.
pub fn next_audio_handle() -> AudioHandle {
    AudioHandle::new(HANDLE_COUNTER.fetch_add(1, Ordering::Relaxed))
}
