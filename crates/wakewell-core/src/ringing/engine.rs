//! Async escalation driver.
//!
//! Owns the background tick loop for the single active ringing session,
//! the haptic and audio capabilities, and the adaptive baseline. Callers
//! only ever see `start` and `stop`; the engine owns cancellation of its
//! own loop entirely.
//!
//! Cancellation is cooperative: each session carries an `AtomicBool` that
//! every loop re-checks immediately after waking, before producing any
//! side effect, so a stop requested mid-tick cannot schedule one more
//! pulse or start the sound. The sleeping task is additionally aborted on
//! stop so no recurring timer outlives the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use uuid::Uuid;

use crate::alarm::Alarm;
use crate::baseline::BaselineStore;
use crate::capability::{AudioHandle, AudioOutput, Haptics};
use crate::events::Event;
use crate::ringing::session::RingingSession;
use crate::storage::EscalationConfig;

/// Volume steps per fade, in either direction.
const FADE_STEPS: u32 = 20;

/// Shared view of the session's audio player, written by the tick loop
/// and the fade tasks, drained by `stop`.
#[derive(Debug, Default)]
struct AudioState {
    handle: Option<AudioHandle>,
    volume: f32,
}

struct ActiveSession {
    alarm_id: Uuid,
    started_at: Instant,
    ringing: Arc<AtomicBool>,
    audio_state: Arc<Mutex<AudioState>>,
    task: JoinHandle<()>,
}

/// The ringing escalation engine. `Idle -> Ringing -> Idle`.
///
/// `start` and `stop` are safe to call from the delivery and dismissal
/// callers concurrently; effects serialize on the session lock, which is
/// held for the full duration of either call. Both must run inside a
/// Tokio runtime (`start` spawns the tick loop, `stop` the fade-out).
pub struct EscalationEngine {
    haptics: Arc<dyn Haptics>,
    audio: Arc<dyn AudioOutput>,
    baseline: BaselineStore,
    cfg: EscalationConfig,
    active: Mutex<Option<ActiveSession>>,
    intensity_tx: Arc<watch::Sender<f32>>,
}

impl EscalationEngine {
    pub fn new(
        haptics: Arc<dyn Haptics>,
        audio: Arc<dyn AudioOutput>,
        baseline: BaselineStore,
        cfg: EscalationConfig,
    ) -> Self {
        let (intensity_tx, _) = watch::channel(0.0);
        Self {
            haptics,
            audio,
            baseline,
            cfg,
            active: Mutex::new(None),
            intensity_tx: Arc::new(intensity_tx),
        }
    }

    /// Whether a session is currently ringing.
    pub fn is_ringing(&self) -> bool {
        self.active.lock().unwrap().is_some()
    }

    /// Id of the currently ringing alarm, if any.
    pub fn current_alarm(&self) -> Option<Uuid> {
        self.active.lock().unwrap().as_ref().map(|s| s.alarm_id)
    }

    /// Live feed of the current haptic intensity, for the ringing view's
    /// reactive glow. Reads 0.0 while idle.
    pub fn intensity_watch(&self) -> watch::Receiver<f32> {
        self.intensity_tx.subscribe()
    }

    /// Begin ringing for the given alarm. No-op if already ringing
    /// (duplicate delivery events are expected and harmless).
    ///
    /// Reads the adaptive baseline as the starting intensity and spawns
    /// the tick loop.
    pub fn start(&self, alarm: &Alarm) -> Option<Event> {
        let mut active = self.active.lock().unwrap();
        if let Some(current) = active.as_ref() {
            tracing::debug!(alarm_id = %alarm.id, ringing = %current.alarm_id,
                "start while ringing, ignoring");
            return None;
        }

        let base_intensity = self.baseline.load();
        let session = RingingSession::new(alarm.id, alarm.sound_id.clone(), base_intensity);

        let ringing = Arc::new(AtomicBool::new(true));
        let audio_state = Arc::new(Mutex::new(AudioState::default()));
        let started_at = Instant::now();
        let _ = self.intensity_tx.send(base_intensity);

        let task = tokio::spawn(tick_loop(
            session,
            started_at,
            ringing.clone(),
            self.haptics.clone(),
            self.audio.clone(),
            audio_state.clone(),
            self.cfg.clone(),
            self.intensity_tx.clone(),
        ));

        *active = Some(ActiveSession {
            alarm_id: alarm.id,
            started_at,
            ringing,
            audio_state,
            task,
        });

        tracing::debug!(alarm_id = %alarm.id, %base_intensity, "ringing started");
        Some(Event::RingingStarted {
            alarm_id: alarm.id,
            base_intensity,
            at: Utc::now(),
        })
    }

    /// Stop the active session. No-op when idle.
    ///
    /// Haptics are silenced before this returns; the audio fade-out runs
    /// asynchronously for its configured duration. The response time is
    /// recorded into the baseline while the session lock is still held,
    /// so a concurrent `start` observes the adapted value. Must run
    /// inside a Tokio runtime.
    pub fn stop(&self) -> Option<Event> {
        let mut active = self.active.lock().unwrap();
        let session = active.take()?;

        session.ringing.store(false, Ordering::SeqCst);
        session.task.abort();
        self.haptics.silence();
        let _ = self.intensity_tx.send(0.0);

        let response_time = session.started_at.elapsed();
        let next_base_intensity = self.baseline.record(response_time);

        // Drain the player handle now so a subsequent start never races
        // the fade-out for ownership of the audio resource.
        let (handle, volume) = {
            let mut state = session.audio_state.lock().unwrap();
            (state.handle.take(), state.volume)
        };
        if let Some(handle) = handle {
            tokio::spawn(fade_out(
                self.audio.clone(),
                handle,
                volume,
                self.cfg.fade_out_secs,
            ));
        }

        tracing::debug!(alarm_id = %session.alarm_id,
            response_ms = response_time.as_millis() as u64,
            %next_base_intensity, "ringing stopped");
        Some(Event::RingingStopped {
            alarm_id: session.alarm_id,
            response_ms: response_time.as_millis() as u64,
            next_base_intensity,
            at: Utc::now(),
        })
    }
}

#[allow(clippy::too_many_arguments)]
async fn tick_loop(
    mut session: RingingSession,
    started_at: Instant,
    ringing: Arc<AtomicBool>,
    haptics: Arc<dyn Haptics>,
    audio: Arc<dyn AudioOutput>,
    audio_state: Arc<Mutex<AudioState>>,
    cfg: EscalationConfig,
    intensity_tx: Arc<watch::Sender<f32>>,
) {
    let tick = Duration::from_secs_f64(cfg.tick_secs);

    while ringing.load(Ordering::SeqCst) {
        sleep(tick).await;
        // Stop may have been requested during the sleep.
        if !ringing.load(Ordering::SeqCst) {
            break;
        }

        let outcome = session.tick(started_at.elapsed(), &cfg);
        haptics.pulse(outcome.pulse_intensity);
        let _ = intensity_tx.send(session.intensity());

        if let Some(sound_id) = outcome.start_sound {
            start_sound(&sound_id, &ringing, &audio, &audio_state, &cfg);
        }
    }
}

/// Start the looping player at zero volume and kick off the fade-in.
fn start_sound(
    sound_id: &str,
    ringing: &Arc<AtomicBool>,
    audio: &Arc<dyn AudioOutput>,
    audio_state: &Arc<Mutex<AudioState>>,
    cfg: &EscalationConfig,
) {
    let Some(handle) = audio.start_loop(sound_id) else {
        tracing::warn!(sound_id, "audio asset unavailable, continuing haptics-only");
        return;
    };
    audio.set_volume(handle, 0.0);

    // stop() drains the handle under this lock; if it already ran, the
    // session is over and the freshly started player must be released.
    let stale = {
        let mut state = audio_state.lock().unwrap();
        if ringing.load(Ordering::SeqCst) {
            state.handle = Some(handle);
            state.volume = 0.0;
            false
        } else {
            true
        }
    };
    if stale {
        audio.stop(handle);
        return;
    }

    tokio::spawn(fade_in(
        audio.clone(),
        audio_state.clone(),
        ringing.clone(),
        cfg.fade_in_secs,
    ));
}

/// Step volume from silence to full over the configured duration.
async fn fade_in(
    audio: Arc<dyn AudioOutput>,
    audio_state: Arc<Mutex<AudioState>>,
    ringing: Arc<AtomicBool>,
    fade_in_secs: f64,
) {
    let step = Duration::from_secs_f64(fade_in_secs / FADE_STEPS as f64);
    for i in 1..=FADE_STEPS {
        sleep(step).await;
        if !ringing.load(Ordering::SeqCst) {
            return;
        }
        let target = i as f32 / FADE_STEPS as f32;
        let handle = {
            let mut state = audio_state.lock().unwrap();
            state.volume = target;
            state.handle
        };
        match handle {
            Some(handle) => audio.set_volume(handle, target),
            // stop() already drained the player.
            None => return,
        }
    }
}

/// Step volume down from where the fade-in left it, then release the
/// player. Owns the handle outright; the session is already gone.
async fn fade_out(
    audio: Arc<dyn AudioOutput>,
    handle: AudioHandle,
    from_volume: f32,
    fade_out_secs: f64,
) {
    let step = Duration::from_secs_f64(fade_out_secs / FADE_STEPS as f64);
    for i in (0..FADE_STEPS).rev() {
        sleep(step).await;
        audio.set_volume(handle, from_volume * i as f32 / FADE_STEPS as f32);
    }
    audio.stop(handle);
}
