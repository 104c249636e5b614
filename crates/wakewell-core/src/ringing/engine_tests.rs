//! Escalation engine scenarios under virtual time.
//!
//! All tests run on a paused Tokio clock, so the 20-second wake-up
//! scenario executes instantly and tick counts are deterministic.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::alarm::{Alarm, AlarmTime};
use crate::baseline::BaselineStore;
use crate::capability::testing::{RecordingAudio, RecordingHaptics};
use crate::events::Event;
use crate::ringing::EscalationEngine;
use crate::storage::{EscalationConfig, KeyValueStore, MemoryStore, BASELINE_KEY};

fn engine_with(
    haptics: Arc<RecordingHaptics>,
    audio: Arc<RecordingAudio>,
    kv: Arc<MemoryStore>,
) -> EscalationEngine {
    EscalationEngine::new(
        haptics,
        audio,
        BaselineStore::new(kv),
        EscalationConfig::default(),
    )
}

fn test_alarm() -> Alarm {
    Alarm::new(AlarmTime::new(6, 30))
}

#[tokio::test(start_paused = true)]
async fn start_is_reentrant() {
    let haptics = Arc::new(RecordingHaptics::default());
    let audio = Arc::new(RecordingAudio::default());
    let engine = engine_with(haptics.clone(), audio, Arc::new(MemoryStore::new()));
    let alarm = test_alarm();

    assert!(matches!(
        engine.start(&alarm),
        Some(Event::RingingStarted { .. })
    ));
    assert!(engine.start(&alarm).is_none());
    assert_eq!(engine.current_alarm(), Some(alarm.id));

    // A single tick loop: exactly the pulses of one 1.5 s cadence.
    sleep(Duration::from_secs(5)).await;
    assert_eq!(haptics.pulse_count(), 3);

    engine.stop();
}

#[tokio::test(start_paused = true)]
async fn stop_on_idle_is_noop() {
    let engine = engine_with(
        Arc::new(RecordingHaptics::default()),
        Arc::new(RecordingAudio::default()),
        Arc::new(MemoryStore::new()),
    );
    assert!(engine.stop().is_none());
    assert!(!engine.is_ringing());
}

#[tokio::test(start_paused = true)]
async fn no_pulses_after_stop() {
    let haptics = Arc::new(RecordingHaptics::default());
    let audio = Arc::new(RecordingAudio::default());
    let engine = engine_with(haptics.clone(), audio, Arc::new(MemoryStore::new()));

    engine.start(&test_alarm());
    sleep(Duration::from_secs(5)).await;

    assert!(engine.stop().is_some());
    assert_eq!(haptics.silence_count(), 1);
    let pulses_at_stop = haptics.pulse_count();

    sleep(Duration::from_secs(10)).await;
    assert_eq!(haptics.pulse_count(), pulses_at_stop);

    // Second stop is a no-op.
    assert!(engine.stop().is_none());
    assert_eq!(haptics.silence_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn sound_joins_after_delay_and_fades_in() {
    let haptics = Arc::new(RecordingHaptics::default());
    let audio = Arc::new(RecordingAudio::default());
    let engine = engine_with(haptics, audio.clone(), Arc::new(MemoryStore::new()));

    engine.start(&test_alarm());

    sleep(Duration::from_secs(10)).await;
    assert_eq!(audio.start_count(), 0, "audio must wait out the delay");

    sleep(Duration::from_secs(7)).await;
    assert_eq!(audio.start_count(), 1);
    {
        let volumes = audio.volumes.lock().unwrap();
        // Starts at zero, then the fade-in walks upward.
        assert_eq!(volumes.first().map(|(_, v)| *v), Some(0.0));
        assert!(volumes.last().map(|(_, v)| *v) > Some(0.0));
    }

    engine.stop();
}

#[tokio::test(start_paused = true)]
async fn stop_fades_out_and_releases_player() {
    let audio = Arc::new(RecordingAudio::default());
    let engine = engine_with(
        Arc::new(RecordingHaptics::default()),
        audio.clone(),
        Arc::new(MemoryStore::new()),
    );

    engine.start(&test_alarm());
    sleep(Duration::from_secs(17)).await;
    assert_eq!(audio.start_count(), 1);

    engine.stop();
    // Fade-out runs 1.5 s, then the player is released.
    sleep(Duration::from_secs(2)).await;
    assert_eq!(audio.stop_count(), 1);
    assert_eq!(audio.last_volume(), Some(0.0));
}

#[tokio::test(start_paused = true)]
async fn missing_audio_asset_keeps_haptics_running() {
    let haptics = Arc::new(RecordingHaptics::default());
    let audio = Arc::new(RecordingAudio::unavailable());
    let engine = engine_with(haptics.clone(), audio.clone(), Arc::new(MemoryStore::new()));

    engine.start(&test_alarm());
    sleep(Duration::from_secs(20)).await;

    assert_eq!(audio.start_count(), 0);
    let pulses_so_far = haptics.pulse_count();
    assert!(pulses_so_far >= 12);

    // Escalation never aborts: pulses keep coming.
    sleep(Duration::from_secs(6)).await;
    assert!(haptics.pulse_count() > pulses_so_far);

    engine.stop();
}

#[tokio::test(start_paused = true)]
async fn pulses_escalate_monotonically() {
    let haptics = Arc::new(RecordingHaptics::default());
    let engine = engine_with(
        haptics.clone(),
        Arc::new(RecordingAudio::default()),
        Arc::new(MemoryStore::new()),
    );

    engine.start(&test_alarm());
    sleep(Duration::from_secs(30)).await;
    engine.stop();

    let pulses = haptics.pulses.lock().unwrap();
    assert!(pulses.windows(2).all(|w| w[0] <= w[1]));
    assert!(pulses.iter().all(|&p| p < 1.0));
}

#[tokio::test(start_paused = true)]
async fn intensity_watch_tracks_session() {
    let engine = engine_with(
        Arc::new(RecordingHaptics::default()),
        Arc::new(RecordingAudio::default()),
        Arc::new(MemoryStore::new()),
    );
    let watch = engine.intensity_watch();
    assert_eq!(*watch.borrow(), 0.0);

    engine.start(&test_alarm());
    assert_eq!(*watch.borrow(), 0.15);

    sleep(Duration::from_secs(5)).await;
    assert!(*watch.borrow() > 0.15);

    engine.stop();
    assert_eq!(*watch.borrow(), 0.0);
}

/// The full §scenario: one-shot alarm fires, rings unanswered for 15 s of
/// haptics, audio joins and fades in, the user takes 20 s overall to
/// dismiss, and the next session starts stronger.
#[tokio::test(start_paused = true)]
async fn slow_dismissal_raises_next_baseline() {
    let haptics = Arc::new(RecordingHaptics::default());
    let audio = Arc::new(RecordingAudio::default());
    let kv = Arc::new(MemoryStore::new());
    let engine = engine_with(haptics, audio.clone(), kv.clone());
    let alarm = test_alarm();

    let started = engine.start(&alarm);
    let Some(Event::RingingStarted { base_intensity, .. }) = started else {
        panic!("expected RingingStarted");
    };
    assert_eq!(base_intensity, 0.15);

    sleep(Duration::from_secs(17)).await;
    assert_eq!(audio.start_count(), 1, "audio fading in by now");

    sleep(Duration::from_secs(3)).await;
    let stopped = engine.stop();
    let Some(Event::RingingStopped {
        response_ms,
        next_base_intensity,
        ..
    }) = stopped
    else {
        panic!("expected RingingStopped");
    };
    assert_eq!(response_ms, 20_000);
    assert!((next_base_intensity - 0.25).abs() < 1e-6);

    // The write happened before stop returned: the next start reads it.
    let stored: f32 = kv.read(BASELINE_KEY).unwrap().unwrap().parse().unwrap();
    assert!((stored - 0.25).abs() < 1e-6);
    let restarted = engine.start(&alarm);
    let Some(Event::RingingStarted { base_intensity, .. }) = restarted else {
        panic!("expected RingingStarted");
    };
    assert!((base_intensity - 0.25).abs() < 1e-6);
    engine.stop();
}
