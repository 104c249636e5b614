//! Hold-to-stop dismissal gesture.
//!
//! Dismissing a ringing alarm requires a sustained, uninterrupted press:
//! deliberate friction so a half-asleep reflex cannot silence the alarm.
//! Progress accumulates only while the press is held; any interruption
//! before completion resets it to zero -- no partial credit carries into
//! the next attempt.
//!
//! ## State Transitions
//!
//! ```text
//! AtRest -> Holding(progress 0 -> 1) -> Completed
//!               |
//!               release -> AtRest(progress 0)
//! ```
//!
//! [`HoldGesture`] is the pure state machine; [`HoldController`] drives it
//! on a timer and calls [`EscalationEngine::stop`] on completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::ringing::EscalationEngine;
use crate::storage::HoldConfig;

/// Dismissal gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    AtRest,
    Holding,
    Completed,
}

/// Pure hold progress state machine. Thread-agnostic; the driver feeds
/// it fixed-size time steps.
#[derive(Debug, Clone)]
pub struct HoldGesture {
    state: HoldState,
    progress: f64,
    step: f64,
}

impl HoldGesture {
    pub fn new(cfg: &HoldConfig) -> Self {
        let step = if cfg.duration_secs > 0.0 {
            cfg.step_secs / cfg.duration_secs
        } else {
            1.0
        };
        Self {
            state: HoldState::AtRest,
            progress: 0.0,
            step,
        }
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    /// Progress in [0.0, 1.0]. Authoritatively 0 the instant a hold is
    /// interrupted, whatever a display animation shows.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Begin a hold attempt. Always starts from zero, including when it
    /// restarts over a prior attempt.
    pub fn begin(&mut self) {
        self.progress = 0.0;
        self.state = HoldState::Holding;
    }

    /// Advance one time step. Returns true exactly once, on the step
    /// that completes the gesture.
    pub fn advance(&mut self) -> bool {
        if self.state != HoldState::Holding {
            return false;
        }
        self.progress = (self.progress + self.step).min(1.0);
        if self.progress >= 1.0 {
            self.state = HoldState::Completed;
            true
        } else {
            false
        }
    }

    /// Interrupt the hold. Before completion this resets progress to
    /// exactly zero; after completion it is irrelevant.
    pub fn release(&mut self) {
        if self.state == HoldState::Holding {
            self.state = HoldState::AtRest;
            self.progress = 0.0;
        }
    }
}

struct Attempt {
    cancelled: Arc<AtomicBool>,
    completed: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Drives the hold gesture against the escalation engine.
///
/// One controller per ringing view. `press` is an idempotent restart: a
/// new hold first cancels any attempt in flight, never stacking two
/// progress timers. Completion fires exactly once; after the configured
/// settle delay it stops the engine and latches the dismissed signal.
pub struct HoldController {
    engine: Arc<EscalationEngine>,
    cfg: HoldConfig,
    attempt: Mutex<Option<Attempt>>,
    progress_tx: Arc<watch::Sender<f64>>,
    dismissed_tx: Arc<watch::Sender<bool>>,
}

impl HoldController {
    pub fn new(engine: Arc<EscalationEngine>, cfg: HoldConfig) -> Self {
        let (progress_tx, _) = watch::channel(0.0);
        let (dismissed_tx, _) = watch::channel(false);
        Self {
            engine,
            cfg,
            attempt: Mutex::new(None),
            progress_tx: Arc::new(progress_tx),
            dismissed_tx: Arc::new(dismissed_tx),
        }
    }

    /// Live hold progress for the vortex display.
    pub fn progress_watch(&self) -> watch::Receiver<f64> {
        self.progress_tx.subscribe()
    }

    /// Flips to true once dismissal is confirmed; the caller closes the
    /// ringing view on it.
    pub fn dismissed_watch(&self) -> watch::Receiver<bool> {
        self.dismissed_tx.subscribe()
    }

    /// Whether a hold attempt is currently accumulating progress.
    pub fn is_holding(&self) -> bool {
        self.attempt
            .lock()
            .unwrap()
            .as_ref()
            .map(|a| !a.cancelled.load(Ordering::SeqCst) && !a.completed.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// The press began (or re-began). Cancels any attempt in flight and
    /// starts a fresh one from zero. Ignored once dismissal is latched.
    pub fn press(&self) {
        let mut attempt = self.attempt.lock().unwrap();
        if let Some(prior) = attempt.take() {
            if prior.completed.load(Ordering::SeqCst) {
                *attempt = Some(prior);
                return;
            }
            prior.cancelled.store(true, Ordering::SeqCst);
            prior.task.abort();
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let completed = Arc::new(AtomicBool::new(false));
        let _ = self.progress_tx.send(0.0);

        let task = tokio::spawn(hold_loop(
            cancelled.clone(),
            completed.clone(),
            self.engine.clone(),
            self.cfg.clone(),
            self.progress_tx.clone(),
            self.dismissed_tx.clone(),
        ));

        *attempt = Some(Attempt {
            cancelled,
            completed,
            task,
        });
    }

    /// The press ended. Cancels the attempt and resets progress to zero,
    /// unless completion already latched.
    pub fn release(&self) {
        let mut attempt = self.attempt.lock().unwrap();
        if let Some(prior) = attempt.take() {
            if prior.completed.load(Ordering::SeqCst) {
                *attempt = Some(prior);
                return;
            }
            prior.cancelled.store(true, Ordering::SeqCst);
            prior.task.abort();
            let _ = self.progress_tx.send(0.0);
        }
    }
}

async fn hold_loop(
    cancelled: Arc<AtomicBool>,
    completed: Arc<AtomicBool>,
    engine: Arc<EscalationEngine>,
    cfg: HoldConfig,
    progress_tx: Arc<watch::Sender<f64>>,
    dismissed_tx: Arc<watch::Sender<bool>>,
) {
    let mut gesture = HoldGesture::new(&cfg);
    gesture.begin();
    let step = Duration::from_secs_f64(cfg.step_secs);

    loop {
        sleep(step).await;
        // Release during the sleep: no further progress, no effects.
        if cancelled.load(Ordering::SeqCst) {
            return;
        }
        let done = gesture.advance();
        if done {
            completed.store(true, Ordering::SeqCst);
        }
        let _ = progress_tx.send(gesture.progress());
        if done {
            break;
        }
    }

    // Settle delay is presentation smoothing only; the stop itself is
    // never delayed beyond it, and a release after completion no longer
    // cancels anything.
    sleep(Duration::from_secs_f64(cfg.settle_secs)).await;
    engine.stop();
    let _ = dismissed_tx.send(true);
}
