//! # Wakewell Core Library
//!
//! Core business logic for the Wakewell escalating haptic alarm: the alarm
//! collection with its platform reminder scheduling, the ringing escalation
//! engine, and the hold-to-stop dismissal gesture. All presentation and the
//! platform capabilities that actually vibrate, play audio, or deliver
//! notifications live outside this crate, behind the traits in
//! [`capability`].
//!
//! ## Architecture
//!
//! - **Alarm Store**: owns the alarm collection; every mutation re-derives
//!   platform reminder registration and persists the full collection
//! - **Escalation Engine**: a background tick loop that ramps haptic
//!   intensity along an exponential approach curve and fades audio in
//!   after a haptics-only grace period
//! - **Adaptive Baseline**: the starting intensity for a new session,
//!   learned from how long past sessions took to dismiss
//! - **Hold Controller**: a cancellable, duration-gated confirmation that
//!   guards against accidental dismissal
//! - **Storage**: key-value persistence under well-known keys plus
//!   TOML-based timing configuration
//!
//! ## Control Flow
//!
//! The store schedules one platform reminder per enabled alarm. Delivery
//! comes back through [`DeliveryRouter`], which starts the engine for the
//! delivered alarm id. The hold controller runs alongside the ringing
//! session; completing the hold stops the engine, which records the
//! response time into the adaptive baseline for next time.

pub mod alarm;
pub mod baseline;
pub mod capability;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod hold;
pub mod ringing;
pub mod storage;
pub mod store;

pub use alarm::{Alarm, AlarmTime, Weekday};
pub use baseline::BaselineStore;
pub use capability::{AudioHandle, AudioOutput, Haptics, ReminderScheduler};
pub use dispatch::{DeliveryAction, DeliveryRouter};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use hold::{HoldController, HoldGesture, HoldState};
pub use ringing::{EscalationEngine, RingingSession};
pub use storage::{Config, EscalationConfig, FileStore, HoldConfig, KeyValueStore, MemoryStore};
pub use store::AlarmStore;
