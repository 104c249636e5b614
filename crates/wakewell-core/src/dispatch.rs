//! Notification delivery routing.
//!
//! The platform reminder capability fires a callback carrying the alarm
//! id string and an optional action tag. This module is the single entry
//! point from that callback into the core: it resolves the alarm and
//! starts, stops, or forwards the snooze intent. Unknown or garbled ids
//! are logged no-ops -- a stray notification must never crash anything.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::events::Event;
use crate::ringing::EscalationEngine;
use crate::store::AlarmStore;

/// Action tag attached to a delivered notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryAction {
    /// Plain delivery (or an unrecognized tag): the alarm is ringing.
    Fired,
    /// The user chose the stop action on the notification itself.
    Stop,
    /// The user chose the snooze action; advisory, handled upstream.
    Snooze,
}

impl DeliveryAction {
    /// Map the platform's optional action tag onto an action.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("stop") => DeliveryAction::Stop,
            Some("snooze") => DeliveryAction::Snooze,
            _ => DeliveryAction::Fired,
        }
    }
}

/// Routes delivery callbacks to the store and engine.
pub struct DeliveryRouter {
    store: Arc<Mutex<AlarmStore>>,
    engine: Arc<EscalationEngine>,
}

impl DeliveryRouter {
    pub fn new(store: Arc<Mutex<AlarmStore>>, engine: Arc<EscalationEngine>) -> Self {
        Self { store, engine }
    }

    /// Handle one delivered notification.
    ///
    /// Returns the resulting session event, `None` when the delivery was
    /// a no-op (unknown id, duplicate start, stop while idle).
    pub fn on_delivery(&self, alarm_id: &str, action: DeliveryAction) -> Option<Event> {
        match action {
            DeliveryAction::Stop => self.engine.stop(),
            DeliveryAction::Snooze => {
                let id = self.parse_id(alarm_id)?;
                Some(Event::SnoozeRequested {
                    alarm_id: id,
                    at: Utc::now(),
                })
            }
            DeliveryAction::Fired => {
                let id = self.parse_id(alarm_id)?;
                let alarm = {
                    let store = self.store.lock().unwrap();
                    store.get(id).cloned()
                };
                let Some(alarm) = alarm else {
                    tracing::warn!(%id, "delivery for unknown alarm, ignoring");
                    return None;
                };
                self.engine.start(&alarm)
            }
        }
    }

    fn parse_id(&self, raw: &str) -> Option<Uuid> {
        match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(raw, "unparseable alarm id in delivery, ignoring");
                None
            }
        }
    }
}
