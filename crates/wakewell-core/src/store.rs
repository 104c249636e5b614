//! Alarm store: collection ownership, persistence, reminder registration.
//!
//! The store owns the full alarm collection in insertion order and is the
//! only writer of the persisted blob. Every enablement change re-derives
//! the platform reminder registration as a side effect, using the alarm's
//! id string as the registration id.
//!
//! Persistence failures are logged and swallowed: the in-memory state
//! stays authoritative for the process lifetime, accepting potential loss
//! on crash. Nothing here ever fails the caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::alarm::Alarm;
use crate::capability::ReminderScheduler;
use crate::storage::{KeyValueStore, ALARMS_KEY};

/// Blob schema version, bumped on incompatible field changes.
const BLOB_VERSION: u32 = 1;

/// Versioned on-disk layout of the alarm collection.
#[derive(Debug, Serialize, Deserialize)]
struct AlarmsBlob {
    version: u32,
    alarms: Vec<Alarm>,
}

/// Owns the alarm collection and drives platform reminder registration.
pub struct AlarmStore {
    alarms: Vec<Alarm>,
    kv: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn ReminderScheduler>,
}

impl AlarmStore {
    /// Load saved alarms on startup. A missing or corrupt blob starts the
    /// store empty; corruption is logged, never fatal.
    pub fn load(kv: Arc<dyn KeyValueStore>, scheduler: Arc<dyn ReminderScheduler>) -> Self {
        let alarms = match kv.read(ALARMS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<AlarmsBlob>(&raw) {
                Ok(blob) => blob.alarms,
                Err(e) => {
                    tracing::warn!(error = %e, "corrupt alarm blob, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read alarms, starting empty");
                Vec::new()
            }
        };
        Self {
            alarms,
            kv,
            scheduler,
        }
    }

    /// Insert a new alarm. A record with the same id replaces the old one
    /// in place, preserving list position. Registration is re-derived from
    /// the incoming enablement: an enabled alarm registers a reminder, a
    /// disabled replacement cancels the one it displaces. Then persists.
    pub fn add(&mut self, mut alarm: Alarm) {
        alarm.normalize();

        let replaces_existing = self.alarms.iter().any(|a| a.id == alarm.id);
        if alarm.is_enabled {
            self.register(&alarm);
        } else if replaces_existing {
            self.scheduler.cancel(&alarm.id.to_string());
        }

        match self.alarms.iter_mut().find(|a| a.id == alarm.id) {
            Some(existing) => *existing = alarm,
            None => self.alarms.push(alarm),
        }

        self.persist();
    }

    /// Enable or disable an alarm, re-deriving its reminder registration.
    /// Silent no-op when the id is unknown or the value is unchanged, so
    /// repeated calls register the reminder at most once externally.
    pub fn set_enabled(&mut self, id: Uuid, enabled: bool) {
        let Some(alarm) = self.alarms.iter_mut().find(|a| a.id == id) else {
            tracing::warn!(%id, "set_enabled on unknown alarm, ignoring");
            return;
        };
        if alarm.is_enabled == enabled {
            return;
        }
        alarm.is_enabled = enabled;

        let alarm = alarm.clone();
        if enabled {
            self.register(&alarm);
        } else {
            self.scheduler.cancel(&alarm.id.to_string());
        }

        self.persist();
    }

    /// Delete the given alarms. Each reminder is cancelled first, while
    /// the record and its id are still resolvable, then the records are
    /// removed and the collection persisted once.
    pub fn delete(&mut self, ids: &[Uuid]) {
        for id in ids {
            if self.alarms.iter().any(|a| a.id == *id) {
                self.scheduler.cancel(&id.to_string());
            }
        }

        self.alarms.retain(|a| !ids.contains(&a.id));
        self.persist();
    }

    /// Look up one alarm by id.
    pub fn get(&self, id: Uuid) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    /// Current collection, insertion order preserved.
    pub fn list(&self) -> &[Alarm] {
        &self.alarms
    }

    fn register(&self, alarm: &Alarm) {
        self.scheduler.schedule(
            &alarm.id.to_string(),
            alarm.time.hour,
            alarm.time.minute,
            alarm.repeats(),
        );
    }

    /// Whole-collection write. Errors are logged and swallowed.
    fn persist(&self) {
        let blob = AlarmsBlob {
            version: BLOB_VERSION,
            alarms: self.alarms.clone(),
        };
        let raw = match serde_json::to_string(&blob) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize alarms");
                return;
            }
        };
        if let Err(e) = self.kv.write(ALARMS_KEY, &raw) {
            tracing::warn!(error = %e, "failed to persist alarms");
        }
    }
}
