use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session-level state changes produce an Event. The presentation layer
/// polls or subscribes; nothing in the core depends on anyone listening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A ringing session began for this alarm.
    RingingStarted {
        alarm_id: Uuid,
        /// Starting haptic intensity, read from the adaptive baseline.
        base_intensity: f32,
        at: DateTime<Utc>,
    },
    /// A ringing session ended (dismissal confirmed or stop delivered).
    RingingStopped {
        alarm_id: Uuid,
        /// Elapsed time between ringing start and dismissal.
        response_ms: u64,
        /// Baseline intensity the next session will start from.
        next_base_intensity: f32,
        at: DateTime<Utc>,
    },
    /// The user picked the snooze action on the delivered notification.
    /// Advisory only: snoozing itself belongs to the scheduling layer.
    SnoozeRequested { alarm_id: Uuid, at: DateTime<Utc> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_type_tag() {
        let event = Event::SnoozeRequested {
            alarm_id: Uuid::nil(),
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"SnoozeRequested\""));
    }
}
