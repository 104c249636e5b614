//! Alarm record definition.
//!
//! An [`Alarm`] is a persisted definition of a single wake-up: a wall-clock
//! time of day, an optional set of repeat weekdays, and display metadata.
//! Identity is by `id` alone -- two records with the same id are the same
//! alarm regardless of other field values.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label substituted for empty or whitespace-only input.
pub const DEFAULT_LABEL: &str = "Alarm";

/// Sound catalog id used when none is given.
pub const DEFAULT_SOUND_ID: &str = "default";

/// Day of the week, numbered 1 = Sunday .. 7 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Get numeric day value (1-7, Sunday first).
    pub fn as_u8(self) -> u8 {
        match self {
            Weekday::Sunday => 1,
            Weekday::Monday => 2,
            Weekday::Tuesday => 3,
            Weekday::Wednesday => 4,
            Weekday::Thursday => 5,
            Weekday::Friday => 6,
            Weekday::Saturday => 7,
        }
    }

    /// Convert from numeric day value. Returns `None` outside 1-7.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Weekday::Sunday),
            2 => Some(Weekday::Monday),
            3 => Some(Weekday::Tuesday),
            4 => Some(Weekday::Wednesday),
            5 => Some(Weekday::Thursday),
            6 => Some(Weekday::Friday),
            7 => Some(Weekday::Saturday),
            _ => None,
        }
    }
}

/// Wall-clock time of day on a 24-hour clock.
///
/// The date component is irrelevant for alarms -- matching is always
/// against hour and minute only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmTime {
    pub hour: u32,
    pub minute: u32,
}

impl AlarmTime {
    /// Create a time of day. Out-of-range components saturate to the
    /// last valid value rather than wrapping into the next unit.
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A single alarm definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: Uuid,
    pub time: AlarmTime,
    /// Empty set means one-shot, non-repeating.
    #[serde(default)]
    pub repeat_days: BTreeSet<Weekday>,
    pub label: String,
    pub sound_id: String,
    /// Advisory flag forwarded to the scheduling layer's snooze action.
    pub snooze_enabled: bool,
    pub is_enabled: bool,
}

impl Alarm {
    /// Create an enabled one-shot alarm with default label and sound.
    pub fn new(time: AlarmTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            time,
            repeat_days: BTreeSet::new(),
            label: DEFAULT_LABEL.to_string(),
            sound_id: DEFAULT_SOUND_ID.to_string(),
            snooze_enabled: true,
            is_enabled: true,
        }
    }

    /// Whether the alarm repeats on at least one weekday.
    pub fn repeats(&self) -> bool {
        !self.repeat_days.is_empty()
    }

    /// Enforce write-time invariants: label and sound id are non-empty.
    pub(crate) fn normalize(&mut self) {
        if self.label.trim().is_empty() {
            self.label = DEFAULT_LABEL.to_string();
        }
        if self.sound_id.trim().is_empty() {
            self.sound_id = DEFAULT_SOUND_ID.to_string();
        }
    }
}
