use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Wall-clock trigger time for a schedule. Hours 0-23, minutes 0-59,
/// enforced by `TriggerTime::new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TriggerTime {
    pub hour: u8,
    pub minute: u8,
}

impl TriggerTime {
    /// Create a trigger time. Returns None when out of the 24h clock range.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour <= 23 && minute <= 59 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }
}

/// A weekday- and time-gated trigger referencing one or more scenes by their
/// 1-based position in the accompanying scene list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Schedule {
    pub name: String,
    pub enable: bool,
    pub scene_amount: usize,
    /// 1-based positions into the scene list. Must resolve to valid positions
    /// at the time the schedule is consumed.
    pub scene_group: Vec<usize>,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub hour: u8,
    pub minute: u8,
}

impl Schedule {
    /// Build a schedule enabled on all seven weekdays, the only form the
    /// synthesizer emits.
    pub fn daily(name: impl Into<String>, scene_group: Vec<usize>, time: TriggerTime) -> Self {
        Self {
            name: name.into(),
            enable: true,
            scene_amount: scene_group.len(),
            scene_group,
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: true,
            sunday: true,
            hour: time.hour,
            minute: time.minute,
        }
    }
}
