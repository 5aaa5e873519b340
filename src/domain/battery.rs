// Battery domain model
use serde::Serialize;

/// Remaining charge/discharge time as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "seconds", rename_all = "camelCase")]
pub enum TimeEstimate {
    Seconds(u64),
    /// The platform cannot estimate the time (reported as +Infinity by browsers).
    Unknown,
}

impl TimeEstimate {
    pub fn from_platform(seconds: f64) -> Self {
        if seconds.is_finite() && seconds >= 0.0 {
            TimeEstimate::Seconds(seconds.round() as u64)
        } else {
            TimeEstimate::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatterySnapshot {
    /// Percentage, 0-100.
    pub level: f64,
    pub charging: bool,
    pub charging_time: TimeEstimate,
    pub discharging_time: TimeEstimate,
}

impl BatterySnapshot {
    pub fn new(
        level: f64,
        charging: bool,
        charging_time: TimeEstimate,
        discharging_time: TimeEstimate,
    ) -> Self {
        Self {
            level: level.clamp(0.0, 100.0),
            charging,
            charging_time,
            discharging_time,
        }
    }

    /// Build a snapshot from the platform contract: `level` is a 0.0-1.0
    /// fraction, times are seconds with non-finite meaning "not estimable".
    pub fn from_platform(
        level_fraction: f64,
        charging: bool,
        charging_time_secs: f64,
        discharging_time_secs: f64,
    ) -> Self {
        let level = if level_fraction.is_finite() {
            level_fraction * 100.0
        } else {
            0.0
        };
        Self::new(
            level,
            charging,
            TimeEstimate::from_platform(charging_time_secs),
            TimeEstimate::from_platform(discharging_time_secs),
        )
    }

    /// Time estimate relevant to the current charging state.
    pub fn remaining_time(&self) -> TimeEstimate {
        if self.charging {
            self.charging_time
        } else {
            self.discharging_time
        }
    }
}
