// Recommendation rules derived from the latest observed state
use super::battery::BatterySnapshot;
use super::location::LocationSnapshot;
use super::network::{EffectiveType, NetworkSnapshot};
use serde::Serialize;

pub const CRITICAL_BATTERY_LEVEL: f64 = 20.0;
pub const WIFI_SUGGESTION_LEVEL: f64 = 50.0;
pub const PRECISION_ACCURACY_METERS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Advisory {
    CriticalBattery,
    DisableBackgroundSync,
    SwitchToWifi,
    DeepPowerSaving,
    ReducePrecision,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::CriticalBattery => {
                "Critical battery level: enable power saving mode and close unused apps"
            }
            Advisory::DisableBackgroundSync => {
                "Slow network detected: disable background sync to save data and battery"
            }
            Advisory::SwitchToWifi => "Switch to WiFi to reduce battery drain from cellular data",
            Advisory::DeepPowerSaving => {
                "Dashboard is not visible: activate deep power saving mode"
            }
            Advisory::ReducePrecision => {
                "Low location accuracy: reduce location precision to save battery"
            }
        }
    }
}

/// Evaluate every rule in order: battery, network, visibility, location.
pub fn derive_recommendations(
    battery: Option<&BatterySnapshot>,
    network: Option<&NetworkSnapshot>,
    visible: bool,
    location: Option<&LocationSnapshot>,
) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if let Some(battery) = battery
        && battery.level < CRITICAL_BATTERY_LEVEL
    {
        advisories.push(Advisory::CriticalBattery);
    }

    if let Some(network) = network {
        if network.effective_type.is_slow() {
            advisories.push(Advisory::DisableBackgroundSync);
        } else if network.effective_type == EffectiveType::FourG
            && battery.is_some_and(|b| b.level < WIFI_SUGGESTION_LEVEL)
        {
            advisories.push(Advisory::SwitchToWifi);
        }
    }

    if !visible {
        advisories.push(Advisory::DeepPowerSaving);
    }

    if let Some(location) = location
        && location.accuracy_meters > PRECISION_ACCURACY_METERS
    {
        advisories.push(Advisory::ReducePrecision);
    }

    advisories
}
