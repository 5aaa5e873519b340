// Observed state - latest snapshot from every feed
use super::battery::BatterySnapshot;
use super::location::{LocationFacet, LocationSnapshot};
use super::network::NetworkSnapshot;
use super::recommendation::{derive_recommendations, Advisory};
use serde::Serialize;

/// One notification delivered by a sensor feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    Battery(BatterySnapshot),
    LocationFix(LocationSnapshot),
    LocationError(String),
    Network(NetworkSnapshot),
    Visibility(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedState {
    pub battery: Option<BatterySnapshot>,
    pub location: LocationFacet,
    pub network: Option<NetworkSnapshot>,
    pub visible: bool,
}

impl Default for ObservedState {
    fn default() -> Self {
        Self {
            battery: None,
            location: LocationFacet::default(),
            network: None,
            // Assume visible until the first intersection report arrives
            visible: true,
        }
    }
}

impl ObservedState {
    /// Apply an update, returning whether anything changed.
    pub fn apply(&mut self, update: FeedUpdate) -> bool {
        let before = self.clone();
        match update {
            FeedUpdate::Battery(snapshot) => self.battery = Some(snapshot),
            FeedUpdate::LocationFix(fix) => self.location.apply_fix(fix),
            FeedUpdate::LocationError(message) => self.location.apply_error(message),
            FeedUpdate::Network(snapshot) => self.network = Some(snapshot),
            FeedUpdate::Visibility(visible) => self.visible = visible,
        }
        *self != before
    }

    pub fn recommendations(&self) -> Vec<Advisory> {
        derive_recommendations(
            self.battery.as_ref(),
            self.network.as_ref(),
            self.visible,
            self.location.last_fix.as_ref(),
        )
    }
}
