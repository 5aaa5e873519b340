// Location domain model
use serde::Serialize;

pub const GEOLOCATION_NOT_SUPPORTED: &str = "Geolocation is not supported by this device";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
    pub observed_at_ms: i64,
}

impl LocationSnapshot {
    pub fn new(latitude: f64, longitude: f64, accuracy_meters: f64, observed_at_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters,
            observed_at_ms,
        }
    }
}

/// Last good fix and last error are independent: an error never erases the fix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFacet {
    pub last_fix: Option<LocationSnapshot>,
    pub error: Option<String>,
}

impl LocationFacet {
    pub fn apply_fix(&mut self, fix: LocationSnapshot) {
        self.last_fix = Some(fix);
        self.error = None;
    }

    pub fn apply_error(&mut self, message: String) {
        self.error = Some(message);
    }
}
