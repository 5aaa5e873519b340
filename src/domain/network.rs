// Network domain model
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
    #[serde(rename = "unknown")]
    Unknown,
}

impl EffectiveType {
    /// Lenient parse: anything unrecognised is `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "slow-2g" => EffectiveType::Slow2g,
            "2g" => EffectiveType::TwoG,
            "3g" => EffectiveType::ThreeG,
            "4g" => EffectiveType::FourG,
            _ => EffectiveType::Unknown,
        }
    }

    /// Classify a connection from measured round-trip time and downlink,
    /// using the Network Information API thresholds.
    pub fn classify(rtt_ms: Option<f64>, downlink_mbps: Option<f64>) -> Self {
        if rtt_ms.is_none() && downlink_mbps.is_none() {
            return EffectiveType::Unknown;
        }
        let rtt = rtt_ms.unwrap_or(0.0);
        let below = |limit: f64| downlink_mbps.is_some_and(|d| d < limit);

        if rtt >= 2000.0 || below(0.05) {
            EffectiveType::Slow2g
        } else if rtt >= 1400.0 || below(0.07) {
            EffectiveType::TwoG
        } else if rtt >= 270.0 || below(0.7) {
            EffectiveType::ThreeG
        } else {
            EffectiveType::FourG
        }
    }

    pub fn is_slow(&self) -> bool {
        matches!(self, EffectiveType::Slow2g | EffectiveType::TwoG)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveType::Slow2g => "slow-2g",
            EffectiveType::TwoG => "2g",
            EffectiveType::ThreeG => "3g",
            EffectiveType::FourG => "4g",
            EffectiveType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EffectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    pub connection_type: String,
    pub effective_type: EffectiveType,
    pub downlink_mbps: f64,
    pub rtt_ms: f64,
}

impl NetworkSnapshot {
    pub fn new(
        connection_type: String,
        effective_type: EffectiveType,
        downlink_mbps: f64,
        rtt_ms: f64,
    ) -> Self {
        Self {
            connection_type,
            effective_type,
            downlink_mbps,
            rtt_ms,
        }
    }

    /// Build a snapshot from optional platform fields, defaulting
    /// missing ones to "unknown" / 0.
    pub fn from_platform(
        connection_type: Option<&str>,
        effective_type: Option<&str>,
        downlink_mbps: Option<f64>,
        rtt_ms: Option<f64>,
    ) -> Self {
        Self::new(
            connection_type.unwrap_or("unknown").to_string(),
            effective_type.map(EffectiveType::parse).unwrap_or(EffectiveType::Unknown),
            downlink_mbps.unwrap_or(0.0),
            rtt_ms.unwrap_or(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_effective_type() {
        assert_eq!(EffectiveType::parse("slow-2g"), EffectiveType::Slow2g);
        assert_eq!(EffectiveType::parse("4G"), EffectiveType::FourG);
        assert_eq!(EffectiveType::parse("5g"), EffectiveType::Unknown);
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(EffectiveType::classify(Some(2500.0), None), EffectiveType::Slow2g);
        assert_eq!(EffectiveType::classify(Some(1500.0), None), EffectiveType::TwoG);
        assert_eq!(EffectiveType::classify(Some(300.0), None), EffectiveType::ThreeG);
        assert_eq!(EffectiveType::classify(Some(40.0), None), EffectiveType::FourG);
        assert_eq!(EffectiveType::classify(Some(40.0), Some(0.06)), EffectiveType::TwoG);
        assert_eq!(EffectiveType::classify(Some(40.0), Some(0.5)), EffectiveType::ThreeG);
        assert_eq!(EffectiveType::classify(None, Some(100.0)), EffectiveType::FourG);
        assert_eq!(EffectiveType::classify(None, None), EffectiveType::Unknown);
    }

    #[test]
    fn test_from_platform_defaults() {
        let snapshot = NetworkSnapshot::from_platform(None, None, None, None);
        assert_eq!(snapshot.connection_type, "unknown");
        assert_eq!(snapshot.effective_type, EffectiveType::Unknown);
        assert_eq!(snapshot.downlink_mbps, 0.0);
        assert_eq!(snapshot.rtt_ms, 0.0);
    }

    #[test]
    fn test_effective_type_serializes_kebab() {
        let json = serde_json::to_string(&EffectiveType::Slow2g).unwrap();
        assert_eq!(json, "\"slow-2g\"");
    }
}
