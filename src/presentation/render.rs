// Presentation - pure mapping from a dashboard snapshot to a view
use crate::application::dashboard_service::DashboardSnapshot;
use crate::domain::battery::{BatterySnapshot, TimeEstimate};
use crate::domain::dashboard::{Band, DashboardView, Section};
use crate::domain::location::LocationFacet;
use crate::domain::network::{EffectiveType, NetworkSnapshot};
use crate::domain::panel::{Panel, UiState};
use crate::domain::recommendation::Advisory;

pub const DASHBOARD_TITLE: &str = "Device Dashboard";
pub const UNAVAILABLE: &str = "Unavailable";
pub const SYSTEM_OPTIMIZED: &str = "System Optimized";

pub fn render(snapshot: &DashboardSnapshot) -> DashboardView {
    let ui = &snapshot.ui;
    let observed = &snapshot.observed;

    let sections = match ui.selected_panel {
        Panel::Dashboard => vec![
            battery_section(observed.battery.as_ref(), ui.power_save, false),
            location_section(&observed.location, false),
            network_section(observed.network.as_ref(), false),
            recommendations_section(&snapshot.recommendations),
        ],
        Panel::Battery => vec![battery_section(observed.battery.as_ref(), ui.power_save, true)],
        Panel::Location => vec![location_section(&observed.location, true)],
        Panel::Network => vec![network_section(observed.network.as_ref(), true)],
        Panel::Recommendations => vec![recommendations_section(&snapshot.recommendations)],
        Panel::Settings => vec![settings_section(snapshot)],
    };

    DashboardView {
        title: DASHBOARD_TITLE.to_string(),
        version: snapshot.version,
        panel: ui.selected_panel,
        menu_open: ui.menu_open,
        power_save: ui.power_save,
        sections,
    }
}

pub fn battery_band(level: f64) -> Band {
    if level < 20.0 {
        Band::Critical
    } else if level < 50.0 {
        Band::Warning
    } else {
        Band::Good
    }
}

pub fn accuracy_band(accuracy_meters: f64) -> Band {
    if accuracy_meters <= 20.0 {
        Band::Good
    } else if accuracy_meters <= 100.0 {
        Band::Warning
    } else {
        Band::Critical
    }
}

pub fn network_band(effective_type: EffectiveType) -> Band {
    match effective_type {
        EffectiveType::FourG => Band::Good,
        EffectiveType::ThreeG => Band::Warning,
        EffectiveType::TwoG | EffectiveType::Slow2g => Band::Critical,
        EffectiveType::Unknown => Band::Neutral,
    }
}

pub fn format_remaining(estimate: TimeEstimate) -> String {
    match estimate {
        TimeEstimate::Unknown => "Calculating...".to_string(),
        TimeEstimate::Seconds(seconds) => {
            let hours = seconds / 3600;
            let minutes = (seconds % 3600) / 60;
            if hours > 0 {
                format!("{}h {}m", hours, minutes)
            } else {
                format!("{}m", minutes)
            }
        }
    }
}

fn battery_section(battery: Option<&BatterySnapshot>, power_save: bool, detailed: bool) -> Section {
    let Some(battery) = battery else {
        return Section::new("battery", "Battery", Band::Neutral)
            .field("Level", UNAVAILABLE)
            .note("Battery information is not available on this device");
    };

    let status = if power_save {
        "Power Saving"
    } else if battery.charging {
        "Charging"
    } else {
        "Discharging"
    };
    let remaining_label = if battery.charging {
        "Time to full"
    } else {
        "Time remaining"
    };

    let mut section = Section::new("battery", "Battery", battery_band(battery.level))
        // Truncated: 19.6 must not read as 20%
        .field("Level", format!("{:.0}%", battery.level.floor()))
        .field("Status", status)
        .field(remaining_label, format_remaining(battery.remaining_time()));

    if detailed {
        section = section
            .field("Charging time", format_remaining(battery.charging_time))
            .field("Discharging time", format_remaining(battery.discharging_time));
    }
    section
}

fn location_section(location: &LocationFacet, detailed: bool) -> Section {
    let mut section = match &location.last_fix {
        Some(fix) => {
            let mut section = Section::new("location", "Location", accuracy_band(fix.accuracy_meters))
                .field("Latitude", format!("{:.6}", fix.latitude))
                .field("Longitude", format!("{:.6}", fix.longitude))
                .field("Accuracy", format!("±{:.0} m", fix.accuracy_meters));
            if detailed {
                let observed_at = chrono::DateTime::from_timestamp_millis(fix.observed_at_ms)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| UNAVAILABLE.to_string());
                section = section.field("Updated", observed_at);
            }
            section
        }
        None => Section::new("location", "Location", Band::Neutral).field("Position", UNAVAILABLE),
    };

    if let Some(error) = &location.error {
        section = section.note(error.clone());
    }
    section
}

fn network_section(network: Option<&NetworkSnapshot>, detailed: bool) -> Section {
    let Some(network) = network else {
        return Section::new("network", "Network", Band::Neutral)
            .field("Connection", UNAVAILABLE)
            .note("Network information is not available on this device");
    };

    let mut section = Section::new("network", "Network", network_band(network.effective_type))
        .field("Connection", network.connection_type.clone())
        .field("Effective type", network.effective_type.as_str());

    if detailed {
        section = section
            .field("Downlink", format!("{:.1} Mbps", network.downlink_mbps))
            .field("Round trip", format!("{:.0} ms", network.rtt_ms));
    }
    section
}

fn recommendations_section(recommendations: &[Advisory]) -> Section {
    if recommendations.is_empty() {
        return Section::new("recommendations", "Recommendations", Band::Good).note(SYSTEM_OPTIMIZED);
    }

    let band = if recommendations.contains(&Advisory::CriticalBattery) {
        Band::Critical
    } else {
        Band::Warning
    };
    recommendations
        .iter()
        .fold(Section::new("recommendations", "Recommendations", band), |section, advisory| {
            section.note(advisory.message())
        })
}

fn settings_section(snapshot: &DashboardSnapshot) -> Section {
    let UiState {
        power_save,
        menu_open,
        ..
    } = snapshot.ui;
    let on_off = |flag: bool| if flag { "On" } else { "Off" };
    let observed = &snapshot.observed;

    Section::new("settings", "Settings", Band::Neutral)
        .field("Power save", on_off(power_save))
        .field("Menu", if menu_open { "Open" } else { "Closed" })
        .field("Battery feed", available(observed.battery.is_some()))
        .field("Location feed", available(observed.location.last_fix.is_some()))
        .field("Network feed", available(observed.network.is_some()))
        .field("Dashboard visible", on_off(observed.visible))
}

fn available(present: bool) -> &'static str {
    if present { "Available" } else { UNAVAILABLE }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::LocationSnapshot;
    use crate::domain::observed::FeedUpdate;

    fn section<'a>(view: &'a DashboardView, id: &str) -> Option<&'a Section> {
        view.sections.iter().find(|s| s.id == id)
    }

    fn snapshot_with(updates: Vec<FeedUpdate>, ui: UiState) -> DashboardSnapshot {
        let mut snapshot = DashboardSnapshot {
            ui,
            ..Default::default()
        };
        for update in updates {
            snapshot.observed.apply(update);
        }
        snapshot.recommendations = snapshot.observed.recommendations();
        snapshot
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(TimeEstimate::Unknown), "Calculating...");
        assert_eq!(format_remaining(TimeEstimate::Seconds(59)), "0m");
        assert_eq!(format_remaining(TimeEstimate::Seconds(1500)), "25m");
        assert_eq!(format_remaining(TimeEstimate::Seconds(7_260)), "2h 1m");
    }

    #[test]
    fn test_bands() {
        assert_eq!(battery_band(19.0), Band::Critical);
        assert_eq!(battery_band(20.0), Band::Warning);
        assert_eq!(battery_band(50.0), Band::Good);
        assert_eq!(accuracy_band(20.0), Band::Good);
        assert_eq!(accuracy_band(100.0), Band::Warning);
        assert_eq!(accuracy_band(100.1), Band::Critical);
        assert_eq!(network_band(EffectiveType::Slow2g), Band::Critical);
        assert_eq!(network_band(EffectiveType::Unknown), Band::Neutral);
    }

    #[test]
    fn test_no_feeds_renders_placeholders_and_system_optimized() {
        let view = render(&snapshot_with(vec![], UiState::default()));

        assert_eq!(view.panel, Panel::Dashboard);
        assert_eq!(view.sections.len(), 4);
        let battery = section(&view, "battery").unwrap();
        assert_eq!(battery.fields[0].value, UNAVAILABLE);
        assert_eq!(battery.band, Band::Neutral);
        assert_eq!(section(&view, "network").unwrap().fields[0].value, UNAVAILABLE);
        assert_eq!(section(&view, "location").unwrap().fields[0].value, UNAVAILABLE);
        assert_eq!(
            section(&view, "recommendations").unwrap().notes,
            vec![SYSTEM_OPTIMIZED.to_string()]
        );
    }

    #[test]
    fn test_battery_panel_with_power_save_label() {
        let ui = UiState {
            selected_panel: Panel::Battery,
            power_save: true,
            menu_open: false,
        };
        let battery = BatterySnapshot::new(35.0, false, TimeEstimate::Unknown, TimeEstimate::Seconds(5400));
        let view = render(&snapshot_with(vec![FeedUpdate::Battery(battery)], ui));

        assert_eq!(view.sections.len(), 1);
        let section = &view.sections[0];
        assert_eq!(section.band, Band::Warning);
        let value = |label: &str| {
            section
                .fields
                .iter()
                .find(|f| f.label == label)
                .map(|f| f.value.clone())
        };
        assert_eq!(value("Level").as_deref(), Some("35%"));
        assert_eq!(value("Status").as_deref(), Some("Power Saving"));
        assert_eq!(value("Time remaining").as_deref(), Some("1h 30m"));
        assert_eq!(value("Charging time").as_deref(), Some("Calculating..."));
    }

    #[test]
    fn test_level_just_below_critical_is_not_rounded_up() {
        let battery = BatterySnapshot::new(19.6, false, TimeEstimate::Unknown, TimeEstimate::Unknown);
        let view = render(&snapshot_with(vec![FeedUpdate::Battery(battery)], UiState::default()));

        let battery = section(&view, "battery").unwrap();
        assert_eq!(battery.band, Band::Critical);
        assert_eq!(battery.fields[0].value, "19%");
        assert_eq!(
            section(&view, "recommendations").unwrap().notes,
            vec![Advisory::CriticalBattery.message().to_string()]
        );
    }

    #[test]
    fn test_location_error_shown_alongside_last_fix() {
        let ui = UiState {
            selected_panel: Panel::Location,
            ..Default::default()
        };
        let view = render(&snapshot_with(
            vec![
                FeedUpdate::LocationFix(LocationSnapshot::new(35.6762, 139.6503, 12.0, 1_700_000_000_000)),
                FeedUpdate::LocationError("Timeout expired".to_string()),
            ],
            ui,
        ));

        let location = section(&view, "location").unwrap();
        assert_eq!(location.band, Band::Good);
        assert_eq!(location.fields[0].value, "35.676200");
        assert_eq!(location.notes, vec!["Timeout expired".to_string()]);
        assert!(location.fields.iter().any(|f| f.label == "Updated"));
    }

    #[test]
    fn test_recommendations_panel_lists_messages_in_order() {
        let ui = UiState {
            selected_panel: Panel::Recommendations,
            ..Default::default()
        };
        let view = render(&snapshot_with(
            vec![
                FeedUpdate::Visibility(false),
                FeedUpdate::LocationFix(LocationSnapshot::new(0.0, 0.0, 150.0, 0)),
            ],
            ui,
        ));

        let recommendations = section(&view, "recommendations").unwrap();
        assert_eq!(
            recommendations.notes,
            vec![
                Advisory::DeepPowerSaving.message().to_string(),
                Advisory::ReducePrecision.message().to_string(),
            ]
        );
    }

    #[test]
    fn test_render_does_not_touch_snapshot() {
        let snapshot = snapshot_with(vec![FeedUpdate::Visibility(false)], UiState::default());
        let before = snapshot.clone();
        let first = render(&snapshot);
        let second = render(&snapshot);
        assert_eq!(snapshot, before);
        assert_eq!(first, second);
    }
}
