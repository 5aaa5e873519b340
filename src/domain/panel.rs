// Panel selection and UI-only toggles
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    #[default]
    Dashboard,
    Battery,
    Location,
    Network,
    Recommendations,
    Settings,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::Dashboard,
        Panel::Battery,
        Panel::Location,
        Panel::Network,
        Panel::Recommendations,
        Panel::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Panel::Dashboard => "dashboard",
            Panel::Battery => "battery",
            Panel::Location => "location",
            Panel::Network => "network",
            Panel::Recommendations => "recommendations",
            Panel::Settings => "settings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Dashboard => "Dashboard",
            Panel::Battery => "Battery",
            Panel::Location => "Location",
            Panel::Network => "Network",
            Panel::Recommendations => "Recommendations",
            Panel::Settings => "Settings",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown panel: {0}")]
pub struct UnknownPanel(pub String);

impl FromStr for Panel {
    type Err = UnknownPanel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Panel::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPanel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Navigate(Panel),
    TogglePowerSave,
    SetPowerSave(bool),
    ToggleMenu,
}

/// Decorative view state, owned by the dashboard service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub selected_panel: Panel,
    pub power_save: bool,
    pub menu_open: bool,
}

impl UiState {
    /// Returns whether the state changed.
    pub fn apply(&mut self, action: UiAction) -> bool {
        let before = *self;
        match action {
            UiAction::Navigate(panel) => {
                self.selected_panel = panel;
                self.menu_open = false;
            }
            UiAction::TogglePowerSave => self.power_save = !self.power_save,
            UiAction::SetPowerSave(enabled) => self.power_save = enabled,
            UiAction::ToggleMenu => self.menu_open = !self.menu_open,
        }
        *self != before
    }
}
