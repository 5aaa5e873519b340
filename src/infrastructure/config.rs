use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub battery: BatterySettings,
    #[serde(default)]
    pub network: NetworkSettings,
    #[serde(default)]
    pub geolocation: GeolocationSettings,
    #[serde(default)]
    pub visibility: VisibilitySettings,
    #[serde(default)]
    pub stream: StreamSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BatterySettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_power_supply_root")]
    pub sysfs_root: String,
    #[serde(default = "default_battery_poll_ms")]
    pub poll_interval_ms: u64,
}

impl Default for BatterySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sysfs_root: default_power_supply_root(),
            poll_interval_ms: default_battery_poll_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_net_root")]
    pub sysfs_root: String,
    /// Interface to report; the first interface that is up when unset.
    #[serde(default)]
    pub interface: Option<String>,
    /// `host:port` used for the TCP round-trip probe; no probe when unset.
    #[serde(default)]
    pub probe_addr: Option<String>,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_network_poll_ms")]
    pub poll_interval_ms: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sysfs_root: default_net_root(),
            interface: None,
            probe_addr: None,
            probe_timeout_ms: default_probe_timeout_ms(),
            poll_interval_ms: default_network_poll_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeolocationSettings {
    /// Position endpoint; geolocation is unsupported when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_true")]
    pub high_accuracy: bool,
    #[serde(default = "default_geolocation_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub max_cached_age_ms: u64,
    #[serde(default = "default_geolocation_poll_ms")]
    pub poll_interval_ms: u64,
}

impl Default for GeolocationSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            high_accuracy: true,
            timeout_ms: default_geolocation_timeout_ms(),
            max_cached_age_ms: 0,
            poll_interval_ms: default_geolocation_poll_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct VisibilitySettings {
    #[serde(default = "default_visibility_threshold")]
    pub threshold: f64,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            threshold: default_visibility_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamSettings {
    #[serde(default = "default_stream_buffer")]
    pub buffer: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            buffer: default_stream_buffer(),
        }
    }
}

impl BatterySettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }
}

impl NetworkSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl GeolocationSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }
}

fn default_true() -> bool {
    true
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_power_supply_root() -> String {
    "/sys/class/power_supply".to_string()
}

fn default_net_root() -> String {
    "/sys/class/net".to_string()
}

fn default_battery_poll_ms() -> u64 {
    5_000
}

fn default_network_poll_ms() -> u64 {
    10_000
}

fn default_probe_timeout_ms() -> u64 {
    3_000
}

fn default_geolocation_timeout_ms() -> u64 {
    5_000
}

fn default_geolocation_poll_ms() -> u64 {
    30_000
}

fn default_visibility_threshold() -> f64 {
    0.1
}

fn default_stream_buffer() -> usize {
    100
}

/// Load `config/dashboard.toml` (optional) overlaid with `DASHBOARD__*` env vars.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
