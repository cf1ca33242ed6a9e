// Application Configuration

use anyhow::Result;
use pixelvane_fusion::IconSet;
use pixelvane_telemetry::ConditionMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// MQTT broker host
    #[serde(default = "default_mqtt_host")]
    pub mqtt_host: String,

    /// MQTT broker port
    #[serde(default = "default_mqtt_port")]
    pub mqtt_port: u16,

    /// MQTT username
    #[serde(default = "default_mqtt_user")]
    pub mqtt_username: String,

    /// MQTT password
    #[serde(default = "default_mqtt_user")]
    pub mqtt_password: String,

    /// AWTRIX device unique id (MQTT topic prefix)
    #[serde(default = "default_device_uid")]
    pub device_uid: String,

    /// Particulate sensor topic
    #[serde(default = "default_pm25_topic")]
    pub pm25_topic: String,

    /// Indoor CO₂ sensor topic
    #[serde(default = "default_co2_topic")]
    pub co2_topic: String,

    /// Lightning station topic
    #[serde(default = "default_lightning_topic")]
    pub lightning_topic: String,

    /// Ecowitt application key
    #[serde(default)]
    pub ecowitt_application_key: String,

    /// Ecowitt API key
    #[serde(default)]
    pub ecowitt_api_key: String,

    /// Ecowitt station MAC address
    #[serde(default)]
    pub ecowitt_mac: String,

    /// Latitude for the weather condition lookup
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Longitude for the weather condition lookup
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Seconds between display updates
    #[serde(default = "default_interval")]
    pub update_interval_secs: u64,

    /// Bounded wait for one indoor CO₂ message, in milliseconds
    #[serde(default = "default_co2_wait")]
    pub co2_wait_ms: u64,

    /// Pause between the display destroy and set writes, in milliseconds
    #[serde(default = "default_handoff")]
    pub display_handoff_ms: u64,

    /// Weather-code classification rules
    #[serde(default)]
    pub condition_map: ConditionMap,

    /// Display icon identifiers
    #[serde(default)]
    pub icons: IconSet,

    /// Path to config file (for reference)
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_mqtt_host() -> String { "localhost".to_string() }
fn default_mqtt_port() -> u16 { 1883 }
fn default_mqtt_user() -> String { "mqtt".to_string() }
fn default_device_uid() -> String { "awtrix_000000".to_string() }
fn default_pm25_topic() -> String { "home/sensors/pm25".to_string() }
fn default_co2_topic() -> String { "home/sensors/co2".to_string() }
fn default_lightning_topic() -> String { "home/lightning/station-001".to_string() }
fn default_latitude() -> f64 { 45.312950 }
fn default_longitude() -> f64 { -75.900148 }
fn default_interval() -> u64 { 40 }
fn default_co2_wait() -> u64 { 1000 }
fn default_handoff() -> u64 { 50 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mqtt_host: default_mqtt_host(),
            mqtt_port: default_mqtt_port(),
            mqtt_username: default_mqtt_user(),
            mqtt_password: default_mqtt_user(),
            device_uid: default_device_uid(),
            pm25_topic: default_pm25_topic(),
            co2_topic: default_co2_topic(),
            lightning_topic: default_lightning_topic(),
            ecowitt_application_key: String::new(),
            ecowitt_api_key: String::new(),
            ecowitt_mac: String::new(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            update_interval_secs: default_interval(),
            co2_wait_ms: default_co2_wait(),
            display_handoff_ms: default_handoff(),
            condition_map: ConditionMap::default(),
            icons: IconSet::default(),
            config_path: PathBuf::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from standard paths
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("/etc/pixelvane/config.toml"),
            dirs::config_dir()
                .map(|p| p.join("pixelvane/config.toml"))
                .unwrap_or_default(),
            PathBuf::from("./config.toml"),
        ];

        for path in &config_paths {
            if path.exists() {
                return Self::load_from(path);
            }
        }

        tracing::warn!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.config_path = path.clone();
        Ok(config)
    }

    /// Generate example configuration
    pub fn example() -> String {
        let config = Self {
            mqtt_host: "10.0.0.11".to_string(),
            device_uid: "awtrix_bb6b64".to_string(),
            ecowitt_application_key: "YOUR_APPLICATION_KEY".to_string(),
            ecowitt_api_key: "YOUR_API_KEY".to_string(),
            ecowitt_mac: "AA:BB:CC:DD:EE:FF".to_string(),
            ..Default::default()
        };

        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Helper for getting config directories
mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}
