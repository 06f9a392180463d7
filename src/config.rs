/// Service configuration, loaded from a TOML file (`aquamon.toml` by
/// default). The RTDB section is required; monitor and schedule sections
/// fall back to their defaults when omitted.

use serde::Deserialize;
use std::error::Error;

use crate::alert::liveness::DEFAULT_STALE_AFTER_MINUTES;
use crate::schedule::DEFAULT_MIN_SEPARATION_MINUTES;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub rtdb: RtdbConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Connection details for the hosted realtime database.
#[derive(Debug, Clone, Deserialize)]
pub struct RtdbConfig {
    /// Database origin, e.g. "https://example-project.firebaseio.com".
    pub base_url: String,
    /// Top-level node all device data lives under.
    #[serde(default = "default_root")]
    pub root: String,
    /// Operator account id; data paths are `{root}/{uid}/...`.
    pub uid: String,
    /// Database secret or ID token appended as `?auth=`. Omit for databases
    /// whose rules allow unauthenticated reads (dev only).
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between evaluation cycles.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Heartbeat gap before the device is reported offline.
    #[serde(default = "default_stale_after_minutes")]
    pub stale_after_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Minimum spacing between two automated feed events.
    #[serde(default = "default_min_separation_minutes")]
    pub min_separation_minutes: u16,
}

fn default_root() -> String {
    "BANGUS".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_stale_after_minutes() -> i64 {
    DEFAULT_STALE_AFTER_MINUTES
}

fn default_min_separation_minutes() -> u16 {
    DEFAULT_MIN_SEPARATION_MINUTES
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            poll_interval_secs: default_poll_interval_secs(),
            stale_after_minutes: default_stale_after_minutes(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            min_separation_minutes: default_min_separation_minutes(),
        }
    }
}

/// Loads and parses the service configuration file.
pub fn load_config(path: &str) -> Result<ServiceConfig, Box<dyn Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read config file '{}': {}", path, e))?;
    let config: ServiceConfig = toml::from_str(&contents)
        .map_err(|e| format!("failed to parse config file '{}': {}", path, e))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parses() {
        let toml = r#"
            [rtdb]
            base_url = "https://bangus-dev.firebaseio.com"
            root = "BANGUS"
            uid = "operator-1"
            auth_token = "secret"
            request_timeout_secs = 5

            [monitor]
            poll_interval_secs = 30
            stale_after_minutes = 10

            [schedule]
            min_separation_minutes = 15
        "#;
        let config: ServiceConfig = toml::from_str(toml).expect("config should parse");
        assert_eq!(config.rtdb.base_url, "https://bangus-dev.firebaseio.com");
        assert_eq!(config.rtdb.uid, "operator-1");
        assert_eq!(config.rtdb.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.monitor.poll_interval_secs, 30);
        assert_eq!(config.monitor.stale_after_minutes, 10);
        assert_eq!(config.schedule.min_separation_minutes, 15);
    }

    #[test]
    fn test_optional_sections_default() {
        let toml = r#"
            [rtdb]
            base_url = "https://bangus-dev.firebaseio.com"
            uid = "operator-1"
        "#;
        let config: ServiceConfig = toml::from_str(toml).expect("config should parse");
        assert_eq!(config.rtdb.root, "BANGUS");
        assert_eq!(config.rtdb.auth_token, None);
        assert_eq!(config.rtdb.request_timeout_secs, 10);
        assert_eq!(config.monitor.poll_interval_secs, 60);
        assert_eq!(config.monitor.stale_after_minutes, 5);
        assert_eq!(config.schedule.min_separation_minutes, 5);
    }

    #[test]
    fn test_missing_rtdb_section_is_an_error() {
        let result: Result<ServiceConfig, _> = toml::from_str("[monitor]\n");
        assert!(result.is_err());
    }
}
