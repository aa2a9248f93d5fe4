//! Hub settings: defaults, optional settings file, environment overrides.
//!
//! Layering (later wins): built-in defaults, then the optional settings
//! file, then `SENSORWATCH_*` environment variables. CLI flags are applied
//! on top by `main`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use sensorwatch_core::{AlertThresholds, MonitorConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    pub broker_host: String,
    pub broker_port: u16,
    /// Bind address for the dashboard HTTP API.
    pub http_bind: String,
    pub history_capacity: usize,
    pub offline_threshold_secs: u64,
    pub tick_interval_secs: u64,
    pub alert_ttl_secs: u64,
    pub alert_debounce_secs: u64,
    pub temperature_danger: f64,
    pub humidity_warning: f64,
    pub vibration_warning: f64,
    pub vibration_danger: f64,
}

impl HubSettings {
    /// Load settings, optionally merging a TOML/JSON settings file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("broker_host", "broker.hivemq.com")?
            .set_default("broker_port", 1883_i64)?
            .set_default("http_bind", "127.0.0.1:5000")?
            .set_default("history_capacity", 10_i64)?
            .set_default("offline_threshold_secs", 30_i64)?
            .set_default("tick_interval_secs", 5_i64)?
            .set_default("alert_ttl_secs", 60_i64)?
            .set_default("alert_debounce_secs", 30_i64)?
            .set_default("temperature_danger", 50.0)?
            .set_default("humidity_warning", 85.0)?
            .set_default("vibration_warning", 3.0)?
            .set_default("vibration_danger", 4.0)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix("SENSORWATCH"))
            .build()
            .context("building settings")?
            .try_deserialize()
            .context("deserializing settings")
    }

    /// The pipeline's static configuration.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            history_capacity: self.history_capacity,
            offline_threshold: Duration::from_secs(self.offline_threshold_secs),
            tick_interval: Duration::from_secs(self.tick_interval_secs),
            alert_ttl: Duration::from_secs(self.alert_ttl_secs),
            alert_debounce: Duration::from_secs(self.alert_debounce_secs),
            thresholds: AlertThresholds {
                temperature_danger: self.temperature_danger,
                humidity_warning: self.humidity_warning,
                vibration_warning: self.vibration_warning,
                vibration_danger: self.vibration_danger,
            },
        }
    }
}
