//! Static configuration for the monitoring pipeline.

use std::time::Duration;

/// Alert thresholds per measurement.
///
/// Vibration thresholds apply to the display scale (0-9), after the raw
/// sensor magnitude has been remapped.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertThresholds {
    /// Temperature above this raises a danger alert (°C).
    pub temperature_danger: f64,
    /// Humidity above this raises a warning alert (%).
    pub humidity_warning: f64,
    /// Vibration above this raises a warning ("elevated") alert.
    pub vibration_warning: f64,
    /// Vibration above this raises a danger ("extreme") alert.
    pub vibration_danger: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temperature_danger: 50.0,
            humidity_warning: 85.0,
            vibration_warning: 3.0,
            vibration_danger: 4.0,
        }
    }
}

/// Process-wide pipeline configuration.
///
/// Fixed at startup; nothing here is runtime-mutable.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Retained readings per channel.
    pub history_capacity: usize,
    /// Silence duration after which the device is considered offline.
    pub offline_threshold: Duration,
    /// Period of the silence check, independent of message arrival.
    pub tick_interval: Duration,
    /// Live alerts older than this are purged before evaluation.
    pub alert_ttl: Duration,
    /// Window within which a repeated alert of the same kind is merged
    /// into the existing entry instead of replacing it.
    pub alert_debounce: Duration,
    pub thresholds: AlertThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 10,
            offline_threshold: Duration::from_secs(30),
            tick_interval: Duration::from_secs(5),
            alert_ttl: Duration::from_secs(60),
            alert_debounce: Duration::from_secs(30),
            thresholds: AlertThresholds::default(),
        }
    }
}
