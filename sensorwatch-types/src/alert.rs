//! Threshold alerts surfaced to the dashboard.

use serde::{Deserialize, Serialize};

use crate::SensorChannel;

/// The measurement a given alert was raised for.
///
/// There is at most one live alert per kind at any instant; the alert engine
/// merges repeated breaches of the same kind instead of stacking them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Temperature,
    Humidity,
    Vibration,
}

impl From<SensorChannel> for AlertKind {
    fn from(channel: SensorChannel) -> Self {
        match channel {
            SensorChannel::Temperature => AlertKind::Temperature,
            SensorChannel::Humidity => AlertKind::Humidity,
            SensorChannel::Vibration => AlertKind::Vibration,
        }
    }
}

/// Severity level, matching the dashboard's two alert styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Danger,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::Danger => "danger",
        }
    }
}

/// A live alert as serialized into the snapshot.
///
/// `raised_at` is the second-resolution time label; expiry and debounce run
/// on monotonic clocks inside the alert engine, not on this field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertInfo {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub raised_at: String,
}
