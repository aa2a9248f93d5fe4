//! Device liveness status.

use serde::{Deserialize, Serialize};

/// Liveness of the originating device as derived by the status tracker.
///
/// `Unknown` is the state before any message has arrived. After that, the
/// device is `Online` while traffic flows and `Offline` once the silence
/// threshold elapses or the device explicitly reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl DeviceStatus {
    /// Lowercase status string as sent to the dashboard.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Unknown => "unknown",
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
        }
    }

    /// Interpret an explicitly reported status string.
    ///
    /// Devices report free-form statuses ("online", "offline", but also
    /// things like "reset_complete"); anything that is not a recognized
    /// liveness value maps to `Unknown` while the raw string is kept by the
    /// tracker for diagnostics.
    pub fn from_reported(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => DeviceStatus::Online,
            "offline" => DeviceStatus::Offline,
            _ => DeviceStatus::Unknown,
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
