//! Measurement channels carried by the sensor device.

use serde::{Deserialize, Serialize};

/// One of the three measurement streams published by the device.
///
/// The status stream is deliberately not a `SensorChannel`: it carries no
/// numeric reading and is handled by the status tracker instead of the
/// normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorChannel {
    Vibration,
    Temperature,
    Humidity,
}

impl SensorChannel {
    /// All channels, in the order the dashboard lays them out.
    pub const ALL: [SensorChannel; 3] = [
        SensorChannel::Vibration,
        SensorChannel::Temperature,
        SensorChannel::Humidity,
    ];

    /// Lowercase channel name as used in topic suffixes and JSON keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorChannel::Vibration => "vibration",
            SensorChannel::Temperature => "temperature",
            SensorChannel::Humidity => "humidity",
        }
    }
}

impl std::fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
