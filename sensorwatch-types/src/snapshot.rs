//! Snapshot - the complete externally visible monitoring state.

use serde::{Deserialize, Serialize};

use crate::{AlertInfo, DeviceStatus, SensorChannel};

/// One reading as exposed to dashboard consumers.
///
/// `label` is the second-resolution arrival time and doubles as the
/// de-duplication key within a channel's history. `raw_value` is only
/// present for vibration, where the pre-remap sensor magnitude is retained
/// alongside the display-scale value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPoint {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<f64>,
}

impl ChannelPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            raw_value: None,
        }
    }

    /// A vibration point carrying both the display value and the raw
    /// sensor magnitude.
    pub fn with_raw(label: impl Into<String>, value: f64, raw_value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            raw_value: Some(raw_value),
        }
    }
}

/// A point-in-time view of the entire monitoring state.
///
/// This is the single shape pushed to every consumer on every mutation and
/// returned by the pull endpoint. The dispatcher performs no diffing: the
/// full aggregate is always sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub vibration: Vec<ChannelPoint>,
    pub temperature: Vec<ChannelPoint>,
    pub humidity: Vec<ChannelPoint>,
    pub status: DeviceStatus,
    pub alerts: Vec<AlertInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

impl StateSnapshot {
    /// The history for one channel.
    pub fn channel(&self, channel: SensorChannel) -> &[ChannelPoint] {
        match channel {
            SensorChannel::Vibration => &self.vibration,
            SensorChannel::Temperature => &self.temperature,
            SensorChannel::Humidity => &self.humidity,
        }
    }

    /// Mutable access for the state builder in sensorwatch-core.
    pub fn channel_mut(&mut self, channel: SensorChannel) -> &mut Vec<ChannelPoint> {
        match channel {
            SensorChannel::Vibration => &mut self.vibration,
            SensorChannel::Temperature => &mut self.temperature,
            SensorChannel::Humidity => &mut self.humidity,
        }
    }

    /// True if no reading has been recorded on any channel yet.
    pub fn is_empty(&self) -> bool {
        SensorChannel::ALL.iter().all(|c| self.channel(*c).is_empty())
    }
}
