//! Payload normalization - decoding arbitrary message bodies into typed
//! numeric readings.
//!
//! Devices publish a mix of encodings on the same topics: JSON objects with
//! differing field names, bare JSON numbers, and plain decimal text. The
//! strategies here are tried in a fixed order, each only if the previous one
//! failed, so the fallback behavior stays explicit and testable.

use std::time::Instant;

use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::trace;

use sensorwatch_types::SensorChannel;

use crate::error::ParseError;

/// Largest raw magnitude the vibration sensor reports (2·√3 g across three
/// axes).
pub const SENSOR_MAX: f64 = 3.464102;

/// Upper bound of the dashboard's vibration scale.
pub const DISPLAY_MAX: f64 = 9.0;

/// A normalized reading, immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub channel: SensorChannel,
    /// Display value; for vibration this is the remapped magnitude.
    pub value: f64,
    /// Pre-remap sensor magnitude, retained only for vibration.
    pub raw_value: Option<f64>,
    /// Second-resolution arrival time label, the de-duplication key.
    pub label: String,
    pub received_at: Instant,
}

/// Decode a payload for the given channel into a [`Reading`].
///
/// Stamps the reading with the current wall-clock label. Pure apart from the
/// clocks; see [`normalize_at`] for the injectable-clock variant used by
/// tests.
pub fn normalize(channel: SensorChannel, payload: &[u8]) -> Result<Reading, ParseError> {
    normalize_at(channel, payload, Instant::now(), Local::now())
}

/// [`normalize`] with explicit clocks.
pub fn normalize_at(
    channel: SensorChannel,
    payload: &[u8],
    received_at: Instant,
    wall: DateTime<Local>,
) -> Result<Reading, ParseError> {
    let decoded = decode_number(channel, payload).ok_or(ParseError::Unrecognized)?;
    if !decoded.is_finite() {
        return Err(ParseError::Invalid(decoded));
    }

    let label = wall.format("%H:%M:%S").to_string();
    let reading = match channel {
        SensorChannel::Vibration => Reading {
            channel,
            value: remap_vibration(decoded),
            raw_value: Some(decoded),
            label,
            received_at,
        },
        _ => Reading {
            channel,
            value: decoded,
            raw_value: None,
            label,
            received_at,
        },
    };
    trace!(channel = %channel, value = reading.value, "normalized reading");
    Ok(reading)
}

/// Rescale a raw vibration magnitude to the display range.
///
/// Clamped to `[0, SENSOR_MAX]` first, so out-of-range sensor glitches pin
/// to the ends of the scale instead of escaping it.
pub fn remap_vibration(raw: f64) -> f64 {
    raw.clamp(0.0, SENSOR_MAX) / SENSOR_MAX * DISPLAY_MAX
}

/// Field names looked up in JSON object payloads, in priority order.
fn preferred_fields(channel: SensorChannel) -> &'static [&'static str] {
    match channel {
        SensorChannel::Vibration => &["magnitude", "level", "current_magnitude", "vibration_level"],
        SensorChannel::Temperature => &["temperature"],
        SensorChannel::Humidity => &["humidity"],
    }
}

/// Ordered decoding strategies. Returns the first number found, or `None`
/// when every strategy is exhausted.
fn decode_number(channel: SensorChannel, payload: &[u8]) -> Option<f64> {
    if let Ok(value) = serde_json::from_slice::<Value>(payload) {
        return match value {
            Value::Object(map) => {
                // Channel-specific names first, then the first numeric field
                // in wire order that isn't a timestamp.
                for name in preferred_fields(channel) {
                    if let Some(number) = map.get(*name).and_then(Value::as_f64) {
                        return Some(number);
                    }
                }
                map.iter()
                    .find(|(key, value)| key.as_str() != "timestamp" && value.is_number())
                    .and_then(|(_, value)| value.as_f64())
            }
            Value::Number(number) => number.as_f64(),
            // Valid JSON but not a number-bearing shape (string, bool,
            // array, null): rejected rather than coerced.
            _ => None,
        };
    }

    // Not JSON at all: try the trimmed bytes as plain decimal text.
    std::str::from_utf8(payload).ok()?.trim().parse::<f64>().ok()
}
