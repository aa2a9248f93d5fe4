//! MQTT topic table and the message dispatch boundary.
//!
//! Channel-to-topic mapping is fixed configuration: nothing is
//! auto-discovered beyond the normalizer's field-name fallback.

use tracing::{debug, warn};

use sensorwatch_core::MonitorState;
use sensorwatch_types::SensorChannel;

pub const TOPIC_VIBRATION: &str = "sensor/vibration";
pub const TOPIC_TEMPERATURE: &str = "sensor/temperature";
pub const TOPIC_HUMIDITY: &str = "sensor/humidity";
pub const TOPIC_STATUS: &str = "sensor/status";
/// Commands consumed by the device/simulator, not by the hub.
pub const TOPIC_COMMANDS: &str = "sensor/commands";

/// Topics the hub subscribes to.
pub const SUBSCRIPTIONS: [&str; 4] = [
    TOPIC_VIBRATION,
    TOPIC_TEMPERATURE,
    TOPIC_HUMIDITY,
    TOPIC_STATUS,
];

/// A recognized inbound topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundTopic {
    Channel(SensorChannel),
    Status,
}

/// Map a raw topic string to its logical stream.
pub fn classify(topic: &str) -> Option<InboundTopic> {
    match topic {
        TOPIC_VIBRATION => Some(InboundTopic::Channel(SensorChannel::Vibration)),
        TOPIC_TEMPERATURE => Some(InboundTopic::Channel(SensorChannel::Temperature)),
        TOPIC_HUMIDITY => Some(InboundTopic::Channel(SensorChannel::Humidity)),
        TOPIC_STATUS => Some(InboundTopic::Status),
        _ => None,
    }
}

/// Publish topic for one measurement channel (used by the simulator).
pub fn topic_for(channel: SensorChannel) -> &'static str {
    match channel {
        SensorChannel::Vibration => TOPIC_VIBRATION,
        SensorChannel::Temperature => TOPIC_TEMPERATURE,
        SensorChannel::Humidity => TOPIC_HUMIDITY,
    }
}

/// Route one inbound publish into the pipeline.
///
/// Malformed readings are dropped and logged; messages on unmapped topics
/// are ignored silently (a debug line only). Neither affects any state.
pub fn dispatch(state: &MonitorState, topic: &str, payload: &[u8]) {
    match classify(topic) {
        Some(InboundTopic::Channel(channel)) => {
            if let Err(error) = state.handle_message(channel, payload) {
                warn!(%channel, %error, "reading dropped");
            }
        }
        Some(InboundTopic::Status) => state.handle_status(payload),
        None => debug!(topic, "message on unmapped topic ignored"),
    }
}

#[cfg(test)]
mod tests {
    use sensorwatch_core::MonitorConfig;
    use sensorwatch_types::DeviceStatus;

    use super::*;

    #[test]
    fn classifies_the_fixed_topic_table() {
        assert_eq!(
            classify("sensor/vibration"),
            Some(InboundTopic::Channel(SensorChannel::Vibration))
        );
        assert_eq!(classify("sensor/status"), Some(InboundTopic::Status));
        assert_eq!(classify("sensor/commands"), None);
        assert_eq!(classify("other/thing"), None);
    }

    #[test]
    fn topic_for_round_trips_through_classify() {
        for channel in SensorChannel::ALL {
            assert_eq!(
                classify(topic_for(channel)),
                Some(InboundTopic::Channel(channel))
            );
        }
    }

    #[test]
    fn dispatch_routes_readings_and_ignores_unknown_topics() {
        let state = MonitorState::new(MonitorConfig::default());

        dispatch(&state, "sensor/temperature", br#"{"value": 21.0}"#);
        dispatch(&state, "sensor/commands", br#"{"type": "reset"}"#);
        dispatch(&state, "sensor/temperature", b"not a reading");

        let snapshot = state.snapshot();
        assert_eq!(snapshot.temperature.len(), 1);
        assert_eq!(snapshot.status, DeviceStatus::Online);
    }
}
