//! # sensorwatch-hub
//!
//! The process boundary around [`sensorwatch_core`]: an MQTT subscriber
//! that feeds raw payloads into the pipeline, an HTTP API for dashboard
//! consumers (snapshot pull plus SSE push), and the settings layer that
//! wires the static configuration surface.
//!
//! The transport stays out of the core on purpose: the hub owns the
//! `rumqttc` event loop and calls into the pipeline through one method per
//! inbound event ([`topics::dispatch`]), so the pipeline itself is testable
//! without a broker.

pub mod settings;
pub mod topics;
pub mod web;

pub use settings::HubSettings;
pub use topics::{classify, dispatch, InboundTopic};
