//! # sensorwatch-types
//!
//! Core types for IoT sensor monitoring. This crate defines the wire schema
//! shared by the ingestion pipeline, the MQTT hub, and dashboard consumers.
//!
//! ## Design Goals
//!
//! - **Small surface**: plain data types with serde derives, no behavior
//!   beyond cheap accessors
//! - **Transport agnostic**: the same snapshot shape serves the HTTP pull
//!   endpoint, the SSE push stream, and tests
//! - **Stable field names**: dashboard consumers bind to the JSON field
//!   names defined here
//!
//! ## Example
//!
//! ```rust
//! use sensorwatch_types::{ChannelPoint, DeviceStatus, StateSnapshot};
//!
//! let mut snapshot = StateSnapshot::default();
//! snapshot.status = DeviceStatus::Online;
//! snapshot.temperature.push(ChannelPoint::new("10:15:04", 23.5));
//!
//! assert_eq!(snapshot.status.as_str(), "online");
//! ```

mod alert;
mod channel;
mod snapshot;
mod status;

pub use alert::*;
pub use channel::*;
pub use snapshot::*;
pub use status::*;
