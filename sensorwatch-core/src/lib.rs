//! # sensorwatch-core
//!
//! The telemetry ingestion pipeline behind sensorwatch. A transport adapter
//! (the MQTT hub) delivers raw payload bytes one message at a time; this
//! crate normalizes them into typed readings, maintains a bounded
//! per-channel history, derives device liveness from traffic and silence,
//! raises debounced threshold alerts, and publishes the full aggregate
//! snapshot to every subscribed consumer on each change.
//!
//! ## Architecture
//!
//! ```text
//! payload bytes ──▶ normalize ──▶ history ──▶ alerts ──┐
//!                                                      ├──▶ MonitorState ──▶ watch channel
//! periodic tick ──▶ status tracker (silence check) ────┘        │
//!                                                               ▼
//!                                                        snapshot() pull
//! ```
//!
//! All mutation funnels through [`MonitorState`], the single serialization
//! point. Both execution contexts (message delivery and the periodic silence
//! check) lock the same aggregate, so consumers never observe a snapshot
//! with inconsistent history/status/alert views.
//!
//! ## Example
//!
//! ```rust
//! use sensorwatch_core::{MonitorConfig, MonitorState};
//! use sensorwatch_types::SensorChannel;
//!
//! let state = MonitorState::new(MonitorConfig::default());
//! state
//!     .handle_message(SensorChannel::Temperature, br#"{"value": 23.5}"#)
//!     .unwrap();
//!
//! let snapshot = state.snapshot();
//! assert_eq!(snapshot.temperature.len(), 1);
//! ```

pub mod alerts;
pub mod config;
pub mod error;
pub mod history;
pub mod normalize;
pub mod state;
pub mod status;

pub use alerts::{Alert, AlertRegistry};
pub use config::{AlertThresholds, MonitorConfig};
pub use error::ParseError;
pub use history::ChannelHistory;
pub use normalize::{normalize, remap_vibration, Reading, DISPLAY_MAX, SENSOR_MAX};
pub use state::MonitorState;
pub use status::StatusTracker;
