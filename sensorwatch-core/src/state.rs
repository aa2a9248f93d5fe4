//! The aggregate monitoring state and snapshot dispatcher.
//!
//! Every mutation (history record, status transition, alert change) funnels
//! through [`MonitorState`], which holds the aggregate behind one mutex and
//! publishes the full rebuilt snapshot on a watch channel after each change.
//! Consumers either pull the latest snapshot synchronously or subscribe for
//! pushes; a slow consumer only ever misses intermediate snapshots, it can
//! never block ingestion.

use std::time::Instant;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use sensorwatch_types::{SensorChannel, StateSnapshot};

use crate::alerts::AlertRegistry;
use crate::config::MonitorConfig;
use crate::error::ParseError;
use crate::history::ChannelHistory;
use crate::normalize::normalize_at;
use crate::status::StatusTracker;

struct Inner {
    vibration: ChannelHistory,
    temperature: ChannelHistory,
    humidity: ChannelHistory,
    status: StatusTracker,
    alerts: AlertRegistry,
    last_update: Option<String>,
}

impl Inner {
    fn new(capacity: usize) -> Self {
        Self {
            vibration: ChannelHistory::new(capacity),
            temperature: ChannelHistory::new(capacity),
            humidity: ChannelHistory::new(capacity),
            status: StatusTracker::new(),
            alerts: AlertRegistry::new(),
            last_update: None,
        }
    }

    fn history_mut(&mut self, channel: SensorChannel) -> &mut ChannelHistory {
        match channel {
            SensorChannel::Vibration => &mut self.vibration,
            SensorChannel::Temperature => &mut self.temperature,
            SensorChannel::Humidity => &mut self.humidity,
        }
    }

    fn build_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            vibration: self.vibration.to_points(),
            temperature: self.temperature.to_points(),
            humidity: self.humidity.to_points(),
            status: self.status.value(),
            alerts: self.alerts.to_infos(),
            last_update: self.last_update.clone(),
        }
    }
}

/// The single process-wide monitoring state.
///
/// Both execution contexts - message delivery and the periodic silence
/// check - serialize through the inner mutex, so every published snapshot is
/// a consistent view of history, status and alerts.
pub struct MonitorState {
    config: MonitorConfig,
    inner: Mutex<Inner>,
    tx: watch::Sender<StateSnapshot>,
}

impl MonitorState {
    pub fn new(config: MonitorConfig) -> Self {
        let (tx, _rx) = watch::channel(StateSnapshot::default());
        Self {
            inner: Mutex::new(Inner::new(config.history_capacity)),
            config,
            tx,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Latest published snapshot (the pull interface).
    pub fn snapshot(&self) -> StateSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribe to snapshot pushes (the push interface). Each mutation
    /// replaces the channel value with the full current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.tx.subscribe()
    }

    /// Ingest one sensor message: normalize, record, re-derive liveness,
    /// evaluate alerts, publish.
    ///
    /// A payload that fails normalization mutates nothing and publishes
    /// nothing; the error is the caller's to log-and-drop.
    pub fn handle_message(&self, channel: SensorChannel, payload: &[u8]) -> Result<(), ParseError> {
        self.handle_message_at(channel, payload, Instant::now(), Local::now())
    }

    /// [`Self::handle_message`] with explicit clocks.
    pub fn handle_message_at(
        &self,
        channel: SensorChannel,
        payload: &[u8],
        now: Instant,
        wall: DateTime<Local>,
    ) -> Result<(), ParseError> {
        // Normalization is pure; keep it outside the lock.
        let reading = normalize_at(channel, payload, now, wall)?;
        debug!(channel = %channel, value = reading.value, label = %reading.label, "reading recorded");

        let snapshot = {
            let mut inner = self.inner.lock();
            inner.status.on_message(now);
            inner.last_update = Some(reading.label.clone());
            inner.history_mut(channel).record(reading);

            let Inner {
                vibration,
                temperature,
                humidity,
                alerts,
                ..
            } = &mut *inner;
            let latest = [vibration.latest(), temperature.latest(), humidity.latest()]
                .into_iter()
                .flatten();
            alerts.evaluate(
                latest,
                &self.config.thresholds,
                self.config.alert_debounce,
                self.config.alert_ttl,
                now,
            );

            inner.build_snapshot()
        };

        self.tx.send_replace(snapshot);
        Ok(())
    }

    /// Ingest one explicit status message.
    ///
    /// Accepts both shapes the device publishes: a JSON object with a
    /// `status` field, or a bare string. Undecodable payloads are dropped.
    pub fn handle_status(&self, payload: &[u8]) {
        self.handle_status_at(payload, Instant::now(), Local::now());
    }

    /// [`Self::handle_status`] with explicit clocks.
    pub fn handle_status_at(&self, payload: &[u8], now: Instant, wall: DateTime<Local>) {
        let Some((reported, device)) = decode_status(payload) else {
            warn!("status payload carried no status string, dropped");
            return;
        };
        if let Some(device) = device {
            info!(device, status = %reported, "device status reported");
        } else {
            info!(status = %reported, "device status reported");
        }

        let snapshot = {
            let mut inner = self.inner.lock();
            inner.status.on_explicit_status(&reported, now);
            inner.last_update = Some(wall.format("%H:%M:%S").to_string());
            inner.build_snapshot()
        };
        self.tx.send_replace(snapshot);
    }

    /// Periodic silence check. Publishes only when a transition happened,
    /// so a flat-lined device produces exactly one offline push.
    pub fn tick(&self) -> bool {
        self.tick_at(Instant::now())
    }

    /// [`Self::tick`] with an explicit clock.
    pub fn tick_at(&self, now: Instant) -> bool {
        let snapshot = {
            let mut inner = self.inner.lock();
            if !inner.status.tick(now, self.config.offline_threshold) {
                return false;
            }
            inner.build_snapshot()
        };
        info!("device offline: no data within the silence threshold");
        self.tx.send_replace(snapshot);
        true
    }
}

/// Pull the reported status string (and optional device name) out of a
/// status payload.
fn decode_status(payload: &[u8]) -> Option<(String, Option<String>)> {
    if let Ok(value) = serde_json::from_slice::<Value>(payload) {
        return match value {
            Value::Object(map) => {
                let status = map.get("status")?.as_str()?.to_string();
                let device = map
                    .get("device")
                    .or_else(|| map.get("device_id"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Some((status, device))
            }
            Value::String(s) => Some((s, None)),
            _ => None,
        };
    }

    let text = std::str::from_utf8(payload).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    Some((text.to_string(), None))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sensorwatch_types::{AlertSeverity, DeviceStatus};

    use super::*;

    fn state() -> MonitorState {
        MonitorState::new(MonitorConfig::default())
    }

    fn wall() -> DateTime<Local> {
        Local::now()
    }

    #[test]
    fn message_flows_through_to_snapshot() {
        let state = state();
        state
            .handle_message(SensorChannel::Temperature, br#"{"value": 23.5}"#)
            .unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.temperature.len(), 1);
        assert_eq!(snapshot.temperature[0].value, 23.5);
        assert_eq!(snapshot.status, DeviceStatus::Online);
        assert!(snapshot.last_update.is_some());
        assert!(snapshot.alerts.is_empty());
    }

    #[test]
    fn malformed_payload_mutates_nothing() {
        let state = state();
        let mut rx = state.subscribe();
        rx.borrow_and_update();

        let err = state
            .handle_message(SensorChannel::Temperature, b"not a number")
            .unwrap_err();
        assert_eq!(err, ParseError::Unrecognized);

        assert!(state.snapshot().is_empty());
        assert_eq!(state.snapshot().status, DeviceStatus::Unknown);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn one_mutation_one_notification() {
        let state = state();
        let mut rx = state.subscribe();
        rx.borrow_and_update();

        state
            .handle_message(SensorChannel::Humidity, b"50.0")
            .unwrap();
        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.humidity.len(), 1);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn breach_surfaces_alert_in_snapshot() {
        let state = state();
        state
            .handle_message(SensorChannel::Temperature, b"55.0")
            .unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.alerts.len(), 1);
        assert_eq!(snapshot.alerts[0].severity, AlertSeverity::Danger);
        assert_eq!(snapshot.alerts[0].message, "Temperatura crítica: 55.0°C");
    }

    #[test]
    fn explicit_status_object_and_bare_string() {
        let state = state();

        state.handle_status(br#"{"status": "offline", "device": "ESP32"}"#);
        assert_eq!(state.snapshot().status, DeviceStatus::Offline);

        state.handle_status(b"online");
        assert_eq!(state.snapshot().status, DeviceStatus::Online);
    }

    #[test]
    fn undecodable_status_is_dropped() {
        let state = state();
        let mut rx = state.subscribe();
        rx.borrow_and_update();

        state.handle_status(b"[1, 2, 3]");
        assert!(!rx.has_changed().unwrap());
        assert_eq!(state.snapshot().status, DeviceStatus::Unknown);
    }

    #[test]
    fn tick_publishes_exactly_once_per_transition() {
        let state = state();
        let t0 = Instant::now();
        state
            .handle_message_at(SensorChannel::Temperature, b"20.0", t0, wall())
            .unwrap();

        let mut rx = state.subscribe();
        rx.borrow_and_update();

        // Within the threshold: no transition, no push.
        assert!(!state.tick_at(t0 + Duration::from_secs(30)));
        assert!(!rx.has_changed().unwrap());

        // Past the threshold: one transition, one push.
        assert!(state.tick_at(t0 + Duration::from_secs(31)));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, DeviceStatus::Offline);

        // Already offline: silent.
        assert!(!state.tick_at(t0 + Duration::from_secs(60)));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn vibration_snapshot_keeps_raw_value() {
        let state = state();
        state
            .handle_message(SensorChannel::Vibration, br#"{"magnitude": 1.732051}"#)
            .unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.vibration[0].raw_value, Some(1.732051));
        assert!((snapshot.vibration[0].value - 4.5).abs() < 1e-6);
    }
}
