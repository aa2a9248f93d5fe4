//! Threshold alert evaluation, debouncing and expiry.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use sensorwatch_types::{AlertInfo, AlertKind, AlertSeverity, SensorChannel};

use crate::config::AlertThresholds;
use crate::normalize::Reading;

/// A live alert held by the registry.
#[derive(Debug, Clone)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub raised_at: Instant,
    /// Second-resolution label of the reading that raised (or last
    /// refreshed) this alert, exposed on the wire.
    pub raised_label: String,
}

/// The set of live alerts, at most one per kind.
///
/// Repeated breaches of the same kind within the debounce window update the
/// existing entry in place; entries older than the TTL are purged before
/// each evaluation. A reading that stops breaching does not clear its alert;
/// only expiry does.
#[derive(Debug, Clone, Default)]
pub struct AlertRegistry {
    alerts: BTreeMap<AlertKind, Alert>,
}

impl AlertRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn get(&self, kind: AlertKind) -> Option<&Alert> {
        self.alerts.get(&kind)
    }

    /// Drop every alert older than `ttl`. Returns how many were purged.
    pub fn purge_expired(&mut self, now: Instant, ttl: Duration) -> usize {
        let before = self.alerts.len();
        self.alerts
            .retain(|_, alert| now.saturating_duration_since(alert.raised_at) <= ttl);
        let purged = before - self.alerts.len();
        if purged > 0 {
            debug!(purged, "expired alerts purged");
        }
        purged
    }

    /// Evaluate the latest reading of each channel against the thresholds.
    ///
    /// Only the most recent reading per channel matters; the rest of the
    /// history is display data.
    pub fn evaluate<'a>(
        &mut self,
        latest: impl IntoIterator<Item = &'a Reading>,
        thresholds: &AlertThresholds,
        debounce: Duration,
        ttl: Duration,
        now: Instant,
    ) {
        self.purge_expired(now, ttl);

        for reading in latest {
            if let Some((severity, message)) = breach(reading, thresholds) {
                self.raise(
                    reading.channel.into(),
                    severity,
                    message,
                    reading.label.clone(),
                    debounce,
                    now,
                );
            }
        }
    }

    /// Insert an alert, merging into an existing entry of the same kind when
    /// it is younger than the debounce window.
    fn raise(
        &mut self,
        kind: AlertKind,
        severity: AlertSeverity,
        message: String,
        raised_label: String,
        debounce: Duration,
        now: Instant,
    ) {
        match self.alerts.get_mut(&kind) {
            Some(existing)
                if now.saturating_duration_since(existing.raised_at) < debounce =>
            {
                debug!(kind = ?kind, message, "alert merged into live entry");
                existing.severity = severity;
                existing.message = message;
                existing.raised_at = now;
                existing.raised_label = raised_label;
            }
            _ => {
                info!(kind = ?kind, severity = ?severity, message, "alert raised");
                self.alerts.insert(
                    kind,
                    Alert {
                        kind,
                        severity,
                        message,
                        raised_at: now,
                        raised_label,
                    },
                );
            }
        }
    }

    /// Wire view, highest severity first (the dashboard shows danger on
    /// top).
    pub fn to_infos(&self) -> Vec<AlertInfo> {
        let mut infos: Vec<AlertInfo> = self
            .alerts
            .values()
            .map(|alert| AlertInfo {
                kind: alert.kind,
                severity: alert.severity,
                message: alert.message.clone(),
                raised_at: alert.raised_label.clone(),
            })
            .collect();
        infos.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.kind.cmp(&b.kind)));
        infos
    }
}

/// Threshold check for one reading. `None` means nothing to raise.
fn breach(reading: &Reading, thresholds: &AlertThresholds) -> Option<(AlertSeverity, String)> {
    let value = reading.value;
    match reading.channel {
        SensorChannel::Temperature if value > thresholds.temperature_danger => Some((
            AlertSeverity::Danger,
            format!("Temperatura crítica: {value:.1}°C"),
        )),
        SensorChannel::Humidity if value > thresholds.humidity_warning => Some((
            AlertSeverity::Warning,
            format!("Umidade elevada: {value:.1}%"),
        )),
        SensorChannel::Vibration if value > thresholds.vibration_danger => Some((
            AlertSeverity::Danger,
            format!("Vibração extrema: {value:.1}"),
        )),
        SensorChannel::Vibration if value > thresholds.vibration_warning => Some((
            AlertSeverity::Warning,
            format!("Vibração elevada: {value:.1}"),
        )),
        _ => None,
    }
}
