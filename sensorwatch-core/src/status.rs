//! Device liveness tracking.

use std::time::{Duration, Instant};

use tracing::debug;

use sensorwatch_types::DeviceStatus;

/// Derives device liveness from message recency and explicit status reports.
///
/// Any inbound traffic implies liveness and promotes to `Online`; an
/// explicit report is authoritative for that one update; the periodic
/// silence check only ever demotes to `Offline`.
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    value: DeviceStatus,
    last_seen_at: Option<Instant>,
    last_explicit: Option<String>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> DeviceStatus {
        self.value
    }

    /// The raw string from the most recent explicit status report.
    pub fn last_explicit(&self) -> Option<&str> {
        self.last_explicit.as_deref()
    }

    /// Note inbound traffic. Returns whether the status changed.
    pub fn on_message(&mut self, now: Instant) -> bool {
        self.last_seen_at = Some(now);
        if self.value != DeviceStatus::Online {
            debug!(previous = %self.value, "device online: traffic received");
            self.value = DeviceStatus::Online;
            return true;
        }
        false
    }

    /// Apply an explicitly reported status. Authoritative for this update,
    /// even against the implicit-online rule: a reported "offline" sticks
    /// until the next data message arrives. Returns whether the status
    /// changed.
    pub fn on_explicit_status(&mut self, reported: &str, now: Instant) -> bool {
        // A status report is still traffic for silence accounting.
        self.last_seen_at = Some(now);
        self.last_explicit = Some(reported.to_string());

        let value = DeviceStatus::from_reported(reported);
        if value != self.value {
            debug!(reported, previous = %self.value, "explicit status applied");
            self.value = value;
            return true;
        }
        false
    }

    /// Periodic silence check. Demotes to `Offline` when the device has been
    /// silent longer than `offline_after`; never promotes. Returns whether a
    /// transition happened.
    pub fn tick(&mut self, now: Instant, offline_after: Duration) -> bool {
        if self.value == DeviceStatus::Offline {
            return false;
        }
        let Some(last_seen) = self.last_seen_at else {
            // No message yet: stay Unknown rather than flapping offline at
            // startup.
            return false;
        };

        let silent_for = now.saturating_duration_since(last_seen);
        if silent_for > offline_after {
            debug!(silent_secs = silent_for.as_secs(), "device offline: silence threshold elapsed");
            self.value = DeviceStatus::Offline;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: Duration = Duration::from_secs(30);

    #[test]
    fn first_message_promotes_unknown_to_online() {
        let mut tracker = StatusTracker::new();
        assert_eq!(tracker.value(), DeviceStatus::Unknown);

        assert!(tracker.on_message(Instant::now()));
        assert_eq!(tracker.value(), DeviceStatus::Online);

        // Already online: no further transition.
        assert!(!tracker.on_message(Instant::now()));
    }

    #[test]
    fn goes_offline_only_after_threshold() {
        let mut tracker = StatusTracker::new();
        let t0 = Instant::now();
        tracker.on_message(t0);

        assert!(!tracker.tick(t0 + THRESHOLD, THRESHOLD));
        assert_eq!(tracker.value(), DeviceStatus::Online);

        assert!(tracker.tick(t0 + THRESHOLD + Duration::from_secs(1), THRESHOLD));
        assert_eq!(tracker.value(), DeviceStatus::Offline);

        // Repeated ticks report no further transition.
        assert!(!tracker.tick(t0 + THRESHOLD + Duration::from_secs(10), THRESHOLD));
    }

    #[test]
    fn tick_never_fires_before_any_message() {
        let mut tracker = StatusTracker::new();
        assert!(!tracker.tick(Instant::now() + Duration::from_secs(3600), THRESHOLD));
        assert_eq!(tracker.value(), DeviceStatus::Unknown);
    }

    #[test]
    fn explicit_offline_overrides_recent_traffic() {
        let mut tracker = StatusTracker::new();
        let t0 = Instant::now();
        tracker.on_message(t0);

        assert!(tracker.on_explicit_status("offline", t0 + Duration::from_secs(1)));
        assert_eq!(tracker.value(), DeviceStatus::Offline);
        assert_eq!(tracker.last_explicit(), Some("offline"));

        // Next data message re-promotes.
        assert!(tracker.on_message(t0 + Duration::from_secs(2)));
        assert_eq!(tracker.value(), DeviceStatus::Online);
    }

    #[test]
    fn explicit_status_refreshes_silence_clock() {
        let mut tracker = StatusTracker::new();
        let t0 = Instant::now();
        tracker.on_message(t0);
        tracker.on_explicit_status("online", t0 + Duration::from_secs(20));

        // 25s after the status report, only 45s after the data message:
        // still within the window measured from the report.
        assert!(!tracker.tick(t0 + Duration::from_secs(45), THRESHOLD));
        assert_eq!(tracker.value(), DeviceStatus::Online);
    }

    #[test]
    fn unrecognized_report_keeps_raw_string() {
        let mut tracker = StatusTracker::new();
        tracker.on_explicit_status("reset_complete", Instant::now());
        assert_eq!(tracker.value(), DeviceStatus::Unknown);
        assert_eq!(tracker.last_explicit(), Some("reset_complete"));
    }

    #[test]
    fn never_promotes_on_tick() {
        let mut tracker = StatusTracker::new();
        let t0 = Instant::now();
        tracker.on_message(t0);
        tracker.tick(t0 + Duration::from_secs(31), THRESHOLD);
        assert_eq!(tracker.value(), DeviceStatus::Offline);

        // Ticks after the demotion cannot bring the device back.
        assert!(!tracker.tick(t0 + Duration::from_secs(32), THRESHOLD));
        assert_eq!(tracker.value(), DeviceStatus::Offline);
    }
}
