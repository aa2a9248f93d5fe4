//! End-to-end pipeline scenarios: raw payload bytes in, snapshots and
//! pushes out.

use std::time::{Duration, Instant};

use chrono::{Local, TimeZone};

use sensorwatch_core::{MonitorConfig, MonitorState};
use sensorwatch_types::{AlertSeverity, DeviceStatus, SensorChannel};

fn wall_at(secs: u32) -> chrono::DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 4, 1, 10, secs / 60, secs % 60)
        .unwrap()
}

#[test]
fn temperature_alert_lives_until_ttl() {
    let state = MonitorState::new(MonitorConfig::default());
    let t0 = Instant::now();

    // t=0: breach raises one danger alert.
    state
        .handle_message_at(SensorChannel::Temperature, b"55.0", t0, wall_at(0))
        .unwrap();
    let snapshot = state.snapshot();
    assert_eq!(snapshot.alerts.len(), 1);
    assert_eq!(snapshot.alerts[0].severity, AlertSeverity::Danger);
    assert_eq!(snapshot.alerts[0].message, "Temperatura crítica: 55.0°C");

    // t=1: a harmless reading does not re-evaluate the alert away.
    state
        .handle_message_at(
            SensorChannel::Temperature,
            b"30.0",
            t0 + Duration::from_secs(1),
            wall_at(1),
        )
        .unwrap();
    assert_eq!(state.snapshot().alerts.len(), 1);

    // t=61: the next evaluation purges the expired alert.
    state
        .handle_message_at(
            SensorChannel::Temperature,
            b"30.0",
            t0 + Duration::from_secs(61),
            wall_at(61),
        )
        .unwrap();
    assert!(state.snapshot().alerts.is_empty());
}

#[test]
fn debounced_breaches_keep_latest_message() {
    let state = MonitorState::new(MonitorConfig::default());
    let t0 = Instant::now();

    state
        .handle_message_at(SensorChannel::Temperature, b"55.0", t0, wall_at(0))
        .unwrap();
    state
        .handle_message_at(
            SensorChannel::Temperature,
            b"60.0",
            t0 + Duration::from_secs(10),
            wall_at(10),
        )
        .unwrap();

    let snapshot = state.snapshot();
    assert_eq!(snapshot.alerts.len(), 1);
    assert_eq!(snapshot.alerts[0].message, "Temperatura crítica: 60.0°C");
}

#[test]
fn silence_flips_offline_with_a_single_push() {
    let config = MonitorConfig::default();
    let threshold = config.offline_threshold;
    let state = MonitorState::new(config);
    let t0 = Instant::now();

    state
        .handle_message_at(SensorChannel::Humidity, b"50.0", t0, wall_at(0))
        .unwrap();
    assert_eq!(state.snapshot().status, DeviceStatus::Online);

    let mut rx = state.subscribe();
    rx.borrow_and_update();

    // Ticks every 5s, as the hub does. Exactly one of them transitions.
    let mut pushes = 0;
    for i in 1..=10 {
        let now = t0 + Duration::from_secs(5 * i);
        if state.tick_at(now) {
            assert!(now.duration_since(t0) > threshold);
        }
        if rx.has_changed().unwrap() {
            rx.borrow_and_update();
            pushes += 1;
        }
    }

    assert_eq!(pushes, 1);
    assert_eq!(state.snapshot().status, DeviceStatus::Offline);

    // History survives the demotion; only liveness changed.
    assert_eq!(state.snapshot().humidity.len(), 1);
}

#[test]
fn burst_coalesces_while_distinct_seconds_evict_fifo() {
    let mut config = MonitorConfig::default();
    config.history_capacity = 3;
    let state = MonitorState::new(config);
    let t0 = Instant::now();

    // Three messages within the same second collapse into one slot.
    for value in [b"1.0".as_slice(), b"2.0", b"3.0"] {
        state
            .handle_message_at(SensorChannel::Temperature, value, t0, wall_at(0))
            .unwrap();
    }
    let snapshot = state.snapshot();
    assert_eq!(snapshot.temperature.len(), 1);
    assert_eq!(snapshot.temperature[0].value, 3.0);

    // Four more distinct seconds: capacity 3, oldest labels evicted.
    for i in 1..=4u32 {
        state
            .handle_message_at(
                SensorChannel::Temperature,
                format!("{}.0", 10 + i).as_bytes(),
                t0 + Duration::from_secs(i as u64),
                wall_at(i),
            )
            .unwrap();
    }
    let snapshot = state.snapshot();
    assert_eq!(snapshot.temperature.len(), 3);
    assert_eq!(snapshot.temperature[0].value, 12.0);
    assert_eq!(snapshot.temperature[2].value, 14.0);
}

#[test]
fn explicit_offline_sticks_until_next_data_message() {
    let state = MonitorState::new(MonitorConfig::default());
    let t0 = Instant::now();

    state
        .handle_message_at(SensorChannel::Temperature, b"20.0", t0, wall_at(0))
        .unwrap();
    state.handle_status_at(
        br#"{"status": "offline", "device": "ESP32"}"#,
        t0 + Duration::from_secs(1),
        wall_at(1),
    );
    assert_eq!(state.snapshot().status, DeviceStatus::Offline);

    state
        .handle_message_at(
            SensorChannel::Temperature,
            b"21.0",
            t0 + Duration::from_secs(2),
            wall_at(2),
        )
        .unwrap();
    assert_eq!(state.snapshot().status, DeviceStatus::Online);
}
