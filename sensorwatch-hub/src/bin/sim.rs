//! Device simulator: fabricates sensor readings in place of a real board.
//!
//! Publishes smoothed, noisy values on the three sensor topics every
//! interval, announces itself on the status topic, and honors commands on
//! `sensor/commands` (`reset`, `calibrate`, `status`, `anomaly`). The
//! `anomaly` command shifts every generator into its out-of-range band for
//! a bounded duration so threshold alerts can be exercised end to end.

use std::f64::consts::PI;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use clap::Parser;
use rand::Rng;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde_json::{json, Value};
use tracing::{info, warn};

use sensorwatch_hub::topics::{self, TOPIC_COMMANDS, TOPIC_STATUS};
use sensorwatch_types::SensorChannel;

const VIBRATION_NORMAL: (f64, f64) = (0.1, 2.0);
const VIBRATION_ANOMALY: (f64, f64) = (5.0, 10.0);
const TEMP_NORMAL: (f64, f64) = (20.0, 28.0);
const TEMP_ANOMALY: (f64, f64) = (30.0, 45.0);
const HUMIDITY_NORMAL: (f64, f64) = (40.0, 60.0);
const HUMIDITY_ANOMALY: (f64, f64) = (75.0, 95.0);

#[derive(Parser, Debug)]
#[command(name = "sensorwatch-sim")]
#[command(about = "Simulated sensor device publishing telemetry over MQTT")]
struct Args {
    /// MQTT broker host
    #[arg(long, default_value = "broker.hivemq.com")]
    broker: String,

    /// MQTT broker port
    #[arg(long, default_value = "1883")]
    port: u16,

    /// Seconds between published readings
    #[arg(long, default_value = "5")]
    interval: u64,
}

struct Simulator {
    device_id: String,
    vibration: f64,
    temperature: f64,
    humidity: f64,
    phase: f64,
    anomaly_until: Option<Instant>,
    started: Instant,
}

impl Simulator {
    fn new() -> Self {
        let suffix: u16 = rand::rng().random_range(1000..=9999);
        Self {
            device_id: format!("ESP32-DHT22-MPU6050-{suffix}"),
            vibration: 0.5,
            temperature: 24.0,
            humidity: 50.0,
            phase: 0.0,
            anomaly_until: None,
            started: Instant::now(),
        }
    }

    fn reset(&mut self) {
        self.vibration = 0.5;
        self.temperature = 24.0;
        self.humidity = 50.0;
        self.anomaly_until = None;
    }

    fn anomaly_active(&mut self, now: Instant) -> bool {
        match self.anomaly_until {
            Some(until) if now < until => true,
            Some(_) => {
                info!("anomaly window ended");
                self.anomaly_until = None;
                false
            }
            None => false,
        }
    }

    /// Advance all generators one step.
    fn step(&mut self, now: Instant) {
        let anomaly = self.anomaly_active(now);
        let (vib_range, temp_range, hum_range) = if anomaly {
            (VIBRATION_ANOMALY, TEMP_ANOMALY, HUMIDITY_ANOMALY)
        } else {
            (VIBRATION_NORMAL, TEMP_NORMAL, HUMIDITY_NORMAL)
        };

        self.phase += 0.1;
        let mut rng = rand::rng();

        let vib_target = rng.random_range(vib_range.0..=vib_range.1);
        self.vibration = approach(self.vibration, vib_target, 0.3);

        self.temperature = sine_wave(
            midpoint(temp_range),
            (temp_range.1 - temp_range.0) / 4.0,
            self.phase,
            rng.random_range(-0.2..=0.2),
        );
        // Humidity swings in opposite phase to temperature.
        self.humidity = sine_wave(
            midpoint(hum_range),
            (hum_range.1 - hum_range.0) / 4.0,
            self.phase + PI,
            rng.random_range(-0.5..=0.5),
        );
    }

    fn reading(&self, channel: SensorChannel) -> Value {
        let value = match channel {
            SensorChannel::Vibration => round_to(self.vibration, 2),
            SensorChannel::Temperature => round_to(self.temperature, 1),
            SensorChannel::Humidity => round_to(self.humidity, 1),
        };
        json!({
            "value": value,
            "timestamp": unix_now(),
            "device_id": self.device_id,
        })
    }

    fn status(&self, status: &str) -> Value {
        json!({
            "status": status,
            "device": "ESP32",
            "device_id": self.device_id,
            "uptime": self.started.elapsed().as_secs(),
            "timestamp": unix_now(),
        })
    }
}

fn approach(current: f64, target: f64, step: f64) -> f64 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

fn sine_wave(base: f64, amplitude: f64, phase: f64, noise: f64) -> f64 {
    base + amplitude * phase.sin() + noise
}

fn midpoint(range: (f64, f64)) -> f64 {
    (range.0 + range.1) / 2.0
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

async fn publish_readings(client: &AsyncClient, sim: &Simulator) -> Result<()> {
    for channel in SensorChannel::ALL {
        client
            .publish(
                topics::topic_for(channel),
                QoS::AtMostOnce,
                false,
                sim.reading(channel).to_string(),
            )
            .await?;
    }
    Ok(())
}

async fn handle_command(client: &AsyncClient, sim: &mut Simulator, payload: &[u8]) -> Result<()> {
    let command: Value = match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "invalid command payload");
            return Ok(());
        }
    };
    let Some(kind) = command.get("type").and_then(Value::as_str) else {
        return Ok(());
    };
    info!(command = kind, "command received");

    match kind {
        "reset" => {
            sim.reset();
            let status = sim.status("reset_complete").to_string();
            client.publish(TOPIC_STATUS, QoS::AtMostOnce, false, status).await?;
        }
        "calibrate" => {
            let status = sim.status("calibration_complete").to_string();
            client.publish(TOPIC_STATUS, QoS::AtMostOnce, false, status).await?;
        }
        "status" => {
            let status = sim.status("online").to_string();
            client.publish(TOPIC_STATUS, QoS::AtMostOnce, false, status).await?;
        }
        "anomaly" => {
            let duration = command.get("value").and_then(Value::as_u64).unwrap_or(30);
            sim.anomaly_until = Some(Instant::now() + Duration::from_secs(duration));
            info!(duration, "anomaly mode enabled");
        }
        other => warn!(command = other, "unknown command ignored"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut sim = Simulator::new();

    let mut options = MqttOptions::new(sim.device_id.clone(), &args.broker, args.port);
    options.set_keep_alive(Duration::from_secs(30));
    let (client, mut eventloop) = AsyncClient::new(options, 20);

    client.subscribe(TOPIC_COMMANDS, QoS::AtMostOnce).await?;
    let online = sim.status("online").to_string();
    client.publish(TOPIC_STATUS, QoS::AtMostOnce, false, online).await?;
    info!(device = %sim.device_id, broker = %args.broker, "simulator started");

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.max(1)));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = eventloop.poll() => {
                match event {
                    Ok(Event::Incoming(Packet::Publish(publish)))
                        if publish.topic == TOPIC_COMMANDS =>
                    {
                        handle_command(&client, &mut sim, &publish.payload).await?;
                    }
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("mqtt connected");
                        client.subscribe(TOPIC_COMMANDS, QoS::AtMostOnce).await?;
                    }
                    Ok(_) => {}
                    Err(error) => {
                        warn!(%error, "mqtt connection error, retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
            _ = ticker.tick() => {
                sim.step(Instant::now());
                publish_readings(&client, &sim).await?;

                // Occasional heartbeat on the status topic.
                if rand::rng().random_range(0.0..1.0) < 0.2 {
                    let status = sim.status("online").to_string();
                    client.publish(TOPIC_STATUS, QoS::AtMostOnce, false, status).await?;
                }
            }
            _ = &mut ctrl_c => {
                let status = sim.status("offline").to_string();
                let _ = client.publish(TOPIC_STATUS, QoS::AtMostOnce, false, status).await;
                info!("simulator stopped");
                break;
            }
        }
    }

    Ok(())
}
