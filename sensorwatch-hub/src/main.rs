//! Hub entry point: loads settings, connects to the MQTT broker, serves the
//! dashboard API, and drives the ingestion pipeline plus the periodic
//! silence check.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tracing::{error, info, warn};

use sensorwatch_core::MonitorState;
use sensorwatch_hub::{settings::HubSettings, topics, web};

#[derive(Parser, Debug)]
#[command(name = "sensorwatch-hub")]
#[command(about = "MQTT ingestion hub and dashboard API for IoT sensor monitoring")]
struct Args {
    /// Path to a settings file (TOML/JSON); defaults apply without one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// MQTT broker host (overrides settings)
    #[arg(long)]
    broker: Option<String>,

    /// MQTT broker port (overrides settings)
    #[arg(long)]
    port: Option<u16>,

    /// Dashboard API bind address (overrides settings)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut settings = HubSettings::load(args.config.as_deref())?;
    if let Some(broker) = args.broker {
        settings.broker_host = broker;
    }
    if let Some(port) = args.port {
        settings.broker_port = port;
    }
    if let Some(bind) = args.bind {
        settings.http_bind = bind;
    }

    let config = settings.monitor_config();
    let tick_interval = config.tick_interval;
    let state = Arc::new(MonitorState::new(config));

    // Dashboard API runs independently of the broker connection.
    let web_state = Arc::clone(&state);
    let http_bind = settings.http_bind.clone();
    tokio::spawn(async move {
        if let Err(error) = web::serve(web_state, &http_bind).await {
            error!(%error, "dashboard API failed");
        }
    });

    // MQTT connection.
    let client_id = format!("sensorwatch-hub-{}", std::process::id());
    let mut options = MqttOptions::new(client_id, &settings.broker_host, settings.broker_port);
    options.set_keep_alive(Duration::from_secs(30));
    let (client, mut eventloop) = AsyncClient::new(options, 20);

    // Initial subscriptions; re-issued on every reconnect in the ConnAck arm.
    for topic in topics::SUBSCRIPTIONS {
        client.subscribe(topic, QoS::AtMostOnce).await?;
    }
    info!(
        broker = %settings.broker_host,
        port = settings.broker_port,
        "subscribed to sensor topics"
    );

    // The silence check runs on its own clock, independent of traffic.
    let mut ticker = tokio::time::interval(tick_interval);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = eventloop.poll() => {
                match event {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        topics::dispatch(&state, &publish.topic, &publish.payload);
                    }
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("mqtt connected");
                        // The broker may have dropped our session; re-subscribe.
                        for topic in topics::SUBSCRIPTIONS {
                            if let Err(error) = client.subscribe(topic, QoS::AtMostOnce).await {
                                error!(topic, %error, "re-subscribe failed");
                            }
                        }
                    }
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        warn!("mqtt disconnected");
                    }
                    Ok(_) => {}
                    Err(error) => {
                        warn!(%error, "mqtt connection error, retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
            _ = ticker.tick() => {
                state.tick();
            }
            _ = &mut ctrl_c => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
