//! Dashboard HTTP API: snapshot pull and SSE push.

use std::convert::Infallible;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
    routing::get,
    Router,
};
use futures_util::stream::{self, Stream};
use tracing::info;

use sensorwatch_core::MonitorState;
use sensorwatch_types::StateSnapshot;

/// Build the dashboard router.
pub fn router(state: Arc<MonitorState>) -> Router {
    Router::new()
        .route("/api/data", get(get_data))
        .route("/api/stream", get(get_stream))
        .with_state(state)
}

/// Serve the dashboard API until the process shuts down.
pub async fn serve(state: Arc<MonitorState>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding dashboard API to {bind}"))?;
    info!(%bind, "dashboard API listening");
    axum::serve(listener, router(state))
        .await
        .context("dashboard API server")
}

/// Pull interface: the full current snapshot.
async fn get_data(State(state): State<Arc<MonitorState>>) -> Json<StateSnapshot> {
    Json(state.snapshot())
}

/// Push interface: one SSE event with the full snapshot per mutation.
///
/// Backed by the dispatcher's watch channel, so a slow consumer simply
/// observes the latest snapshot on its next wakeup instead of applying
/// backpressure to ingestion.
async fn get_stream(
    State(state): State<Arc<MonitorState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    let stream = stream::unfold(rx, |mut rx| async move {
        rx.changed().await.ok()?;
        let snapshot = rx.borrow_and_update().clone();
        let event = Event::default().json_data(&snapshot).ok()?;
        Some((Ok::<_, Infallible>(event), rx))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use sensorwatch_core::MonitorConfig;
    use sensorwatch_types::{DeviceStatus, SensorChannel};

    use super::*;

    #[tokio::test]
    async fn data_endpoint_returns_current_snapshot() {
        let state = Arc::new(MonitorState::new(MonitorConfig::default()));
        state
            .handle_message(SensorChannel::Temperature, b"55.0")
            .unwrap();

        let Json(snapshot) = get_data(State(state.clone())).await;
        assert_eq!(snapshot.status, DeviceStatus::Online);
        assert_eq!(snapshot.temperature.len(), 1);
        assert_eq!(snapshot.alerts.len(), 1);
    }

    #[tokio::test]
    async fn snapshot_serializes_with_dashboard_field_names() {
        let state = Arc::new(MonitorState::new(MonitorConfig::default()));
        state
            .handle_message(SensorChannel::Vibration, br#"{"magnitude": 1.732051}"#)
            .unwrap();

        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert!(json["vibration"][0]["label"].is_string());
        assert_eq!(json["vibration"][0]["raw_value"], 1.732051);
        assert_eq!(json["status"], "online");
        assert!(json["alerts"].is_array());
    }
}
