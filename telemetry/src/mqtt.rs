//! MQTT Transports
//!
//! Three kinds of MQTT collaborators, all built on rumqttc:
//!
//! - background listeners for the particulate and lightning topics, each
//!   owning its client and writing into a [`SensorCell`];
//! - a bounded-wait indoor sampler that subscribes, waits a short window
//!   for one message and proceeds regardless;
//! - the AWTRIX client, which publishes display frames (destroy, pause,
//!   set) and push notifications.

use crate::{
    AlertSink, DisplayPayload, DisplaySink, IndoorReading, IndoorSource, Notification, Result,
    SensorCell,
};
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, Outgoing, QoS};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Broker connection settings shared by every MQTT collaborator.
#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl MqttSettings {
    fn options(&self, client_id: &str) -> MqttOptions {
        let mut options = MqttOptions::new(client_id, &self.host, self.port);
        options.set_credentials(&self.username, &self.password);
        options.set_keep_alive(Duration::from_secs(60));
        options
    }
}

/// Spawn the particulate listener; each message replaces the pm25 cell.
///
/// Accepts both `PM25` and `pm25` field spellings, as deployed sensors
/// disagree on the casing.
pub fn spawn_particulate_listener(
    settings: MqttSettings,
    topic: String,
    cell: Arc<SensorCell<f64>>,
) -> JoinHandle<()> {
    spawn_listener(settings, "pixelvane-pm25", topic, move |payload| {
        match parse_particulate(payload) {
            Ok(pm25) => {
                tracing::debug!(pm25, "particulate reading");
                cell.set(pm25);
            }
            // Previous value stays in the cell.
            Err(e) => tracing::warn!("particulate parse error: {e}"),
        }
    })
}

/// Spawn the lightning listener; each message replaces the storm
/// distance cell, which the update loop consumes as a one-shot signal.
pub fn spawn_lightning_listener(
    settings: MqttSettings,
    topic: String,
    cell: Arc<SensorCell<f64>>,
) -> JoinHandle<()> {
    spawn_listener(settings, "pixelvane-lightning", topic, move |payload| {
        match parse_lightning(payload) {
            Ok(distance_km) => {
                tracing::info!(distance_km, "lightning detected");
                cell.set(distance_km);
            }
            Err(e) => tracing::warn!("lightning parse error: {e}"),
        }
    })
}

/// Run one subscribe-and-listen client forever, resubscribing after
/// every reconnect. Connection errors are logged and retried; the task
/// never ends on its own.
fn spawn_listener(
    settings: MqttSettings,
    client_id: &'static str,
    topic: String,
    on_message: impl Fn(&[u8]) + Send + Sync + 'static,
) -> JoinHandle<()> {
    let (client, mut eventloop) = AsyncClient::new(settings.options(client_id), 16);

    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    tracing::info!(client_id, %topic, "connected, subscribing");
                    if let Err(e) = client.subscribe(&topic, QoS::AtMostOnce).await {
                        tracing::error!("subscribe to {topic} failed: {e}");
                    }
                }
                Ok(Event::Incoming(Incoming::Publish(publish))) => {
                    on_message(&publish.payload);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(client_id, "connection lost: {e}, retrying");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    })
}

fn parse_particulate(payload: &[u8]) -> Result<f64> {
    let value: Value = serde_json::from_slice(payload)?;
    num_field(&value, "PM25")
        .or_else(|| num_field(&value, "pm25"))
        .ok_or_else(|| crate::TelemetryError::MissingField("PM25".to_string()))
}

fn parse_lightning(payload: &[u8]) -> Result<f64> {
    let value: Value = serde_json::from_slice(payload)?;
    num_field(&value, "storm_dist")
        .ok_or_else(|| crate::TelemetryError::MissingField("storm_dist".to_string()))
}

fn parse_indoor(payload: &[u8]) -> Result<IndoorReading> {
    let value: Value = serde_json::from_slice(payload)?;
    // Missing fields default to zero, matching the sensor firmware's
    // partial messages.
    Ok(IndoorReading {
        co2_ppm: num_field(&value, "co2").unwrap_or(0.0),
        temperature_c: num_field(&value, "temp").unwrap_or(0.0),
        humidity_pct: num_field(&value, "rh").unwrap_or(0.0),
    })
}

/// Numeric field that may arrive as a JSON number or a quoted string.
fn num_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Bounded-wait sampler for the indoor CO₂ topic.
///
/// Best-effort by design: connects, subscribes, waits up to `wait` for a
/// single message and returns whatever arrived. An expired window is
/// `Ok(None)`, not an error.
pub struct MqttIndoorSampler {
    settings: MqttSettings,
    topic: String,
    wait: Duration,
}

impl MqttIndoorSampler {
    pub fn new(settings: MqttSettings, topic: &str, wait: Duration) -> Self {
        Self {
            settings,
            topic: topic.to_string(),
            wait,
        }
    }
}

impl IndoorSource for MqttIndoorSampler {
    async fn sample(&self) -> Result<Option<IndoorReading>> {
        let (client, mut eventloop) = AsyncClient::new(self.settings.options("pixelvane-co2"), 16);
        let deadline = tokio::time::Instant::now() + self.wait;
        let mut reading = None;

        loop {
            match tokio::time::timeout_at(deadline, eventloop.poll()).await {
                // Window elapsed without a message: proceed regardless.
                Err(_) => break,
                Ok(Ok(Event::Incoming(Incoming::ConnAck(_)))) => {
                    client.subscribe(&self.topic, QoS::AtMostOnce).await?;
                }
                Ok(Ok(Event::Incoming(Incoming::Publish(publish)))) => {
                    match parse_indoor(&publish.payload) {
                        Ok(r) => {
                            reading = Some(r);
                            break;
                        }
                        Err(e) => tracing::warn!("indoor parse error: {e}"),
                    }
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(e.into()),
            }
        }

        let _ = client.disconnect().await;
        Ok(reading)
    }
}

/// MQTT client for the AWTRIX display device.
///
/// Display frames need two sequential writes: destroying the previous
/// custom app, then setting the new one, with a short pause in between
/// so the firmware processes the destroy first.
pub struct AwtrixClient {
    settings: MqttSettings,
    device_uid: String,
    handoff: Duration,
}

impl AwtrixClient {
    pub fn new(settings: MqttSettings, device_uid: &str, handoff: Duration) -> Self {
        Self {
            settings,
            device_uid: device_uid.to_string(),
            handoff,
        }
    }

    /// Open a short-lived connection and drive its event loop in the
    /// background until disconnect or failure.
    fn connect(
        &self,
        client_id: &str,
    ) -> (AsyncClient, JoinHandle<std::result::Result<(), rumqttc::ConnectionError>>) {
        let (client, mut eventloop) = AsyncClient::new(self.settings.options(client_id), 16);
        let driver = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => return Ok(()),
                    Ok(_) => {}
                    Err(e) => return Err(e),
                }
            }
        });
        (client, driver)
    }

    async fn finish(
        client: AsyncClient,
        driver: JoinHandle<std::result::Result<(), rumqttc::ConnectionError>>,
    ) -> Result<()> {
        let _ = client.disconnect().await;
        match driver.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(join) => {
                tracing::error!("mqtt driver task failed: {join}");
                Ok(())
            }
        }
    }
}

impl DisplaySink for AwtrixClient {
    async fn publish(&self, payload: &DisplayPayload) -> Result<()> {
        let (client, driver) = self.connect("pixelvane-display");

        let destroy_topic = format!("{}/custom/{}/destroy", self.device_uid, payload.id);
        client
            .publish(destroy_topic, QoS::AtLeastOnce, false, "1")
            .await?;

        // Let the firmware process the destroy before the create.
        tokio::time::sleep(self.handoff).await;

        let topic = format!("{}/custom/{}", self.device_uid, payload.id);
        client
            .publish(topic, QoS::AtLeastOnce, false, serde_json::to_vec(payload)?)
            .await?;

        Self::finish(client, driver).await
    }
}

impl AlertSink for AwtrixClient {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let (client, driver) = self.connect("pixelvane-notify");

        let topic = format!("{}/notify", self.device_uid);
        client
            .publish(
                topic,
                QoS::AtLeastOnce,
                false,
                serde_json::to_vec(notification)?,
            )
            .await?;

        Self::finish(client, driver).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particulate_accepts_both_field_spellings() {
        assert_eq!(parse_particulate(br#"{"PM25": 18.5}"#).unwrap(), 18.5);
        assert_eq!(parse_particulate(br#"{"pm25": 7}"#).unwrap(), 7.0);
        assert_eq!(parse_particulate(br#"{"pm25": "12.3"}"#).unwrap(), 12.3);
    }

    #[test]
    fn particulate_rejects_messages_without_the_field() {
        assert!(parse_particulate(br#"{"pm10": 30}"#).is_err());
        assert!(parse_particulate(b"not json").is_err());
    }

    #[test]
    fn lightning_reads_storm_distance() {
        assert_eq!(parse_lightning(br#"{"storm_dist": 12}"#).unwrap(), 12.0);
        assert!(parse_lightning(br#"{"energy": 5000}"#).is_err());
    }

    #[test]
    fn indoor_defaults_missing_fields_to_zero() {
        let reading = parse_indoor(br#"{"co2": 812.0}"#).unwrap();
        assert_eq!(reading.co2_ppm, 812.0);
        assert_eq!(reading.temperature_c, 0.0);
        assert_eq!(reading.humidity_pct, 0.0);
    }

    #[test]
    fn indoor_parses_a_full_message() {
        let reading = parse_indoor(br#"{"co2": 640, "temp": 21.5, "rh": 38.0}"#).unwrap();
        assert_eq!(reading.co2_ppm, 640.0);
        assert_eq!(reading.temperature_c, 21.5);
        assert_eq!(reading.humidity_pct, 38.0);
    }
}
