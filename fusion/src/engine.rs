//! Update Loop
//!
//! The orchestrator: on each tick it snapshots the sensor cells, runs
//! the lightning gate, pulls the external collaborators, resolves the
//! icon and publishes one display frame. A cycle that fails is logged
//! and abandoned; the loop itself never stops.

use crate::icon::{self, IconSet};
use crate::{AirQualityReading, LightningGate, Result};
use chrono::Timelike;
use pixelvane_telemetry::{
    AlertSink, ConditionSource, DisplayPayload, DisplaySink, IndoorReading, IndoorSource,
    Notification, OutdoorSource, OutdoorTelemetry, SensorCell,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tunables for the update loop and the published frame.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Custom-app identifier on the display device
    pub app_id: String,
    /// Sleep between cycles
    pub interval: Duration,
    /// Frame text colour
    pub color: [u8; 3],
    pub scroll_speed: u32,
    pub repeat: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_id: "weather".to_string(),
            interval: Duration::from_secs(40),
            color: [255, 200, 100],
            scroll_speed: 40,
            repeat: 1,
        }
    }
}

/// The fusion engine: sensor cells in, display frames out.
///
/// Strictly sequential; a cycle runs to completion before the sleep, so
/// ticks never overlap. The cells are written concurrently by their
/// listener tasks and only ever snapshotted here.
pub struct FusionEngine<O, C, I, D, A> {
    outdoor: O,
    condition: C,
    indoor: I,
    display: D,
    alerts: A,
    pm25: Arc<SensorCell<f64>>,
    lightning: Arc<SensorCell<f64>>,
    gate: LightningGate,
    icons: IconSet,
    config: EngineConfig,
    seq: AtomicU64,
}

impl<O, C, I, D, A> FusionEngine<O, C, I, D, A>
where
    O: OutdoorSource,
    C: ConditionSource,
    I: IndoorSource,
    D: DisplaySink,
    A: AlertSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        outdoor: O,
        condition: C,
        indoor: I,
        display: D,
        alerts: A,
        pm25: Arc<SensorCell<f64>>,
        lightning: Arc<SensorCell<f64>>,
        icons: IconSet,
        config: EngineConfig,
    ) -> Self {
        Self {
            outdoor,
            condition,
            indoor,
            display,
            alerts,
            pm25,
            lightning,
            gate: LightningGate::new(),
            icons,
            config,
            seq: AtomicU64::new(0),
        }
    }

    /// Run cycles forever, swallowing per-cycle failures.
    pub async fn run(&mut self) {
        loop {
            if let Err(e) = self.run_cycle().await {
                tracing::error!("update cycle failed: {e}");
            }
            tokio::time::sleep(self.config.interval).await;
        }
    }

    /// One fetch / fuse / publish cycle.
    pub async fn run_cycle(&mut self) -> Result<()> {
        // Non-blocking snapshots first; the lightning cell is one-shot
        // and always cleared for this tick.
        let pm25 = self.pm25.get();
        let strike = self.lightning.take();

        if let Some(distance_km) = strike {
            if self.gate.observe(distance_km) {
                tracing::info!(distance_km, "publishing lightning alert");
                self.alerts
                    .notify(&lightning_notification(distance_km, self.icons.lightning))
                    .await?;
            } else {
                tracing::debug!(distance_km, "unchanged storm distance, alert suppressed");
            }
        }

        let outdoor = match self.outdoor.fetch().await {
            Ok(telemetry) => telemetry,
            Err(e) => {
                tracing::warn!("outdoor telemetry unavailable ({e}), showing sentinel");
                OutdoorTelemetry::SENTINEL
            }
        };

        // A condition failure aborts the cycle; run() catches it.
        let condition = self.condition.fetch().await?;
        let indoor = self.indoor.sample().await?;

        let air = pm25.map(AirQualityReading::from_pm25);

        let hour = chrono::Local::now().hour();
        let icon = icon::resolve_icon(
            condition,
            indoor.as_ref().map(|i| i.co2_ppm),
            air.map(|a| a.pm25),
            strike.is_some(),
            hour,
            &self.icons,
        );

        let payload = DisplayPayload {
            id: self.config.app_id.clone(),
            text: format_ticker(&outdoor, air.as_ref(), indoor.as_ref()),
            icon,
            color: self.config.color,
            scroll_speed: self.config.scroll_speed,
            repeat: self.config.repeat,
            unique: self.next_token(),
        };

        tracing::info!(icon = ?payload.icon, "frame: {}", payload.text);
        self.display.publish(&payload).await?;

        Ok(())
    }

    /// Fresh token per publish so the firmware refreshes even when the
    /// text is unchanged.
    fn next_token(&self) -> String {
        format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            self.seq.fetch_add(1, Ordering::Relaxed)
        )
    }
}

/// Compose the scrolling ticker text. Absent readings show as `?`.
pub fn format_ticker(
    outdoor: &OutdoorTelemetry,
    air: Option<&AirQualityReading>,
    indoor: Option<&IndoorReading>,
) -> String {
    let pm25 = match air {
        Some(a) => format!("{}µg/m³", a.pm25),
        None => "?".to_string(),
    };
    let aqi = match air {
        Some(a) => a.aqi.to_string(),
        None => "?".to_string(),
    };
    let (co2, indoor_temp, indoor_rh) = match indoor {
        Some(i) => (
            i.co2_ppm.to_string(),
            i.temperature_c.to_string(),
            i.humidity_pct.to_string(),
        ),
        None => ("?".to_string(), "?".to_string(), "?".to_string()),
    };

    format!(
        "🌡{}°C 💧{}% 🌬{}km/h ☔{}mm P:{}hPa UV:{} PM2.5:{} AQI:{} CO2:{} {}°C {}%",
        outdoor.temperature_c,
        outdoor.humidity_pct,
        outdoor.wind_kmh,
        outdoor.rain_mm,
        outdoor.pressure_hpa,
        outdoor.uv_index,
        pm25,
        aqi,
        co2,
        indoor_temp,
        indoor_rh,
    )
}

fn lightning_notification(distance_km: f64, icon: u32) -> Notification {
    Notification {
        title: "⚡ Lightning Alert".to_string(),
        text: format!("Storm: {distance_km} km"),
        duration: 10,
        icon,
        color: [255, 200, 0],
        repeat: 3,
    }
}
