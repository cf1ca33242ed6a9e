//! Pixelvane Weather Display Daemon
//!
//! Main application entry point: wires the MQTT listeners, the weather
//! sources and the AWTRIX client into the fusion engine and runs it
//! until interrupted.

use anyhow::Result;
use clap::Parser;
use pixelvane_fusion::{EngineConfig, FusionEngine};
use pixelvane_telemetry::{
    mqtt::{spawn_lightning_listener, spawn_particulate_listener},
    AwtrixClient, EcowittSource, MqttIndoorSampler, MqttSettings, OpenMeteoSource, SensorCell,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "pixelvane")]
#[command(author = "Pixelvane Team")]
#[command(version = "0.1.0")]
#[command(about = "Weather and indoor air quality display daemon", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", AppConfig::example());
        return Ok(());
    }

    init_logging();

    tracing::info!("╔══════════════════════════════════════════╗");
    tracing::info!("║    Pixelvane Weather Display Daemon      ║");
    tracing::info!("║            Version 0.1.0                 ║");
    tracing::info!("╚══════════════════════════════════════════╝");

    // Load configuration
    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    tracing::info!("Configuration loaded from {:?}", config.config_path);

    // Surface any shadowed classification rules at startup.
    config.condition_map.warn_overlaps();

    let mqtt = MqttSettings {
        host: config.mqtt_host.clone(),
        port: config.mqtt_port,
        username: config.mqtt_username.clone(),
        password: config.mqtt_password.clone(),
    };

    // Sensor stream cells: one writer task each, read by the update loop.
    let pm25 = Arc::new(SensorCell::new());
    let lightning = Arc::new(SensorCell::new());

    tracing::info!("Starting MQTT listeners...");
    let pm25_task =
        spawn_particulate_listener(mqtt.clone(), config.pm25_topic.clone(), pm25.clone());
    let lightning_task =
        spawn_lightning_listener(mqtt.clone(), config.lightning_topic.clone(), lightning.clone());

    // External collaborators
    let outdoor = EcowittSource::new(
        &config.ecowitt_application_key,
        &config.ecowitt_api_key,
        &config.ecowitt_mac,
    );
    let condition = OpenMeteoSource::new(
        config.latitude,
        config.longitude,
        config.condition_map.clone(),
    );
    let indoor = MqttIndoorSampler::new(
        mqtt.clone(),
        &config.co2_topic,
        Duration::from_millis(config.co2_wait_ms),
    );
    let awtrix = AwtrixClient::new(
        mqtt.clone(),
        &config.device_uid,
        Duration::from_millis(config.display_handoff_ms),
    );
    let notifier = AwtrixClient::new(
        mqtt,
        &config.device_uid,
        Duration::from_millis(config.display_handoff_ms),
    );

    let mut engine = FusionEngine::new(
        outdoor,
        condition,
        indoor,
        awtrix,
        notifier,
        pm25,
        lightning,
        config.icons.clone(),
        EngineConfig {
            interval: Duration::from_secs(config.update_interval_secs),
            ..Default::default()
        },
    );

    print_system_status(&config);

    tracing::info!(
        "Pixelvane is now publishing to {} every {}s...",
        config.device_uid,
        config.update_interval_secs
    );
    tracing::info!("Press Ctrl+C to stop");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
        _ = engine.run() => {
            tracing::warn!("Update loop ended unexpectedly");
        }
        _ = pm25_task => {
            tracing::warn!("Particulate listener ended unexpectedly");
        }
        _ = lightning_task => {
            tracing::warn!("Lightning listener ended unexpectedly");
        }
    }

    tracing::info!("Pixelvane shutdown complete");

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,pixelvane=debug,pixelvane_telemetry=debug,pixelvane_fusion=debug")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

fn print_system_status(config: &AppConfig) {
    use sysinfo::System;

    let mut sys = System::new_all();
    sys.refresh_all();

    tracing::info!("╭─────────────── System Status ───────────────╮");
    tracing::info!("│ Hostname: {:>32} │", System::host_name().unwrap_or_default());
    tracing::info!("│ OS: {:>38} │", System::name().unwrap_or_default());
    tracing::info!(
        "│ Memory: {:>26} MB / {} MB │",
        sys.used_memory() / 1024 / 1024,
        sys.total_memory() / 1024 / 1024
    );
    tracing::info!("├──────────────── Configuration ────────────────┤");
    tracing::info!("│ Broker: {:>32}:{} │", config.mqtt_host, config.mqtt_port);
    tracing::info!("│ Display: {:>33} │", config.device_uid);
    tracing::info!("│ Update Interval: {:>22} s │", config.update_interval_secs);
    tracing::info!("│ CO₂ Wait: {:>28} ms │", config.co2_wait_ms);
    tracing::info!("╰──────────────────────────────────────────────╯");
}
