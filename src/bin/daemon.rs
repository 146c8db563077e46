// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! fancurve-daemon: system service that owns the active fan curve and the
//! named curve store, tracks the current temperature, and accepts commands
//! from TUI clients over a Unix domain socket.

use clap::Parser;
use fan_curve_utility::config::{self, Config};
use fan_curve_utility::protocol::{self, Request, Response};
use fan_curve_utility::service::ServiceState;
use fan_curve_utility::thermal;
use signal_hook::consts::SIGHUP;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{Mutex, Notify};
use tokio::time::{self, Instant};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "fancurve-daemon", about = "Fan curve evaluation daemon")]
struct Cli {
    /// Path to the configuration file [default: /etc/fancurve/config.toml]
    #[arg(short, long)]
    config: Option<String>,

    /// Override the socket path.
    #[arg(short, long)]
    socket: Option<String>,
}

type SharedState = Arc<Mutex<ServiceState>>;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = config::resolve_config_path(cli.config.as_deref());
    let cfg = config::load_config(&config_path).unwrap_or_else(|e| {
        log::warn!("Could not load config: {e}, using defaults");
        Config::default()
    });

    let socket_path = cli
        .socket
        .clone()
        .unwrap_or_else(|| cfg.daemon.socket_path.clone());

    log::info!(
        "Active curve: {} point(s), {} mode; {} named curve(s)",
        cfg.session.points.len(),
        cfg.session.interpolation_mode,
        cfg.curves.len()
    );

    log_thermal_zones(&cfg.daemon.thermal_zone);

    let state: SharedState = Arc::new(Mutex::new(ServiceState::new(cfg, config_path)));

    // SIGHUP reloads the config on the next poll tick
    let reload_requested = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGHUP, reload_requested.clone())?;

    // Clean up old socket file
    let _ = std::fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)?;

    // Make socket accessible to non-root users
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o666);
        std::fs::set_permissions(&socket_path, perms)?;
    }

    log::info!("Listening on {socket_path}");

    let shutdown = Arc::new(Notify::new());
    let shutdown_signal = shutdown.clone();

    // Signal handler
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        log::info!("Received shutdown signal");
        shutdown_signal.notify_waiters();
    });

    // Temperature poll loop
    let state_for_poll = state.clone();
    let shutdown_for_poll = shutdown.clone();
    tokio::spawn(async move {
        let mut period = state_for_poll.lock().await.poll_interval();
        let mut interval = time::interval(period);
        let mut last_error: Option<String> = None;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let mut st = state_for_poll.lock().await;
                    if reload_requested.swap(false, Ordering::Relaxed) {
                        match st.reload() {
                            Ok(()) => log::info!("Config reloaded on SIGHUP"),
                            Err(e) => log::error!("Failed to reload config on SIGHUP: {e}"),
                        }
                    }
                    poll_temperature(&mut st, &mut last_error);

                    // Reloads (SIGHUP or reload_config) may change the period
                    let configured = st.poll_interval();
                    if configured != period {
                        log::info!("Poll interval changed to {} ms", configured.as_millis());
                        period = configured;
                        interval = time::interval_at(Instant::now() + period, period);
                    }
                }
                _ = shutdown_for_poll.notified() => {
                    break;
                }
            }
        }
    });

    // Accept client connections
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _addr)) => {
                        let state_clone = state.clone();
                        tokio::spawn(handle_client(stream, state_clone));
                    }
                    Err(e) => {
                        log::error!("Failed to accept connection: {e}");
                    }
                }
            }
            _ = shutdown.notified() => {
                log::info!("Daemon shutting down");
                break;
            }
        }
    }

    // Cleanup socket
    let _ = std::fs::remove_file(&socket_path);
    Ok(())
}

// ---------------------------------------------------------------------------
// Client connection handler
// ---------------------------------------------------------------------------

async fn handle_client(stream: UnixStream, state: SharedState) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let response = match protocol::decode::<Request>(&line) {
            Ok(req) => {
                log::debug!("Request: {req:?}");
                state.lock().await.handle(req)
            }
            Err(e) => Response::Error {
                message: format!("Invalid request: {e}"),
            },
        };

        let encoded = match protocol::encode(&response) {
            Ok(s) => s,
            Err(e) => {
                log::error!("Failed to encode response: {e}");
                continue;
            }
        };

        if writer.write_all(encoded.as_bytes()).await.is_err() {
            break; // Client disconnected
        }
    }
}

// ---------------------------------------------------------------------------
// Poll loop
// ---------------------------------------------------------------------------

/// List the thermal zones on this machine when the configured one is missing.
fn log_thermal_zones(configured: &str) {
    if Path::new(configured).exists() {
        log::debug!("Reading temperature from {configured}");
        return;
    }
    log::warn!("Thermal zone {configured} does not exist");
    match thermal::discover_zones() {
        Ok(zones) if zones.is_empty() => log::warn!("No thermal zones found"),
        Ok(zones) => {
            for zone in &zones {
                let kind = zone.kind.as_deref().unwrap_or("unknown");
                match thermal::read_zone_temp(zone) {
                    Ok(temp) => log::info!(
                        "Available: {} ({kind}) at {}: {temp:.1}°C",
                        zone.id,
                        zone.input_path.display()
                    ),
                    Err(e) => log::info!(
                        "Available: {} ({kind}) at {}: unreadable ({e})",
                        zone.id,
                        zone.input_path.display()
                    ),
                }
            }
        }
        Err(e) => log::warn!("Could not scan thermal zones: {e}"),
    }
}

/// Take one reading. Repeated identical errors are logged once.
fn poll_temperature(st: &mut ServiceState, last_error: &mut Option<String>) {
    match st.poll() {
        Ok(reading) => {
            if last_error.take().is_some() {
                log::info!("Temperature readings resumed at {:.1}°C", reading.temperature);
            }
        }
        Err(e) => {
            let message = e.to_string();
            if last_error.as_deref() != Some(message.as_str()) {
                log::warn!("Failed to read temperature: {message}");
                *last_error = Some(message);
            }
        }
    }
}
