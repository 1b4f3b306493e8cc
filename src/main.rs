//! # Gamepad Pilot
//!
//! Fly an AR.Drone with a USB gamepad.
//!
//! Finds the configured gamepad in the kernel input-device registry, polls its
//! joystick node and forwards decoded flight commands to the drone.

use anyhow::Result;
use std::fs::File;
use std::io::BufReader;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use gamepad_pilot::config::{Config, LoggingConfig};
use gamepad_pilot::controller::{EventDecoder, JoystickDevice};
use gamepad_pilot::drone::{dispatch, DroneLink};
use gamepad_pilot::error::PilotError;
use gamepad_pilot::registry::find_handler;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix for daily log files
const LOG_FILE_PREFIX: &str = "gamepad-pilot.log";

/// Log one keepalive failure in this many (the tick is a few tens of ms)
const KEEPALIVE_WARN_EVERY: u64 = 100;

/// Sets up the tracing subscriber.
///
/// `RUST_LOG` overrides the configured level. When a log directory is
/// configured, output goes to a daily rolling file through a non-blocking
/// writer; the returned guard must be held until exit so buffered lines are
/// flushed.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.log_dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logging.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

/// Main entry point for Gamepad Pilot
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging
///    - Scan the input-device registry for the gamepad's joystick handler
///    - Open the joystick node and the drone link
///
/// 2. **Main Loop**
///    - Poll tick: read one event batch, decode it, send resulting commands
///    - Keepalive tick: repeat the current take-off state and last command
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Shutdown** (Ctrl+C or a fatal joystick read error)
///    - Send a hover command
///    - Log totals
///    - Return the read error, if any
///
/// # Errors
///
/// Returns error if:
/// - The configuration cannot be loaded
/// - The gamepad is not listed in the registry
/// - The joystick node cannot be opened or stops being readable
/// - The UDP socket cannot be set up
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;
    let _log_guard = init_logging(&config.logging);

    info!("Gamepad Pilot v{} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Loaded configuration from {}", config_path);

    // Locate the joystick node
    let target = config.gamepad.target();
    let registry = File::open(&config.gamepad.registry_path)?;
    let handler = find_handler(BufReader::new(registry), target)?.ok_or(
        PilotError::DeviceNotFound {
            vendor: target.vendor,
            product: target.product,
        },
    )?;

    let mut device = JoystickDevice::open(config.gamepad.input_dir.join(&handler))?;
    let mut decoder = EventDecoder::new(config.gamepad.layout);
    let mut link = DroneLink::connect(config.drone.socket_addr()?).await?;

    let mut poll = interval(Duration::from_millis(config.gamepad.poll_interval_ms));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut keepalive = interval(Duration::from_millis(config.drone.keepalive_ms));
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Flying with {:?} layout on {} (poll {}ms, keepalive {}ms)",
        config.gamepad.layout,
        device.device_path(),
        config.gamepad.poll_interval_ms,
        config.drone.keepalive_ms
    );
    info!("Press Ctrl+C to exit");

    let mut batch_count: u64 = 0;
    let mut command_count: u64 = 0;
    let mut keepalive_failures: u64 = 0;

    // Main control loop
    let outcome = loop {
        tokio::select! {
            _ = poll.tick() => {
                let events = match device.read_batch() {
                    Ok(events) => events,
                    Err(e) => {
                        error!("Joystick read failed: {}", e);
                        break Err(e);
                    }
                };
                if events.is_empty() {
                    continue;
                }
                batch_count += 1;

                for command in decoder.process_batch(&events) {
                    debug!("Dispatching {:?}", command);
                    if let Err(e) = dispatch(&mut link, &command).await {
                        warn!("Failed to send command: {}", e);
                        continue;
                    }
                    command_count += 1;
                }

                if let Some(button) = decoder.state_mut().take_notification() {
                    info!("Auxiliary button {} pressed", button);
                }
            }

            _ = keepalive.tick() => {
                if let Err(e) = link.keepalive().await {
                    keepalive_failures += 1;
                    if keepalive_failures % KEEPALIVE_WARN_EVERY == 1 {
                        warn!("Keepalive failed ({} so far): {}", keepalive_failures, e);
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break Ok(());
            }
        }
    };

    link.shutdown().await;
    info!(
        "Processed {} event batches, sent {} commands ({} datagrams)",
        batch_count,
        command_count,
        link.packets_sent()
    );

    Ok(outcome?)
}
