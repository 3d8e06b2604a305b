//! Binary entry point for the bridge.
//!
//! Responsibilities:
//! 1. Parse command-line flags and merge them over the config file.
//! 2. Initialise `tracing` logging.
//! 3. Discover and open the serial port, then run the bridge session on a
//!    blocking thread.
//! 4. Translate Ctrl-C into the shared cancellation flag the session polls.
//!
//! The bridge loop itself is synchronous; tokio is only used for the Ctrl-C
//! signal future and the blocking-thread handoff.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hidbridge::application::bridge::{BridgeSession, StopReason};
use hidbridge::application::dispatch::CommandDispatcher;
use hidbridge::infrastructure::config::{self, BridgeConfig};
use hidbridge::infrastructure::discovery;
use hidbridge::infrastructure::injection::EnigoInjector;
use hidbridge::infrastructure::serial::{list_ports, SerialLineTransport};

/// Boards re-enumerate over USB when the port opens; commands sent during
/// that window are lost, so the bridge waits before reading.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Read timeout per poll tick; also bounds Ctrl-C latency.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Bridges micro:bit serial HID commands to host keyboard and mouse input.
#[derive(Debug, Parser)]
#[command(name = "hidbridge", version, about)]
struct Cli {
    /// Serial port to use (e.g. /dev/ttyACM0 or COM4); discovered
    /// automatically when omitted.
    #[arg(long, env = "HIDBRIDGE_PORT")]
    port: Option<String>,

    /// Baud rate for the bridge session.
    #[arg(long, env = "HIDBRIDGE_BAUD")]
    baud: Option<u32>,

    /// Force debug-level logging.
    #[arg(long)]
    debug: bool,

    /// List the serial ports the OS knows about, then exit.
    #[arg(long)]
    list_ports: bool,

    /// Config file path; defaults to the platform config directory.
    #[arg(long, env = "HIDBRIDGE_CONFIG")]
    config: Option<PathBuf>,
}

/// Effective settings after merging CLI flags over the config file.
#[derive(Debug, PartialEq)]
struct Settings {
    port: Option<String>,
    baud: u32,
    log_level: String,
}

/// CLI flags win over config values; `--debug` wins over both for the log
/// level.
fn merge_settings(cli: &Cli, cfg: BridgeConfig) -> Settings {
    Settings {
        port: cli.port.clone().or(cfg.port),
        baud: cli.baud.unwrap_or(cfg.baud),
        log_level: if cli.debug {
            "debug".to_string()
        } else {
            cfg.log_level
        },
    }
}

fn load_configuration(cli: &Cli) -> anyhow::Result<BridgeConfig> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => match config::config_file_path() {
            Ok(path) => path,
            // No resolvable config dir (stripped container): run on defaults.
            Err(_) => return Ok(BridgeConfig::default()),
        },
    };
    config::load_config(&path).with_context(|| format!("loading config from {}", path.display()))
}

fn init_tracing(level: &str) {
    // RUST_LOG still wins when set, matching the usual tracing convention.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = merge_settings(&cli, load_configuration(&cli)?);
    init_tracing(&settings.log_level);

    if cli.list_ports {
        return print_ports();
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl-c received, shutting down");
                running.store(false, Ordering::SeqCst);
            }
        });
    }

    let reason = tokio::task::spawn_blocking(move || run_bridge(&settings, running))
        .await
        .context("bridge thread panicked")??;

    match reason {
        StopReason::Cancelled => info!("bridge stopped cleanly"),
        StopReason::Disconnected => warn!("bridge stopped: device disconnected"),
        StopReason::ReadError(e) => error!(error = %e, "bridge stopped on read failure"),
    }
    Ok(())
}

/// Discovers, opens, settles, and runs one bridge session to completion.
fn run_bridge(settings: &Settings, running: Arc<AtomicBool>) -> anyhow::Result<StopReason> {
    let port = discovery::find_port(settings.port.as_deref())?;
    info!(port = %port, baud = settings.baud, "connecting");

    let transport = SerialLineTransport::open(&port, settings.baud, READ_TIMEOUT)?;
    info!(delay_secs = SETTLE_DELAY.as_secs(), "waiting for device to settle");
    std::thread::sleep(SETTLE_DELAY);

    let injector = EnigoInjector::new().context("starting input injection backend")?;
    let dispatcher = CommandDispatcher::new(Box::new(injector));
    let mut session = BridgeSession::new(Box::new(transport), dispatcher, running);
    Ok(session.run())
}

fn print_ports() -> anyhow::Result<()> {
    let ports = list_ports().context("failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("no serial ports found");
        return Ok(());
    }
    println!("{:<24} {:<10} DESCRIPTION", "DEVICE", "USB ID");
    for port in ports {
        let usb = port
            .usb_id
            .map(|(vid, pid)| format!("{vid:04x}:{pid:04x}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:<10} {}",
            port.device,
            usb,
            port.description.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
