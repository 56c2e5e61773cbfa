//! Button bridge binary.
//!
//! Connects to the remote button server and relays the three buttons of a
//! simulated GPIO bank. Typing `1`, `2` or `3` on stdin toggles that
//! button's line, standing in for an external events generator.

use std::io::BufRead;
use std::path::PathBuf;

use clap::Parser;

use button_bridge::config::{load_config, BridgeConfig};
use button_bridge::gpio::{PinLine, SimulatedGpio};
use button_bridge::lifecycle::{signals, Application};
use button_bridge::observability::{logging, metrics};
use button_bridge::wire::ButtonId;

#[derive(Parser)]
#[command(name = "button-bridge")]
#[command(about = "Relay three GPIO buttons to a remote button server", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remote host (falls back to the configured or default address)
    #[arg(short, long)]
    address: Option<String>,

    /// Remote port (invalid values fall back to the default)
    #[arg(short, long)]
    port: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init(level);

    tracing::info!("button-bridge v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let gpio = SimulatedGpio::new();
    let app = Application::new(
        gpio.clone(),
        &config,
        cli.address.as_deref(),
        cli.port.as_deref(),
    )?;

    app.on_start().await?;

    let buttons = app.bridge().buttons().to_vec();
    std::thread::spawn(move || drive_from_stdin(gpio, buttons));

    tokio::select! {
        _ = app.bridge().wait_for_stopped() => {
            tracing::info!("Remote button server disconnected");
        }
        _ = signals::shutdown_signal() => {}
    }

    let state = app.on_stop().await;
    tracing::info!(state = ?state, "Shutdown complete");
    Ok(())
}

/// Toggle button lines from stdin, one button number per line.
///
/// Runs on its own thread, the way a GPIO driver delivers edges.
fn drive_from_stdin(gpio: SimulatedGpio, buttons: Vec<(ButtonId, PinLine)>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stdin");
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let button = input
            .parse::<u8>()
            .ok()
            .and_then(|n| ButtonId::try_from(n).ok());
        match button.and_then(|b| buttons.iter().find(|(id, _)| *id == b)) {
            Some((_, pin_line)) => {
                gpio.toggle(*pin_line);
            }
            None => tracing::warn!(input = %input, "Unknown button, expected 1, 2 or 3"),
        }
    }
}
