//! Keylock - terminal front end for the combination-lock controller.
//!
//! Keys are read from stdin (digits, `*` program-enable, `-` clear,
//! `+` enter by default) and the bolt and buzzer are printed to stdout.
//! Logs go to stderr; set `RUST_LOG` to change the level.
//!
//! When stdin is a terminal it is put into raw mode, so each keystroke is
//! handled as it is typed and nothing is echoed. Ctrl-C or Ctrl-D stops the
//! lock; an unlock in progress still runs to completion first.

mod terminal;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use keylock_core::LockConfig;
use keylock_emulator::{LockController, run_lock_until};
use keylock_hardware::KeypadDevice;
use keylock_hardware::console::{ConsoleActuator, ConsoleKeypad, TerminalWriter};
use keylock_hardware::devices::{AnyActuatorDevice, AnyKeypadDevice};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::terminal::RawModeGuard;

#[derive(Debug, Parser)]
#[command(name = "keylock", version, about = "Keypad combination-lock controller")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the tick period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let raw_mode = RawModeGuard::enable();
    let raw = raw_mode.as_ref().is_ok_and(RawModeGuard::is_active);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(move || TerminalWriter::new(std::io::stderr(), raw)),
        )
        .init();

    if let Err(e) = &raw_mode {
        warn!("Terminal stays in line mode: {}", e);
    }

    let result = run(args, raw).await;

    // Restore the terminal before the error is printed
    drop(raw_mode);
    result
}

async fn run(args: Args, raw: bool) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => LockConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => LockConfig::default(),
    };
    if let Some(tick_ms) = args.tick_ms {
        config.tick_period_ms = tick_ms;
    }

    let tick_period = Duration::from_millis(config.tick_period_ms);
    let keys = config.keys;
    let mut controller = LockController::new(config).context("Invalid configuration")?;

    let mut keypad = AnyKeypadDevice::Console(ConsoleKeypad::stdin(keys));
    let mut actuator = AnyActuatorDevice::Console(ConsoleActuator::stdout(raw));

    let keypad_info = keypad.get_info().await?;
    info!(
        "Keylock v{} started on {} ({}, program-enable '{}', clear '{}', enter '{}')",
        keylock_core::VERSION,
        keypad_info.name,
        keypad_info.model,
        keys.program_enable,
        keys.clear,
        keys.enter
    );

    run_lock_until(
        &mut controller,
        &mut keypad,
        &mut actuator,
        tick_period,
        shutdown_signal(),
    )
    .await
    .context("Lock stopped with an error")?;

    info!(
        "Shutting down after {} unlocks in state {}",
        controller.unlock_count(),
        controller.state_kind()
    );

    Ok(())
}

/// Completes on SIGINT; never completes if the handler cannot be installed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
