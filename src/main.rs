//! Axe Link - console host for the Axe-Fx device link
//!
//! Opens the configured MIDI ports, polls the link on a fixed interval and
//! accepts commands from an interactive console.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use axe_link::config::AppConfig;
use axe_link::link::{AxeLink, Clock};
use axe_link::transport::{MidirTransport, Transport};
use axe_link::VendorEvent;
use crate::cli::Command;

/// Axe Link - talk to a Fractal Audio Axe-Fx over MIDI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "axe-link.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Input port pattern (overrides config)
    #[arg(long)]
    input: Option<String>,

    /// Output port pattern (overrides config)
    #[arg(long)]
    output: Option<String>,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting Axe Link...");

    if args.list_ports {
        print_ports()?;
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&args.config).await?;
    if let Some(input) = args.input {
        config.midi.input_port = input;
    }
    if let Some(output) = args.output {
        config.midi.output_port = output;
    }
    config.validate()?;

    let transport = MidirTransport::connect(&config.midi.input_port, &config.midi.output_port)
        .context("Failed to open MIDI ports")?;
    info!(
        "Using ports in: '{}', out: '{}'",
        transport.input_port_name(),
        transport.output_port_name()
    );

    let mut link = AxeLink::with_system_clock(transport);
    link.set_model(config.device.model);
    link.set_channel(config.device.channel)?;
    register_handlers(&mut link);

    // Kick off connection detection right away
    link.send_loopback_and_version_check();

    let (command_tx, mut command_rx) = mpsc::channel::<Command>(32);
    // Plain thread: a pending readline must not hold up runtime shutdown
    std::thread::spawn(move || {
        if let Err(e) = cli::run_repl(command_tx) {
            warn!("Console stopped: {}", e);
        }
    });
    println!("Type 'help' for commands");

    let mut ticker = tokio::time::interval(Duration::from_millis(config.poll_interval_ms));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                link.poll();
            }
            command = command_rx.recv() => {
                match command {
                    Some(Command::Quit) | None => break,
                    Some(command) => apply_command(&mut link, command),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    info!("Axe Link shutdown complete");
    Ok(())
}

fn register_handlers<T: Transport, C: Clock>(link: &mut AxeLink<T, C>) {
    link.on_connected(|| println!("{}", "Axe-Fx connected".green().bold()));
    link.on_disconnected(|| println!("{}", "Axe-Fx disconnected".red().bold()));
    link.on_warning(|warning| println!("{} {}", "#WARNING#".yellow().bold(), warning));

    link.on_vendor_sysex(|event, _raw| match event {
        // Realtime traffic is too chatty for the console
        VendorEvent::TunerRealtime { .. } | VendorEvent::TempoRealtime => {
            tracing::trace!("{}", event)
        }
        _ => println!("{} {}", "<-".cyan(), event),
    });

    link.on_raw_sysex(|raw| {
        tracing::debug!("Foreign SysEx: {}", axe_link::midi::format_hex(raw));
    });
}

fn apply_command<T: Transport, C: Clock>(link: &mut AxeLink<T, C>, command: Command) {
    match command {
        Command::Preset(preset) => {
            if let Err(e) = link.send_preset_change(preset) {
                println!("{}", e.to_string().red());
            }
        }
        Command::Xy(y_mode) => link.send_toggle_xy(y_mode),
        Command::PresetName => link.request_preset_name(),
        Command::PresetNumber => link.request_preset_number(),
        Command::Bypass => link.request_bypass_states(),
        Command::Looper(enable) => link.request_looper_updates(enable),
        Command::Param { effect_id, param_id, value, query } => {
            link.request_effect_parameter(effect_id, param_id, value, query)
        }
        Command::Firmware => link.send_loopback_and_version_check(),
        Command::Status => println!(
            "connected: {}, tuner: {}, model: {} ({:?}), channel: {}",
            link.is_connected(),
            link.is_tuner_active(),
            link.model(),
            link.profile(),
            link.channel()
        ),
        Command::Help => println!("{}", cli::HELP),
        Command::Quit => {}
    }
}

fn print_ports() -> Result<()> {
    println!("\n=== MIDI Input Ports ===");
    for (i, name) in MidirTransport::list_input_ports()?.iter().enumerate() {
        println!("  {}: {}", i, name);
    }

    println!("\n=== MIDI Output Ports ===");
    for (i, name) in MidirTransport::list_output_ports()?.iter().enumerate() {
        println!("  {}: {}", i, name);
    }
    println!();

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
