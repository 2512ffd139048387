// beacon - command-line front end for cryptobeacon
//
// Decodes single advertisements, renders frames as advertisement text, and
// replays recorded captures through a controller on the simulated radio.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cryptobeacon::broadcast::BroadcastParser;
use cryptobeacon::capture::load_capture;
use cryptobeacon::codec::{decode_hex_pairs, render_advertisement, AdvertDecoder, PassthroughCipher};
use cryptobeacon::config::FRAME_LEN;
use cryptobeacon::link::run_session;
use cryptobeacon::notify::drain;
use cryptobeacon::transport::{RadioPower, SimulatedRadio, TransportEvent};
use cryptobeacon::{AdvertFormat, BeaconConfig, BeaconController};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Encrypted status beacon decoder", long_about = None)]
#[command(version)]
struct Cli {
    /// Log filter (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one advertisement text
    Decode { advertisement: String },
    /// Render a 25-byte hex frame as advertisement text
    Synth { frame: String },
    /// Replay a capture file and print every notification
    Replay {
        capture: PathBuf,
        #[arg(long, default_value = "20")]
        stability_threshold: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Decode { advertisement } => cmd_decode(&advertisement),
        Commands::Synth { frame } => cmd_synth(&frame),
        Commands::Replay {
            capture,
            stability_threshold,
        } => cmd_replay(capture, stability_threshold).await,
    }
}

fn cmd_decode(advertisement: &str) -> Result<()> {
    let decoder = AdvertDecoder::new(AdvertFormat::default());
    let frame = decoder
        .decode(advertisement, &PassthroughCipher)
        .context("Advertisement rejected")?;

    println!("frame:     {:?}", frame);
    println!("broadcast: {:#?}", BroadcastParser::parse(&frame));
    Ok(())
}

fn cmd_synth(frame: &str) -> Result<()> {
    let bytes = decode_hex_pairs(frame, FRAME_LEN * 2).context("Invalid frame hex")?;
    let Ok(bytes) = <[u8; FRAME_LEN]>::try_from(bytes.as_slice()) else {
        bail!("Frame must be {} bytes, got {}", FRAME_LEN, bytes.len());
    };

    println!("{}", render_advertisement(&bytes, &AdvertFormat::default()));
    Ok(())
}

async fn cmd_replay(capture: PathBuf, stability_threshold: u32) -> Result<()> {
    let records = load_capture(&capture)
        .with_context(|| format!("Failed to load capture {}", capture.display()))?;

    let config = BeaconConfig::default().with_stability_threshold(stability_threshold);
    config.validate()?;

    let (mut controller, mut notifications) =
        BeaconController::new(SimulatedRadio::new(), PassthroughCipher, config);
    controller.handle_event(TransportEvent::PowerChanged(RadioPower::On));
    controller.start_scan();

    let (event_tx, event_rx) = mpsc::channel(records.len().max(1));
    let (intent_tx, intent_rx) = mpsc::channel(1);
    drop(intent_tx);

    for record in records {
        event_tx.send(record.into_event()).await?;
    }
    drop(event_tx);

    let controller = run_session(controller, event_rx, intent_rx).await;

    for notification in drain(&mut notifications) {
        println!("{}", notification);
    }
    match controller.active_peer() {
        Some(peer) => println!(
            "active peer: {} ({} dBm, {} messages, trusted: {})",
            peer.identity(),
            peer.signal_strength(),
            peer.message_count(),
            peer.is_trusted()
        ),
        None => println!("active peer: none"),
    }
    Ok(())
}
