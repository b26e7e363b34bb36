//! HandPlay gesture engine CLI
//!
//! Runs the gesture engine against a synthetic demo hand, a recorded stream,
//! or (with the `server` feature) frames posted over HTTP.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use handplay_gesture_engine::{
    config::{Config, HandFilter},
    core::{GestureEngine, GestureNotification},
    source::{FrameSource, HandIdentity, Handedness, ReplaySource, SyntheticConfig, SyntheticSource},
    stats::{create_shared_stats, SharedSessionStats},
    GESTURE_GUIDE, VERSION,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "handplay")]
#[command(version = VERSION)]
#[command(about = "Hand gesture recognition for toddler play", long_about = None)]
struct Cli {
    /// Log classifier decisions (debug level)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine against the synthetic demo hand
    Run {
        /// Hands to generate (left, right, or all)
        #[arg(long, default_value = "right")]
        hands: String,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Replay a recorded JSON Lines stream of hand frames
    Replay {
        /// Recording to replay
        #[arg(long, short)]
        input: PathBuf,

        /// Honour the recorded frame timing
        #[arg(long)]
        realtime: bool,
    },

    /// Accept frames over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Port to bind on localhost
        #[arg(long, default_value = "8787")]
        port: u16,
    },

    /// Show the supported gestures
    Gestures,

    /// Show configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { hands, duration } => cmd_run(&hands, duration),
        Commands::Replay { input, realtime } => cmd_replay(&input, realtime),
        #[cfg(feature = "server")]
        Commands::Serve { port } => cmd_serve(port),
        Commands::Gestures => {
            println!("{GESTURE_GUIDE}");
            Ok(())
        }
        Commands::Config => cmd_config(),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn cmd_run(hands: &str, duration: Option<u64>) -> anyhow::Result<()> {
    println!("HandPlay Gesture Engine v{VERSION}");
    println!();

    let mut config = Config::load().unwrap_or_default();
    config.hands = HandFilter::from_csv(hands);
    if !config.hands.any_enabled() {
        bail!("at least one hand must be enabled (left or right)");
    }

    let identities = synthetic_hands(&config);
    println!("Starting synthetic hand...");
    for hand in &identities {
        println!("  Hand: {hand}");
    }
    println!("  Frame rate: {} fps", config.frame_rate);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let mut source = SyntheticSource::new(SyntheticConfig {
        hands: identities,
        frame_rate: config.frame_rate,
    });
    source.start()?;

    let deadline = duration.map(|secs| Instant::now() + Duration::from_secs(secs));
    let stats = create_shared_stats();
    drive(&mut source, &config, &stats, deadline)?;

    println!();
    println!("{}", stats.summary());
    Ok(())
}

fn cmd_replay(input: &Path, realtime: bool) -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    let mut source = ReplaySource::open(input)
        .with_context(|| format!("could not load recording {}", input.display()))?
        .realtime(realtime);
    println!(
        "Replaying {} frames from {}",
        source.frame_count(),
        input.display()
    );
    println!();
    source.start()?;

    let stats = create_shared_stats();
    drive(&mut source, &config, &stats, None)?;

    println!();
    println!("{}", stats.summary());
    Ok(())
}

#[cfg(feature = "server")]
fn cmd_serve(port: u16) -> anyhow::Result<()> {
    use handplay_gesture_engine::server::{run, ServerConfig};

    let config = Config::load().unwrap_or_default();
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async move {
        let (addr, shutdown_tx) = run(ServerConfig::new(port, config.engine)).await?;
        println!("Listening on http://{addr}");
        println!("Press Ctrl+C to stop");

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(());
        Ok::<(), anyhow::Error>(())
    })
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Identities the synthetic source should generate for this config.
fn synthetic_hands(config: &Config) -> Vec<HandIdentity> {
    let mut hands = Vec::new();
    for slot in 0..config.max_hands.max(1) {
        for handedness in [Handedness::Left, Handedness::Right] {
            if config.hands.allows(handedness) {
                hands.push(HandIdentity::new(handedness, slot));
            }
        }
    }
    hands
}

/// Feed frames from a source through a fresh engine until the source ends,
/// the deadline passes, or Ctrl+C is pressed.
fn drive(
    source: &mut dyn FrameSource,
    config: &Config,
    stats: &SharedSessionStats,
    deadline: Option<Instant>,
) -> anyhow::Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("could not set Ctrl+C handler")?;

    let mut engine = GestureEngine::new(config.engine.clone()).with_stats(stats.clone());
    tracing::info!(hands = ?config.hands, "engine started");

    let receiver = source.receiver().clone();

    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(frame) => {
                if !config.accepts(&frame.hand) {
                    continue;
                }
                // Rejected frames are logged and counted by the engine.
                if let Ok(notifications) = engine.process_frame(&frame) {
                    for notification in &notifications {
                        print_notification(notification);
                    }
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    println!();
    println!("Stopping...");
    source.stop();
    engine.reset_all();

    Ok(())
}

fn print_notification(notification: &GestureNotification) {
    let gesture = &notification.gesture;
    let mut line = format!(
        "[{}] {:<8} {:<6}",
        notification.timestamp.format("%H:%M:%S%.3f"),
        notification.hand,
        gesture.kind
    );
    if let Some(direction) = gesture.direction {
        line.push_str(&format!(" {direction}"));
    }
    if let Some(strength) = gesture.strength {
        line.push_str(&format!(" strength={strength:.2}"));
    }
    if let Some(speed) = gesture.speed {
        line.push_str(&format!(" speed={speed:.2}"));
    }
    if let Some(held) = gesture.duration_ms {
        line.push_str(&format!(" held={held}ms"));
    }
    println!("{line}");
}
