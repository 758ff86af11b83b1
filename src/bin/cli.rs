// CLI binary — panicking on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use simplelog::{Config as LogConfig, TermLogger, TerminalMode};

use dmxcue::clip::Clip;
use dmxcue::config::{EngineConfig, Protocol};
use dmxcue::model::color::{self, ColorStrategy};
use dmxcue::{Engine, EngineError};

#[path = "../../demos/basic_show.rs"]
mod basic_show;

#[derive(Parser)]
#[command(name = "dmxcue", about = "Software DMX512 lighting engine", version)]
struct Cli {
    /// Verbose (debug-level) logging.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play the built-in demo show and exit when it completes.
    Demo {
        /// Output protocol.
        #[arg(long, default_value = "sacn")]
        protocol: String,
        /// Frames per second.
        #[arg(long, default_value_t = 40.0)]
        fps: f64,
        /// Art-Net unicast/broadcast target (ignored for sACN).
        #[arg(long, default_value = "255.255.255.255")]
        artnet_target: String,
        /// RGB-to-RGBW/RGBA/RGBAW conversion strategy.
        #[arg(long, default_value = "balanced")]
        color_strategy: String,
    },
    /// Render a single frame of the demo show at time `t` and print the
    /// resulting per-universe DMX bytes, without touching a transport.
    Preview {
        /// Time in seconds since show start.
        #[arg(long, default_value_t = 0.0)]
        t: f64,
    },
}

fn main() -> Result<(), EngineError> {
    let args = Cli::parse();
    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let _ = TermLogger::init(level, LogConfig::default(), TerminalMode::Mixed, simplelog::ColorChoice::Auto);

    match args.command {
        Command::Demo { protocol, fps, artnet_target, color_strategy } => {
            run_demo(&protocol, fps, &artnet_target, &color_strategy)
        }
        Command::Preview { t } => run_preview(t),
    }
}

fn run_demo(protocol: &str, fps: f64, artnet_target: &str, color_strategy: &str) -> Result<(), EngineError> {
    let strategy = ColorStrategy::parse(color_strategy)
        .ok_or_else(|| EngineError::configuration(format!("unsupported color strategy: {color_strategy}")))?;
    color::set_color_strategy(strategy);

    let (rig, timeline) = basic_show::build()?;
    let config = EngineConfig { protocol: Protocol::parse(protocol)?, fps, universe_ips: HashMap::new(), artnet_target: artnet_target.to_string() };

    let mut engine = Engine::new(&config);
    engine.set_rig(rig);

    let clip: Arc<dyn Clip> = Arc::new(timeline);
    info!("playing demo show");
    engine.play_sync(clip, 0.0)
}

fn run_preview(t: f64) -> Result<(), EngineError> {
    let (rig, timeline) = basic_show::build()?;
    let mut engine = Engine::new(&EngineConfig::default());
    engine.set_rig(rig);

    let universes = engine.render_frame(&timeline, t)?;
    let mut universe_ids: Vec<_> = universes.keys().copied().collect();
    universe_ids.sort_unstable();
    for universe in universe_ids {
        let mut channels: Vec<_> = universes[&universe].iter().collect();
        channels.sort_unstable_by_key(|(ch, _)| **ch);
        println!("universe {universe}: {channels:?}");
    }
    Ok(())
}
