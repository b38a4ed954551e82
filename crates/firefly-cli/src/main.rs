//! Firefly CLI - Headless driver for the firefly scene engines

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, simulate, tree};

#[derive(Parser)]
#[command(name = "firefly")]
#[command(about = "Run and inspect the firefly scene without a renderer", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scene for a number of frames and report statistics
    Simulate {
        /// Scene config (TOML); defaults apply when omitted
        #[arg(long)]
        config: Option<String>,

        /// Layout snapshot (TOML); a built-in demo page when omitted
        #[arg(long)]
        layout: Option<String>,

        /// Number of frames to run
        #[arg(long, default_value = "600")]
        frames: u32,

        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,

        /// RNG seed (overrides the config's)
        #[arg(long)]
        seed: Option<u64>,

        /// Hold the pointer at a screen position (comma-separated x,y)
        #[arg(long, value_parser = parse_vec2)]
        pointer: Option<[f32; 2]>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Generate a tree and describe it
    Tree {
        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Recursion depth
        #[arg(long)]
        depth: Option<u32>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print the default scene config as TOML
    Config {
        /// Print the demo layout snapshot instead
        #[arg(long)]
        layout: bool,
    },
}

fn parse_vec2(s: &str) -> Result<[f32; 2], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("expected 2 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    Ok([x, y])
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Simulate {
            config,
            layout,
            frames,
            dt,
            seed,
            pointer,
            format,
        } => simulate::run(simulate::SimulateArgs {
            config,
            layout,
            frames,
            dt,
            seed,
            pointer,
            format,
        }),
        Commands::Tree { seed, depth, format } => tree::run(seed, depth, &format),
        Commands::Config { layout } => config::run(layout),
    }
}
