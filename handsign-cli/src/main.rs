mod backends;
mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::CliConfig;
use handsign_core::Move;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "handsign")]
#[command(about = "Rock-paper-scissors against the computer, by hand sign or keyboard")]
#[command(version)]
struct Cli {
    /// Data directory for settings
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw five lottery number sets
    Numbers,
    /// Switch between the light and dark theme
    Theme,
    /// Play a round with a chosen move, or interactively without one
    Play {
        /// rock, paper or scissors
        #[arg(value_parser = parse_move)]
        user_move: Option<Move>,
    },
    /// Classify an image and play the detected gesture
    Classify {
        /// Replay model script
        #[arg(short, long)]
        script: PathBuf,
        /// Image file to classify
        image: PathBuf,
    },
    /// Play a timed match against the synthetic camera
    Match {
        /// Replay model script
        #[arg(short, long)]
        script: PathBuf,
        /// Number of rounds
        #[arg(short, long)]
        rounds: Option<u32>,
    },
}

fn parse_move(s: &str) -> Result<Move, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "handsign={},handsign_core={},handsign_lottery={}",
            log_level, log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = cli.data_dir.unwrap_or_else(CliConfig::default_data_dir);
    tokio::fs::create_dir_all(&data_dir).await?;

    let mut config = match CliConfig::load(&data_dir).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Numbers => commands::show_numbers(&config),
        Commands::Theme => commands::toggle_theme(&data_dir, &mut config).await,
        Commands::Play { user_move } => commands::play(&config, user_move).await,
        Commands::Classify { script, image } => {
            commands::classify(&config, &script, &image).await
        }
        Commands::Match { script, rounds } => {
            commands::run_match(&config, &script, rounds).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
