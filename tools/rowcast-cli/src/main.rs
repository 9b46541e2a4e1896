//! Rowcast CLI — Convert dataset episodes into timeline recordings.
//!
//! Usage:
//!   rowcast log <DATASET>        Convert an episode into a recording
//!   rowcast info <DATASET>       Show dataset columns and episodes
//!   rowcast inspect <RECORDING>  Summarize a recording file
//!   rowcast check                Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rowcast_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "rowcast",
    about = "Turn tabular robotics datasets into timeline visualizations",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a dataset episode into a recording file
    Log {
        /// Dataset directory or .jsonl file
        dataset: PathBuf,

        /// Episode to convert (all rows when omitted)
        #[arg(short, long)]
        episode: Option<i64>,

        /// Column holding the episode index
        #[arg(long)]
        episode_column: Option<String>,

        /// Output recording path (defaults to the cache directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Convert even if the recording already exists
        #[arg(long)]
        force: bool,

        /// Application id written into the recording header
        #[arg(long)]
        application_id: Option<String>,
    },

    /// Show dataset information
    Info {
        /// Dataset directory or .jsonl file
        dataset: PathBuf,

        /// Column holding the episode index
        #[arg(long)]
        episode_column: Option<String>,
    },

    /// Summarize a recording file
    Inspect {
        /// Path to the recording
        recording: PathBuf,
    },

    /// Check system capabilities
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load();

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    rowcast_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Log {
            dataset,
            episode,
            episode_column,
            output,
            force,
            application_id,
        } => {
            if let Some(column) = episode_column {
                config.conversion.episode_column = column;
            }
            if let Some(id) = application_id {
                config.conversion.application_id = id;
            }
            commands::log::run(&config, dataset, episode, output, force)
        }
        Commands::Info {
            dataset,
            episode_column,
        } => {
            let column = episode_column.unwrap_or(config.conversion.episode_column);
            commands::info::run(dataset, &column)
        }
        Commands::Inspect { recording } => commands::inspect::run(recording),
        Commands::Check => commands::check::run(&config),
    }
}
