//! Nuggets CLI - run, check and simulate Nuggets matches.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Nuggets - a multiplayer gold-hunting game server
#[derive(Parser, Debug)]
#[command(name = "nuggets")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve a match over UDP until all gold is collected
    Serve {
        /// Map file
        #[arg(required = true)]
        map: PathBuf,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// UDP port to listen on (default: any free port)
        #[arg(short, long, default_value = "0")]
        port: u16,

        #[command(flatten)]
        tuning: cli::Tuning,
    },

    /// Check that a map file can host a match
    Validate {
        /// Map file
        #[arg(required = true)]
        map: PathBuf,

        #[command(flatten)]
        tuning: cli::Tuning,
    },

    /// Play a headless match between random-walking bots
    Simulate {
        /// Map file
        #[arg(required = true)]
        map: PathBuf,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of bots (1-26)
        #[arg(short = 'n', long, default_value = "4")]
        players: usize,

        /// Give up after this many keystrokes in total
        #[arg(short, long, default_value = "100000")]
        max_moves: u32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        #[command(flatten)]
        tuning: cli::Tuning,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = cli::init_logging() {
        eprintln!("Warning: {e}");
    }

    let result = match args.command {
        Commands::Serve {
            map,
            seed,
            port,
            tuning,
        } => cli::serve::execute(&map, seed, port, &tuning),

        Commands::Validate { map, tuning } => cli::validate::execute(&map, &tuning),

        Commands::Simulate {
            map,
            seed,
            players,
            max_moves,
            format,
            tuning,
        } => cli::simulate::execute(&map, seed, players, max_moves, format, &tuning),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
