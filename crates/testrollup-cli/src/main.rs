//! testrollup CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "testrollup",
    version,
    about = "Aggregate test sessions across multiple DUT configurations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate sessions and write reports
    Run {
        /// Path to the input JSON file containing test sessions
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Directory where reports will be written (default: out)
        #[arg(long, short = 'o')]
        out_dir: Option<PathBuf>,

        /// Output formats: json, csv, html, sqlite, all (comma-separated)
        #[arg(long)]
        format: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check an input file and report coercion warnings
    Validate {
        /// Path to the input JSON file containing test sessions
        #[arg(long, short = 'i')]
        input: PathBuf,
    },

    /// Create starter config and example input
    Init,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("testrollup=info,testrollup_core=info,testrollup_report=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            out_dir,
            format,
            config,
        } => commands::run::execute(input, out_dir, format, config),
        Commands::Validate { input } => commands::validate::execute(input),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
