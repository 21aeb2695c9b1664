//! CLI entry point and command dispatch for advisor.

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "advisor")]
#[command(version)]
#[command(about = "Module choice validation for honours advising", long_about = None)]
#[command(
    after_help = "All results are experimental and not to be trusted. Double-check me."
)]
struct Cli {
    /// Suppress per-student narration
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file (defaults to advisor.yaml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one module choice form, or every form in a folder
    Check {
        /// Form file or folder of forms to process
        file_or_folder: PathBuf,

        /// Where to write the summary report
        #[arg(long, value_name = "FILE", default_value = "summary.csv")]
        output: PathBuf,

        /// Print the summary records as JSON instead of narrating
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = advisor::config::Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            file_or_folder,
            output,
            json,
        } => cmd::check::run(&file_or_folder, &config, &output, json, cli.quiet),
    }
}
