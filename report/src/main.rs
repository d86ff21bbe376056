mod cli;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "report", version, about = "Aggregate replayed planning sessions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sum every `<DIR>/*/summary.json`.
    Summarize { dir: PathBuf },
}

fn main() -> Result<()> {
    planner::logging::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Summarize { dir } => cli::summarize(&dir),
    }
}
