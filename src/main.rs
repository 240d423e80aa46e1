mod classify;
mod commands;
mod knowledge;
mod llm;
mod papers;
mod report;
mod state;
mod store;

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use commands::Commands;
use state::ClassifierConfig;

#[derive(Parser)]
#[command(name = "paper-sorter", version, about = "Sort research papers into a model taxonomy")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Root directory for classified output
    #[arg(long, global = true, env = "PAPER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Taxonomy document embedded in every prompt
    #[arg(long, global = true, env = "PAPER_KNOWLEDGE_FILE")]
    knowledge_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load env before clap reads env-backed flags
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClassifierConfig::from_env();
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(file) = cli.knowledge_file {
        config.knowledge_file = file;
    }

    commands::run(cli.command, config).await
}
