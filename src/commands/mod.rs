mod classify;
mod preview;
mod report;
mod split;
mod stats;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use tracing::{info, warn};

use crate::classify::ClassificationPipeline;
use crate::knowledge::KnowledgeBase;
use crate::llm::{LlmClient, RetryingGenerator, TextGenerator};
use crate::report::CategoryLedger;
use crate::state::ClassifierConfig;
use crate::store::fs::FsTree;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Subcommand)]
pub enum Commands {
    /// Classify papers, write one document per paper, then the summary report
    Classify {
        /// JSON array of paper records
        #[arg(short, long)]
        papers: PathBuf,

        /// Output date directory (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Skip the model and file every paper under the default category
        #[arg(long)]
        no_ai: bool,

        /// Pause between model calls, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Do not regenerate the summary report afterwards
        #[arg(long)]
        no_report: bool,

        /// Hide the waiting spinner
        #[arg(short, long)]
        quiet: bool,

        /// Also write one digest per category of this run's results
        #[arg(long)]
        digests: bool,
    },

    /// Classify a single paper and print the result without writing it
    Preview {
        #[arg(short, long)]
        papers: PathBuf,

        /// paper_id to classify
        #[arg(long)]
        id: String,
    },

    /// Write unclassified stub documents into the date directory
    Split {
        #[arg(short, long)]
        papers: PathBuf,

        #[arg(short, long)]
        date: Option<String>,
    },

    /// Rebuild the summary report from the documents on disk
    Report {
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List date directories under the output root
    Stats,
}

pub async fn run(command: Commands, mut config: ClassifierConfig) -> anyhow::Result<()> {
    match command {
        Commands::Classify {
            papers,
            date,
            no_ai,
            delay_ms,
            no_report,
            quiet,
            digests,
        } => {
            if no_ai {
                config.use_ai = false;
            }
            if let Some(ms) = delay_ms {
                config.delay_between_requests = std::time::Duration::from_millis(ms);
            }
            if quiet {
                config.show_progress = false;
            }
            let date = resolve_date(date)?;
            classify::classify(config, &papers, &date, !no_report, digests).await
        }
        Commands::Preview { papers, id } => preview::preview(config, &papers, &id).await,
        Commands::Split { papers, date } => split::split(config, &papers, &resolve_date(date)?),
        Commands::Report { date } => report::report(config, &resolve_date(date)?),
        Commands::Stats => stats::stats(config),
    }
}

/// Explicit date, or today's local date, as `YYYY-MM-DD`.
fn resolve_date(date: Option<String>) -> anyhow::Result<String> {
    let Some(date) = date else {
        return Ok(chrono::Local::now().format(DATE_FORMAT).to_string());
    };
    chrono::NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", date))?;
    Ok(date)
}

/// Retrying model client, or `None` when AI is off or the client cannot be set up.
fn build_generator(config: &ClassifierConfig) -> Option<Arc<dyn TextGenerator>> {
    if !config.use_ai {
        return None;
    }

    match LlmClient::from_env() {
        Ok(client) => {
            info!("LLM client initialized");
            Some(Arc::new(RetryingGenerator::new(
                Arc::new(client),
                config.max_attempts,
                config.retry_delay,
            )))
        }
        Err(e) => {
            warn!(error = %e, "LLM client unavailable, falling back to default classification");
            None
        }
    }
}

fn build_pipeline(config: &ClassifierConfig, tree: Arc<FsTree>) -> ClassificationPipeline {
    let generator = build_generator(config);
    let knowledge = KnowledgeBase::load(&config.knowledge_file);
    ClassificationPipeline::new(config.clone(), generator, knowledge, tree)
}

fn print_ledger(ledger: &CategoryLedger) {
    println!("总论文数: {} 篇", ledger.total());
    println!("分类数量: {} 个", ledger.entries().len());
    for entry in ledger.entries() {
        println!(
            "  - {}: {} 篇 ({:.1}%)",
            entry.category, entry.count, entry.percentage
        );
    }
}
