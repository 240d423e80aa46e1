use std::sync::Arc;

use anyhow::{Context, Result};

use super::print_ledger;
use crate::report::ReportAggregator;
use crate::state::ClassifierConfig;
use crate::store::fs::FsTree;

pub fn report(config: ClassifierConfig, date: &str) -> Result<()> {
    let tree = Arc::new(FsTree::new(&config.output_dir));
    let aggregator = ReportAggregator::new(tree, config.summary_filename);

    let (path, ledger) = aggregator
        .write_summary(date)
        .with_context(|| format!("Failed to build summary for {}", date))?;

    println!("汇总报告: {}", path.display());
    print_ledger(&ledger);
    Ok(())
}
