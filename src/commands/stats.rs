use std::sync::Arc;

use anyhow::Result;

use crate::report::{ReportAggregator, ReportError};
use crate::state::ClassifierConfig;
use crate::store::fs::FsTree;
use crate::store::ArtifactTree;

pub fn stats(config: ClassifierConfig) -> Result<()> {
    let tree = Arc::new(FsTree::new(&config.output_dir));
    let dates = tree.dates()?;

    println!("输出目录: {}", tree.root().display());
    println!("日期数量: {}", dates.len());

    let aggregator = ReportAggregator::new(tree, config.summary_filename);
    for date in &dates {
        match aggregator.ledger(date) {
            Ok(ledger) => println!(
                "  - {}: {} 篇, {} 个分类",
                date,
                ledger.total(),
                ledger.entries().len()
            ),
            Err(ReportError::Empty(_)) => println!("  - {}: 未分类", date),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
