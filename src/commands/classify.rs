use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{build_pipeline, print_ledger};
use crate::papers::load_papers;
use crate::report::ReportAggregator;
use crate::state::ClassifierConfig;
use crate::store::fs::FsTree;

pub async fn classify(
    config: ClassifierConfig,
    papers_path: &Path,
    date: &str,
    write_report: bool,
    write_digests: bool,
) -> Result<()> {
    let papers = load_papers(papers_path)?;
    let tree = Arc::new(FsTree::new(&config.output_dir));
    let pipeline = build_pipeline(&config, tree.clone());

    info!(
        papers = papers.len(),
        date,
        output = %tree.root().display(),
        "Classification started"
    );
    let report = pipeline
        .classify_batch(&papers, date)
        .await
        .with_context(|| format!("Cannot classify into date {:?}", date))?;
    let stats = &report.stats;

    println!("分类完成统计");
    println!("  总论文数: {}", stats.total);
    println!("  跳过论文: {}", stats.skipped);
    println!("  实际处理: {}", stats.processed);
    println!("  成功分类: {}", stats.succeeded);
    println!("  分类失败: {}", stats.failed);
    if stats.unsaved > 0 {
        println!("  保存失败: {}", stats.unsaved);
    }
    println!("  成功率: {:.1}%", stats.success_rate());

    if !report.results.is_empty() {
        if let Err(e) = pipeline.save_statistics(date, &report.results) {
            warn!(error = %e, "failed to save classification stats");
        }
    }

    if write_digests {
        match pipeline.save_category_digests(date, &report.results) {
            Ok(paths) => println!("分类摘要: {} 个", paths.len()),
            Err(e) => warn!(error = %e, "category digests not written"),
        }
    }

    if write_report {
        let aggregator = ReportAggregator::new(tree, config.summary_filename.clone());
        match aggregator.write_summary(date) {
            Ok((path, ledger)) => {
                println!("\n汇总报告: {}", path.display());
                print_ledger(&ledger);
            }
            Err(e) => warn!(error = %e, "summary report not written"),
        }
    }

    Ok(())
}
