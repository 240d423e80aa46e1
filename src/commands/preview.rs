use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::build_pipeline;
use crate::papers::load_papers;
use crate::state::ClassifierConfig;
use crate::store::fs::FsTree;

pub async fn preview(config: ClassifierConfig, papers_path: &Path, paper_id: &str) -> Result<()> {
    let papers = load_papers(papers_path)?;
    let paper = papers
        .iter()
        .find(|p| p.paper_id == paper_id)
        .with_context(|| format!("paper {} not found in {}", paper_id, papers_path.display()))?;

    let pipeline = build_pipeline(&config, Arc::new(FsTree::new(&config.output_dir)));
    let result = pipeline
        .classify_single(paper)
        .await
        .with_context(|| format!("classification failed for {}", paper_id))?;

    println!("分类: {}", result.category);
    println!("置信度: {:.2}", result.confidence);
    println!("状态: {:?}\n", result.status);
    println!("{}", result.md_content);
    Ok(())
}
