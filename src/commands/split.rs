use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::build_pipeline;
use crate::papers::load_papers;
use crate::state::ClassifierConfig;
use crate::store::fs::FsTree;

pub fn split(mut config: ClassifierConfig, papers_path: &Path, date: &str) -> Result<()> {
    let papers = load_papers(papers_path)?;
    // Stubs never call the model.
    config.use_ai = false;

    let tree = Arc::new(FsTree::new(&config.output_dir));
    let pipeline = build_pipeline(&config, tree.clone());
    let written = pipeline
        .split_to_stubs(&papers, date)
        .context("Failed to write stub documents")?;

    println!(
        "已切分 {} 篇论文, 输出目录: {}",
        written,
        tree.root().join(date).display()
    );
    Ok(())
}
