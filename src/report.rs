use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::papers::markdown::summary_report;
use crate::store::{ArtifactTree, StoreError};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("date directory not found: {0}")]
    MissingDate(String),

    #[error("no classified papers under {0}")]
    Empty(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
    /// Share of the ledger total, 0..=100.
    pub percentage: f64,
}

/// Artifact counts per category, derived from a directory scan. Sorted by
/// descending count, ties by name. Categories with no documents are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryLedger {
    entries: Vec<CategoryCount>,
    total: usize,
}

impl CategoryLedger {
    pub fn from_counts(counts: Vec<(String, usize)>) -> Self {
        let mut counts: Vec<(String, usize)> =
            counts.into_iter().filter(|(_, n)| *n > 0).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let total: usize = counts.iter().map(|(_, n)| n).sum();
        let entries = counts
            .into_iter()
            .map(|(category, count)| CategoryCount {
                percentage: if total == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / total as f64
                },
                category,
                count,
            })
            .collect();

        Self { entries, total }
    }

    pub fn entries(&self) -> &[CategoryCount] {
        &self.entries
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub struct ReportAggregator {
    tree: Arc<dyn ArtifactTree>,
    summary_filename: String,
}

impl ReportAggregator {
    pub fn new(tree: Arc<dyn ArtifactTree>, summary_filename: impl Into<String>) -> Self {
        Self {
            tree,
            summary_filename: summary_filename.into(),
        }
    }

    /// Count documents in every category directory of `date`.
    pub fn ledger(&self, date: &str) -> Result<CategoryLedger, ReportError> {
        if !self.tree.has_date(date) {
            return Err(ReportError::MissingDate(date.to_string()));
        }

        let mut counts = Vec::new();
        for category in self.tree.categories(date)? {
            let count = self.tree.count_documents(date, &category)?;
            counts.push((category, count));
        }

        let ledger = CategoryLedger::from_counts(counts);
        if ledger.is_empty() {
            return Err(ReportError::Empty(date.to_string()));
        }
        Ok(ledger)
    }

    /// Rescan `date` and overwrite its summary document. Nothing is written on error.
    pub fn write_summary(&self, date: &str) -> Result<(PathBuf, CategoryLedger), ReportError> {
        let ledger = self.ledger(date)?;
        let content = summary_report(date, &ledger);
        let path = self
            .tree
            .write_file(date, None, &self.summary_filename, &content)?;

        info!(
            path = %path.display(),
            total = ledger.total(),
            categories = ledger.entries().len(),
            "summary report written"
        );
        Ok((path, ledger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryTree;

    fn seeded() -> MemoryTree {
        let mut tree = MemoryTree::new().with_empty_category("d", "视频生成");
        for i in 0..4 {
            tree = tree.with_file("d", "图像生成", &format!("img{i}.md"), "x");
        }
        tree.with_file("d", "文本生成", "t.md", "x")
            .with_file("d", "文本生成", "t.txt", "x")
    }

    #[test]
    fn test_ledger_sorted_with_percentages() {
        let aggregator = ReportAggregator::new(Arc::new(seeded()), "模型分类汇总.md");
        let ledger = aggregator.ledger("d").unwrap();

        assert_eq!(ledger.total(), 5);
        assert_eq!(
            ledger.entries(),
            &[
                CategoryCount {
                    category: "图像生成".into(),
                    count: 4,
                    percentage: 80.0
                },
                CategoryCount {
                    category: "文本生成".into(),
                    count: 1,
                    percentage: 20.0
                },
            ]
        );
    }

    #[test]
    fn test_ledger_totals_match_counts() {
        let ledger = CategoryLedger::from_counts(vec![
            ("a".into(), 1),
            ("b".into(), 1),
            ("c".into(), 1),
            ("z".into(), 0),
        ]);
        let sum: usize = ledger.entries().iter().map(|e| e.count).sum();
        let pct: f64 = ledger.entries().iter().map(|e| e.percentage).sum();
        assert_eq!(sum, ledger.total());
        assert_eq!(ledger.entries().len(), 3);
        assert!((pct - 100.0).abs() < 1e-9);
        assert_eq!(ledger.entries()[0].category, "a");
    }

    #[test]
    fn test_summary_written_in_date_dir() {
        let tree = Arc::new(seeded());
        let aggregator = ReportAggregator::new(tree.clone(), "模型分类汇总.md");
        let (path, ledger) = aggregator.write_summary("d").unwrap();

        assert_eq!(path, PathBuf::from("d/模型分类汇总.md"));
        assert_eq!(ledger.total(), 5);
        let summary = tree.read("d", None, "模型分类汇总.md").unwrap();
        assert!(summary.contains("### 图像生成\n- 论文数量：4 篇\n- 占比：80.0%"));
        assert!(!summary.contains("视频生成"));
    }

    #[test]
    fn test_missing_date_fails() {
        let tree = Arc::new(MemoryTree::new());
        let aggregator = ReportAggregator::new(tree.clone(), "s.md");
        assert!(matches!(
            aggregator.write_summary("d"),
            Err(ReportError::MissingDate(_))
        ));
        assert_eq!(tree.file_count(), 0);
    }

    #[test]
    fn test_only_empty_categories_fails_without_writing() {
        let tree = Arc::new(MemoryTree::new().with_empty_category("d", "文本生成"));
        let aggregator = ReportAggregator::new(tree.clone(), "s.md");
        assert!(matches!(aggregator.write_summary("d"), Err(ReportError::Empty(_))));
        assert!(tree.read("d", None, "s.md").is_none());
    }

    #[test]
    fn test_aggregates_real_tree() {
        let dir = tempfile::tempdir().unwrap();
        let tree = Arc::new(crate::store::fs::FsTree::new(dir.path()));
        tree.write_file("d", Some("音频生成"), "a.md", "x").unwrap();
        tree.write_file("d", None, "stub.md", "x").unwrap();

        let aggregator = ReportAggregator::new(tree, "模型分类汇总.md");
        let (path, ledger) = aggregator.write_summary("d").unwrap();
        assert_eq!(ledger.total(), 1);
        assert!(path.ends_with("d/模型分类汇总.md"));
        assert!(path.exists());
    }
}
