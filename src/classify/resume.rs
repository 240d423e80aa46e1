use std::sync::Arc;

use tracing::{debug, warn};

use crate::papers::types::{ClassificationResult, ClassificationStatus, PaperRecord};
use crate::papers::artifact_filename;
use crate::store::ArtifactTree;

/// Read-only lookup of previously classified papers.
///
/// A paper counts as done when a file named after its safe title exists in
/// any category directory of the date. Stubs at the date root do not count.
pub struct ResumptionIndex {
    tree: Arc<dyn ArtifactTree>,
    confidence: f64,
}

impl ResumptionIndex {
    pub fn new(tree: Arc<dyn ArtifactTree>, confidence: f64) -> Self {
        Self { tree, confidence }
    }

    /// Category directory already holding this paper's artifact, if any.
    pub fn find_category(&self, paper: &PaperRecord, date: &str) -> Option<String> {
        let filename = artifact_filename(paper);
        let categories = match self.tree.categories(date) {
            Ok(categories) => categories,
            Err(e) => {
                warn!(date, error = %e, "cannot list categories, treating paper as new");
                return None;
            }
        };

        let found = categories
            .into_iter()
            .find(|category| self.tree.contains(date, category, &filename));
        debug!(
            paper_id = %paper.paper_id,
            filename = %filename,
            found = ?found,
            "resumption lookup"
        );
        found
    }

    /// Resumed result for an already classified paper; no body, no timestamp.
    pub fn lookup(&self, paper: &PaperRecord, date: &str) -> Option<ClassificationResult> {
        self.find_category(paper, date)
            .map(|category| ClassificationResult {
                paper_id: paper.paper_id.clone(),
                category,
                confidence: self.confidence,
                md_content: String::new(),
                status: ClassificationStatus::Resumed,
                classified_at: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryTree;

    fn paper(id: &str, translation: &str) -> PaperRecord {
        PaperRecord {
            paper_id: id.into(),
            translation: translation.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_hit_in_any_category() {
        let tree = MemoryTree::new()
            .with_empty_category("2024-05-01", "文本生成")
            .with_file("2024-05-01", "音频生成", "声场生成.md", "body");
        let index = ResumptionIndex::new(Arc::new(tree), 1.0);

        let result = index.lookup(&paper("1", "声场生成"), "2024-05-01").unwrap();
        assert_eq!(result.category, "音频生成");
        assert_eq!(result.confidence, 1.0);
        assert!(result.md_content.is_empty());
        assert_eq!(result.status, ClassificationStatus::Resumed);
        assert!(result.classified_at.is_none());
    }

    #[test]
    fn test_miss_on_other_date() {
        let tree = MemoryTree::new().with_file("2024-05-01", "音频生成", "声场生成.md", "body");
        let index = ResumptionIndex::new(Arc::new(tree), 1.0);
        assert!(index.lookup(&paper("1", "声场生成"), "2024-05-02").is_none());
    }

    #[test]
    fn test_root_stub_does_not_count() {
        let tree = MemoryTree::new();
        tree.write_file("2024-05-01", None, "声场生成.md", "stub").unwrap();
        let index = ResumptionIndex::new(Arc::new(tree), 1.0);
        assert!(index.lookup(&paper("1", "声场生成"), "2024-05-01").is_none());
    }

    #[test]
    fn test_fallback_title_lookup() {
        let tree = MemoryTree::new().with_file("d", "文本生成", "paper_42.md", "body");
        let index = ResumptionIndex::new(Arc::new(tree), 1.0);
        assert_eq!(
            index.find_category(&paper("42", "!!!"), "d").as_deref(),
            Some("文本生成")
        );
        assert!(index.find_category(&paper("43", "!!!"), "d").is_none());
    }

    #[test]
    fn test_against_real_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let tree = crate::store::fs::FsTree::new(dir.path());
        tree.write_file("d", Some("视频生成"), "镜头.md", "x").unwrap();
        let index = ResumptionIndex::new(Arc::new(tree), 1.0);
        assert_eq!(index.find_category(&paper("1", "镜头"), "d").as_deref(), Some("视频生成"));
    }
}
