pub mod parse;
pub mod progress;
pub mod prompts;
pub mod resume;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::knowledge::KnowledgeBase;
use crate::llm::{GenerationError, TextGenerator};
use crate::papers::markdown::{category_digest, default_document, paper_stub};
use crate::papers::types::{ClassificationResult, ClassificationStatus, PaperRecord};
use crate::papers::{artifact_filename, safe_title, DOC_EXTENSION};
use crate::state::ClassifierConfig;
use crate::store::{check_segment, ArtifactTree, StoreError};

use parse::ParsedResponse;
use progress::ProgressTicker;
use resume::ResumptionIndex;

const STATS_FILENAME: &str = "classification_stats.json";
/// Digest files sit at the date root as `分类_<category>.md`.
const DIGEST_PREFIX: &str = "分类_";

#[derive(Error, Debug)]
pub enum ClassifyFailure {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// What happened to one paper.
#[derive(Debug)]
pub enum PaperOutcome {
    /// Artifact already present; no model call, no write.
    Resumed(ClassificationResult),
    /// Classified and written to `path`.
    Saved {
        result: ClassificationResult,
        path: PathBuf,
    },
    /// Classified, but the artifact could not be written.
    Unsaved {
        result: ClassificationResult,
        error: StoreError,
    },
    Failed(ClassifyFailure),
}

/// Counters for one batch run. `processed` excludes skipped papers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Successes whose artifact write failed; included in `succeeded`.
    pub unsaved: usize,
}

impl BatchStats {
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.succeeded as f64 * 100.0 / self.processed as f64
        }
    }
}

#[derive(Debug)]
pub struct BatchReport {
    /// Fresh classifications in input order. Resumed papers are not included.
    pub results: Vec<ClassificationResult>,
    pub stats: BatchStats,
}

#[derive(Serialize)]
struct StatsFile<'a> {
    date: &'a str,
    total_papers: usize,
    categories: BTreeMap<&'a str, usize>,
    classification_time: String,
}

pub struct ClassificationPipeline {
    config: ClassifierConfig,
    /// `None` means AI-disabled mode.
    generator: Option<Arc<dyn TextGenerator>>,
    knowledge: KnowledgeBase,
    tree: Arc<dyn ArtifactTree>,
    index: ResumptionIndex,
}

impl ClassificationPipeline {
    pub fn new(
        config: ClassifierConfig,
        generator: Option<Arc<dyn TextGenerator>>,
        knowledge: KnowledgeBase,
        tree: Arc<dyn ArtifactTree>,
    ) -> Self {
        let generator = if config.use_ai { generator } else { None };
        if generator.is_none() {
            warn!("AI classification disabled, papers get the default category");
        } else if knowledge.is_empty() {
            warn!("knowledge base is empty, prompts carry only the category list");
        }
        let index = ResumptionIndex::new(tree.clone(), config.resumed_confidence);

        Self {
            config,
            generator,
            knowledge,
            tree,
            index,
        }
    }

    pub fn ai_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Classify one paper without touching the output tree.
    ///
    /// Returns `None` when the model call fails or answers with nothing. With
    /// AI disabled, returns the static default classification instead.
    pub async fn classify_single(&self, paper: &PaperRecord) -> Option<ClassificationResult> {
        match self.classify_paper(paper).await {
            Ok(result) => Some(result),
            Err(e) => {
                error!(paper_id = %paper.paper_id, error = %e, "classification failed");
                None
            }
        }
    }

    async fn classify_paper(
        &self,
        paper: &PaperRecord,
    ) -> Result<ClassificationResult, ClassifyFailure> {
        let Some(generator) = &self.generator else {
            let category = self.config.taxonomy.default_category().to_string();
            return Ok(ClassificationResult {
                paper_id: paper.paper_id.clone(),
                md_content: default_document(paper, &category),
                category,
                confidence: self.config.fallback_confidence,
                status: ClassificationStatus::Fallback,
                classified_at: Some(Local::now()),
            });
        };

        let prompt =
            prompts::build_classification_prompt(paper, &self.knowledge, &self.config.taxonomy);
        debug!(paper_id = %paper.paper_id, prompt_len = prompt.len(), "prompt built");

        let title: String = paper.translation.chars().take(30).collect();
        let ticker = ProgressTicker::start(&format!("分类论文: {}", title), self.config.show_progress);
        let started = std::time::Instant::now();
        let response = generator.generate(&prompt).await;
        ticker.stop().await;

        let response = response?;
        debug!(
            paper_id = %paper.paper_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_len = response.len(),
            "model responded"
        );
        if response.trim().is_empty() {
            return Err(ClassifyFailure::EmptyResponse);
        }

        let parsed =
            ParsedResponse::parse(&response, &self.config.taxonomy, self.config.ai_confidence);
        let status = match parsed.degradation() {
            None => ClassificationStatus::Classified,
            Some(reason) => {
                warn!(
                    paper_id = %paper.paper_id,
                    category = %parsed.classification().category,
                    reason = ?reason,
                    "model answer degraded"
                );
                ClassificationStatus::Degraded
            }
        };
        let parsed = parsed.into_classification();

        Ok(ClassificationResult {
            paper_id: paper.paper_id.clone(),
            category: parsed.category,
            confidence: parsed.confidence,
            md_content: parsed.md_content,
            status,
            classified_at: Some(Local::now()),
        })
    }

    /// Resume-or-classify one paper and persist its artifact.
    ///
    /// The artifact name comes from the paper itself, never from the
    /// category, so a later run finds it under whichever category it landed.
    pub async fn classify_and_save(&self, paper: &PaperRecord, date: &str) -> PaperOutcome {
        if let Some(resumed) = self.index.lookup(paper, date) {
            return PaperOutcome::Resumed(resumed);
        }

        let result = match self.classify_paper(paper).await {
            Ok(result) => result,
            Err(e) => return PaperOutcome::Failed(e),
        };

        let filename = artifact_filename(paper);
        match self
            .tree
            .write_file(date, Some(&result.category), &filename, &result.md_content)
        {
            Ok(path) => PaperOutcome::Saved { result, path },
            Err(error) => PaperOutcome::Unsaved { result, error },
        }
    }

    /// Classify papers strictly in order, one at a time.
    ///
    /// After each paper that reached the model, waits
    /// `delay_between_requests` before starting the next one. A date that
    /// cannot name a directory is rejected before any model call.
    pub async fn classify_batch(
        &self,
        papers: &[PaperRecord],
        date: &str,
    ) -> Result<BatchReport, StoreError> {
        check_segment(date)?;

        let mut stats = BatchStats {
            total: papers.len(),
            ..Default::default()
        };
        let mut results = Vec::new();

        if papers.is_empty() {
            warn!("no papers to classify");
            return Ok(BatchReport { results, stats });
        }
        info!(count = papers.len(), date, ai = self.ai_enabled(), "batch classification started");

        for (i, paper) in papers.iter().enumerate() {
            info!(
                "[{}/{}] {} (ok: {}, failed: {}, skipped: {})",
                i + 1,
                papers.len(),
                paper.translation.chars().take(50).collect::<String>(),
                stats.succeeded,
                stats.failed,
                stats.skipped
            );

            let outcome = self.classify_and_save(paper, date).await;
            let called_model = self.ai_enabled() && !matches!(outcome, PaperOutcome::Resumed(_));

            match outcome {
                PaperOutcome::Resumed(resumed) => {
                    info!(
                        paper_id = %paper.paper_id,
                        category = %resumed.category,
                        "already classified, skipping"
                    );
                    stats.skipped += 1;
                }
                PaperOutcome::Saved { result, path } => {
                    info!(
                        paper_id = %paper.paper_id,
                        category = %result.category,
                        path = %path.display(),
                        "artifact saved"
                    );
                    stats.processed += 1;
                    stats.succeeded += 1;
                    results.push(result);
                }
                PaperOutcome::Unsaved { result, error } => {
                    error!(
                        paper_id = %paper.paper_id,
                        category = %result.category,
                        error = %error,
                        "failed to save artifact"
                    );
                    stats.processed += 1;
                    stats.succeeded += 1;
                    stats.unsaved += 1;
                    results.push(result);
                }
                PaperOutcome::Failed(failure) => {
                    error!(paper_id = %paper.paper_id, error = %failure, "classification failed");
                    stats.processed += 1;
                    stats.failed += 1;
                }
            }

            let delay = self.config.delay_between_requests;
            if called_model && i + 1 < papers.len() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        info!(
            total = stats.total,
            processed = stats.processed,
            succeeded = stats.succeeded,
            failed = stats.failed,
            skipped = stats.skipped,
            unsaved = stats.unsaved,
            success_rate = stats.success_rate(),
            "batch classification finished"
        );
        Ok(BatchReport { results, stats })
    }

    /// Write an unclassified stub for every paper at the date root.
    pub fn split_to_stubs(&self, papers: &[PaperRecord], date: &str) -> Result<usize, StoreError> {
        if papers.is_empty() {
            warn!("no papers to split");
            return Ok(0);
        }

        for (i, paper) in papers.iter().enumerate() {
            let filename = artifact_filename(paper);
            let path = self.tree.write_file(date, None, &filename, &paper_stub(paper))?;
            debug!(
                index = i + 1,
                total = papers.len(),
                title = %safe_title(paper),
                path = %path.display(),
                "stub written"
            );
        }

        info!(count = papers.len(), date, "stubs written");
        Ok(papers.len())
    }

    /// Write per-category counts of `results` to `<date>/classification_stats.json`.
    pub fn save_statistics(&self, date: &str, results: &[ClassificationResult]) -> Result<PathBuf> {
        let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
        for result in results {
            *categories.entry(result.category.as_str()).or_default() += 1;
        }

        let stats = StatsFile {
            date,
            total_papers: results.len(),
            categories,
            classification_time: results
                .first()
                .and_then(|r| r.classified_at)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        };
        let json = serde_json::to_string_pretty(&stats).context("serialize classification stats")?;
        let path = self.tree.write_file(date, None, STATS_FILENAME, &json)?;

        info!(path = %path.display(), "classification stats saved");
        Ok(path)
    }

    /// Write one digest per category of `results`, bodies in input order.
    pub fn save_category_digests(
        &self,
        date: &str,
        results: &[ClassificationResult],
    ) -> Result<Vec<PathBuf>, StoreError> {
        let mut by_category: BTreeMap<&str, Vec<&ClassificationResult>> = BTreeMap::new();
        for result in results.iter().filter(|r| !r.md_content.is_empty()) {
            by_category.entry(result.category.as_str()).or_default().push(result);
        }

        let mut paths = Vec::with_capacity(by_category.len());
        for (category, members) in by_category {
            let filename = format!("{}{}.{}", DIGEST_PREFIX, category, DOC_EXTENSION);
            let content = category_digest(category, &members, date);
            let path = self.tree.write_file(date, None, &filename, &content)?;
            debug!(category, papers = members.len(), path = %path.display(), "category digest written");
            paths.push(path);
        }

        info!(count = paths.len(), date, "category digests written");
        Ok(paths)
    }
}
