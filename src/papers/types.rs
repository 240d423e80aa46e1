use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One analysed paper, as produced upstream. Read-only to the classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperRecord {
    pub paper_id: String,
    /// Original (usually English) title.
    #[serde(default)]
    pub title: String,
    /// Translated title; the artifact filename is derived from it.
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub paper_url: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub publish_date: String,
    /// One-paragraph functional description.
    #[serde(default)]
    pub model_function: String,
}

/// How a classification came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationStatus {
    /// Model output parsed cleanly into an on-taxonomy label and a body.
    Classified,
    /// Model answered, but the label or body had to be substituted.
    Degraded,
    /// An artifact already existed; nothing was generated or written.
    Resumed,
    /// AI path disabled; static default classification.
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub paper_id: String,
    pub category: String,
    pub confidence: f64,
    /// Markdown document body; empty for resumed results.
    pub md_content: String,
    pub status: ClassificationStatus,
    #[serde(default)]
    pub classified_at: Option<DateTime<Local>>,
}
