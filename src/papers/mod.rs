pub mod markdown;
pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use types::PaperRecord;

/// Artifact extension, without the dot.
pub const DOC_EXTENSION: &str = "md";

const MAX_TITLE_CHARS: usize = 50;

/// Filesystem-safe stem derived from the translated title alone.
///
/// Keeps alphanumerics, spaces, hyphens and underscores, trims trailing
/// whitespace, then truncates to 50 characters. An empty result falls back
/// to `paper_<id>` with separators escaped. The stub pass and the classified
/// pass must agree on this name, otherwise resumption lookups miss.
pub fn safe_title(paper: &PaperRecord) -> String {
    let kept: String = paper
        .translation
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let title: String = kept.trim_end().chars().take(MAX_TITLE_CHARS).collect();

    if title.is_empty() {
        format!("paper_{}", escape_id(&paper.paper_id))
    } else {
        title
    }
}

/// Percent-encode path separators and `%` itself, so ids such as `cs/0101001`
/// stay one path segment and distinct ids keep distinct names.
fn escape_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '\\' => out.push_str("%5C"),
            c => out.push(c),
        }
    }
    out
}

pub fn artifact_filename(paper: &PaperRecord) -> String {
    format!("{}.{}", safe_title(paper), DOC_EXTENSION)
}

/// Load a JSON array of paper records.
pub fn load_papers(path: &Path) -> Result<Vec<PaperRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read paper file {}", path.display()))?;
    let papers: Vec<PaperRecord> =
        serde_json::from_str(&text).context("Failed to parse paper records")?;

    if let Some(blank) = papers.iter().position(|p| p.paper_id.trim().is_empty()) {
        anyhow::bail!("paper record #{} has an empty paper_id", blank);
    }

    debug!(count = papers.len(), path = %path.display(), "paper records loaded");
    Ok(papers)
}
