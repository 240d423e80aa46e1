use std::path::Path;

use tracing::{info, warn};

/// Taxonomy/criteria document, passed through to prompts verbatim.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    content: String,
}

impl KnowledgeBase {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Never fails: a missing or unreadable file yields an empty knowledge base.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "knowledge base not found, classifying without it");
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                info!(path = %path.display(), size = content.len(), "knowledge base loaded");
                Self::new(content)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read knowledge base");
                Self::default()
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}
