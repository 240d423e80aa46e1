use crate::papers::markdown::{failure_body, placeholder_body};
use crate::state::Taxonomy;

/// Why a parse had to substitute part of the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// No usable text at all.
    EmptyResponse,
    /// First line was blank once markers were stripped.
    MissingCategory,
    /// First line named something outside the taxonomy.
    UnknownCategory(String),
    /// Only a category line; the body is a placeholder.
    MissingBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedClassification {
    pub category: String,
    pub confidence: f64,
    pub md_content: String,
}

/// Structured view of a free-text model answer. Both arms carry a complete,
/// usable classification; there is no error arm.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Structured(ParsedClassification),
    Degraded(ParsedClassification, Degradation),
}

impl ParsedResponse {
    /// Parse `<category line>\n<body...>`.
    ///
    /// The category is the first line without leading `#`/`:`/`：` markers,
    /// trailing colons and surrounding whitespace; the body is the remaining
    /// lines, trimmed.
    pub fn parse(raw: &str, taxonomy: &Taxonomy, confidence: f64) -> Self {
        let default = taxonomy.default_category();

        if raw.trim().is_empty() {
            return ParsedResponse::Degraded(
                ParsedClassification {
                    category: default.to_string(),
                    confidence,
                    md_content: failure_body(),
                },
                Degradation::EmptyResponse,
            );
        }

        let (first, rest) = raw.split_once('\n').unwrap_or((raw, ""));
        let label = clean_category_line(first);
        let body = rest.trim();

        let (category, degradation) = if label.is_empty() {
            (default.to_string(), Some(Degradation::MissingCategory))
        } else if !taxonomy.contains(&label) {
            (default.to_string(), Some(Degradation::UnknownCategory(label)))
        } else {
            (label, None)
        };

        let (md_content, degradation) = if body.is_empty() {
            (
                placeholder_body(&category),
                degradation.or(Some(Degradation::MissingBody)),
            )
        } else {
            (body.to_string(), degradation)
        };

        let parsed = ParsedClassification {
            category,
            confidence,
            md_content,
        };
        match degradation {
            None => ParsedResponse::Structured(parsed),
            Some(reason) => ParsedResponse::Degraded(parsed, reason),
        }
    }

    pub fn classification(&self) -> &ParsedClassification {
        match self {
            ParsedResponse::Structured(c) | ParsedResponse::Degraded(c, _) => c,
        }
    }

    pub fn into_classification(self) -> ParsedClassification {
        match self {
            ParsedResponse::Structured(c) | ParsedResponse::Degraded(c, _) => c,
        }
    }

    pub fn degradation(&self) -> Option<&Degradation> {
        match self {
            ParsedResponse::Structured(_) => None,
            ParsedResponse::Degraded(_, reason) => Some(reason),
        }
    }
}

fn clean_category_line(line: &str) -> String {
    let is_marker = |c: char| matches!(c, '#' | ':' | '：') || c.is_whitespace();
    line.trim_start_matches(is_marker)
        .trim_end_matches(is_marker)
        .to_string()
}
