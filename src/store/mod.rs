//! Access to the `<output_root>/<date>/<category>/<file>` tree.
//!
//! The tree is the only persistent state: resumption and reporting both work
//! by listing it. `ArtifactTree` keeps those lookups testable without a real
//! filesystem.

pub mod fs;
#[cfg(test)]
pub mod memory;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid path segment: {0:?}")]
    InvalidSegment(String),
}

pub trait ArtifactTree: Send + Sync {
    /// Date directories under the root, sorted. Missing root yields none.
    fn dates(&self) -> Result<Vec<String>, StoreError>;

    fn has_date(&self, date: &str) -> bool;

    /// Non-hidden immediate subdirectories of a date, sorted by name.
    fn categories(&self, date: &str) -> Result<Vec<String>, StoreError>;

    /// Whether `<date>/<category>/<filename>` exists as a complete file.
    fn contains(&self, date: &str, category: &str, filename: &str) -> bool;

    /// Number of `.md` files directly inside a category directory.
    fn count_documents(&self, date: &str, category: &str) -> Result<usize, StoreError>;

    /// Write `contents` to `<date>/[<category>/]<filename>`, creating
    /// directories as needed. Readers never observe a partial file.
    fn write_file(
        &self,
        date: &str,
        category: Option<&str>,
        filename: &str,
        contents: &str,
    ) -> Result<PathBuf, StoreError>;
}

/// Reject anything that could escape or restructure the tree.
pub fn check_segment(segment: &str) -> Result<&str, StoreError> {
    let bad = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);
    if bad {
        Err(StoreError::InvalidSegment(segment.to_string()))
    } else {
        Ok(segment)
    }
}

pub(crate) fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_segment() {
        assert!(check_segment("图像生成").is_ok());
        assert!(check_segment("2024-05-01").is_ok());
        assert!(check_segment("").is_err());
        assert!(check_segment("..").is_err());
        assert!(check_segment("a/b").is_err());
        assert!(check_segment("a\\b").is_err());
    }
}
