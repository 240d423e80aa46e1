use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Mutex;

use super::{check_segment, is_hidden, ArtifactTree, StoreError};
use crate::papers::DOC_EXTENSION;

type DirKey = (String, Option<String>);

/// In-memory tree for tests. Directories exist independently of files.
#[derive(Default)]
pub struct MemoryTree {
    dirs: Mutex<BTreeSet<DirKey>>,
    files: Mutex<BTreeMap<(DirKey, String), String>>,
    /// Categories whose writes fail, to exercise persistence errors.
    read_only: Mutex<BTreeSet<String>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, date: &str, category: &str, filename: &str, contents: &str) -> Self {
        self.write_file(date, Some(category), filename, contents)
            .expect("seed file");
        self
    }

    pub fn with_empty_category(self, date: &str, category: &str) -> Self {
        let mut dirs = self.dirs.lock().unwrap();
        dirs.insert((date.to_string(), None));
        dirs.insert((date.to_string(), Some(category.to_string())));
        drop(dirs);
        self
    }

    pub fn deny_writes_to(&self, category: &str) {
        self.read_only.lock().unwrap().insert(category.to_string());
    }

    pub fn read(&self, date: &str, category: Option<&str>, filename: &str) -> Option<String> {
        let key = (
            (date.to_string(), category.map(str::to_string)),
            filename.to_string(),
        );
        self.files.lock().unwrap().get(&key).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

impl ArtifactTree for MemoryTree {
    fn dates(&self) -> Result<Vec<String>, StoreError> {
        let dirs = self.dirs.lock().unwrap();
        let dates: BTreeSet<String> = dirs.iter().map(|(d, _)| d.clone()).collect();
        Ok(dates.into_iter().collect())
    }

    fn has_date(&self, date: &str) -> bool {
        self.dirs.lock().unwrap().iter().any(|(d, _)| d == date)
    }

    fn categories(&self, date: &str) -> Result<Vec<String>, StoreError> {
        check_segment(date)?;
        let dirs = self.dirs.lock().unwrap();
        Ok(dirs
            .iter()
            .filter(|(d, _)| d == date)
            .filter_map(|(_, c)| c.clone())
            .filter(|c| !is_hidden(c))
            .collect())
    }

    fn contains(&self, date: &str, category: &str, filename: &str) -> bool {
        self.read(date, Some(category), filename).is_some()
    }

    fn count_documents(&self, date: &str, category: &str) -> Result<usize, StoreError> {
        let suffix = format!(".{}", DOC_EXTENSION);
        let dir: DirKey = (date.to_string(), Some(category.to_string()));
        let files = self.files.lock().unwrap();
        Ok(files
            .keys()
            .filter(|(d, name)| *d == dir && name.ends_with(&suffix))
            .count())
    }

    fn write_file(
        &self,
        date: &str,
        category: Option<&str>,
        filename: &str,
        contents: &str,
    ) -> Result<PathBuf, StoreError> {
        check_segment(date)?;
        check_segment(filename)?;
        let mut path = PathBuf::from(date);
        if let Some(category) = category {
            check_segment(category)?;
            if self.read_only.lock().unwrap().contains(category) {
                return Err(StoreError::Io {
                    path: path.join(category),
                    source: std::io::Error::new(
                        std::io::ErrorKind::PermissionDenied,
                        "read-only category",
                    ),
                });
            }
            path.push(category);
        }

        let dir: DirKey = (date.to_string(), category.map(str::to_string));
        {
            let mut dirs = self.dirs.lock().unwrap();
            dirs.insert((date.to_string(), None));
            dirs.insert(dir.clone());
        }
        self.files
            .lock()
            .unwrap()
            .insert((dir, filename.to_string()), contents.to_string());

        path.push(filename);
        Ok(path)
    }
}
