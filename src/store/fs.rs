use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{check_segment, is_hidden, ArtifactTree, StoreError};
use crate::papers::DOC_EXTENSION;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// `ArtifactTree` over a real output root.
pub struct FsTree {
    root: PathBuf,
}

impl FsTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted names of the visible subdirectories of `dir`; missing `dir` yields none.
    fn subdirs(dir: &Path) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(io_err(dir)(e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_err(dir))?;
            let is_dir = entry.file_type().map_err(io_err(&entry.path()))?.is_dir();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if is_dir && !is_hidden(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

impl ArtifactTree for FsTree {
    fn dates(&self) -> Result<Vec<String>, StoreError> {
        Self::subdirs(&self.root)
    }

    fn has_date(&self, date: &str) -> bool {
        check_segment(date).is_ok() && self.root.join(date).is_dir()
    }

    fn categories(&self, date: &str) -> Result<Vec<String>, StoreError> {
        Self::subdirs(&self.root.join(check_segment(date)?))
    }

    fn contains(&self, date: &str, category: &str, filename: &str) -> bool {
        if [date, category, filename].iter().any(|s| check_segment(s).is_err()) {
            return false;
        }
        self.root.join(date).join(category).join(filename).is_file()
    }

    fn count_documents(&self, date: &str, category: &str) -> Result<usize, StoreError> {
        let dir = self
            .root
            .join(check_segment(date)?)
            .join(check_segment(category)?);

        let mut count = 0;
        for entry in fs::read_dir(&dir).map_err(io_err(&dir))? {
            let path = entry.map_err(io_err(&dir))?.path();
            let is_doc = path.extension().and_then(|e| e.to_str()) == Some(DOC_EXTENSION);
            if is_doc && path.is_file() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn write_file(
        &self,
        date: &str,
        category: Option<&str>,
        filename: &str,
        contents: &str,
    ) -> Result<PathBuf, StoreError> {
        let mut dir = self.root.join(check_segment(date)?);
        if let Some(category) = category {
            dir.push(check_segment(category)?);
        }
        let filename = check_segment(filename)?;
        fs::create_dir_all(&dir).map_err(io_err(&dir))?;

        // Hidden temp name: invisible to category listings and never a `.md` match.
        let tmp = dir.join(format!(".{}.tmp", filename));
        let path = dir.join(filename);
        let written = File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(contents.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(&path)(e));
        }

        debug!(path = %path.display(), size = contents.len(), "file written");
        Ok(path)
    }
}
