use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::warn;

use super::{ContentStore, ReadOutcome};
use crate::error::{Error, Result};
use crate::listing::{self, FileEntry, FileKind, Levels};
use crate::paths;

/// Read-only backend serving a fixed mapping of files.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    root: PathBuf,
    files: BTreeMap<PathBuf, String>,
    loaded_at: DateTime<Utc>,
}

impl MemoryStore {
    /// Build from root-relative paths as listed or exported, taken literally.
    /// Keys with `.` or `..` segments are dropped.
    pub fn new<I, K, V>(root: impl Into<PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let root = root.into();
        let mut map = BTreeMap::new();
        for (key, text) in files {
            match paths::stored(&root, key.as_ref()) {
                Ok(abs) if abs != root => {
                    map.insert(abs, text.into());
                }
                Ok(_) => warn!("ignoring snapshot entry for the root itself"),
                Err(e) => warn!("ignoring snapshot entry: {e}"),
            }
        }
        Self {
            root,
            files: map,
            loaded_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn file_entry(&self, rel: String, text: &str) -> FileEntry {
        FileEntry {
            name: rel.rsplit('/').next().unwrap_or_default().to_string(),
            path: rel,
            size: text.len() as u64,
            modified: self.loaded_at,
            kind: FileKind::File,
        }
    }

    fn dir_entry(&self, rel: String) -> FileEntry {
        FileEntry {
            name: rel.rsplit('/').next().unwrap_or_default().to_string(),
            path: rel,
            size: 0,
            modified: self.loaded_at,
            kind: FileKind::Directory,
        }
    }
}

impl ContentStore for MemoryStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn read(&self, path: &Path) -> ReadOutcome {
        match self.files.get(path) {
            Some(text) => ReadOutcome::Found(text.clone()),
            None => ReadOutcome::NotFound,
        }
    }

    async fn write(&self, path: &Path, _text: &str) -> Result<()> {
        warn!("refusing to write {path:?}: snapshot is read-only");
        Err(Error::ReadOnly)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        warn!("refusing to delete {path:?}: snapshot is read-only");
        Err(Error::ReadOnly)
    }

    async fn list(&self, dir: &Path, recursive: bool) -> Vec<FileEntry> {
        let top = paths::relative(&self.root, dir);
        let mut levels = Levels::new();
        let mut seen_dirs = HashSet::new();

        for (abs, text) in &self.files {
            let Ok(below) = abs.strip_prefix(dir) else {
                continue;
            };
            let segments: Vec<String> = below
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            let Some((file_name, dirs)) = segments.split_last() else {
                continue;
            };

            let mut parent = top.clone();
            for name in dirs {
                let rel = paths::join_relative(&parent, name);
                if seen_dirs.insert(rel.clone()) {
                    levels
                        .entry(parent.clone())
                        .or_default()
                        .push(self.dir_entry(rel.clone()));
                }
                parent = rel;
            }
            let rel = paths::join_relative(&parent, file_name);
            levels
                .entry(parent)
                .or_default()
                .push(self.file_entry(rel, text));
        }

        listing::flatten(levels, &top, recursive)
    }
}
