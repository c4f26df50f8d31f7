//! Directory listings.
//!
//! Directories are walked breadth-first into per-directory levels, then
//! flattened: each level is sorted directories-first and by name, and in
//! recursive mode a directory's descendants are emitted before the directory.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use tokio::fs;

use crate::{paths, store};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Directory,
    File,
}

/// One node of a listing.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Root-relative, `/` separated.
    pub path: String,
    pub name: String,
    /// Bytes; always 0 for directories.
    pub size: u64,
    pub modified: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: FileKind,
}

impl FileEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Root-relative path of the containing directory (`""` at the top).
    pub fn parent(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(parent, _)| parent)
    }
}

/// Entries of each visited directory, keyed by the directory's root-relative path.
pub(crate) type Levels = HashMap<String, Vec<FileEntry>>;

fn sort_level(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| match (a.kind, b.kind) {
        (FileKind::Directory, FileKind::File) => std::cmp::Ordering::Less,
        (FileKind::File, FileKind::Directory) => std::cmp::Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });
}

fn emit(levels: &mut Levels, dir: &str, recursive: bool, out: &mut Vec<FileEntry>) {
    let Some(mut entries) = levels.remove(dir) else {
        return;
    };
    sort_level(&mut entries);
    for entry in entries {
        if recursive && entry.is_dir() {
            emit(levels, &entry.path, recursive, out);
        }
        out.push(entry);
    }
}

/// Flatten collected levels starting at `dir`.
pub(crate) fn flatten(mut levels: Levels, dir: &str, recursive: bool) -> Vec<FileEntry> {
    let mut out = vec![];
    emit(&mut levels, dir, recursive, &mut out);
    out
}

async fn read_level(root: &Path, dir: &Path, rel_dir: &str) -> Option<Vec<FileEntry>> {
    let mut read_dir = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) => {
            debug!("cannot list {dir:?}: {e}");
            return None;
        }
    };

    let mut entries = vec![];
    loop {
        let entry = match read_dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("listing of {dir:?} cut short: {e}");
                break;
            }
        };
        let name = entry.file_name().to_string_lossy().to_string();
        if store::is_staging_name(&name) {
            continue;
        }
        // symlink_metadata: links are reported as files and never followed
        let meta = match fs::symlink_metadata(entry.path()).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("skipping {:?}: {e}", entry.path());
                continue;
            }
        };
        let kind = if meta.is_dir() {
            FileKind::Directory
        } else {
            FileKind::File
        };
        entries.push(FileEntry {
            path: paths::join_relative(rel_dir, &name),
            name,
            size: if kind == FileKind::Directory { 0 } else { meta.len() },
            modified: meta.modified().map(DateTime::<Utc>::from).unwrap_or_default(),
            kind,
        });
    }
    debug!("listed {} entries in {root:?}/{rel_dir}", entries.len());
    Some(entries)
}

/// List `dir` (an absolute path under `root`).
///
/// A missing or unreadable directory yields an empty listing; unreadable
/// subdirectories are listed as entries but contribute no children.
pub async fn list(root: &Path, dir: &Path, recursive: bool) -> Vec<FileEntry> {
    let top = paths::relative(root, dir);
    let mut levels = Levels::new();

    let mut queue: VecDeque<(PathBuf, String)> = VecDeque::new();
    queue.push_back((dir.to_path_buf(), top.clone()));
    while let Some((abs, rel)) = queue.pop_front() {
        let Some(entries) = read_level(root, &abs, &rel).await else {
            continue;
        };
        if recursive {
            for entry in entries.iter().filter(|e| e.is_dir()) {
                queue.push_back((abs.join(&entry.name), entry.path.clone()));
            }
        }
        levels.insert(rel, entries);
    }

    flatten(levels, &top, recursive)
}
