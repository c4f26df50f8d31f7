use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use log::{debug, info, warn};
use regex::Regex;
use tokio::fs;

use super::{ContentStore, ReadOutcome};
use crate::error::{Error, Result};
use crate::listing::{self, FileEntry};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Filesystem backend rooted at a canonical directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open an existing directory as the content root.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let canonical = std::fs::canonicalize(root).map_err(|e| Error::io(root, e))?;
        if !canonical.is_dir() {
            return Err(Error::InvalidInput(format!(
                "content root {} must be a directory",
                canonical.display()
            )));
        }
        debug!("content root is {canonical:?}");
        Ok(Self { root: canonical })
    }
}

/// Sibling of `path` used to stage a write before renaming it into place.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    path.with_file_name(name)
}

fn staging_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\..+\.\d+\.\d+\.tmp$").unwrap())
}

/// Whether `name` is a write in flight, or one left behind by a crash.
pub(crate) fn is_staging_name(name: &str) -> bool {
    staging_name().is_match(name)
}

impl ContentStore for FsStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn read(&self, path: &Path) -> ReadOutcome {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return ReadOutcome::NotFound,
            Err(e) => {
                warn!("reading {path:?} failed: {e}");
                return ReadOutcome::Fault(Error::io(path, e));
            }
        };
        match String::from_utf8(bytes) {
            Ok(text) => ReadOutcome::Found(text),
            Err(_) => ReadOutcome::Fault(Error::NotText(path.to_path_buf())),
        }
    }

    async fn write(&self, path: &Path, text: &str) -> Result<()> {
        if path == self.root {
            return Err(Error::InvalidInput("cannot write to the content root".into()));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }

        let staged = staging_path(path);
        if let Err(e) = fs::write(&staged, text).await {
            let _ = fs::remove_file(&staged).await;
            warn!("writing {path:?} failed: {e}");
            return Err(Error::io(path, e));
        }
        if let Err(e) = fs::rename(&staged, path).await {
            let _ = fs::remove_file(&staged).await;
            warn!("replacing {path:?} failed: {e}");
            return Err(Error::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
        info!("wrote {} bytes to {path:?}", text.len());
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(|e| {
            if e.kind() != ErrorKind::NotFound {
                warn!("deleting {path:?} failed: {e}");
            }
            Error::io(path, e)
        })?;
        info!("deleted {path:?}");
        Ok(())
    }

    async fn list(&self, dir: &Path, recursive: bool) -> Vec<FileEntry> {
        listing::list(&self.root, dir, recursive).await
    }
}
