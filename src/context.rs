use std::path::PathBuf;

use anyhow::{bail, Context as _};
use log::info;

use crate::snapshot::load_snapshot;
use crate::store::{Backend, FsStore, MemoryStore};
use crate::workspace::Workspace;

pub const DEFAULT_ROOT: &str = "content";
pub const DEFAULT_PAGES_DIR: &str = "pages";
pub const ROOT_ENV: &str = "MDCMS_ROOT";

/// Process configuration, passed to whatever needs it.
#[derive(Debug, Clone)]
pub struct Context {
    pub root: PathBuf,
    /// Serve this JSON snapshot read-only instead of the filesystem.
    pub snapshot: Option<PathBuf>,
    /// Root-relative directory holding pages.
    pub pages_dir: String,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            snapshot: None,
            pages_dir: DEFAULT_PAGES_DIR.to_string(),
        }
    }
}

impl Context {
    /// Open the workspace, picking the backend once.
    pub fn open(&self) -> anyhow::Result<Workspace<Backend>> {
        let backend = match &self.snapshot {
            Some(snapshot_path) => {
                let files = load_snapshot(snapshot_path)?;
                info!("serving {} files read-only from {snapshot_path:?}", files.len());
                Backend::Memory(MemoryStore::new(&self.root, files))
            }
            None => {
                if !self.root.is_dir() {
                    bail!("content root {:?} must be a directory.", self.root);
                }
                Backend::Fs(FsStore::open(&self.root).with_context(|| format!("{:?}", self.root))?)
            }
        };
        Ok(Workspace::new(backend))
    }
}
