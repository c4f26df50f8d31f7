//! Storage backends.
//!
//! Every method takes an absolute path that already went through
//! [`crate::paths::resolve`]; backends do not re-check containment.

mod fs;
mod memory;

use std::future::Future;
use std::path::Path;

pub(crate) use fs::is_staging_name;
pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use crate::listing::FileEntry;

/// Result of a read. An empty file is `Found("")`, never `NotFound`.
#[derive(Debug)]
pub enum ReadOutcome {
    Found(String),
    NotFound,
    Fault(Error),
}

impl ReadOutcome {
    pub fn found(self) -> Option<String> {
        match self {
            ReadOutcome::Found(text) => Some(text),
            _ => None,
        }
    }

    /// Collapse into a `Result`, reporting a missing file as [`Error::NotFound`].
    pub fn into_result(self, path: &Path) -> Result<String> {
        match self {
            ReadOutcome::Found(text) => Ok(text),
            ReadOutcome::NotFound => Err(Error::NotFound(path.to_path_buf())),
            ReadOutcome::Fault(e) => Err(e),
        }
    }
}

/// Capability interface over a content root.
pub trait ContentStore: Send + Sync {
    /// Absolute content root all paths live under.
    fn root(&self) -> &Path;

    fn read(&self, path: &Path) -> impl Future<Output = ReadOutcome> + Send;

    /// Replace the whole file, creating parent directories as needed.
    fn write(&self, path: &Path, text: &str) -> impl Future<Output = Result<()>> + Send;

    /// Remove a file; [`Error::NotFound`] if it does not exist.
    fn delete(&self, path: &Path) -> impl Future<Output = Result<()>> + Send;

    /// Best-effort listing, empty when `dir` is missing.
    fn list(&self, dir: &Path, recursive: bool) -> impl Future<Output = Vec<FileEntry>> + Send;
}

/// Backend picked when the workspace is opened.
#[derive(Debug)]
pub enum Backend {
    Fs(FsStore),
    Memory(MemoryStore),
}

impl Backend {
    pub fn is_read_only(&self) -> bool {
        matches!(self, Backend::Memory(_))
    }
}

impl ContentStore for Backend {
    fn root(&self) -> &Path {
        match self {
            Backend::Fs(s) => s.root(),
            Backend::Memory(s) => s.root(),
        }
    }

    async fn read(&self, path: &Path) -> ReadOutcome {
        match self {
            Backend::Fs(s) => s.read(path).await,
            Backend::Memory(s) => s.read(path).await,
        }
    }

    async fn write(&self, path: &Path, text: &str) -> Result<()> {
        match self {
            Backend::Fs(s) => s.write(path, text).await,
            Backend::Memory(s) => s.write(path, text).await,
        }
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        match self {
            Backend::Fs(s) => s.delete(path).await,
            Backend::Memory(s) => s.delete(path).await,
        }
    }

    async fn list(&self, dir: &Path, recursive: bool) -> Vec<FileEntry> {
        match self {
            Backend::Fs(s) => s.list(dir, recursive).await,
            Backend::Memory(s) => s.list(dir, recursive).await,
        }
    }
}
