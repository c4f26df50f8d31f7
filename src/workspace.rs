use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::listing::FileEntry;
use crate::metadata::{self, Document, Parsed};
use crate::paths;
use crate::store::{ContentStore, ReadOutcome};
use crate::tree::FileTree;

/// Client-facing entry point: takes root-relative strings, confines them to
/// the content root and hands the resolved paths to the backend.
#[derive(Debug)]
pub struct Workspace<S> {
    store: S,
}

impl<S: ContentStore> Workspace<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    pub fn resolve(&self, user_path: &str) -> Result<PathBuf> {
        paths::resolve(self.root(), user_path)
    }

    /// Listing of `dir`. Only an out-of-bounds path is an error.
    pub async fn list(&self, dir: &str, recursive: bool) -> Result<Vec<FileEntry>> {
        let abs = self.resolve(dir)?;
        Ok(self.store.list(&abs, recursive).await)
    }

    pub async fn tree(&self, dir: &str) -> Result<FileTree> {
        let abs = self.resolve(dir)?;
        let entries = self.store.list(&abs, true).await;
        Ok(FileTree::build(&paths::relative(self.root(), &abs), entries))
    }

    pub async fn read(&self, path: &str) -> ReadOutcome {
        match self.resolve(path) {
            Ok(abs) => self.store.read(&abs).await,
            Err(e) => ReadOutcome::Fault(e),
        }
    }

    pub async fn write(&self, path: &str, text: &str) -> Result<()> {
        let abs = self.resolve(path)?;
        if abs.as_path() == self.root() {
            return Err(Error::InvalidInput("cannot write to the content root".into()));
        }
        self.store.write(&abs, text).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let abs = self.resolve(path)?;
        self.store.delete(&abs).await
    }

    /// Read and parse a document; a missing file is [`Error::NotFound`].
    pub async fn load_document(&self, path: &str) -> Result<Parsed> {
        let abs = self.resolve(path)?;
        let text = self.store.read(&abs).await.into_result(&abs)?;
        let parsed = metadata::parse(&text);
        if let Some(reason) = &parsed.degraded {
            warn!("{path}: {reason}; treating the whole file as body");
        }
        Ok(parsed)
    }

    pub async fn save_document(&self, path: &str, doc: &Document) -> Result<()> {
        let text = metadata::serialize(doc)?;
        self.write(path, &text).await
    }

    /// Every readable text file under the root, keyed by root-relative path.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        let root = self.root().to_path_buf();
        let mut files = BTreeMap::new();
        for entry in self.store.list(&root, true).await {
            if entry.is_dir() {
                continue;
            }
            let Ok(abs) = paths::stored(self.root(), &entry.path) else {
                continue;
            };
            match self.store.read(&abs).await {
                ReadOutcome::Found(text) => {
                    files.insert(entry.path, text);
                }
                ReadOutcome::NotFound => debug!("{} vanished during snapshot", entry.path),
                ReadOutcome::Fault(e) => warn!("leaving {} out of snapshot: {e}", entry.path),
            }
        }
        files
    }
}
