use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures surfaced by the content store and the workspace built on it.
#[derive(Debug, Error)]
pub enum Error {
    /// The client path resolves outside the content root.
    #[error("path {0:?} escapes the content root")]
    OutOfBounds(String),

    #[error("{} not found", .0.display())]
    NotFound(PathBuf),

    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8 text", .0.display())]
    NotText(PathBuf),

    #[error("content store is read-only")]
    ReadOnly,

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to encode metadata block: {0}")]
    Encode(#[from] serde_yaml::Error),
}

impl Error {
    /// Classify an I/O error raised while touching `path`.
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.to_path_buf())
        } else {
            Error::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
