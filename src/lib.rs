//! File-backed markdown content store.
//!
//! Client paths go through [`paths::resolve`] before any backend sees them;
//! documents are split into metadata and body by [`metadata::parse`] and
//! rebuilt by [`metadata::serialize`].

pub mod context;
pub mod error;
pub mod listing;
pub mod metadata;
pub mod pages;
pub mod paths;
pub mod renderer;
pub mod slug;
pub mod snapshot;
pub mod store;
pub mod tree;
pub mod workspace;

pub use context::Context;
pub use error::{Error, Result};
pub use listing::{FileEntry, FileKind};
pub use metadata::{parse, serialize, Document, ParseDegraded, Parsed};
pub use pages::{NewPage, Page};
pub use slug::slugify;
pub use store::{Backend, ContentStore, FsStore, MemoryStore, ReadOutcome};
pub use tree::FileTree;
pub use workspace::Workspace;
