//! Page listing and the page-creation flow.

use log::{info, warn};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::listing::FileEntry;
use crate::metadata::{self, Document};
use crate::paths;
use crate::slug::slugify;
use crate::store::{ContentStore, ReadOutcome};
use crate::workspace::Workspace;

pub const DEFAULT_AUTHOR: &str = "Admin";

/// A markdown file together with its decoded document.
#[derive(Serialize, Debug, Clone)]
pub struct Page {
    pub entry: FileEntry,
    pub document: Document,
}

/// Input of [`Workspace::create_page`].
#[derive(Debug, Clone)]
pub struct NewPage {
    pub title: String,
    pub slug: Option<String>,
    pub body: String,
    pub published: bool,
    pub author: Option<String>,
}

impl NewPage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: None,
            body: body.into(),
            published: true,
            author: None,
        }
    }
}

impl<S: ContentStore> Workspace<S> {
    /// Markdown files under `dir`, decoded. Files that cannot be read are
    /// skipped; degraded metadata is kept and logged.
    pub async fn pages(&self, dir: &str, recursive: bool) -> Result<Vec<Page>> {
        let mut pages = vec![];
        for entry in self.list(dir, recursive).await? {
            if entry.is_dir() || !paths::is_markdown(&entry.name) {
                continue;
            }
            let abs = paths::stored(self.root(), &entry.path)?;
            let text = match self.store().read(&abs).await {
                ReadOutcome::Found(text) => text,
                ReadOutcome::NotFound => continue,
                ReadOutcome::Fault(e) => {
                    warn!("skipping page {}: {e}", entry.path);
                    continue;
                }
            };
            let parsed = metadata::parse(&text);
            if let Some(reason) = &parsed.degraded {
                warn!("page {}: {reason}", entry.path);
            }
            pages.push(Page {
                entry,
                document: parsed.document,
            });
        }
        Ok(pages)
    }

    /// Write a new page to `dir/<slug>.md` and return its document.
    ///
    /// The slug falls back to the slugified title; an existing page is never
    /// overwritten.
    pub async fn create_page(&self, dir: &str, page: NewPage) -> Result<Document> {
        if page.title.trim().is_empty() || page.body.trim().is_empty() {
            return Err(Error::InvalidInput("title and content are required".into()));
        }
        let slug = match page.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => slugify(s),
            _ => slugify(&page.title),
        };
        if slug.is_empty() {
            return Err(Error::InvalidInput(format!(
                "cannot derive a slug from {:?}",
                page.title
            )));
        }

        let abs = self.resolve(dir)?.join(format!("{slug}.md"));
        let rel = paths::relative(self.root(), &abs);
        match self.store().read(&abs).await {
            ReadOutcome::NotFound => {}
            ReadOutcome::Found(_) => return Err(Error::AlreadyExists(abs)),
            ReadOutcome::Fault(e) => return Err(e),
        }

        let document = Document {
            id: slug.clone(),
            title: page.title,
            slug,
            body: page.body,
            published: page.published,
            author: page.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            ..Default::default()
        };
        let text = metadata::serialize(&document)?;
        self.store().write(&abs, &text).await?;
        info!("created page {rel}");
        Ok(metadata::parse(&text).into_document())
    }
}
