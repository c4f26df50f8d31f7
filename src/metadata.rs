//! Metadata block codec.
//!
//! A document is an optional `---` delimited YAML block followed by free-form
//! markdown. [`parse`] splits the two and projects well-known keys onto
//! [`Document`]; [`serialize`] rebuilds the text from a document.

use log::debug;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::error::Result;

/// Marker line that opens and closes the metadata block.
pub const MARKER: &str = "---";

const KEY_ID: &str = "id";
const KEY_TITLE: &str = "title";
const KEY_SLUG: &str = "slug";
const KEY_EXCERPT: &str = "excerpt";
const KEY_PUBLISHED: &str = "published";
const KEY_TAGS: &str = "tags";
const KEY_AUTHOR: &str = "author";
const KEY_FEATURED_IMAGE: &str = "featuredImage";

/// Decoded form of one content file.
///
/// `metadata` holds every key of the block as written, including the ones
/// projected onto the typed fields. On serialization the typed fields win.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(rename = "content")]
    pub body: String,
    pub excerpt: String,
    pub published: bool,
    pub tags: Vec<String>,
    pub author: String,
    pub featured_image: String,
    pub metadata: Mapping,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            slug: String::new(),
            body: String::new(),
            excerpt: String::new(),
            published: true,
            tags: vec![],
            author: String::new(),
            featured_image: String::new(),
            metadata: Mapping::new(),
        }
    }
}

impl Document {
    /// String view of a free-form metadata value. Scalars are rendered,
    /// sequences and mappings are not representable and yield `None`.
    pub fn meta_str(&self, key: &str) -> Option<String> {
        self.metadata.get(key).and_then(scalar_to_string)
    }
}

/// Why a leading metadata block was ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDegraded {
    #[error("metadata block is never closed")]
    Unterminated,
    #[error("metadata block is not valid YAML: {0}")]
    Malformed(String),
    #[error("metadata block is not a key/value mapping")]
    NotAMapping,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub document: Document,
    /// Set when a block was present but unusable; the whole text is then the body.
    pub degraded: Option<ParseDegraded>,
}

impl Parsed {
    pub fn into_document(self) -> Document {
        self.document
    }
}

struct Split<'a> {
    header: &'a str,
    body: &'a str,
}

fn is_marker(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == MARKER
}

fn split_block(text: &str) -> Option<Result<Split<'_>, ParseDegraded>> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if !is_marker(first) {
        return None;
    }
    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if is_marker(line) {
            return Some(Ok(Split {
                header: &text[header_start..offset],
                body: &text[offset + line.len()..],
            }));
        }
        offset += line.len();
    }
    Some(Err(ParseDegraded::Unterminated))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

fn text_field(block: &Mapping, key: &str) -> String {
    block.get(key).and_then(scalar_to_string).unwrap_or_default()
}

fn published_field(block: &Mapping) -> bool {
    match block.get(KEY_PUBLISHED) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.trim().eq_ignore_ascii_case("false"),
        _ => true,
    }
}

fn tags_field(block: &Mapping) -> Vec<String> {
    match block.get(KEY_TAGS) {
        Some(Value::Sequence(seq)) => seq.iter().filter_map(scalar_to_string).collect(),
        // `tags: a, b` written by hand
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect(),
        _ => vec![],
    }
}

fn whole_text(text: &str) -> Document {
    Document {
        body: text.to_string(),
        ..Default::default()
    }
}

/// Split `text` into metadata and body.
///
/// Text without a leading marker line is all body. A block that is never
/// closed, is not YAML, or is not a mapping leaves the text untouched as body
/// and reports the reason in [`Parsed::degraded`].
pub fn parse(text: &str) -> Parsed {
    let split = match split_block(text) {
        None => {
            return Parsed {
                document: whole_text(text),
                degraded: None,
            }
        }
        Some(Err(reason)) => {
            debug!("metadata block degraded: {reason}");
            return Parsed {
                document: whole_text(text),
                degraded: Some(reason),
            };
        }
        Some(Ok(split)) => split,
    };

    let block = match serde_yaml::from_str::<Value>(split.header) {
        Ok(Value::Mapping(m)) => m,
        Ok(Value::Null) => Mapping::new(),
        Ok(_) => {
            return Parsed {
                document: whole_text(text),
                degraded: Some(ParseDegraded::NotAMapping),
            }
        }
        Err(e) => {
            debug!("metadata block is not YAML: {e}");
            return Parsed {
                document: whole_text(text),
                degraded: Some(ParseDegraded::Malformed(e.to_string())),
            };
        }
    };

    let document = Document {
        id: text_field(&block, KEY_ID),
        title: text_field(&block, KEY_TITLE),
        slug: text_field(&block, KEY_SLUG),
        body: split.body.to_string(),
        excerpt: text_field(&block, KEY_EXCERPT),
        published: published_field(&block),
        tags: tags_field(&block),
        author: text_field(&block, KEY_AUTHOR),
        featured_image: text_field(&block, KEY_FEATURED_IMAGE),
        metadata: block,
    };
    Parsed {
        document,
        degraded: None,
    }
}

/// Render `doc` as a metadata block followed by its body.
///
/// Typed fields come first in a fixed order, then every other key of
/// `doc.metadata` in its stored order.
pub fn serialize(doc: &Document) -> Result<String> {
    let mut block = Mapping::new();
    block.insert(KEY_ID.into(), doc.id.clone().into());
    block.insert(KEY_TITLE.into(), doc.title.clone().into());
    block.insert(KEY_SLUG.into(), doc.slug.clone().into());
    block.insert(KEY_EXCERPT.into(), doc.excerpt.clone().into());
    block.insert(KEY_PUBLISHED.into(), doc.published.into());
    block.insert(
        KEY_TAGS.into(),
        Value::Sequence(doc.tags.iter().cloned().map(Value::from).collect()),
    );
    block.insert(KEY_AUTHOR.into(), doc.author.clone().into());
    block.insert(KEY_FEATURED_IMAGE.into(), doc.featured_image.clone().into());
    for (key, value) in &doc.metadata {
        if !block.contains_key(key) {
            block.insert(key.clone(), value.clone());
        }
    }

    let yaml = serde_yaml::to_string(&block)?;
    Ok(format!("{MARKER}\n{yaml}{MARKER}\n{}", doc.body))
}
