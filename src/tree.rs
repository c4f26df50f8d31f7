use std::collections::HashMap;
use std::fmt::Write as _;

use crate::listing::FileEntry;

/// A recursive listing indexed once by parent directory.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    base: String,
    entries: Vec<FileEntry>,
    children: HashMap<String, Vec<usize>>,
    by_path: HashMap<String, usize>,
}

impl FileTree {
    /// Index a flattened listing of `base` (root-relative).
    ///
    /// Child order follows the listing, so a sorted listing gives sorted children.
    pub fn build(base: &str, entries: Vec<FileEntry>) -> Self {
        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_path = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            children.entry(entry.parent().to_string()).or_default().push(idx);
            by_path.insert(entry.path.clone(), idx);
        }
        Self {
            base: base.to_string(),
            entries,
            children,
            by_path,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.by_path.get(path).map(|&idx| &self.entries[idx])
    }

    /// Direct children of the directory at `path`.
    pub fn children<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a FileEntry> + 'a {
        self.children
            .get(path)
            .map(|v| v.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&idx| &self.entries[idx])
    }

    pub fn top_level(&self) -> impl Iterator<Item = &FileEntry> {
        self.children(&self.base)
    }

    /// Indented outline, directories suffixed with `/`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_level(&self.base, 0, &mut out);
        out
    }

    fn render_level(&self, dir: &str, depth: usize, out: &mut String) {
        for entry in self.children(dir) {
            let _ = writeln!(
                out,
                "{}{}{}",
                "  ".repeat(depth),
                entry.name,
                if entry.is_dir() { "/" } else { "" }
            );
            if entry.is_dir() {
                self.render_level(&entry.path, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::FileKind;
    use chrono::{DateTime, Utc};

    fn entry(path: &str, kind: FileKind) -> FileEntry {
        FileEntry {
            path: path.to_string(),
            name: path.rsplit('/').next().unwrap().to_string(),
            size: 0,
            modified: DateTime::<Utc>::default(),
            kind,
        }
    }

    fn sample() -> FileTree {
        FileTree::build(
            "",
            vec![
                entry("pages/deep/x.md", FileKind::File),
                entry("pages/deep", FileKind::Directory),
                entry("pages/a.md", FileKind::File),
                entry("pages", FileKind::Directory),
                entry("index.md", FileKind::File),
            ],
        )
    }

    #[test]
    fn children_are_direct_only() {
        let tree = sample();
        let top: Vec<_> = tree.top_level().map(|e| e.name.as_str()).collect();
        assert_eq!(top, vec!["pages", "index.md"]);
        let pages: Vec<_> = tree.children("pages").map(|e| e.path.as_str()).collect();
        assert_eq!(pages, vec!["pages/deep", "pages/a.md"]);
        assert_eq!(tree.children("index.md").count(), 0);
        assert_eq!(tree.children("missing").count(), 0);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn lookup_and_render() {
        let tree = sample();
        assert!(tree.get("pages/deep").unwrap().is_dir());
        assert!(tree.get("nope").is_none());
        assert_eq!(tree.render(), "pages/\n  deep/\n    x.md\n  a.md\nindex.md\n");
    }
}
