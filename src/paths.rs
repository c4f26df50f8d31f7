//! Confinement of client-supplied paths to the content root.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve a client path against `root`.
///
/// Separators may be `/` or `\`, the input is percent-decoded once, and
/// leading separators are ignored so `/pages/a.md` means `pages/a.md`.
/// `.` segments are dropped and `..` pops the previous segment; popping past
/// the root is an [`Error::OutOfBounds`], never silently clamped.
pub fn resolve(root: &Path, user_path: &str) -> Result<PathBuf> {
    let decoded = urlencoding::decode(user_path).unwrap_or(Cow::Borrowed(user_path));
    if decoded.contains('\0') {
        return Err(Error::OutOfBounds(user_path.to_string()));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(Error::OutOfBounds(user_path.to_string()));
                }
            }
            s => segments.push(s),
        }
    }

    let mut resolved = root.to_path_buf();
    for segment in segments {
        // a drive prefix or root component would replace the whole path on push
        if Path::new(segment)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::OutOfBounds(user_path.to_string()));
        }
        resolved.push(segment);
    }

    if !resolved.starts_with(root) {
        return Err(Error::OutOfBounds(user_path.to_string()));
    }
    Ok(resolved)
}

/// Absolute form of a root-relative path as it is stored: `/` separated and
/// taken literally, with no decoding. Listed entry paths and snapshot keys
/// come back to storage through here; `.`, `..` and prefix segments are
/// [`Error::OutOfBounds`].
pub fn stored(root: &Path, rel: &str) -> Result<PathBuf> {
    if rel.contains('\0') {
        return Err(Error::OutOfBounds(rel.to_string()));
    }
    let mut resolved = root.to_path_buf();
    for segment in rel.split('/').filter(|s| !s.is_empty()) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == OsStr::new(segment) => {
                resolved.push(name)
            }
            _ => return Err(Error::OutOfBounds(rel.to_string())),
        }
    }
    Ok(resolved)
}

/// Root-relative, forward-slash form of `abs`. The root itself maps to `""`.
pub fn relative(root: &Path, abs: &Path) -> String {
    let rel = abs.strip_prefix(root).unwrap_or(abs);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a child name onto a root-relative parent path.
pub(crate) fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Whether `name` carries a markdown extension (`.md` or `.markdown`).
pub fn is_markdown(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".md") || lower.ends_with(".markdown")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(r"C:\srv\content")
        } else {
            PathBuf::from("/srv/content")
        }
    }

    #[test]
    fn plain_paths_stay_under_root() {
        let root = root();
        for p in ["a.md", "pages/a.md", "./pages/./a.md", "pages/x/../a.md", ""] {
            let resolved = resolve(&root, p).unwrap();
            assert!(resolved.starts_with(&root), "{p} -> {resolved:?}");
        }
        assert_eq!(resolve(&root, "pages/x/../a.md").unwrap(), root.join("pages").join("a.md"));
        assert_eq!(resolve(&root, "").unwrap(), root);
    }

    #[test]
    fn leading_separator_is_root_relative() {
        let root = root();
        assert_eq!(resolve(&root, "/etc/passwd").unwrap(), root.join("etc").join("passwd"));
        assert_eq!(resolve(&root, "\\pages\\a.md").unwrap(), root.join("pages").join("a.md"));
    }

    #[test]
    fn traversal_is_out_of_bounds() {
        let root = root();
        for p in [
            "..",
            "../secret",
            "a/../../b",
            "a/b/../../../c",
            "..\\..\\windows",
            "%2e%2e/secret",
            "pages%2F..%2F..%2Fsecret",
        ] {
            assert!(
                matches!(resolve(&root, p), Err(Error::OutOfBounds(_))),
                "{p} should escape"
            );
        }
    }

    #[test]
    fn double_encoding_is_decoded_once() {
        let root = root();
        let resolved = resolve(&root, "%252e%252e/x").unwrap();
        assert_eq!(resolved, root.join("%2e%2e").join("x"));
    }

    #[test]
    fn nul_is_rejected() {
        assert!(matches!(resolve(&root(), "a\0b"), Err(Error::OutOfBounds(_))));
        assert!(matches!(resolve(&root(), "a%00b"), Err(Error::OutOfBounds(_))));
    }

    #[test]
    fn stored_paths_are_taken_literally() {
        let root = root();
        assert_eq!(stored(&root, "100%25 done.md").unwrap(), root.join("100%25 done.md"));
        assert_eq!(
            stored(&root, "pages/%2e%2e%2fsecret.md").unwrap(),
            root.join("pages").join("%2e%2e%2fsecret.md")
        );
        assert_eq!(stored(&root, "").unwrap(), root);
        for p in ["..", "../x.md", "pages/../x.md", "./x.md", "a\0b"] {
            assert!(matches!(stored(&root, p), Err(Error::OutOfBounds(_))), "{p}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn stored_backslash_is_part_of_the_name() {
        let root = root();
        assert_eq!(stored(&root, "a\\b.md").unwrap(), root.join("a\\b.md"));
        assert_eq!(stored(&root, "..\\x.md").unwrap(), root.join("..\\x.md"));
    }

    #[test]
    fn relative_uses_forward_slashes() {
        let root = root();
        assert_eq!(relative(&root, &root.join("pages").join("a.md")), "pages/a.md");
        assert_eq!(relative(&root, &root), "");
        assert_eq!(join_relative("", "a"), "a");
        assert_eq!(join_relative("pages", "a.md"), "pages/a.md");
    }

    #[test]
    fn markdown_extensions() {
        assert!(is_markdown("a.md"));
        assert!(is_markdown("README.MD"));
        assert!(is_markdown("notes.markdown"));
        assert!(!is_markdown("image.png"));
        assert!(!is_markdown("md"));
    }
}
