use std::sync::OnceLock;

use regex::Regex;

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_\s-]").unwrap())
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_-]+").unwrap())
}

/// URL slug for a page title: `"Hello, World!"` becomes `"hello-world"`.
///
/// Only ASCII word characters survive. Returns an empty string when nothing does.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let kept = disallowed().replace_all(&lower, "");
    let dashed = separators().replace_all(&kept, "-");
    dashed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_titles() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust   in_Production -- 2024 "), "rust-in-production-2024");
        assert_eq!(slugify("---edge---"), "edge");
    }

    #[test]
    fn nothing_left() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("Привет"), "");
    }

    #[test]
    fn mixed_scripts_keep_ascii() {
        assert_eq!(slugify("pari — Интерактивный лендинг"), "pari");
    }
}
