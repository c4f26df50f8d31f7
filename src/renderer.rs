use maud::{html, PreEscaped, DOCTYPE};
use pulldown_cmark::{html as cmark_html, Options, Parser};

use crate::metadata::Document;

/// Markdown to HTML for the editor preview.
pub fn render_body(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    cmark_html::push_html(&mut out, parser);
    out
}

/// Standalone preview page for one document.
pub fn render_preview(doc: &Document) -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (doc.title) }
            }
            body {
                article.preview {
                    @if !doc.published {
                        p.preview-draft { "draft" }
                    }
                    (PreEscaped(render_body(&doc.body)))
                    @if !doc.tags.is_empty() {
                        ul.preview-tags {
                            @for tag in &doc.tags {
                                li { (tag) }
                            }
                        }
                    }
                }
            }
        }
    }
    .into_string()
}

/// Listing card: image, title, subtitle, description and a link, the last
/// four taken from free-form metadata when present.
pub fn render_card(doc: &Document) -> String {
    let image = doc
        .meta_str("image")
        .filter(|s| !s.is_empty())
        .or_else(|| Some(doc.featured_image.clone()).filter(|s| !s.is_empty()));
    let subtitle = doc.meta_str("subtitle");
    let description = doc.meta_str("description").or_else(|| {
        Some(doc.excerpt.clone()).filter(|s| !s.is_empty())
    });
    let link = doc.meta_str("link").unwrap_or_default();

    html! {
        div.card {
            @if let Some(src) = image {
                img.card-image src=(src) alt="";
            }
            div.card-content {
                h2.card-title { (doc.title) }
                @if let Some(subtitle) = subtitle {
                    h3.card-subtitle { (subtitle) }
                }
                @if let Some(description) = description {
                    p.card-description { (description) }
                }
                a.card-link href=(link) { "Read more" }
            }
        }
    }
    .into_string()
}
