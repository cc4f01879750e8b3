//! Standalone HTML document template.

use std::fmt::Write;

use babbl_meta::{Frontmatter, display_value};

use crate::escape::escape_html;

/// Bundled base stylesheet.
pub const DEFAULT_CSS: &str = include_str!("default.css");

/// Metadata keys shown in the header, in order, with their labels.
const HEADER_FIELDS: &[(&str, &str)] = &[
    ("author", "Author"),
    ("date", "Date"),
    ("summary", "Summary"),
    ("description", "Description"),
    ("tags", "Tags"),
    ("categories", "Categories"),
    ("slug", "Slug"),
    ("layout", "Layout"),
    ("draft", "Draft"),
];

/// Wrap a rendered fragment into a complete HTML5 document.
///
/// Every metadata key becomes a `<meta>` tag. A non-empty metadata mapping
/// also produces a `<title>` (falling back to `Document`) and a header block
/// above the content.
#[must_use]
pub fn render_document(fragment: &str, metadata: &Frontmatter, css: &str) -> String {
    let mut html = String::with_capacity(fragment.len() + css.len() + 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");

    for (key, value) in metadata {
        let _ = writeln!(
            html,
            r#"<meta name="{}" content="{}">"#,
            escape_html(key),
            escape_html(&display_value(value))
        );
    }

    if !metadata.is_empty() {
        let title = metadata
            .get("title")
            .map_or_else(|| "Document".to_owned(), display_value);
        let _ = writeln!(html, "<title>{}</title>", escape_html(&title));
    }

    let _ = writeln!(html, "<style>\n{}\n</style>", css.trim_end());
    html.push_str("</head>\n<body>\n<section>\n");

    if !metadata.is_empty() {
        html.push_str(&render_header(metadata));
    }

    html.push_str(fragment);
    if !fragment.is_empty() && !fragment.ends_with('\n') {
        html.push('\n');
    }
    html.push_str("</section>\n</body>\n</html>\n");
    html
}

/// Render the metadata header: title, known fields, then the rest.
fn render_header(metadata: &Frontmatter) -> String {
    let mut header = String::from("<header>\n");

    if let Some(title) = metadata.get("title") {
        let _ = writeln!(header, r#"<h1 class="title">{}</h1>"#, escape_html(&display_value(title)));
    }

    header.push_str("<div class=\"metadata\">\n");
    for (key, label) in HEADER_FIELDS {
        if let Some(value) = metadata.get(*key) {
            push_field(&mut header, label, &display_value(value));
        }
    }
    for (key, value) in metadata {
        let known = key == "title" || HEADER_FIELDS.iter().any(|(k, _)| *k == key.as_str());
        if !known {
            push_field(&mut header, key, &display_value(value));
        }
    }
    header.push_str("</div>\n<hr />\n</header>\n");
    header
}

fn push_field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        out,
        r#"<div class="meta-field">{}: {}</div>"#,
        escape_html(label),
        escape_html(value)
    );
}
