//! HTML renderer.

use std::fmt::Write;

use babbl_meta::Frontmatter;

use crate::escape::{escape_code, escape_html, escape_url};
use crate::highlight::{Highlighter, force_code_block_class};
use crate::node::Node;
use crate::parse::parse_document;
use crate::table::Table;
use crate::template::{DEFAULT_CSS, render_document};

/// How a subtree is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Full HTML markup.
    #[default]
    Normal,
    /// Escaped text only, with all markup flattened. Used for image alt text.
    TextOnly,
}

/// Renders a [`Node`] tree to HTML.
///
/// Rendering is deterministic: the same tree and metadata always produce the
/// same output. The renderer keeps no state between calls, so one instance
/// can be shared across threads.
///
/// # Example
///
/// ```
/// use babbl_renderer::{HtmlRenderer, parse_document};
///
/// let renderer = HtmlRenderer::new();
/// let html = renderer.render_fragment(&parse_document("Hello *world*\n"));
/// assert_eq!(html, "<p class=\"paragraph\">Hello <em class=\"emphasis\">world</em></p>\n");
/// ```
pub struct HtmlRenderer {
    highlighter: Option<Box<dyn Highlighter>>,
    css: String,
}

impl HtmlRenderer {
    /// Create a renderer with the bundled stylesheet and no highlighting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            highlighter: None,
            css: DEFAULT_CSS.to_owned(),
        }
    }

    /// Highlight fenced code with a declared language.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Some(Box::new(highlighter));
        self
    }

    /// Replace the bundled base stylesheet.
    #[must_use]
    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = css.into();
        self
    }

    /// Whether code blocks are highlighted.
    #[must_use]
    pub fn highlights(&self) -> bool {
        self.highlighter.is_some()
    }

    /// Base stylesheet followed by the highlighter's stylesheet, if any.
    #[must_use]
    pub fn stylesheet(&self) -> String {
        let mut css = self.css.clone();
        if let Some(extra) = self.highlighter.as_ref().and_then(|h| h.stylesheet()) {
            css.push('\n');
            css.push_str(&extra);
        }
        css
    }

    /// Render a node to an HTML fragment.
    #[must_use]
    pub fn render_fragment(&self, node: &Node) -> String {
        let mut out = String::with_capacity(4096);
        self.render_node(node, RenderMode::Normal, &mut out);
        out
    }

    /// Render a node into a complete HTML document.
    #[must_use]
    pub fn render(&self, node: &Node, metadata: &Frontmatter) -> String {
        render_document(&self.render_fragment(node), metadata, &self.stylesheet())
    }

    /// Parse markdown and render it into a complete HTML document.
    #[must_use]
    pub fn render_markdown(&self, markdown: &str, metadata: &Frontmatter) -> String {
        self.render(&parse_document(markdown), metadata)
    }

    fn render_children(&self, children: &[Node], mode: RenderMode, out: &mut String) {
        for child in children {
            self.render_node(child, mode, out);
        }
    }

    #[allow(clippy::too_many_lines)]
    fn render_node(&self, node: &Node, mode: RenderMode, out: &mut String) {
        if mode == RenderMode::TextOnly {
            self.render_text(node, out);
            return;
        }

        match node {
            Node::Document { children } | Node::PlainText { children } => {
                self.render_children(children, mode, out);
            }
            Node::Paragraph { tight, children } => {
                if *tight {
                    self.render_children(children, mode, out);
                } else {
                    out.push_str(r#"<p class="paragraph">"#);
                    self.render_children(children, mode, out);
                    out.push_str("</p>\n");
                }
            }
            Node::Heading { level, children } => {
                let level = (*level).clamp(1, 6);
                let _ = write!(out, r#"<h{level} class="heading-{level}">"#);
                self.render_children(children, mode, out);
                let _ = writeln!(out, "</h{level}>");
            }
            Node::List {
                ordered,
                start,
                children,
            } => {
                let tag = if *ordered { "ol" } else { "ul" };
                if *ordered {
                    out.push_str(r#"<ol class="ordered-list""#);
                    if *start != 1 {
                        let _ = write!(out, r#" start="{start}""#);
                    }
                    out.push_str(">\n");
                } else {
                    out.push_str("<ul class=\"unordered-list\">\n");
                }
                self.render_children(children, mode, out);
                let _ = writeln!(out, "</{tag}>");
            }
            Node::ListItem { children } => {
                out.push_str(r#"<li class="list-item">"#);
                if !matches!(children.as_slice(), [only] if only.is_tight_paragraph()) {
                    out.push('\n');
                }
                self.render_children(children, mode, out);
                out.push_str("</li>\n");
            }
            Node::Quote { children } => {
                out.push_str("<blockquote class=\"blockquote\">\n");
                self.render_children(children, mode, out);
                out.push_str("</blockquote>\n");
            }
            Node::FencedCode { lang, code } => self.code_block(lang.as_deref(), code, out),
            Node::CodeBlock { code } => self.code_block(None, code, out),
            Node::HtmlBlock { body } => out.push_str(body),
            Node::ThematicBreak => out.push_str("<hr />\n"),
            Node::BlankLine | Node::LinkRefDef { .. } => {}
            Node::Emphasis { children } => {
                out.push_str(r#"<em class="emphasis">"#);
                self.render_children(children, mode, out);
                out.push_str("</em>");
            }
            Node::StrongEmphasis { children } => {
                out.push_str(r#"<strong class="strong">"#);
                self.render_children(children, mode, out);
                out.push_str("</strong>");
            }
            Node::InlineHtml { raw } => out.push_str(raw),
            Node::Link {
                dest,
                title,
                children,
            } => self.link(dest, title.as_deref(), children, out),
            Node::AutoLink { dest, children } => self.link(dest, None, children, out),
            Node::Image {
                dest,
                title,
                children,
            } => {
                let mut alt = String::new();
                self.render_children(children, RenderMode::TextOnly, &mut alt);
                let _ = write!(
                    out,
                    r#"<img src="{}" alt="{alt}" class="image"{} />"#,
                    escape_url(dest),
                    title_attr(title.as_deref())
                );
            }
            Node::RawText { text } => out.push_str(&escape_html(text)),
            Node::LineBreak { soft: true } => out.push('\n'),
            Node::LineBreak { soft: false } => out.push_str("<br />\n"),
            Node::CodeSpan { code } => {
                let _ = write!(out, r#"<code class="inline-code">{}</code>"#, escape_code(code));
            }
            Node::Table(table) => render_table(table, out),
            Node::TableHead { children } => {
                out.push_str("<thead>\n");
                self.render_children(children, mode, out);
                out.push_str("</thead>\n");
            }
            Node::TableBody { children } => {
                out.push_str("<tbody>\n");
                self.render_children(children, mode, out);
                out.push_str("</tbody>\n");
            }
            Node::TableRow { children } => {
                out.push_str("<tr>\n");
                self.render_children(children, mode, out);
                out.push_str("</tr>\n");
            }
            Node::TableCell { header, children } => {
                let tag = if *header { "th" } else { "td" };
                let _ = write!(out, "<{tag}>");
                self.render_children(children, mode, out);
                let _ = writeln!(out, "</{tag}>");
            }
            Node::Other {
                kind,
                inline,
                children,
            } => {
                let kind = escape_html(kind);
                if *inline {
                    let _ = write!(out, r#"<span class="node-{kind}">"#);
                    self.render_children(children, mode, out);
                    out.push_str("</span>");
                } else {
                    let _ = writeln!(out, r#"<div class="node-{kind}">"#);
                    self.render_children(children, mode, out);
                    out.push_str("</div>\n");
                }
            }
        }
    }

    /// Text-only rendering: escaped text with all markup flattened.
    fn render_text(&self, node: &Node, out: &mut String) {
        match node {
            Node::RawText { text } => out.push_str(&escape_html(text)),
            Node::CodeSpan { code }
            | Node::FencedCode { code, .. }
            | Node::CodeBlock { code } => out.push_str(&escape_html(code)),
            Node::InlineHtml { raw: text } | Node::HtmlBlock { body: text } => {
                out.push_str(&escape_html(text));
            }
            Node::LineBreak { .. } => out.push('\n'),
            Node::ThematicBreak | Node::BlankLine | Node::LinkRefDef { .. } => {}
            Node::Table(table) => {
                let cells: Vec<&str> = table
                    .headers()
                    .iter()
                    .chain(table.rows().iter().flatten())
                    .map(String::as_str)
                    .collect();
                out.push_str(&escape_html(&cells.join(" ")));
            }
            Node::Document { children }
            | Node::Paragraph { children, .. }
            | Node::Heading { children, .. }
            | Node::List { children, .. }
            | Node::ListItem { children }
            | Node::Quote { children }
            | Node::Emphasis { children }
            | Node::StrongEmphasis { children }
            | Node::PlainText { children }
            | Node::Link { children, .. }
            | Node::AutoLink { children, .. }
            | Node::Image { children, .. }
            | Node::TableHead { children }
            | Node::TableBody { children }
            | Node::TableRow { children }
            | Node::TableCell { children, .. }
            | Node::Other { children, .. } => {
                self.render_children(children, RenderMode::TextOnly, out);
            }
        }
    }

    fn link(&self, dest: &str, title: Option<&str>, children: &[Node], out: &mut String) {
        let _ = write!(
            out,
            r#"<a href="{}" class="link"{}>"#,
            escape_url(dest),
            title_attr(title)
        );
        self.render_children(children, RenderMode::Normal, out);
        out.push_str("</a>");
    }

    /// Highlight when possible, otherwise emit an escaped plain block.
    fn code_block(&self, lang: Option<&str>, code: &str, out: &mut String) {
        if let (Some(lang), Some(highlighter)) = (lang, &self.highlighter) {
            match highlighter.highlight(code, lang) {
                Ok(html) => {
                    out.push_str(&force_code_block_class(&html));
                    out.push('\n');
                    return;
                }
                Err(e) => {
                    tracing::debug!(language = lang, error = %e, "Falling back to plain code block");
                }
            }
        }

        let lang_class = lang
            .map(|lang| format!(" language-{}", escape_html(lang)))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            r#"<pre class="code-block{lang_class}"><code>{}</code></pre>"#,
            escape_code(code)
        );
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn title_attr(title: Option<&str>) -> String {
    title
        .filter(|t| !t.is_empty())
        .map(|t| format!(r#" title="{}""#, escape_html(t)))
        .unwrap_or_default()
}

fn render_table(table: &Table, out: &mut String) {
    out.push_str("<div class=\"table-container\">\n<table class=\"table\">\n");

    out.push_str("<thead>\n<tr>\n");
    for (header, alignment) in table.headers().iter().zip(table.alignments()) {
        let _ = writeln!(
            out,
            "<th{}>{}</th>",
            align_attr(alignment.as_css()),
            escape_html(header)
        );
    }
    out.push_str("</tr>\n</thead>\n");

    out.push_str("<tbody>\n");
    for row in table.rows() {
        out.push_str("<tr>\n");
        for (cell, alignment) in row.iter().zip(table.alignments()) {
            let _ = writeln!(
                out,
                "<td{}>{}</td>",
                align_attr(alignment.as_css()),
                escape_html(cell)
            );
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n");

    out.push_str("</table>\n</div>\n");
}

fn align_attr(align: Option<&str>) -> String {
    align
        .map(|a| format!(r#" style="text-align:{a}""#))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{HighlightError, SyntectHighlighter};
    use crate::table::Alignment;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> String {
        HtmlRenderer::new().render_fragment(&parse_document(markdown))
    }

    fn highlighted(markdown: &str) -> String {
        HtmlRenderer::new()
            .with_highlighter(SyntectHighlighter::new(crate::DEFAULT_THEME).unwrap())
            .render_fragment(&parse_document(markdown))
    }

    struct FailingHighlighter;

    impl Highlighter for FailingHighlighter {
        fn highlight(&self, _code: &str, language: &str) -> Result<String, HighlightError> {
            Err(HighlightError::Failed {
                language: language.to_owned(),
                message: "boom".to_owned(),
            })
        }
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(render("Hello\n"), "<p class=\"paragraph\">Hello</p>\n");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            render("&lt;script&gt; it's\n"),
            "<p class=\"paragraph\">&lt;script&gt; it's</p>\n"
        );
        let node = Node::text("<script>");
        assert_eq!(HtmlRenderer::new().render_fragment(&node), "&lt;script&gt;");
    }

    #[test]
    fn test_headings() {
        assert_eq!(render("## Two\n"), "<h2 class=\"heading-2\">Two</h2>\n");
        let node = Node::Heading {
            level: 9,
            children: vec![Node::text("x")],
        };
        assert_eq!(
            HtmlRenderer::new().render_fragment(&node),
            "<h6 class=\"heading-6\">x</h6>\n"
        );
    }

    #[test]
    fn test_tight_unordered_list() {
        assert_eq!(
            render("- a\n- b\n"),
            "<ul class=\"unordered-list\">\n\
             <li class=\"list-item\">a</li>\n\
             <li class=\"list-item\">b</li>\n\
             </ul>\n"
        );
    }

    #[test]
    fn test_loose_ordered_list_with_start() {
        assert_eq!(
            render("3. a\n\n4. b\n"),
            "<ol class=\"ordered-list\" start=\"3\">\n\
             <li class=\"list-item\">\n<p class=\"paragraph\">a</p>\n</li>\n\
             <li class=\"list-item\">\n<p class=\"paragraph\">b</p>\n</li>\n\
             </ol>\n"
        );
    }

    #[test]
    fn test_ordered_list_starting_at_one_has_no_start() {
        assert!(render("1. a\n").starts_with("<ol class=\"ordered-list\">\n"));
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            render("> quoted\n"),
            "<blockquote class=\"blockquote\">\n<p class=\"paragraph\">quoted</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_plain_code_block() {
        assert_eq!(
            render("```\na < b\n```\n"),
            "<pre class=\"code-block\"><code>a &lt; b\n</code></pre>\n"
        );
        assert_eq!(
            render("    x = 'y'\n"),
            "<pre class=\"code-block\"><code>x = &#x27;y&#x27;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_language_class_without_highlighting() {
        assert_eq!(
            render("```rust\nfn main() {}\n```\n"),
            "<pre class=\"code-block language-rust\"><code>fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let html = highlighted("```no-such-lang\n<x>\n```\n");
        assert_eq!(
            html,
            "<pre class=\"code-block language-no-such-lang\"><code>&lt;x&gt;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_highlighter_error_falls_back() {
        let renderer = HtmlRenderer::new().with_highlighter(FailingHighlighter);
        let html = renderer.render_fragment(&parse_document("```rust\nx\n```\n"));
        assert_eq!(html, "<pre class=\"code-block language-rust\"><code>x\n</code></pre>\n");
    }

    #[test]
    fn test_highlighted_code_block() {
        let html = highlighted("```rust\nfn main() {}\n```\n");
        assert!(html.starts_with("<div class=\"highlight\"><pre class=\"code-block\"><code class=\"language-rust\">"));
        assert!(html.ends_with("</pre></div>\n"));
    }

    #[test]
    fn test_html_passthrough() {
        assert_eq!(render("<div>raw</div>\n"), "<div>raw</div>\n");
        assert_eq!(
            render("a <b>bold</b>\n"),
            "<p class=\"paragraph\">a <b>bold</b></p>\n"
        );
    }

    #[test]
    fn test_thematic_break() {
        assert_eq!(render("---\n"), "<hr />\n");
    }

    #[test]
    fn test_inline_formatting() {
        assert_eq!(
            render("*a* **b** `c<d>`\n"),
            "<p class=\"paragraph\"><em class=\"emphasis\">a</em> \
             <strong class=\"strong\">b</strong> \
             <code class=\"inline-code\">c&lt;d&gt;</code></p>\n"
        );
    }

    #[test]
    fn test_links() {
        assert_eq!(
            render("[x](/a b \"T\")\n"),
            "<p class=\"paragraph\">[x](/a b &quot;T&quot;)</p>\n"
        );
        assert_eq!(
            render("[x](</a b> \"T's\")\n"),
            "<p class=\"paragraph\"><a href=\"/a%20b\" class=\"link\" title=\"T's\">x</a></p>\n"
        );
        assert_eq!(
            render("<https://e.com/?a=1&b=2>\n"),
            "<p class=\"paragraph\"><a href=\"https://e.com/?a=1&amp;b=2\" class=\"link\">https://e.com/?a=1&amp;b=2</a></p>\n"
        );
    }

    #[test]
    fn test_image_alt_is_text_only() {
        assert_eq!(
            render("![a *b* `<c>`](img.png \"t\")\n"),
            "<p class=\"paragraph\"><img src=\"img.png\" alt=\"a b &lt;c&gt;\" class=\"image\" title=\"t\" /></p>\n"
        );
    }

    #[test]
    fn test_text_only_mode_does_not_leak() {
        let html = render("![*a*](i.png) *b*\n");
        assert!(html.contains("alt=\"a\""));
        assert!(html.contains("<em class=\"emphasis\">b</em>"));
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(
            render("a\nb\\\nc\n"),
            "<p class=\"paragraph\">a\nb<br />\nc</p>\n"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            render("| Name | Age |\n|---|---|\n| Ann | 30 |\n"),
            "<div class=\"table-container\">\n<table class=\"table\">\n\
             <thead>\n<tr>\n<th>Name</th>\n<th>Age</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td>Ann</td>\n<td>30</td>\n</tr>\n</tbody>\n\
             </table>\n</div>\n"
        );
    }

    #[test]
    fn test_table_cells_escaped_and_literal() {
        let html = render("| <b> | *x* |\n|---|---|\n| a & b | `c` |\n");
        assert!(html.contains("<th>&lt;b&gt;</th>"));
        assert!(html.contains("<th>*x*</th>"));
        assert!(html.contains("<td>a &amp; b</td>"));
        assert!(html.contains("<td>`c`</td>"));
    }

    #[test]
    fn test_table_alignment() {
        let table = Table::new(
            vec!["a".to_owned(), "b".to_owned()],
            vec![Alignment::Center, Alignment::None],
            vec![vec!["1".to_owned()]],
        );
        let html = HtmlRenderer::new().render_fragment(&Node::Table(table));
        assert!(html.contains("<th style=\"text-align:center\">a</th>\n<th>b</th>"));
        assert!(html.contains("<td style=\"text-align:center\">1</td>\n<td></td>"));
    }

    #[test]
    fn test_table_not_absorbed_into_paragraph() {
        let html = render("Intro\n| a |\n|---|\n");
        assert!(html.starts_with("<p class=\"paragraph\">Intro</p>\n<div class=\"table-container\">"));
    }

    #[test]
    fn test_table_in_blockquote() {
        assert_eq!(
            render("> | a | b |\n> |---|---|\n> | 1 | 2 |\n"),
            "<blockquote class=\"blockquote\">\n\
             <div class=\"table-container\">\n<table class=\"table\">\n\
             <thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td>1</td>\n<td>2</td>\n</tr>\n</tbody>\n\
             </table>\n</div>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_header_only_table_in_blockquote() {
        let html = render("> | a |\n> |---|\n");
        assert!(html.starts_with("<blockquote class=\"blockquote\">\n<div class=\"table-container\">"));
        assert!(!html.contains("paragraph"));
    }

    #[test]
    fn test_pipes_in_html_block_pass_through() {
        let source = "<div>\n| a | b |\n|---|---|\n| 1 | 2 |\n</div>\n";
        assert_eq!(render(source), source);
    }

    #[test]
    fn test_marker_text_in_source_does_not_move_table() {
        let html = render("<!--babbl-table:0-->\n\nText\n\n| a |\n|---|\n| 1 |\n");

        assert!(html.starts_with(
            "<!--babbl-table:0-->\n<p class=\"paragraph\">Text</p>\n<div class=\"table-container\">"
        ));
        assert!(html.ends_with("</table>\n</div>\n"));
        assert_eq!(html.matches("babbl-table").count(), 1);
    }

    #[test]
    fn test_generic_table_nodes() {
        let node = Node::TableHead {
            children: vec![Node::TableRow {
                children: vec![Node::TableCell {
                    header: true,
                    children: vec![Node::text("h")],
                }],
            }],
        };
        assert_eq!(
            HtmlRenderer::new().render_fragment(&node),
            "<thead>\n<tr>\n<th>h</th>\n</tr>\n</thead>\n"
        );
    }

    #[test]
    fn test_other_nodes_use_generic_wrapper() {
        assert_eq!(
            render("~~gone~~\n"),
            "<p class=\"paragraph\"><span class=\"node-strikethrough\">gone</span></p>\n"
        );
        let block = Node::Other {
            kind: "footnote-definition".to_owned(),
            inline: false,
            children: vec![Node::text("x")],
        };
        assert_eq!(
            HtmlRenderer::new().render_fragment(&block),
            "<div class=\"node-footnote-definition\">\nx</div>\n"
        );
    }

    #[test]
    fn test_link_reference_definition_renders_nothing() {
        assert_eq!(
            render("[x]\n\n[x]: /y\n"),
            "<p class=\"paragraph\"><a href=\"/y\" class=\"link\">x</a></p>\n"
        );
        assert_eq!(HtmlRenderer::new().render_fragment(&Node::BlankLine), "");
    }

    #[test]
    fn test_render_is_idempotent() {
        let markdown = "# T\n\n- a\n- b\n\n```python\nx = 1\n```\n\n| a |\n|---|\n| 1 |\n";
        let renderer = HtmlRenderer::new().with_highlighter(SyntectHighlighter::new(crate::DEFAULT_THEME).unwrap());
        let metadata = Frontmatter::new();
        assert_eq!(
            renderer.render_markdown(markdown, &metadata),
            renderer.render_markdown(markdown, &metadata)
        );
    }

    #[test]
    fn test_stylesheet_includes_highlighter_css() {
        assert_eq!(HtmlRenderer::new().stylesheet(), DEFAULT_CSS);
        let css = HtmlRenderer::new()
            .with_css("body {}")
            .with_highlighter(SyntectHighlighter::new(crate::DEFAULT_THEME).unwrap())
            .stylesheet();
        assert!(css.starts_with("body {}\n"));
        assert!(css.contains(".highlight pre"));
    }

    #[test]
    fn test_render_full_document() {
        let mut metadata = Frontmatter::new();
        metadata.insert("title".to_owned(), "Post".into());

        let html = HtmlRenderer::new().render_markdown("Body\n", &metadata);

        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains("<title>Post</title>"));
        assert!(html.contains("<p class=\"paragraph\">Body</p>\n</section>"));
    }

    #[test]
    fn test_renderer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HtmlRenderer>();
    }
}
