//! Markdown to standalone HTML rendering for babbl.
//!
//! The pipeline is:
//!
//! 1. [`parse_document`] turns markdown into a [`Node`] tree. Pipe tables are
//!    recognized by the [`table`] extension before the markdown parser runs.
//! 2. [`HtmlRenderer`] walks the tree and emits an HTML fragment, escaping
//!    text and optionally highlighting fenced code through a [`Highlighter`].
//! 3. [`render_document`] wraps the fragment and metadata into a complete
//!    HTML5 document with the stylesheet inlined.
//!
//! # Example
//!
//! ```
//! use babbl_meta::Frontmatter;
//! use babbl_renderer::{HtmlRenderer, SyntectHighlighter, DEFAULT_THEME};
//!
//! let renderer = HtmlRenderer::new().with_highlighter(SyntectHighlighter::new(DEFAULT_THEME)?);
//! let html = renderer.render_markdown("# Hello\n\n| a | b |\n|---|---|\n", &Frontmatter::new());
//!
//! assert!(html.starts_with("<!DOCTYPE html>"));
//! assert!(html.contains(r#"<h1 class="heading-1">Hello</h1>"#));
//! assert!(html.contains(r#"<table class="table">"#));
//! # Ok::<(), babbl_renderer::HighlightError>(())
//! ```

mod escape;
mod highlight;
mod node;
mod parse;
mod renderer;
pub mod table;
mod template;

pub use escape::{escape_code, escape_html, escape_url};
pub use highlight::{DEFAULT_THEME, HighlightError, Highlighter, SyntectHighlighter};
pub use node::Node;
pub use parse::parse_document;
pub use renderer::{HtmlRenderer, RenderMode};
pub use table::{Alignment, Table, TablePreprocessor};
pub use template::{DEFAULT_CSS, render_document};
