//! Syntax highlighting for fenced code.
//!
//! The renderer depends only on the [`Highlighter`] trait. [`SyntectHighlighter`]
//! is the bundled implementation and emits class-based markup styled by its
//! [`stylesheet`](Highlighter::stylesheet).

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::escape::escape_html;

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

const HIGHLIGHT_CSS: &str = "
.highlight {
    background: #f5f5f5;
    border: none;
    margin: 1rem 0;
}
.highlight pre {
    margin: 0;
    padding: 1rem;
    overflow-x: auto;
    font-family: 'SF Mono', 'Monaco', 'Inconsolata', 'Roboto Mono', monospace;
    font-size: 0.85rem;
    line-height: 1.4;
}
";

/// Highlighting failure. The renderer falls back to a plain code block.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
    #[error("Failed to highlight {language}: {message}")]
    Failed { language: String, message: String },
}

/// Turns code in a named language into highlighted HTML.
pub trait Highlighter: Send + Sync {
    /// Highlight `code` as `language`.
    ///
    /// The result must contain a `<pre` element; the renderer tags it with
    /// the `code-block` class.
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError>;

    /// CSS required by the highlighted markup.
    fn stylesheet(&self) -> Option<String> {
        None
    }
}

/// Highlighter backed by syntect's bundled syntaxes and themes.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    /// Create a highlighter using the named bundled theme.
    pub fn new(theme: &str) -> Result<Self, HighlightError> {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(theme)
            .ok_or_else(|| HighlightError::UnknownTheme(theme.to_owned()))?;

        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Names of the bundled themes.
    #[must_use]
    pub fn theme_names() -> Vec<String> {
        ThemeSet::load_defaults().themes.into_keys().collect()
    }

    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let token = language.to_ascii_lowercase();
        self.syntaxes
            .find_syntax_by_token(&token)
            .or_else(|| self.syntaxes.find_syntax_by_name(language))
            .or_else(|| self.syntaxes.find_syntax_by_extension(&token))
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        let syntax = self
            .find_syntax(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_owned()))?;

        let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| HighlightError::Failed {
                    language: language.to_owned(),
                    message: e.to_string(),
                })?;
        }

        Ok(format!(
            r#"<div class="highlight"><pre><code class="language-{}">{}</code></pre></div>"#,
            escape_html(language),
            generator.finalize()
        ))
    }

    fn stylesheet(&self) -> Option<String> {
        match css_for_theme_with_class_style(&self.theme, CLASS_STYLE) {
            Ok(css) => Some(css + HIGHLIGHT_CSS),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to generate highlight stylesheet");
                None
            }
        }
    }
}

/// Add the `code-block` class to the first `<pre>` in highlighted markup.
pub(crate) fn force_code_block_class(html: &str) -> String {
    let Some(start) = html.find("<pre") else {
        return html.to_owned();
    };
    let Some(tag_len) = html[start..].find('>') else {
        return html.to_owned();
    };
    let tag = &html[start..start + tag_len];

    if let Some(class_pos) = tag.find("class=\"") {
        let insert = start + class_pos + "class=\"".len();
        format!("{}code-block {}", &html[..insert], &html[insert..])
    } else {
        let insert = start + "<pre".len();
        format!("{} class=\"code-block\"{}", &html[..insert], &html[insert..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighter() -> SyntectHighlighter {
        SyntectHighlighter::new(DEFAULT_THEME).unwrap()
    }

    #[test]
    fn test_highlight_known_language() {
        let html = highlighter().highlight("fn main() {}\n", "rust").unwrap();

        assert!(html.starts_with(r#"<div class="highlight"><pre><code class="language-rust">"#));
        assert!(html.contains("hl-"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_highlight_by_extension() {
        assert!(highlighter().highlight("x = 1\n", "py").is_ok());
    }

    #[test]
    fn test_unknown_language() {
        let err = highlighter().highlight("code", "no-such-lang").unwrap_err();
        assert!(matches!(err, HighlightError::UnknownLanguage(lang) if lang == "no-such-lang"));
    }

    #[test]
    fn test_unknown_theme() {
        assert!(matches!(
            SyntectHighlighter::new("missing"),
            Err(HighlightError::UnknownTheme(_))
        ));
    }

    #[test]
    fn test_stylesheet() {
        let css = highlighter().stylesheet().unwrap();
        assert!(css.contains(".hl-"));
        assert!(css.contains(".highlight pre"));
    }

    #[test]
    fn test_theme_names() {
        assert!(SyntectHighlighter::theme_names().contains(&DEFAULT_THEME.to_owned()));
    }

    #[test]
    fn test_force_code_block_class() {
        assert_eq!(
            force_code_block_class(r#"<div class="highlight"><pre><code>x</code></pre></div>"#),
            r#"<div class="highlight"><pre class="code-block"><code>x</code></pre></div>"#
        );
        assert_eq!(
            force_code_block_class(r#"<pre class="x"><code>x</code></pre>"#),
            r#"<pre class="code-block x"><code>x</code></pre>"#
        );
        assert_eq!(force_code_block_class("<div>no pre</div>"), "<div>no pre</div>");
    }
}
