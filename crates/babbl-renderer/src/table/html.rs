//! Raw HTML block tracking for the line-based table scan.
//!
//! Lines inside an HTML block are passed through by the markdown parser, so
//! pipes there must not start a table. Start and end conditions follow the
//! seven `CommonMark` HTML block kinds.

/// Tags whose block runs until the matching closing tag.
const RAW_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

/// Tags that open an HTML block ending at a blank line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

/// How an open HTML block ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum End {
    /// A line containing this text closes the block, inclusive.
    Contains(&'static str),
    /// A line containing any raw tag's closing tag closes the block.
    RawClose,
    /// A blank line closes the block.
    Blank,
}

/// Tracks raw HTML block state across lines.
#[derive(Debug)]
pub(crate) struct HtmlBlockTracker {
    open: Option<End>,
    /// Whether the previous line was blank, so a lone tag may start a block.
    after_blank: bool,
}

impl Default for HtmlBlockTracker {
    fn default() -> Self {
        Self {
            open: None,
            after_blank: true,
        }
    }
}

impl HtmlBlockTracker {
    pub(crate) fn in_block(&self) -> bool {
        self.open.is_some()
    }

    /// Drop any open block, as when its container ends.
    pub(crate) fn reset(&mut self) {
        self.open = None;
    }

    /// Feed one line of block content, with container markers removed.
    ///
    /// `may_start` is false for lines that cannot begin a block, such as
    /// lines inside fenced code.
    pub(crate) fn update(&mut self, line: &str, may_start: bool) {
        let blank = line.trim().is_empty();

        match self.open {
            Some(end) => {
                if closes(end, line, blank) {
                    self.open = None;
                }
            }
            None if may_start => {
                if let Some(end) = block_start(line, self.after_blank) {
                    // Comments and raw tags may close on their opening line
                    self.open = (!closes(end, line, blank)).then_some(end);
                }
            }
            None => {}
        }

        self.after_blank = blank;
    }
}

fn closes(end: End, line: &str, blank: bool) -> bool {
    match end {
        End::Contains(marker) => line.contains(marker),
        End::RawClose => {
            let lower = line.to_ascii_lowercase();
            RAW_TAGS.iter().any(|tag| lower.contains(&format!("</{tag}>")))
        }
        End::Blank => blank,
    }
}

/// End condition of the HTML block `line` opens, if it opens one.
fn block_start(line: &str, after_blank: bool) -> Option<End> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() >= 4 {
        return None;
    }
    let rest = trimmed.strip_prefix('<')?;

    if rest.starts_with("!--") {
        return Some(End::Contains("-->"));
    }
    if rest.starts_with('?') {
        return Some(End::Contains("?>"));
    }
    if rest.starts_with("![CDATA[") {
        return Some(End::Contains("]]>"));
    }
    if rest.strip_prefix('!').is_some_and(|s| s.starts_with(|c: char| c.is_ascii_alphabetic())) {
        return Some(End::Contains(">"));
    }

    let closing = rest.starts_with('/');
    let name_start = rest.strip_prefix('/').unwrap_or(rest);
    let name_len = name_start
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(name_start.len());
    let name = name_start[..name_len].to_ascii_lowercase();
    let after = &name_start[name_len..];
    if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let ends_name = after.is_empty() || after.starts_with([' ', '\t', '>']);
    if !closing && RAW_TAGS.contains(&name.as_str()) && ends_name {
        return Some(End::RawClose);
    }
    if BLOCK_TAGS.contains(&name.as_str()) && (ends_name || after.starts_with("/>")) {
        return Some(End::Blank);
    }

    // A lone complete tag cannot interrupt a paragraph
    let lone_tag = after.trim_end().ends_with('>') && !after.contains('<');
    let raw = RAW_TAGS.contains(&name.as_str());
    (after_blank && lone_tag && !raw && (ends_name || after.starts_with('/'))).then_some(End::Blank)
}
