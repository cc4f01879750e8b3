//! Inline frontmatter extraction.

use serde_json::Value;

use crate::Frontmatter;

/// Delimiter line that opens and closes a frontmatter block.
const DELIMITER: &str = "---";

/// Split a leading frontmatter block from markdown content.
///
/// The block must start on the first line with a line consisting of exactly
/// `---` (trailing whitespace allowed) and ends at the next such line.
///
/// Returns `(None, content)` unchanged when there is no block, when the block
/// is unterminated, or when its YAML does not parse into a mapping. An empty
/// block yields an empty mapping.
#[must_use]
pub fn extract_frontmatter(content: &str) -> (Option<Frontmatter>, &str) {
    let Some((block, body_start)) = find_block(content) else {
        return (None, content);
    };

    match parse_block(block) {
        Some(frontmatter) => (Some(frontmatter), &content[body_start..]),
        None => {
            tracing::debug!("frontmatter block is not a valid YAML mapping, treating as content");
            (None, content)
        }
    }
}

/// Locate the frontmatter block.
///
/// Returns the text between the delimiter lines and the byte offset where
/// the body starts.
fn find_block(content: &str) -> Option<(&str, usize)> {
    let mut lines = LineCursor::new(content);

    let (first, _) = lines.next_line()?;
    if !is_delimiter(first) {
        return None;
    }
    let block_start = lines.offset;

    while let Some((line, line_start)) = lines.next_line() {
        if is_delimiter(line) {
            let block = content[block_start..line_start].trim_end_matches(['\n', '\r']);
            return Some((block, lines.offset));
        }
    }

    None
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

fn parse_block(block: &str) -> Option<Frontmatter> {
    if block.trim().is_empty() {
        return Some(Frontmatter::new());
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(block).ok()?;
    match serde_json::to_value(yaml).ok()? {
        Value::Object(map) => Some(map),
        Value::Null => Some(Frontmatter::new()),
        _ => None,
    }
}

/// Iterates lines together with their starting byte offsets.
struct LineCursor<'a> {
    content: &'a str,
    offset: usize,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str) -> Self {
        Self { content, offset: 0 }
    }

    /// Next line without its terminator, and the offset it started at.
    fn next_line(&mut self) -> Option<(&'a str, usize)> {
        if self.offset >= self.content.len() {
            return None;
        }
        let start = self.offset;
        let rest = &self.content[start..];
        let (line, advance) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], pos + 1),
            None => (rest, rest.len()),
        };
        self.offset += advance;
        Some((line.strip_suffix('\r').unwrap_or(line), start))
    }
}
