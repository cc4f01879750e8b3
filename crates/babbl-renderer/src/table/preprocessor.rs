//! Table preprocessor.
//!
//! Swaps pipe tables for `<!--babbl-table:N-->` comment lines. The markdown
//! parser passes a comment through as an HTML block, so a table can never be
//! folded into the surrounding paragraph.

use super::fence::FenceTracker;
use super::html::HtmlBlockTracker;
use super::{Table, match_table};

const MARKER_NAME: &str = "babbl-table";
const PLACEHOLDER_SUFFIX: &str = "-->";

/// Extracts pipe tables from markdown source.
///
/// # Example
///
/// ```
/// use babbl_renderer::TablePreprocessor;
///
/// let mut preprocessor = TablePreprocessor::new();
/// let output = preprocessor.process("Intro\n| a | b |\n|---|---|\n| 1 | 2 |\n");
///
/// assert_eq!(output, "Intro\n<!--babbl-table:0-->\n");
/// assert!(preprocessor.take_table("<!--babbl-table:0-->").is_some());
/// ```
#[derive(Debug, Default)]
pub struct TablePreprocessor {
    fence: FenceTracker,
    html: HtmlBlockTracker,
    /// Quote depth at which the open fence or HTML block started.
    open_depth: usize,
    /// Placeholder start, chosen so the source never contains it.
    prefix: String,
    tables: Vec<Option<Table>>,
}

impl TablePreprocessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every table outside fenced code and raw HTML with a
    /// placeholder line.
    ///
    /// The placeholder keeps the header row's blockquote markers and
    /// indentation so tables nested in quotes and list items stay in their
    /// container. The placeholder marker is picked on the first call.
    #[must_use]
    pub fn process(&mut self, input: &str) -> String {
        if self.prefix.is_empty() {
            self.prefix = unused_prefix(input);
        }

        let mut output = String::with_capacity(input.len());
        let lines: Vec<&str> = input.lines().collect();

        let mut idx = 0;
        while idx < lines.len() {
            idx += self.scan_line(&lines[idx..], &mut output);

            // Preserve the final line ending only if the input had one
            if idx < lines.len() || input.ends_with('\n') {
                output.push('\n');
            }
        }

        output
    }

    /// Copy or replace the block starting at `lines[0]`. Returns the number
    /// of lines consumed.
    fn scan_line(&mut self, lines: &[&str], output: &mut String) -> usize {
        let line = lines[0];
        let in_block = self.fence.in_fence() || self.html.in_block();
        let limit = if in_block { self.open_depth } else { usize::MAX };
        let (depth, content) = strip_quotes(line, limit);

        // Fences and HTML blocks never continue lazily past their quote
        if in_block && depth < self.open_depth {
            self.fence.reset();
            self.html.reset();
        }

        if self.fence.in_fence() {
            self.fence.update(content);
            self.html.update(content, false);
        } else if self.html.in_block() {
            self.html.update(content, true);
        } else if self.fence.update(content) {
            self.open_depth = depth;
            self.html.update(content, false);
        } else {
            self.html.update(content, true);
            if self.html.in_block() {
                self.open_depth = depth;
            } else if let Some(consumed) = self.replace_table(lines, depth, output) {
                return consumed;
            }
        }

        output.push_str(line);
        1
    }

    /// Emit a placeholder if a table starts at `lines[0]` at quote `depth`.
    fn replace_table(&mut self, lines: &[&str], depth: usize, output: &mut String) -> Option<usize> {
        let block: Vec<&str> = lines
            .iter()
            .map_while(|line| {
                let (level, content) = strip_quotes(line, depth);
                (level == depth).then_some(content)
            })
            .collect();
        let matched = match_table(&block)?;

        let line = lines[0];
        let content = block[0];
        let container = &line[..line.len() - content.len()];
        let indent = &content[..content.len() - content.trim_start().len()];
        output.push_str(container);
        output.push_str(indent);
        output.push_str(&self.placeholder(self.tables.len()));
        self.tables.push(Some(matched.table));

        Some(matched.consumed)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("{}{index}{PLACEHOLDER_SUFFIX}", self.prefix)
    }

    /// Number of tables extracted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Take the table an HTML block stands for, if the block is one of this
    /// preprocessor's placeholders. Each table can be taken once.
    pub fn take_table(&mut self, html: &str) -> Option<Table> {
        let index: usize = html
            .trim()
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(PLACEHOLDER_SUFFIX)?
            .parse()
            .ok()?;
        self.tables.get_mut(index)?.take()
    }

    /// Consume the preprocessor and return the tables not yet taken, in
    /// document order.
    #[must_use]
    pub fn into_tables(self) -> Vec<Table> {
        self.tables.into_iter().flatten().collect()
    }
}

/// First placeholder prefix that does not occur anywhere in `input`.
fn unused_prefix(input: &str) -> String {
    let mut prefix = format!("<!--{MARKER_NAME}:");
    let mut attempt = 0usize;
    while input.contains(&prefix) {
        attempt += 1;
        prefix = format!("<!--{MARKER_NAME}-{attempt}:");
    }
    prefix
}

/// Strip up to `limit` blockquote markers from the start of `line`.
///
/// Each marker is up to three spaces, `>` and one optional space. Returns the
/// number of markers removed and the rest of the line.
fn strip_quotes(line: &str, limit: usize) -> (usize, &str) {
    let mut rest = line;
    let mut depth = 0;
    while depth < limit {
        let unindented = rest.trim_start_matches(' ');
        if rest.len() - unindented.len() > 3 {
            break;
        }
        let Some(after) = unindented.strip_prefix('>') else {
            break;
        };
        rest = after.strip_prefix(' ').unwrap_or(after);
        depth += 1;
    }
    (depth, rest)
}
