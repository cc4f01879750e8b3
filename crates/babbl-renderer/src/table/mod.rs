//! Pipe table extension.
//!
//! Recognizes GitHub-style pipe tables:
//!
//! ```text
//! | Name | Age |
//! |:-----|----:|
//! | Ann  | 30  |
//! ```
//!
//! [`match_table`] matches a table at the start of a run of lines. The
//! [`TablePreprocessor`] applies it to a whole document before the markdown
//! parser runs, replacing each table with a placeholder comment that the tree
//! builder later swaps for a [`Table`] node. Tables are found at the top
//! level and inside blockquotes and list items, never inside fenced code or
//! raw HTML blocks. Cell text is kept literal.

mod fence;
mod html;
mod preprocessor;

pub use preprocessor::TablePreprocessor;

/// Column alignment declared by the separator row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// CSS `text-align` value, if the column declares one.
    #[must_use]
    pub fn as_css(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
        }
    }
}

/// A rectangular table of literal text cells.
///
/// Every row has exactly as many cells as there are headers: short rows are
/// padded with empty cells and long rows are truncated on construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    alignments: Vec<Alignment>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table, normalizing alignments and rows to the header width.
    #[must_use]
    pub fn new(headers: Vec<String>, mut alignments: Vec<Alignment>, mut rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        alignments.resize(width, Alignment::None);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self {
            headers,
            alignments,
            rows,
        }
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn alignments(&self) -> &[Alignment] {
        &self.alignments
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

/// A table matched at the start of a run of lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableMatch {
    pub table: Table,
    /// Lines consumed by the header, separator and data rows.
    pub consumed: usize,
}

/// Try to match a pipe table at the start of `lines`.
///
/// Requires a header row containing a pipe, followed by a separator row with
/// the same number of cells, each made of dashes with optional colons. Data
/// rows continue until a blank line or a line without a pipe. Returns `None`
/// when the lines do not start a table.
#[must_use]
pub fn match_table(lines: &[&str]) -> Option<TableMatch> {
    let (header, separator) = match lines {
        [header, separator, ..] => (*header, *separator),
        _ => return None,
    };

    if !starts_row(header) || !starts_row(separator) {
        return None;
    }

    let headers = split_row(header);
    let alignments = parse_separator(separator)?;
    if alignments.len() != headers.len() {
        return None;
    }

    let rows: Vec<Vec<String>> = lines[2..]
        .iter()
        .take_while(|line| !line.trim().is_empty() && line.contains('|'))
        .map(|line| split_row(line))
        .collect();
    let consumed = 2 + rows.len();

    Some(TableMatch {
        table: Table::new(headers, alignments, rows),
        consumed,
    })
}

/// Whether a line can be a header or separator row.
fn starts_row(line: &str) -> bool {
    indent_width(line) < 4 && line.contains('|')
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| matches!(c, ' ' | '\t'))
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Split a row into trimmed cells.
///
/// Leading and trailing pipes are optional. `\|` is a literal pipe inside a
/// cell; other backslashes are kept as written.
#[must_use]
pub fn split_row(line: &str) -> Vec<String> {
    let mut row = line.trim();
    row = row.strip_prefix('|').unwrap_or(row);
    if row.ends_with('|') && !row.ends_with("\\|") {
        row = &row[..row.len() - 1];
    }

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = row.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_owned()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_owned());
    cells
}

/// Parse a separator row into column alignments.
fn parse_separator(line: &str) -> Option<Vec<Alignment>> {
    split_row(line)
        .iter()
        .map(|cell| parse_separator_cell(cell))
        .collect()
}

fn parse_separator_cell(cell: &str) -> Option<Alignment> {
    let left = cell.starts_with(':');
    let body = cell.strip_prefix(':').unwrap_or(cell);
    let right = body.ends_with(':');
    let dashes = body.strip_suffix(':').unwrap_or(body);

    if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
        return None;
    }

    Some(match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|&c| c.to_owned()).collect()
    }

    #[test]
    fn test_match_basic_table() {
        let lines = ["| Name | Age |", "|------|-----|", "| Ann  | 30  |", "", "after"];

        let matched = match_table(&lines).unwrap();

        assert_eq!(matched.consumed, 3);
        assert_eq!(matched.table.headers(), strings(&["Name", "Age"]));
        assert_eq!(matched.table.rows(), [strings(&["Ann", "30"])]);
        assert_eq!(matched.table.alignments(), [Alignment::None, Alignment::None]);
    }

    #[test]
    fn test_match_without_outer_pipes() {
        let lines = ["a | b", "--- | ---", "1 | 2"];
        let matched = match_table(&lines).unwrap();
        assert_eq!(matched.table.headers(), strings(&["a", "b"]));
        assert_eq!(matched.table.rows(), [strings(&["1", "2"])]);
    }

    #[test]
    fn test_header_only_table() {
        let matched = match_table(&["| a |", "| - |"]).unwrap();
        assert_eq!(matched.consumed, 2);
        assert!(matched.table.rows().is_empty());
    }

    #[test]
    fn test_alignments() {
        let lines = ["| a | b | c | d |", "|:--|:-:|--:|---|"];
        let matched = match_table(&lines).unwrap();
        assert_eq!(
            matched.table.alignments(),
            [
                Alignment::Left,
                Alignment::Center,
                Alignment::Right,
                Alignment::None
            ]
        );
    }

    #[test]
    fn test_column_count_mismatch_is_no_match() {
        assert!(match_table(&["| a | b |", "|---|"]).is_none());
    }

    #[test]
    fn test_invalid_separator_is_no_match() {
        assert!(match_table(&["| a | b |", "| x | y |"]).is_none());
        assert!(match_table(&["| a |", "| : |"]).is_none());
        assert!(match_table(&["| a |", "|   |"]).is_none());
    }

    #[test]
    fn test_header_without_pipe_is_no_match() {
        assert!(match_table(&["Title", "---"]).is_none());
        assert!(match_table(&["a | b"]).is_none());
    }

    #[test]
    fn test_indented_header_is_no_match() {
        assert!(match_table(&["    | a | b |", "    |---|---|"]).is_none());
        assert!(match_table(&["   | a | b |", "   |---|---|"]).is_some());
    }

    #[test]
    fn test_rows_end_at_line_without_pipe() {
        let lines = ["| a |", "|---|", "| 1 |", "plain text", "| 2 |"];
        assert_eq!(match_table(&lines).unwrap().consumed, 3);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let lines = ["| a | b | c |", "|---|---|---|", "| 1 |"];
        let matched = match_table(&lines).unwrap();
        assert_eq!(matched.table.rows(), [strings(&["1", "", ""])]);
    }

    #[test]
    fn test_long_rows_are_truncated() {
        let lines = ["| a | b |", "|---|---|", "| 1 | 2 | 3 | 4 |"];
        let matched = match_table(&lines).unwrap();
        assert_eq!(matched.table.rows(), [strings(&["1", "2"])]);
    }

    #[test]
    fn test_split_row_escaped_pipe() {
        assert_eq!(split_row(r"| a \| b | c |"), strings(&["a | b", "c"]));
        assert_eq!(split_row(r"| a | b \|"), strings(&["a", "b |"]));
        assert_eq!(split_row(r"| C:\path | x |"), strings(&[r"C:\path", "x"]));
    }

    #[test]
    fn test_split_row_empty_cells() {
        assert_eq!(split_row("| | x |"), strings(&["", "x"]));
    }

    #[test]
    fn test_table_new_normalizes_alignments() {
        let table = Table::new(strings(&["a", "b"]), vec![Alignment::Right], vec![]);
        assert_eq!(table.alignments(), [Alignment::Right, Alignment::None]);
        assert_eq!(table.width(), 2);
    }

    #[test]
    fn test_alignment_css() {
        assert_eq!(Alignment::Center.as_css(), Some("center"));
        assert_eq!(Alignment::None.as_css(), None);
    }
}
