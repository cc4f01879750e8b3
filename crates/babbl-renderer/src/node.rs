//! Document tree.

use crate::table::Table;

/// A node in a parsed markdown document.
///
/// Container variants own their children in document order. Leaf variants
/// own their raw text.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Root of a document.
    Document { children: Vec<Node> },
    /// Paragraph. Tight paragraphs (list item text without blank-line
    /// separation) render without a wrapping element.
    Paragraph { tight: bool, children: Vec<Node> },
    Heading { level: u8, children: Vec<Node> },
    List {
        ordered: bool,
        start: u64,
        children: Vec<Node>,
    },
    ListItem { children: Vec<Node> },
    Quote { children: Vec<Node> },
    /// Fenced code with an optional language from the info string.
    FencedCode { lang: Option<String>, code: String },
    /// Indented code.
    CodeBlock { code: String },
    /// Raw HTML block, passed through unescaped.
    HtmlBlock { body: String },
    ThematicBreak,
    BlankLine,
    /// Link reference definition. Renders nothing.
    LinkRefDef {
        label: String,
        dest: String,
        title: Option<String>,
    },

    Emphasis { children: Vec<Node> },
    StrongEmphasis { children: Vec<Node> },
    /// Raw inline HTML, passed through unescaped.
    InlineHtml { raw: String },
    /// Inline container without markup of its own.
    PlainText { children: Vec<Node> },
    Link {
        dest: String,
        title: Option<String>,
        children: Vec<Node>,
    },
    AutoLink { dest: String, children: Vec<Node> },
    /// Image. Children are the alt text.
    Image {
        dest: String,
        title: Option<String>,
        children: Vec<Node>,
    },
    RawText { text: String },
    LineBreak { soft: bool },
    CodeSpan { code: String },

    /// Pipe table with literal cells.
    Table(Table),
    TableHead { children: Vec<Node> },
    TableBody { children: Vec<Node> },
    TableRow { children: Vec<Node> },
    TableCell { header: bool, children: Vec<Node> },

    /// Construct without a dedicated rendering rule, such as strikethrough or
    /// a footnote definition. Renders its children in a generic wrapper.
    Other {
        kind: String,
        inline: bool,
        children: Vec<Node>,
    },
}

impl Node {
    /// Shorthand for a text leaf.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::RawText { text: text.into() }
    }

    /// Child nodes. Leaves have none.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Document { children }
            | Self::Paragraph { children, .. }
            | Self::Heading { children, .. }
            | Self::List { children, .. }
            | Self::ListItem { children }
            | Self::Quote { children }
            | Self::Emphasis { children }
            | Self::StrongEmphasis { children }
            | Self::PlainText { children }
            | Self::Link { children, .. }
            | Self::AutoLink { children, .. }
            | Self::Image { children, .. }
            | Self::TableHead { children }
            | Self::TableBody { children }
            | Self::TableRow { children }
            | Self::TableCell { children, .. }
            | Self::Other { children, .. } => children,
            Self::FencedCode { .. }
            | Self::CodeBlock { .. }
            | Self::HtmlBlock { .. }
            | Self::ThematicBreak
            | Self::BlankLine
            | Self::LinkRefDef { .. }
            | Self::InlineHtml { .. }
            | Self::RawText { .. }
            | Self::LineBreak { .. }
            | Self::CodeSpan { .. }
            | Self::Table(_) => &[],
        }
    }

    /// Whether the node is inline content.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        match self {
            Self::Emphasis { .. }
            | Self::StrongEmphasis { .. }
            | Self::InlineHtml { .. }
            | Self::PlainText { .. }
            | Self::Link { .. }
            | Self::AutoLink { .. }
            | Self::Image { .. }
            | Self::RawText { .. }
            | Self::LineBreak { .. }
            | Self::CodeSpan { .. } => true,
            Self::Other { inline, .. } => *inline,
            _ => false,
        }
    }

    /// Whether this is a tight paragraph.
    #[must_use]
    pub fn is_tight_paragraph(&self) -> bool {
        matches!(self, Self::Paragraph { tight: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children() {
        let node = Node::Emphasis {
            children: vec![Node::text("a")],
        };
        assert_eq!(node.children(), [Node::text("a")]);
        assert!(Node::text("a").children().is_empty());
    }

    #[test]
    fn test_is_inline() {
        assert!(Node::text("a").is_inline());
        assert!(Node::LineBreak { soft: true }.is_inline());
        assert!(!Node::ThematicBreak.is_inline());
        assert!(
            Node::Other {
                kind: "strikethrough".to_owned(),
                inline: true,
                children: vec![],
            }
            .is_inline()
        );
    }

    #[test]
    fn test_is_tight_paragraph() {
        let tight = Node::Paragraph {
            tight: true,
            children: vec![],
        };
        let loose = Node::Paragraph {
            tight: false,
            children: vec![],
        };
        assert!(tight.is_tight_paragraph());
        assert!(!loose.is_tight_paragraph());
    }
}
