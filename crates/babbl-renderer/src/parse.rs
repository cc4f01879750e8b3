//! Markdown to [`Node`] tree.
//!
//! Block and inline grammar come from pulldown-cmark. Tables are lifted out
//! beforehand by the [`TablePreprocessor`] and spliced back in where their
//! placeholder HTML block appears.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, LinkType, Options, Parser, Tag};

use crate::node::Node;
use crate::table::TablePreprocessor;

/// Parser extensions enabled on top of `CommonMark`.
fn parser_options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES
}

/// Parse markdown into a [`Node::Document`].
///
/// ```
/// use babbl_renderer::{Node, parse_document};
///
/// let doc = parse_document("# Title\n");
/// assert!(matches!(&doc.children()[0], Node::Heading { level: 1, .. }));
/// ```
#[must_use]
pub fn parse_document(markdown: &str) -> Node {
    let mut preprocessor = TablePreprocessor::new();
    let source = preprocessor.process(markdown);

    let parser = Parser::new_ext(&source, parser_options());

    let mut definitions: Vec<(usize, Node)> = parser
        .reference_definitions()
        .iter()
        .map(|(label, def)| {
            let node = Node::LinkRefDef {
                label: label.to_owned(),
                dest: def.dest.to_string(),
                title: def.title.as_ref().map(ToString::to_string),
            };
            (def.span.start, node)
        })
        .collect();
    definitions.sort_by_key(|(start, _)| *start);

    let mut builder = TreeBuilder::new(preprocessor, definitions);
    for (event, range) in parser.into_offset_iter() {
        builder.event(event, range);
    }
    builder.finish()
}

/// Node under construction.
#[derive(Debug)]
enum Pending {
    Document,
    Paragraph,
    Heading(u8),
    List { ordered: bool, start: u64 },
    Item,
    Quote,
    FencedCode(Option<String>),
    IndentedCode,
    HtmlBlock,
    Emphasis,
    Strong,
    Link { dest: String, title: Option<String> },
    AutoLink { dest: String },
    Image { dest: String, title: Option<String> },
    TableHead,
    TableRow,
    TableCell,
    Other { kind: &'static str, inline: bool },
}

#[derive(Debug)]
struct Frame {
    pending: Pending,
    children: Vec<Node>,
    /// Raw text for code and HTML blocks.
    text: String,
}

impl Frame {
    fn new(pending: Pending) -> Self {
        Self {
            pending,
            children: Vec::new(),
            text: String::new(),
        }
    }

    fn collects_text(&self) -> bool {
        matches!(
            self.pending,
            Pending::FencedCode(_) | Pending::IndentedCode | Pending::HtmlBlock
        )
    }
}

/// Builds a [`Node`] tree from pulldown-cmark events.
struct TreeBuilder {
    stack: Vec<Frame>,
    /// Holds the tables whose placeholders are still to come.
    tables: TablePreprocessor,
    /// Link reference definitions not yet placed, sorted by source offset.
    definitions: std::vec::IntoIter<(usize, Node)>,
    next_definition: Option<(usize, Node)>,
}

impl TreeBuilder {
    fn new(tables: TablePreprocessor, definitions: Vec<(usize, Node)>) -> Self {
        let mut definitions = definitions.into_iter();
        let next_definition = definitions.next();
        Self {
            stack: vec![Frame::new(Pending::Document)],
            tables,
            definitions,
            next_definition,
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        if self.stack.len() == 1 {
            self.place_definitions(range.start);
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push(Node::CodeSpan {
                code: code.into_string(),
            }),
            Event::Html(html) => self.html(&html),
            Event::InlineHtml(html) => self.push(Node::InlineHtml {
                raw: html.into_string(),
            }),
            Event::SoftBreak => self.push(Node::LineBreak { soft: true }),
            Event::HardBreak => self.push(Node::LineBreak { soft: false }),
            Event::Rule => self.push(Node::ThematicBreak),
            Event::TaskListMarker(checked) => self.text(if checked { "[x] " } else { "[ ] " }),
            Event::FootnoteReference(label) => self.push(Node::Other {
                kind: "footnote-reference".to_owned(),
                inline: true,
                children: vec![Node::text(label.into_string())],
            }),
            Event::InlineMath(math) | Event::DisplayMath(math) => self.push(Node::Other {
                kind: "math".to_owned(),
                inline: true,
                children: vec![Node::text(math.into_string())],
            }),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let pending = match tag {
            Tag::Paragraph => Pending::Paragraph,
            Tag::Heading { level, .. } => Pending::Heading(heading_level(level)),
            Tag::BlockQuote(_) => Pending::Quote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => Pending::FencedCode(fence_language(&info)),
            Tag::CodeBlock(CodeBlockKind::Indented) => Pending::IndentedCode,
            Tag::HtmlBlock => Pending::HtmlBlock,
            Tag::List(start) => Pending::List {
                ordered: start.is_some(),
                start: start.unwrap_or(1),
            },
            Tag::Item => Pending::Item,
            Tag::Emphasis => Pending::Emphasis,
            Tag::Strong => Pending::Strong,
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => match link_type {
                LinkType::Autolink => Pending::AutoLink {
                    dest: dest_url.into_string(),
                },
                LinkType::Email => Pending::AutoLink {
                    dest: format!("mailto:{dest_url}"),
                },
                _ => Pending::Link {
                    dest: dest_url.into_string(),
                    title: non_empty(&title),
                },
            },
            Tag::Image { dest_url, title, .. } => Pending::Image {
                dest: dest_url.into_string(),
                title: non_empty(&title),
            },
            Tag::TableHead => Pending::TableHead,
            Tag::TableRow => Pending::TableRow,
            Tag::TableCell => Pending::TableCell,
            Tag::Table(_) => Pending::Other {
                kind: "table",
                inline: false,
            },
            Tag::Strikethrough => Pending::Other {
                kind: "strikethrough",
                inline: true,
            },
            Tag::Superscript => Pending::Other {
                kind: "superscript",
                inline: true,
            },
            Tag::Subscript => Pending::Other {
                kind: "subscript",
                inline: true,
            },
            Tag::FootnoteDefinition(_) => Pending::Other {
                kind: "footnote-definition",
                inline: false,
            },
            Tag::DefinitionList => Pending::Other {
                kind: "definition-list",
                inline: false,
            },
            Tag::DefinitionListTitle => Pending::Other {
                kind: "definition-title",
                inline: false,
            },
            Tag::DefinitionListDefinition => Pending::Other {
                kind: "definition",
                inline: false,
            },
            Tag::MetadataBlock(_) => Pending::Other {
                kind: "metadata",
                inline: false,
            },
        };
        self.stack.push(Frame::new(pending));
    }

    fn end(&mut self) {
        // The document frame is never closed by an event
        if self.stack.len() < 2 {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            let node = self.complete(frame);
            self.push(node);
        }
    }

    fn complete(&mut self, frame: Frame) -> Node {
        let Frame {
            pending,
            children,
            text,
        } = frame;

        match pending {
            Pending::Document => Node::Document { children },
            Pending::Paragraph => Node::Paragraph {
                tight: false,
                children,
            },
            Pending::Heading(level) => Node::Heading { level, children },
            Pending::List { ordered, start } => Node::List {
                ordered,
                start,
                children,
            },
            Pending::Item => Node::ListItem {
                children: group_tight_paragraphs(children),
            },
            Pending::Quote => Node::Quote { children },
            Pending::FencedCode(lang) => Node::FencedCode { lang, code: text },
            Pending::IndentedCode => Node::CodeBlock { code: text },
            Pending::HtmlBlock => self.html_block(text),
            Pending::Emphasis => Node::Emphasis { children },
            Pending::Strong => Node::StrongEmphasis { children },
            Pending::Link { dest, title } => Node::Link {
                dest,
                title,
                children,
            },
            Pending::AutoLink { dest } => Node::AutoLink { dest, children },
            Pending::Image { dest, title } => Node::Image {
                dest,
                title,
                children,
            },
            Pending::TableHead => Node::TableHead { children },
            Pending::TableRow => Node::TableRow { children },
            Pending::TableCell => Node::TableCell {
                header: self
                    .stack
                    .iter()
                    .any(|frame| matches!(frame.pending, Pending::TableHead)),
                children,
            },
            Pending::Other { kind, inline } => Node::Other {
                kind: kind.to_owned(),
                inline,
                children,
            },
        }
    }

    /// Swap a table placeholder for its table; other HTML passes through.
    fn html_block(&mut self, body: String) -> Node {
        match self.tables.take_table(&body) {
            Some(table) => Node::Table(table),
            None => Node::HtmlBlock { body },
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(frame) = self.stack.last_mut()
            && frame.collects_text()
        {
            frame.text.push_str(text);
            return;
        }
        if let Some(Node::RawText { text: previous }) = self.current_children().last_mut() {
            previous.push_str(text);
            return;
        }
        self.push(Node::text(text));
    }

    fn html(&mut self, html: &str) {
        if let Some(frame) = self.stack.last_mut()
            && frame.collects_text()
        {
            frame.text.push_str(html);
        } else {
            self.push(Node::HtmlBlock {
                body: html.to_owned(),
            });
        }
    }

    fn push(&mut self, node: Node) {
        self.current_children().push(node);
    }

    fn current_children(&mut self) -> &mut Vec<Node> {
        // The document frame is only removed by finish()
        let last = self.stack.len() - 1;
        &mut self.stack[last].children
    }

    /// Place link reference definitions that start before `offset`.
    fn place_definitions(&mut self, offset: usize) {
        while let Some((start, _)) = &self.next_definition
            && *start < offset
        {
            if let Some((_, node)) = self.next_definition.take() {
                self.push(node);
            }
            self.next_definition = self.definitions.next();
        }
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.end();
        }
        self.place_definitions(usize::MAX);
        match self.stack.pop() {
            Some(frame) => self.complete(frame),
            None => Node::Document {
                children: Vec::new(),
            },
        }
    }
}

/// Wrap runs of inline content in a list item into tight paragraphs.
///
/// Tight list items carry their text directly; loose ones already hold
/// paragraphs.
fn group_tight_paragraphs(children: Vec<Node>) -> Vec<Node> {
    let mut grouped = Vec::with_capacity(children.len());
    let mut inline = Vec::new();

    for child in children {
        if child.is_inline() {
            inline.push(child);
            continue;
        }
        if !inline.is_empty() {
            grouped.push(Node::Paragraph {
                tight: true,
                children: std::mem::take(&mut inline),
            });
        }
        grouped.push(child);
    }
    if !inline.is_empty() {
        grouped.push(Node::Paragraph {
            tight: true,
            children: inline,
        });
    }

    grouped
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// First word of a fence info string.
fn fence_language(info: &str) -> Option<String> {
    info.split_whitespace()
        .next()
        .map(|lang| lang.trim_start_matches('{').trim_end_matches('}'))
        .filter(|lang| !lang.is_empty())
        .map(ToOwned::to_owned)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}
