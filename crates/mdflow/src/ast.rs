//! An owned block tree built from the pulldown-cmark event stream.
//!
//! pulldown-cmark hands out a flat stream of start/end events. Widgets want nested blocks
//! (a quote owns its paragraphs, a list owns its items), so [`build_document`] folds the
//! stream into [`MarkdownDocument`] once per `set_text`.

use std::collections::HashSet;

use pulldown_cmark::Alignment;
use pulldown_cmark::BlockQuoteKind;
use pulldown_cmark::CodeBlockKind;
use pulldown_cmark::CowStr;
use pulldown_cmark::Event;
use pulldown_cmark::HeadingLevel;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;

/// A parsed markdown document: the top-level blocks in source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkdownDocument {
    pub blocks: Vec<MarkdownBlock>,
}

impl MarkdownDocument {
    pub fn iter(&self) -> std::slice::Iter<'_, MarkdownBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Heading anchors in document order (including headings nested in quotes and lists).
    pub fn heading_ids(&self) -> Vec<&str> {
        fn walk<'a>(blocks: &'a [MarkdownBlock], out: &mut Vec<&'a str>) {
            for block in blocks {
                match block {
                    MarkdownBlock::Heading(h) => out.extend(h.id.as_deref()),
                    MarkdownBlock::Quote(q) => walk(&q.children, out),
                    MarkdownBlock::List(l) => {
                        for item in &l.items {
                            walk(&item.children, out);
                        }
                    }
                    MarkdownBlock::FootnoteDefinition(f) => walk(&f.children, out),
                    MarkdownBlock::DefinitionList(d) => {
                        for item in &d.items {
                            if let DefinitionItem::Definition(children) = item {
                                walk(children, out);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.blocks, &mut out);
        out
    }
}

impl<'a> IntoIterator for &'a MarkdownDocument {
    type Item = &'a MarkdownBlock;
    type IntoIter = std::slice::Iter<'a, MarkdownBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MarkdownBlock {
    Heading(HeadingBlock),
    Paragraph(ParagraphBlock),
    Quote(QuoteBlock),
    FencedCode(CodeBlock),
    IndentedCode(CodeBlock),
    Table(TableBlock),
    List(ListBlock),
    Html(HtmlBlock),
    ThematicBreak,
    FootnoteDefinition(FootnoteDefinitionBlock),
    DefinitionList(DefinitionListBlock),
    /// Front matter, only produced when the pipeline enables metadata blocks.
    Metadata(String),
}

impl MarkdownBlock {
    /// Stable type name, used by placeholders and log lines.
    pub fn kind_name(&self) -> &'static str {
        match self {
            MarkdownBlock::Heading(_) => "Heading",
            MarkdownBlock::Paragraph(_) => "Paragraph",
            MarkdownBlock::Quote(_) => "Quote",
            MarkdownBlock::FencedCode(_) => "FencedCode",
            MarkdownBlock::IndentedCode(_) => "IndentedCode",
            MarkdownBlock::Table(_) => "Table",
            MarkdownBlock::List(_) => "List",
            MarkdownBlock::Html(_) => "Html",
            MarkdownBlock::ThematicBreak => "ThematicBreak",
            MarkdownBlock::FootnoteDefinition(_) => "FootnoteDefinition",
            MarkdownBlock::DefinitionList(_) => "DefinitionList",
            MarkdownBlock::Metadata(_) => "Metadata",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeadingBlock {
    /// 1..=6
    pub level: u8,
    /// Explicit `{#id}` attribute, or the generated identifier when auto identifiers are on.
    pub id: Option<String>,
    pub inline: Vec<Inline>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphBlock {
    pub inline: Vec<Inline>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl QuoteKind {
    pub fn title(self) -> &'static str {
        match self {
            QuoteKind::Note => "Note",
            QuoteKind::Tip => "Tip",
            QuoteKind::Important => "Important",
            QuoteKind::Warning => "Warning",
            QuoteKind::Caution => "Caution",
        }
    }
}

impl From<BlockQuoteKind> for QuoteKind {
    fn from(value: BlockQuoteKind) -> Self {
        match value {
            BlockQuoteKind::Note => QuoteKind::Note,
            BlockQuoteKind::Tip => QuoteKind::Tip,
            BlockQuoteKind::Important => QuoteKind::Important,
            BlockQuoteKind::Warning => QuoteKind::Warning,
            BlockQuoteKind::Caution => QuoteKind::Caution,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuoteBlock {
    /// GFM alert kind (`> [!NOTE]`), when present.
    pub kind: Option<QuoteKind>,
    pub children: Vec<MarkdownBlock>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    /// Source lines with tabs expanded and no trailing empty line.
    pub lines: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColumnAlign {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl From<Alignment> for ColumnAlign {
    fn from(value: Alignment) -> Self {
        match value {
            Alignment::None => ColumnAlign::None,
            Alignment::Left => ColumnAlign::Left,
            Alignment::Center => ColumnAlign::Center,
            Alignment::Right => ColumnAlign::Right,
        }
    }
}

/// A cell is a run of inline content.
pub type TableCell = Vec<Inline>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableBlock {
    pub aligns: Vec<ColumnAlign>,
    pub head: Vec<TableCell>,
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListBlock {
    /// First number of an ordered list; `None` for bullet lists.
    pub start: Option<u64>,
    pub items: Vec<ListItemBlock>,
}

impl ListBlock {
    pub fn is_ordered(&self) -> bool {
        self.start.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListItemBlock {
    /// `Some(checked)` for task-list items.
    pub task: Option<bool>,
    pub children: Vec<MarkdownBlock>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HtmlBlock {
    pub raw: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FootnoteDefinitionBlock {
    pub label: String,
    pub children: Vec<MarkdownBlock>,
}

/// Terms and their definitions, in source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefinitionListBlock {
    pub items: Vec<DefinitionItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DefinitionItem {
    Title(Vec<Inline>),
    Definition(Vec<MarkdownBlock>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        dest: String,
        title: String,
        children: Vec<Inline>,
    },
    Image {
        dest: String,
        title: String,
        alt: Vec<Inline>,
    },
    SoftBreak,
    HardBreak,
    Html(String),
    FootnoteReference(String),
    Math {
        tex: String,
        display: bool,
    },
}

impl Inline {
    /// Text content with all formatting dropped; breaks become spaces.
    pub fn plain_text(inlines: &[Inline]) -> String {
        fn walk(inlines: &[Inline], out: &mut String) {
            for inline in inlines {
                match inline {
                    Inline::Text(s) | Inline::Code(s) => out.push_str(s),
                    Inline::Math { tex, .. } => out.push_str(tex),
                    Inline::Emphasis(c) | Inline::Strong(c) | Inline::Strikethrough(c) => {
                        walk(c, out)
                    }
                    Inline::Link { children, .. } => walk(children, out),
                    Inline::Image { alt, .. } => walk(alt, out),
                    Inline::SoftBreak | Inline::HardBreak => out.push(' '),
                    Inline::Html(_) | Inline::FootnoteReference(_) => {}
                }
            }
        }
        let mut out = String::new();
        walk(inlines, &mut out);
        out
    }
}

/// How heading identifiers are generated when the source doesn't give one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AutoIdentifiers {
    None,
    /// GitHub-style slugs: `## Hello, World!` -> `hello-world`.
    #[default]
    GitHub,
}

/// GitHub-style slug for heading text.
///
/// Lowercases, keeps alphanumerics, `-` and `_`, turns spaces into `-`, and drops
/// everything else.
pub fn github_slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            out.extend(ch.to_lowercase());
        } else if ch == ' ' {
            out.push('-');
        }
    }
    out
}

#[derive(Debug, Default)]
struct IdRegistry {
    used: HashSet<String>,
}

impl IdRegistry {
    fn claim(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "section" } else { base };
        let mut candidate = base.to_string();
        let mut n = 0usize;
        while self.used.contains(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

enum Container {
    Quote {
        kind: Option<QuoteKind>,
        children: Vec<MarkdownBlock>,
    },
    List {
        start: Option<u64>,
        items: Vec<ListItemBlock>,
    },
    Item(ListItemBlock),
    Footnote {
        label: String,
        children: Vec<MarkdownBlock>,
    },
    DefinitionList {
        items: Vec<DefinitionItem>,
    },
    Definition(Vec<MarkdownBlock>),
}

enum Leaf {
    /// `implicit` paragraphs wrap the bare text of tight list items.
    Paragraph { implicit: bool },
    Heading { level: u8, id: Option<String> },
    DefinitionTitle,
}

enum FrameKind {
    Emphasis,
    Strong,
    Strikethrough,
    Link { dest: String, title: String },
    Image { dest: String, title: String },
}

struct InlineFrame {
    kind: FrameKind,
    children: Vec<Inline>,
}

struct CodeLeaf {
    fenced: bool,
    language: Option<String>,
    text: String,
}

#[derive(Default)]
struct TableLeaf {
    aligns: Vec<ColumnAlign>,
    head: Vec<TableCell>,
    rows: Vec<Vec<TableCell>>,
    row: Vec<TableCell>,
    cell: Option<TableCell>,
}

struct Builder {
    root: Vec<MarkdownBlock>,
    containers: Vec<Container>,
    leaf: Option<Leaf>,
    leaf_inline: Vec<Inline>,
    frames: Vec<InlineFrame>,
    code: Option<CodeLeaf>,
    html: Option<String>,
    metadata: Option<String>,
    table: Option<TableLeaf>,
    auto_identifiers: AutoIdentifiers,
    ids: IdRegistry,
}

impl Builder {
    fn new(auto_identifiers: AutoIdentifiers) -> Self {
        Self {
            root: Vec::new(),
            containers: Vec::new(),
            leaf: None,
            leaf_inline: Vec::new(),
            frames: Vec::new(),
            code: None,
            html: None,
            metadata: None,
            table: None,
            auto_identifiers,
            ids: IdRegistry::default(),
        }
    }

    fn children_mut(&mut self) -> &mut Vec<MarkdownBlock> {
        for container in self.containers.iter_mut().rev() {
            match container {
                Container::Quote { children, .. } | Container::Footnote { children, .. } => {
                    return children;
                }
                Container::Item(item) => return &mut item.children,
                Container::Definition(children) => return children,
                Container::List { .. } | Container::DefinitionList { .. } => {}
            }
        }
        &mut self.root
    }

    fn push_block(&mut self, block: MarkdownBlock) {
        self.close_implicit_paragraph();
        self.children_mut().push(block);
    }

    fn close_implicit_paragraph(&mut self) {
        if matches!(self.leaf, Some(Leaf::Paragraph { implicit: true })) {
            self.finish_leaf();
        }
    }

    fn start_leaf(&mut self, leaf: Leaf) {
        self.close_implicit_paragraph();
        self.leaf = Some(leaf);
        self.leaf_inline.clear();
    }

    fn finish_leaf(&mut self) {
        let Some(leaf) = self.leaf.take() else {
            return;
        };
        // Unbalanced frames can't happen with pulldown-cmark, but keep their content.
        while !self.frames.is_empty() {
            self.close_frame();
        }
        let inline = std::mem::take(&mut self.leaf_inline);
        let block = match leaf {
            Leaf::Paragraph { .. } => MarkdownBlock::Paragraph(ParagraphBlock { inline }),
            Leaf::Heading { level, id } => {
                let id = match (id, self.auto_identifiers) {
                    (Some(explicit), _) => Some(self.ids.claim(&explicit)),
                    (None, AutoIdentifiers::GitHub) => {
                        Some(self.ids.claim(&github_slug(&Inline::plain_text(&inline))))
                    }
                    (None, AutoIdentifiers::None) => None,
                };
                MarkdownBlock::Heading(HeadingBlock { level, id, inline })
            }
            Leaf::DefinitionTitle => {
                if let Some(Container::DefinitionList { items }) = self.containers.last_mut() {
                    items.push(DefinitionItem::Title(inline));
                }
                return;
            }
        };
        self.children_mut().push(block);
    }

    fn push_inline(&mut self, inline: Inline) {
        let target = if let Some(frame) = self.frames.last_mut() {
            &mut frame.children
        } else if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
            cell
        } else {
            if self.leaf.is_none() {
                self.leaf = Some(Leaf::Paragraph { implicit: true });
            }
            &mut self.leaf_inline
        };
        push_merged(target, inline);
    }

    fn close_frame(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let inline = match frame.kind {
            FrameKind::Emphasis => Inline::Emphasis(frame.children),
            FrameKind::Strong => Inline::Strong(frame.children),
            FrameKind::Strikethrough => Inline::Strikethrough(frame.children),
            FrameKind::Link { dest, title } => Inline::Link {
                dest,
                title,
                children: frame.children,
            },
            FrameKind::Image { dest, title } => Inline::Image {
                dest,
                title,
                alt: frame.children,
            },
        };
        self.push_inline(inline);
    }

    fn open_frame(&mut self, kind: FrameKind) {
        self.frames.push(InlineFrame {
            kind,
            children: Vec::new(),
        });
    }

    fn push_text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.text.push_str(text);
        } else if let Some(html) = self.html.as_mut() {
            html.push_str(text);
        } else if let Some(meta) = self.metadata.as_mut() {
            meta.push_str(text);
        } else {
            self.push_inline(Inline::Text(text.to_string()));
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.start_leaf(Leaf::Paragraph { implicit: false }),
            Tag::Heading { level, id, .. } => self.start_leaf(Leaf::Heading {
                level: heading_level(level),
                id: id.map(|s| s.to_string()),
            }),
            Tag::BlockQuote(kind) => {
                self.close_implicit_paragraph();
                self.containers.push(Container::Quote {
                    kind: kind.map(QuoteKind::from),
                    children: Vec::new(),
                });
            }
            Tag::CodeBlock(kind) => {
                self.close_implicit_paragraph();
                let (fenced, language) = match kind {
                    CodeBlockKind::Fenced(info) => (true, normalize_fenced_lang(&info)),
                    CodeBlockKind::Indented => (false, None),
                };
                self.code = Some(CodeLeaf {
                    fenced,
                    language,
                    text: String::new(),
                });
            }
            Tag::HtmlBlock => {
                self.close_implicit_paragraph();
                self.html = Some(String::new());
            }
            Tag::List(start) => {
                self.close_implicit_paragraph();
                self.containers.push(Container::List {
                    start,
                    items: Vec::new(),
                });
            }
            Tag::Item => self.containers.push(Container::Item(ListItemBlock::default())),
            Tag::FootnoteDefinition(label) => {
                self.close_implicit_paragraph();
                self.containers.push(Container::Footnote {
                    label: label.to_string(),
                    children: Vec::new(),
                });
            }
            Tag::DefinitionList => {
                self.close_implicit_paragraph();
                self.containers
                    .push(Container::DefinitionList { items: Vec::new() });
            }
            Tag::DefinitionListTitle => self.start_leaf(Leaf::DefinitionTitle),
            Tag::DefinitionListDefinition => {
                self.close_implicit_paragraph();
                self.containers.push(Container::Definition(Vec::new()));
            }
            Tag::Table(aligns) => {
                self.close_implicit_paragraph();
                self.table = Some(TableLeaf {
                    aligns: aligns.into_iter().map(ColumnAlign::from).collect(),
                    ..TableLeaf::default()
                });
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell = Some(Vec::new());
                }
            }
            Tag::Emphasis => self.open_frame(FrameKind::Emphasis),
            Tag::Strong => self.open_frame(FrameKind::Strong),
            Tag::Strikethrough => self.open_frame(FrameKind::Strikethrough),
            Tag::Link {
                dest_url, title, ..
            } => self.open_frame(FrameKind::Link {
                dest: dest_url.to_string(),
                title: title.to_string(),
            }),
            Tag::Image {
                dest_url, title, ..
            } => self.open_frame(FrameKind::Image {
                dest: dest_url.to_string(),
                title: title.to_string(),
            }),
            Tag::MetadataBlock(_) => {
                self.close_implicit_paragraph();
                self.metadata = Some(String::new());
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) => self.finish_leaf(),
            TagEnd::BlockQuote(_) => {
                self.close_implicit_paragraph();
                if let Some(Container::Quote { kind, children }) = self.containers.pop() {
                    self.push_block(MarkdownBlock::Quote(QuoteBlock { kind, children }));
                }
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    let block = CodeBlock {
                        language: code.language,
                        lines: code_lines(&code.text),
                    };
                    self.push_block(if code.fenced {
                        MarkdownBlock::FencedCode(block)
                    } else {
                        MarkdownBlock::IndentedCode(block)
                    });
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(raw) = self.html.take() {
                    self.push_block(MarkdownBlock::Html(HtmlBlock { raw }));
                }
            }
            TagEnd::List(_) => {
                self.close_implicit_paragraph();
                if let Some(Container::List { start, items }) = self.containers.pop() {
                    self.push_block(MarkdownBlock::List(ListBlock { start, items }));
                }
            }
            TagEnd::Item => {
                self.close_implicit_paragraph();
                if let Some(Container::Item(item)) = self.containers.pop()
                    && let Some(Container::List { items, .. }) = self.containers.last_mut()
                {
                    items.push(item);
                }
            }
            TagEnd::FootnoteDefinition => {
                self.close_implicit_paragraph();
                if let Some(Container::Footnote { label, children }) = self.containers.pop() {
                    self.push_block(MarkdownBlock::FootnoteDefinition(FootnoteDefinitionBlock {
                        label,
                        children,
                    }));
                }
            }
            TagEnd::DefinitionListTitle => self.finish_leaf(),
            TagEnd::DefinitionListDefinition => {
                self.close_implicit_paragraph();
                if let Some(Container::Definition(children)) = self.containers.pop()
                    && let Some(Container::DefinitionList { items }) = self.containers.last_mut()
                {
                    items.push(DefinitionItem::Definition(children));
                }
            }
            TagEnd::DefinitionList => {
                self.close_implicit_paragraph();
                if let Some(Container::DefinitionList { items }) = self.containers.pop() {
                    self.push_block(MarkdownBlock::DefinitionList(DefinitionListBlock { items }));
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.head = std::mem::take(&mut table.row);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::TableCell => {
                while !self.frames.is_empty() {
                    self.close_frame();
                }
                if let Some(table) = self.table.as_mut() {
                    let cell = table.cell.take().unwrap_or_default();
                    table.row.push(cell);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.push_block(MarkdownBlock::Table(TableBlock {
                        aligns: table.aligns,
                        head: table.head,
                        rows: table.rows,
                    }));
                }
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image => self.close_frame(),
            TagEnd::MetadataBlock(_) => {
                if let Some(meta) = self.metadata.take() {
                    self.push_block(MarkdownBlock::Metadata(meta));
                }
            }
            _ => {}
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.push_inline(Inline::Code(code.to_string())),
            Event::InlineMath(tex) => self.push_inline(Inline::Math {
                tex: tex.to_string(),
                display: false,
            }),
            Event::DisplayMath(tex) => self.push_inline(Inline::Math {
                tex: tex.to_string(),
                display: true,
            }),
            Event::Html(html) => {
                if let Some(block) = self.html.as_mut() {
                    block.push_str(&html);
                } else {
                    self.push_inline(Inline::Html(html.to_string()));
                }
            }
            Event::InlineHtml(html) => self.push_inline(Inline::Html(html.to_string())),
            Event::FootnoteReference(label) => {
                self.push_inline(Inline::FootnoteReference(label.to_string()))
            }
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => self.push_block(MarkdownBlock::ThematicBreak),
            Event::TaskListMarker(checked) => {
                let item = self.containers.iter_mut().rev().find_map(|c| match c {
                    Container::Item(item) => Some(item),
                    _ => None,
                });
                if let Some(item) = item {
                    item.task = Some(checked);
                }
            }
        }
    }

    fn finish(mut self) -> MarkdownDocument {
        self.finish_leaf();
        // Close anything left open so a truncated stream still yields its content.
        while let Some(container) = self.containers.pop() {
            let block = match container {
                Container::Quote { kind, children } => {
                    Some(MarkdownBlock::Quote(QuoteBlock { kind, children }))
                }
                Container::List { start, items } => {
                    Some(MarkdownBlock::List(ListBlock { start, items }))
                }
                Container::Item(item) => {
                    if let Some(Container::List { items, .. }) = self.containers.last_mut() {
                        items.push(item);
                    }
                    None
                }
                Container::Footnote { label, children } => Some(
                    MarkdownBlock::FootnoteDefinition(FootnoteDefinitionBlock { label, children }),
                ),
                Container::DefinitionList { items } => {
                    Some(MarkdownBlock::DefinitionList(DefinitionListBlock { items }))
                }
                Container::Definition(children) => {
                    if let Some(Container::DefinitionList { items }) = self.containers.last_mut() {
                        items.push(DefinitionItem::Definition(children));
                    }
                    None
                }
            };
            if let Some(block) = block {
                self.children_mut().push(block);
            }
        }
        MarkdownDocument { blocks: self.root }
    }
}

/// Folds a pulldown-cmark event stream into a [`MarkdownDocument`].
pub fn build_document<'a>(
    events: impl IntoIterator<Item = Event<'a>>,
    auto_identifiers: AutoIdentifiers,
) -> MarkdownDocument {
    let mut b = Builder::new(auto_identifiers);
    for event in events {
        b.event(event);
    }
    b.finish()
}

fn push_merged(target: &mut Vec<Inline>, inline: Inline) {
    if let Inline::Text(next) = &inline
        && let Some(Inline::Text(prev)) = target.last_mut()
    {
        prev.push_str(next);
        return;
    }
    target.push(inline);
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

fn normalize_fenced_lang(info: &CowStr<'_>) -> Option<String> {
    let first = info.split_whitespace().next().unwrap_or("");
    let first = first.split(',').next().unwrap_or("").trim();
    let first = first.strip_prefix("language-").unwrap_or(first);
    let first = first.strip_prefix('{').unwrap_or(first);
    let first = first.strip_suffix('}').unwrap_or(first).trim();
    (!first.is_empty()).then(|| first.to_string())
}

fn code_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|l| l.trim_end_matches('\r').replace('\t', "    "))
        .collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MarkdownPipeline;

    fn parse(md: &str) -> MarkdownDocument {
        MarkdownPipeline::default().parse(md)
    }

    #[test]
    fn tight_list_items_get_implicit_paragraphs() {
        let doc = parse("- one\n- two\n");
        let MarkdownBlock::List(list) = &doc.blocks[0] else {
            panic!("expected list, got {:?}", doc.blocks[0]);
        };
        assert!(!list.is_ordered());
        assert_eq!(list.items.len(), 2);
        assert_eq!(
            list.items[1].children,
            vec![MarkdownBlock::Paragraph(ParagraphBlock {
                inline: vec![Inline::Text("two".into())]
            })]
        );
    }

    #[test]
    fn definition_lists_keep_terms_and_definitions_in_order() {
        let doc = parse("Apple\n: fruit\n: ### Deep\n");
        let MarkdownBlock::DefinitionList(list) = &doc.blocks[0] else {
            panic!("expected definition list, got {:?}", doc.blocks[0]);
        };
        assert_eq!(list.items[0], DefinitionItem::Title(vec![Inline::Text("Apple".into())]));
        assert_eq!(
            list.items[1],
            DefinitionItem::Definition(vec![MarkdownBlock::Paragraph(ParagraphBlock {
                inline: vec![Inline::Text("fruit".into())]
            })])
        );
        assert_eq!(list.items.len(), 3);
        assert!(matches!(&list.items[2], DefinitionItem::Definition(d) if d.len() == 1));
        assert_eq!(doc.blocks[0].kind_name(), "DefinitionList");
        assert!(doc.heading_ids().contains(&"deep"));
    }

    #[test]
    fn nested_lists_stay_inside_their_item() {
        let doc = parse("1. outer\n   - inner\n2. next\n");
        let MarkdownBlock::List(list) = &doc.blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(list.start, Some(1));
        let first = &list.items[0].children;
        assert_eq!(first.len(), 2);
        assert!(matches!(first[0], MarkdownBlock::Paragraph(_)));
        assert!(matches!(first[1], MarkdownBlock::List(_)));
    }

    #[test]
    fn task_markers_attach_to_items() {
        let doc = parse("- [x] done\n- [ ] todo\n- plain\n");
        let MarkdownBlock::List(list) = &doc.blocks[0] else {
            panic!("expected list");
        };
        let tasks: Vec<_> = list.items.iter().map(|i| i.task).collect();
        assert_eq!(tasks, vec![Some(true), Some(false), None]);
    }

    #[test]
    fn fenced_code_language_is_normalized() {
        let doc = parse("```{language-rust,ignore}\nfn main() {}\n\tx\n```\n");
        assert_eq!(
            doc.blocks[0],
            MarkdownBlock::FencedCode(CodeBlock {
                language: Some("rust".into()),
                lines: vec!["fn main() {}".into(), "    x".into()],
            })
        );
    }

    #[test]
    fn indented_code_is_its_own_kind() {
        let doc = parse("    let x = 1;\n");
        assert!(matches!(
            &doc.blocks[0],
            MarkdownBlock::IndentedCode(CodeBlock { language: None, lines }) if lines == &["let x = 1;"]
        ));
    }

    #[test]
    fn table_head_and_rows_are_split() {
        let doc = parse("| a | b |\n|:--|--:|\n| 1 | **2** |\n");
        let MarkdownBlock::Table(table) = &doc.blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.aligns, vec![ColumnAlign::Left, ColumnAlign::Right]);
        assert_eq!(table.head.len(), 2);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(
            table.rows[0][1],
            vec![Inline::Strong(vec![Inline::Text("2".into())])]
        );
    }

    #[test]
    fn quotes_own_their_blocks_and_alert_kind() {
        let doc = parse("> [!WARNING]\n> careful\n>\n> - a\n");
        let MarkdownBlock::Quote(quote) = &doc.blocks[0] else {
            panic!("expected quote");
        };
        assert_eq!(quote.kind, Some(QuoteKind::Warning));
        assert_eq!(quote.children.len(), 2);
        assert!(matches!(quote.children[1], MarkdownBlock::List(_)));
    }

    #[test]
    fn links_keep_destination_and_children() {
        let doc = parse("see [*docs*](https://example.com \"t\")\n");
        let MarkdownBlock::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            p.inline[1],
            Inline::Link {
                dest: "https://example.com".into(),
                title: "t".into(),
                children: vec![Inline::Emphasis(vec![Inline::Text("docs".into())])],
            }
        );
    }

    #[test]
    fn heading_ids_are_slugged_and_deduplicated() {
        let doc = parse("# Hello, World!\n\n## Hello, World!\n\n### Custom {#own}\n");
        assert_eq!(doc.heading_ids(), vec!["hello-world", "hello-world-1", "own"]);
    }

    #[test]
    fn auto_identifiers_can_be_disabled() {
        let pipeline = MarkdownPipeline {
            auto_identifiers: AutoIdentifiers::None,
            ..MarkdownPipeline::default()
        };
        let doc = pipeline.parse("# Title\n");
        assert!(doc.heading_ids().is_empty());
    }

    #[test]
    fn html_blocks_and_footnotes_are_collected() {
        let doc = parse("<div>\nhi\n</div>\n\ntext[^1]\n\n[^1]: note\n");
        assert!(matches!(&doc.blocks[0], MarkdownBlock::Html(h) if h.raw.contains("<div>")));
        assert!(matches!(
            doc.blocks.last(),
            Some(MarkdownBlock::FootnoteDefinition(f)) if f.label == "1"
        ));
    }

    #[test]
    fn github_slug_drops_punctuation() {
        assert_eq!(github_slug("  API v2: What's New?  "), "api-v2-whats-new");
        assert_eq!(github_slug("snake_case-and-dash"), "snake_case-and-dash");
    }
}
