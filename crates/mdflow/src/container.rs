use std::fmt;
use std::sync::Arc;

use log::debug;
use mdflow_core::input::InputEvent;
use mdflow_core::layout::MarginPadding;
use mdflow_core::render;
use mdflow_core::scroll::ScrollBindings;
use mdflow_core::text::CodeHighlighter;
use mdflow_core::theme::Theme;
use mdflow_core::viewport::ViewportState;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::ast::MarkdownDocument;
use crate::factory::DefaultMarkdownFactory;
use crate::factory::MarkdownComponentFactory;
use crate::flow::FillFlow;
use crate::flow::horizontal_from_px;
use crate::flow::rows_from_px;
use crate::layout::Component;
use crate::layout::LayoutContext;
use crate::layout::LayoutOutput;
use crate::node::MarkdownNode;
use crate::pipeline::MarkdownPipeline;
use crate::table::TableStyle;

/// Blank rows between top-level blocks (25 px).
pub const DEFAULT_SPACING: u16 = rows_from_px(25);
/// Left 10 px, right 30 px.
pub const DEFAULT_MARGIN: MarginPadding = horizontal_from_px(10, 30);
/// Left 10 px, right 30 px.
pub const DEFAULT_PADDING: MarginPadding = horizontal_from_px(10, 30);

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarkdownContainerOptions {
    pub pipeline: MarkdownPipeline,
    pub spacing: u16,
    pub margin: MarginPadding,
    pub padding: MarginPadding,
    /// Reserve the right-most column for a scrollbar. Content never draws under it.
    pub show_scrollbar: bool,
    pub table_style: TableStyle,
    pub code_block_indent: u16,
    pub show_code_line_numbers: bool,
    /// Code blocks longer than this are drawn without highlighting.
    pub max_highlight_lines: usize,
    /// Append ` (url)` after link text.
    pub show_link_destinations: bool,
    /// Base for resolving relative link destinations.
    pub base_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub scroll: ScrollBindings,
}

impl Default for MarkdownContainerOptions {
    fn default() -> Self {
        Self {
            pipeline: MarkdownPipeline::default(),
            spacing: DEFAULT_SPACING,
            margin: DEFAULT_MARGIN,
            padding: DEFAULT_PADDING,
            show_scrollbar: true,
            table_style: TableStyle::Glow,
            code_block_indent: 2,
            show_code_line_numbers: false,
            max_highlight_lines: 2_000,
            show_link_destinations: false,
            base_url: None,
            scroll: ScrollBindings::default(),
        }
    }
}

/// Scrollable view of a markdown document.
///
/// `set_text` parses the source and rebuilds the widget tree: one node per top-level
/// block in a vertical [`FillFlow`]. Layout is computed lazily for the width being drawn
/// and cached until the width, text, box model, factory or highlighter change. The theme
/// passed to [`render_ref`](Self::render_ref) is not part of the cache key; call
/// [`invalidate_layout`](Self::invalidate_layout) after switching themes.
pub struct MarkdownContainer {
    options: MarkdownContainerOptions,
    factory: Arc<dyn MarkdownComponentFactory + Send + Sync>,
    highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>,
    text: String,
    document: MarkdownDocument,
    root: FillFlow,
    rendered: LayoutOutput,
    cached_width: Option<u16>,
    pub state: ViewportState,
}

impl fmt::Debug for MarkdownContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownContainer")
            .field("options", &self.options)
            .field("highlighter", &self.highlighter.is_some())
            .field("blocks", &self.document.len())
            .field("cached_width", &self.cached_width)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for MarkdownContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownContainer {
    pub fn new() -> Self {
        Self::with_options(MarkdownContainerOptions::default())
    }

    pub fn with_options(options: MarkdownContainerOptions) -> Self {
        let root = root_flow(&options);
        Self {
            options,
            factory: Arc::new(DefaultMarkdownFactory),
            highlighter: None,
            text: String::new(),
            document: MarkdownDocument::default(),
            root,
            rendered: LayoutOutput::new(),
            cached_width: None,
            state: ViewportState::default(),
        }
    }

    pub fn options(&self) -> &MarkdownContainerOptions {
        &self.options
    }

    /// Replaces the source, reparses it and rebuilds the widget tree.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.document = self.options.pipeline.parse(text);
        self.rebuild();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn document(&self) -> &MarkdownDocument {
        &self.document
    }

    /// The top-level fill flow holding one node per block.
    pub fn root(&self) -> &FillFlow {
        &self.root
    }

    pub fn spacing(&self) -> u16 {
        self.root.spacing()
    }

    pub fn set_spacing(&mut self, spacing: u16) {
        self.options.spacing = spacing;
        self.root.set_spacing(spacing);
        self.invalidate_layout();
    }

    pub fn margin(&self) -> MarginPadding {
        self.root.margin()
    }

    pub fn set_margin(&mut self, margin: MarginPadding) {
        self.options.margin = margin;
        self.root.set_margin(margin);
        self.invalidate_layout();
    }

    pub fn padding(&self) -> MarginPadding {
        self.root.padding()
    }

    pub fn set_padding(&mut self, padding: MarginPadding) {
        self.options.padding = padding;
        self.root.set_padding(padding);
        self.invalidate_layout();
    }

    /// Swaps the pipeline and reparses the current text.
    pub fn set_pipeline(&mut self, pipeline: MarkdownPipeline) {
        self.options.pipeline = pipeline;
        let text = std::mem::take(&mut self.text);
        self.set_text(&text);
    }

    /// Swaps the widget factory and rebuilds the tree from the already-parsed document.
    pub fn set_factory(&mut self, factory: Arc<dyn MarkdownComponentFactory + Send + Sync>) {
        self.factory = factory;
        self.rebuild();
    }

    pub fn set_highlighter(&mut self, highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>) {
        self.highlighter = highlighter;
        self.invalidate_layout();
    }

    pub fn set_table_style(&mut self, style: TableStyle) {
        self.options.table_style = style;
        self.invalidate_layout();
    }

    pub fn invalidate_layout(&mut self) {
        self.cached_width = None;
        self.rendered = LayoutOutput::new();
    }

    fn rebuild(&mut self) {
        self.root.clear();
        for block in &self.document {
            self.factory
                .add_markdown_component(block, &mut self.root, 0);
        }
        debug!(
            "markdown rebuilt: {} blocks -> {} nodes",
            self.document.len(),
            self.root.children().iter().map(MarkdownNode::count).sum::<usize>()
        );
        self.invalidate_layout();
    }

    /// Area left for content once the scrollbar column is taken out.
    fn content_area(&self, area: Rect) -> (Rect, Option<u16>) {
        if self.options.show_scrollbar && area.width >= 2 {
            (
                Rect::new(area.x, area.y, area.width - 1, area.height),
                Some(area.x + area.width - 1),
            )
        } else {
            (area, None)
        }
    }

    /// Updates viewport size for `area`.
    pub fn set_viewport(&mut self, area: Rect) {
        let (content, _) = self.content_area(area);
        self.state.set_viewport(content.width, content.height);
    }

    pub fn scroll_y_by(&mut self, delta: i32) {
        self.state.scroll_y_by(delta);
    }

    pub fn scroll_x_by(&mut self, delta: i32) {
        self.state.scroll_x_by(delta);
    }

    /// Applies scroll keys and mouse wheel events. Returns `true` when a redraw is needed.
    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Mouse(m) => {
                self.options.scroll.apply_wheel(&mut self.state, m.kind);
                true
            }
            InputEvent::Key(key) => {
                let Some(action) = self.options.scroll.action_for(&key) else {
                    return false;
                };
                self.options.scroll.apply(&mut self.state, action);
                true
            }
        }
    }

    /// Scrolls so the heading with anchor `id` is the top row.
    ///
    /// Needs a prior layout (`render_ref` or `lines_for_width`); returns `false` when the
    /// anchor is unknown.
    pub fn scroll_to_anchor(&mut self, id: &str) -> bool {
        match self.rendered.anchor_row(id) {
            Some(row) => {
                self.state.scroll_to_y(row as u32);
                true
            }
            None => false,
        }
    }

    /// Row of `id` in the current layout.
    pub fn anchor_row(&self, id: &str) -> Option<usize> {
        self.rendered.anchor_row(id)
    }

    /// Laid-out size `(width, height)` in cells, as of the last layout.
    pub fn content_size(&self) -> (u32, u32) {
        (self.state.content_w, self.state.content_h)
    }

    pub fn render_ref(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let (content, scrollbar_x) = self.content_area(area);
        self.set_viewport(area);
        self.ensure_layout(content.width, theme);

        for row in 0..content.height {
            let y = content.y + row;
            buf.set_style(Rect::new(content.x, y, content.width, 1), theme.text_primary);
            let idx = (self.state.y as usize).saturating_add(row as usize);
            if let Some(line) = self.rendered.lines().get(idx) {
                render::render_spans_clipped(
                    content.x,
                    y,
                    self.state.x,
                    content.width,
                    buf,
                    &line.spans,
                    theme.text_primary,
                );
            }
        }

        if let Some(x) = scrollbar_x {
            render::render_scrollbar(
                Rect::new(x, area.y, 1, area.height),
                buf,
                &self.state,
                theme.text_muted,
            );
        }
    }

    /// Lays out at `width` (no scrollbar) and returns the rows.
    pub fn lines_for_width(&mut self, width: u16, theme: &Theme) -> Vec<Line<'static>> {
        self.ensure_layout(width, theme);
        self.rendered.lines().to_vec()
    }

    fn ensure_layout(&mut self, width: u16, theme: &Theme) {
        if self.cached_width == Some(width) {
            return;
        }
        let cx = LayoutContext {
            theme,
            highlighter: self.highlighter.as_deref(),
            table_style: self.options.table_style,
            code_block_indent: self.options.code_block_indent,
            show_code_line_numbers: self.options.show_code_line_numbers,
            max_highlight_lines: self.options.max_highlight_lines,
            show_link_destinations: self.options.show_link_destinations,
            base_url: self.options.base_url.as_deref(),
        };
        let mut out = LayoutOutput::new();
        self.root.layout(width, &cx, &mut out);
        self.state.set_content(out.max_width(), out.len() as u32);
        self.rendered = out;
        self.cached_width = Some(width);
    }
}

fn root_flow(options: &MarkdownContainerOptions) -> FillFlow {
    FillFlow::new()
        .with_spacing(options.spacing)
        .with_margin(options.margin)
        .with_padding(options.padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdflow_core::input::KeyCode;
    use mdflow_core::input::KeyEvent;
    use mdflow_core::input::MouseEvent;
    use mdflow_core::input::MouseEventKind;
    use mdflow_core::input::KeyModifiers;
    use mdflow_core::render::spans_plain;

    fn plain(lines: &[Line<'static>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| spans_plain(&l.spans).trim_end().to_string())
            .collect()
    }

    #[test]
    fn defaults_match_the_box_model() {
        let c = MarkdownContainer::new();
        assert_eq!(c.spacing(), 1);
        assert_eq!(c.margin(), MarginPadding::horizontal(1, 3));
        assert_eq!(c.padding(), MarginPadding::horizontal(1, 3));
    }

    #[test]
    fn set_text_replaces_previous_tree() {
        let mut c = MarkdownContainer::new();
        c.set_text("# a\n\nb\n");
        assert_eq!(c.root().len(), 3);
        c.set_text("only\n");
        assert_eq!(c.root().len(), 1);
        assert_eq!(c.text(), "only\n");
    }

    #[test]
    fn layout_applies_margin_padding_and_spacing() {
        let mut c = MarkdownContainer::new();
        c.set_text("# Title\n\nHello world.\n");
        let theme = Theme::default();
        assert_eq!(
            plain(&c.lines_for_width(20, &theme)),
            vec!["  Title", "", "  ────────────", "", "  Hello world."]
        );
        assert_eq!(c.content_size(), (14, 5));
    }

    #[test]
    fn box_model_setters_invalidate_layout() {
        let mut c = MarkdownContainer::new();
        c.set_text("a\n\nb\n");
        let theme = Theme::default();
        assert_eq!(c.lines_for_width(20, &theme).len(), 3);
        c.set_spacing(0);
        c.set_margin(MarginPadding::ZERO);
        c.set_padding(MarginPadding::ZERO);
        assert_eq!(plain(&c.lines_for_width(20, &theme)), vec!["a", "b"]);
    }

    #[test]
    fn scroll_keys_and_wheel_move_the_viewport() {
        let mut c = MarkdownContainer::new();
        let text: String = (0..30).map(|i| format!("p{i}\n\n")).collect();
        c.set_text(&text);
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        c.render_ref(area, &mut buf, &Theme::default());

        assert!(c.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Down))));
        assert_eq!(c.state.y, 1);
        assert!(c.handle_event(InputEvent::Mouse(MouseEvent {
            x: 0,
            y: 0,
            kind: MouseEventKind::ScrollDown,
            modifiers: KeyModifiers::NONE,
        })));
        assert_eq!(c.state.y, 4);
        assert!(!c.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char('x')))));
    }

    #[test]
    fn scroll_to_anchor_uses_heading_rows() {
        let mut c = MarkdownContainer::new();
        let mut text = String::from("# Top\n\n");
        for i in 0..20 {
            text.push_str(&format!("line {i}\n\n"));
        }
        text.push_str("## Bottom part\n\nend\n");
        c.set_text(&text);
        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        c.render_ref(area, &mut buf, &Theme::default());

        let row = c.anchor_row("bottom-part");
        assert!(row.is_some());
        assert!(c.scroll_to_anchor("bottom-part"));
        assert_eq!(Some(c.state.y as usize), row);
        assert!(!c.scroll_to_anchor("missing"));
    }

    #[test]
    fn factory_swap_rebuilds_without_reparse() {
        #[derive(Debug)]
        struct NoSeparators;
        impl MarkdownComponentFactory for NoSeparators {
            fn add_markdown_component(
                &self,
                block: &crate::ast::MarkdownBlock,
                container: &mut FillFlow,
                layer_index: usize,
            ) {
                crate::factory::add_markdown_component(self, block, container, layer_index);
                if matches!(container.children().last(), Some(MarkdownNode::Separator(_))) {
                    let keep: Vec<MarkdownNode> = container
                        .children()
                        .iter()
                        .filter(|n| !matches!(n, MarkdownNode::Separator(_)))
                        .cloned()
                        .collect();
                    container.clear();
                    for node in keep {
                        container.add(node);
                    }
                }
            }
        }

        let mut c = MarkdownContainer::new();
        c.set_text("# a\n\n---\n");
        assert_eq!(c.root().len(), 3);
        c.set_factory(Arc::new(NoSeparators));
        assert_eq!(c.root().len(), 1);
    }

    #[test]
    fn render_keeps_the_scrollbar_column_clear_of_content() {
        let mut c = MarkdownContainer::with_options(MarkdownContainerOptions {
            margin: MarginPadding::ZERO,
            padding: MarginPadding::ZERO,
            ..MarkdownContainerOptions::default()
        });
        c.set_text("abcdefghij\n");
        let area = Rect::new(0, 0, 6, 2);
        let mut buf = Buffer::empty(area);
        c.render_ref(area, &mut buf, &Theme::default());
        let row: String = (0..5).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert_eq!(row, "abcde");
        assert_eq!(c.content_size(), (5, 2));
    }
}
