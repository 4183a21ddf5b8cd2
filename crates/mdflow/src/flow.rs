use mdflow_core::layout::MarginPadding;
use mdflow_core::render::spans_width;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::layout::Component;
use crate::layout::LayoutContext;
use crate::layout::LayoutOutput;
use crate::node::MarkdownNode;

/// Horizontal pixels per terminal column when converting pixel-based box sizes.
pub const PX_PER_COLUMN: u16 = 10;
/// Vertical pixels per terminal row. A cell is about twice as tall as it is wide.
pub const PX_PER_ROW: u16 = 20;

/// Columns for a horizontal pixel size, rounded down.
pub const fn columns_from_px(px: u16) -> u16 {
    px / PX_PER_COLUMN
}

/// Rows for a vertical pixel size, rounded down.
pub const fn rows_from_px(px: u16) -> u16 {
    px / PX_PER_ROW
}

/// Left/right box sides from pixel sizes.
pub const fn horizontal_from_px(left: u16, right: u16) -> MarginPadding {
    MarginPadding::horizontal(columns_from_px(left), columns_from_px(right))
}

/// Vertical stacking container.
///
/// Children are laid out top to bottom with `spacing` blank rows between them. `margin`
/// is empty space outside the flow; `padding` sits inside it and is painted with `style`.
#[derive(Clone, Debug, Default)]
pub struct FillFlow {
    spacing: u16,
    margin: MarginPadding,
    padding: MarginPadding,
    style: Style,
    children: Vec<MarkdownNode>,
}

impl FillFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spacing(mut self, spacing: u16) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_margin(mut self, margin: MarginPadding) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_padding(mut self, padding: MarginPadding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn spacing(&self) -> u16 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: u16) {
        self.spacing = spacing;
    }

    pub fn margin(&self) -> MarginPadding {
        self.margin
    }

    pub fn set_margin(&mut self, margin: MarginPadding) {
        self.margin = margin;
    }

    pub fn padding(&self) -> MarginPadding {
        self.padding
    }

    pub fn set_padding(&mut self, padding: MarginPadding) {
        self.padding = padding;
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn add(&mut self, node: MarkdownNode) {
        self.children.push(node);
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn children(&self) -> &[MarkdownNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [MarkdownNode] {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Component for FillFlow {
    fn layout(&self, width: u16, cx: &LayoutContext<'_>, out: &mut LayoutOutput) {
        let outer = self.margin.inner_width(width);
        let inner = self.padding.inner_width(outer);
        let painted = self.style != Style::default();

        let mut body = LayoutOutput::new();
        for _ in 0..self.padding.top {
            body.push_blank();
        }
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                for _ in 0..self.spacing {
                    body.push_blank();
                }
            }
            child.layout(inner, cx, &mut body);
        }
        for _ in 0..self.padding.bottom {
            body.push_blank();
        }

        for _ in 0..self.margin.top {
            out.push_blank();
        }
        if painted {
            let fill_to = inner as usize + self.padding.right as usize;
            for line in body.lines_mut() {
                let used = spans_width(&line.spans);
                if used < fill_to {
                    line.spans
                        .push(Span::styled(" ".repeat(fill_to - used), self.style));
                }
            }
            let mut prefix = Vec::new();
            if self.margin.left > 0 {
                prefix.push(Span::raw(" ".repeat(self.margin.left as usize)));
            }
            prefix.push(Span::styled(" ".repeat(self.padding.left as usize), self.style));
            out.append_prefixed(body, &prefix);
        } else {
            let indent = self.margin.left as usize + self.padding.left as usize;
            let prefix = if indent > 0 {
                vec![Span::raw(" ".repeat(indent))]
            } else {
                Vec::new()
            };
            out.append_indented(body, &prefix);
        }
        for _ in 0..self.margin.bottom {
            out.push(Line::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::separator::MarkdownSeparator;
    use crate::text_flow::MarkdownTextFlow;
    use mdflow_core::render::spans_plain;
    use mdflow_core::theme::Theme;

    #[test]
    fn pixel_sizes_scale_down_to_cells() {
        assert_eq!(rows_from_px(25), 1);
        assert_eq!(rows_from_px(10), 0);
        assert_eq!(rows_from_px(40), 2);
        assert_eq!(horizontal_from_px(10, 30), MarginPadding::horizontal(1, 3));
        assert_eq!(horizontal_from_px(25, 5), MarginPadding::horizontal(2, 0));
    }

    fn text(s: &str) -> MarkdownNode {
        let mut flow = MarkdownTextFlow::new();
        flow.add_text(s, Style::default());
        MarkdownNode::TextFlow(flow)
    }

    fn rows(flow: &FillFlow, width: u16) -> Vec<String> {
        let theme = Theme::default();
        let cx = LayoutContext::new(&theme);
        let mut out = LayoutOutput::new();
        flow.layout(width, &cx, &mut out);
        out.lines().iter().map(|l| spans_plain(&l.spans)).collect()
    }

    #[test]
    fn spacing_goes_between_children_only() {
        let mut flow = FillFlow::new().with_spacing(2);
        flow.add(text("a"));
        flow.add(text("b"));
        assert_eq!(rows(&flow, 10), vec!["a", "", "", "b"]);
    }

    #[test]
    fn margin_and_padding_shrink_the_children() {
        let mut flow = FillFlow::new()
            .with_margin(MarginPadding::horizontal(1, 3))
            .with_padding(MarginPadding::horizontal(1, 3));
        flow.add(MarkdownNode::Separator(MarkdownSeparator));
        assert_eq!(rows(&flow, 12), vec!["  ────"]);
    }

    #[test]
    fn vertical_box_model_adds_rows() {
        let mut flow = FillFlow::new()
            .with_margin(MarginPadding {
                top: 1,
                ..MarginPadding::ZERO
            })
            .with_padding(MarginPadding {
                bottom: 1,
                ..MarginPadding::ZERO
            });
        flow.add(text("a"));
        assert_eq!(rows(&flow, 10), vec!["", "a", ""]);
    }

    #[test]
    fn styled_padding_is_painted_to_full_width() {
        let style = Style::default().bg(ratatui::style::Color::Blue);
        let mut flow = FillFlow::new()
            .with_padding(MarginPadding::horizontal(1, 1))
            .with_style(style);
        flow.add(text("ab"));
        let theme = Theme::default();
        let cx = LayoutContext::new(&theme);
        let mut out = LayoutOutput::new();
        flow.layout(6, &cx, &mut out);
        let line = &out.lines()[0];
        assert_eq!(spans_plain(&line.spans), " ab   ");
        assert_eq!(line.spans.last().map(|s| s.style), Some(style));
    }
}
