use ratatui::text::Line;
use ratatui::text::Span;

use crate::layout::Component;
use crate::layout::LayoutContext;
use crate::layout::LayoutOutput;

/// Horizontal rule under top-level headings and for thematic breaks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarkdownSeparator;

impl Component for MarkdownSeparator {
    fn layout(&self, width: u16, cx: &LayoutContext<'_>, out: &mut LayoutOutput) {
        if width == 0 {
            return;
        }
        out.push(Line::from(Span::styled(
            "─".repeat(width as usize),
            cx.theme.text_muted,
        )));
    }
}
