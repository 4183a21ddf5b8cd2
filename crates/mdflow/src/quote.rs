use ratatui::style::Modifier;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::ast::QuoteKind;
use crate::flow::FillFlow;
use crate::layout::Component;
use crate::layout::LayoutContext;
use crate::layout::LayoutOutput;

const BAR: &str = "│ ";

/// Block quote: composed child blocks behind a vertical bar.
#[derive(Clone, Debug)]
pub struct MarkdownQuoteBlock {
    kind: Option<QuoteKind>,
    content: FillFlow,
}

impl MarkdownQuoteBlock {
    pub fn new(kind: Option<QuoteKind>, content: FillFlow) -> Self {
        Self { kind, content }
    }

    pub fn kind(&self) -> Option<QuoteKind> {
        self.kind
    }

    pub fn content(&self) -> &FillFlow {
        &self.content
    }
}

impl Component for MarkdownQuoteBlock {
    fn layout(&self, width: u16, cx: &LayoutContext<'_>, out: &mut LayoutOutput) {
        let bar_w = BAR.chars().count() as u16;
        if width == 0 {
            return;
        }
        // Too narrow for content: keep the row count and anchors, draw only the bar.
        let narrow = width <= bar_w;
        let mut body = LayoutOutput::new();
        if let Some(kind) = self.kind {
            let style = match kind {
                QuoteKind::Warning | QuoteKind::Caution => cx.theme.danger,
                QuoteKind::Note | QuoteKind::Tip | QuoteKind::Important => cx.theme.accent,
            };
            body.push(Line::from(Span::styled(
                kind.title(),
                style.add_modifier(Modifier::BOLD),
            )));
        }
        let inner = if narrow { 1 } else { width - bar_w };
        self.content.layout(inner, cx, &mut body);
        if body.is_empty() {
            body.push_blank();
        }
        if narrow {
            let bar: String = BAR.chars().take(width as usize).collect();
            for line in body.lines_mut() {
                *line = Line::from(Span::styled(bar.clone(), cx.theme.text_muted));
            }
            out.append(body);
            return;
        }
        out.append_prefixed(body, &[Span::styled(BAR, cx.theme.text_muted)]);
    }
}
