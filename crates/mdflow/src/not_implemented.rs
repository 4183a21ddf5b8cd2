use crate::ast::MarkdownBlock;
use crate::layout::Component;
use crate::layout::LayoutContext;
use crate::layout::LayoutOutput;
use crate::segment::Segment;
use crate::segment::wrap_segments;

/// Placeholder for block kinds without a widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotImplementedMarkdown {
    kind: &'static str,
}

impl NotImplementedMarkdown {
    pub fn new(block: &MarkdownBlock) -> Self {
        Self {
            kind: block.kind_name(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn message(&self) -> String {
        format!("{} is not implemented.", self.kind)
    }
}

impl Component for NotImplementedMarkdown {
    fn layout(&self, width: u16, cx: &LayoutContext<'_>, out: &mut LayoutOutput) {
        let seg = Segment::styled(self.message(), cx.theme.danger);
        for row in wrap_segments(&[], &[], &[seg], width, cx.theme.text_primary, cx.theme) {
            out.push(row);
        }
    }
}
