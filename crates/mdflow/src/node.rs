use std::sync::Arc;

use crate::code::MarkdownFencedCodeBlock;
use crate::flow::FillFlow;
use crate::heading::MarkdownHeading;
use crate::layout::Component;
use crate::layout::LayoutContext;
use crate::layout::LayoutOutput;
use crate::not_implemented::NotImplementedMarkdown;
use crate::quote::MarkdownQuoteBlock;
use crate::separator::MarkdownSeparator;
use crate::table::MarkdownTable;
use crate::text_flow::MarkdownTextFlow;

/// One widget in the tree built from a document.
#[derive(Clone, Debug)]
pub enum MarkdownNode {
    Heading(MarkdownHeading),
    Separator(MarkdownSeparator),
    TextFlow(MarkdownTextFlow),
    Quote(MarkdownQuoteBlock),
    FencedCode(MarkdownFencedCodeBlock),
    Table(MarkdownTable),
    Flow(FillFlow),
    NotImplemented(NotImplementedMarkdown),
    /// Widget supplied by a custom factory.
    Custom(Arc<dyn Component + Send + Sync>),
}

impl MarkdownNode {
    pub fn kind(&self) -> &'static str {
        match self {
            MarkdownNode::Heading(_) => "Heading",
            MarkdownNode::Separator(_) => "Separator",
            MarkdownNode::TextFlow(_) => "TextFlow",
            MarkdownNode::Quote(_) => "Quote",
            MarkdownNode::FencedCode(_) => "FencedCode",
            MarkdownNode::Table(_) => "Table",
            MarkdownNode::Flow(_) => "Flow",
            MarkdownNode::NotImplemented(_) => "NotImplemented",
            MarkdownNode::Custom(_) => "Custom",
        }
    }

    pub fn as_flow(&self) -> Option<&FillFlow> {
        match self {
            MarkdownNode::Flow(flow) => Some(flow),
            _ => None,
        }
    }

    pub fn as_text_flow(&self) -> Option<&MarkdownTextFlow> {
        match self {
            MarkdownNode::TextFlow(flow) => Some(flow),
            _ => None,
        }
    }

    pub fn as_text_flow_mut(&mut self) -> Option<&mut MarkdownTextFlow> {
        match self {
            MarkdownNode::TextFlow(flow) => Some(flow),
            _ => None,
        }
    }

    /// Number of nodes in this subtree, counting `self`.
    pub fn count(&self) -> usize {
        match self {
            MarkdownNode::Flow(flow) => 1 + flow.children().iter().map(Self::count).sum::<usize>(),
            MarkdownNode::Quote(quote) => {
                1 + quote.content().children().iter().map(Self::count).sum::<usize>()
            }
            _ => 1,
        }
    }
}

impl Component for MarkdownNode {
    fn layout(&self, width: u16, cx: &LayoutContext<'_>, out: &mut LayoutOutput) {
        match self {
            MarkdownNode::Heading(w) => w.layout(width, cx, out),
            MarkdownNode::Separator(w) => w.layout(width, cx, out),
            MarkdownNode::TextFlow(w) => w.layout(width, cx, out),
            MarkdownNode::Quote(w) => w.layout(width, cx, out),
            MarkdownNode::FencedCode(w) => w.layout(width, cx, out),
            MarkdownNode::Table(w) => w.layout(width, cx, out),
            MarkdownNode::Flow(w) => w.layout(width, cx, out),
            MarkdownNode::NotImplemented(w) => w.layout(width, cx, out),
            MarkdownNode::Custom(w) => w.layout(width, cx, out),
        }
    }
}
