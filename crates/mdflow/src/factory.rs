//! Widget constructors and the block dispatch that drives them.

use log::trace;
use mdflow_core::layout::MarginPadding;

use crate::ast::CodeBlock;
use crate::ast::HeadingBlock;
use crate::ast::ListItemBlock;
use crate::ast::MarkdownBlock;
use crate::ast::ParagraphBlock;
use crate::ast::QuoteBlock;
use crate::ast::TableBlock;
use crate::code::MarkdownFencedCodeBlock;
use crate::flow::FillFlow;
use crate::flow::horizontal_from_px;
use crate::flow::rows_from_px;
use crate::heading::MarkdownHeading;
use crate::node::MarkdownNode;
use crate::not_implemented::NotImplementedMarkdown;
use crate::quote::MarkdownQuoteBlock;
use crate::separator::MarkdownSeparator;
use crate::table::MarkdownTable;
use crate::text_flow::MarkdownTextFlow;

/// Blank rows between the items of a nested list (10 px).
pub const CHILD_FLOW_SPACING: u16 = rows_from_px(10);
/// Indent of a nested list relative to its parent (left 25 px, right 5 px).
pub const CHILD_FLOW_PADDING: MarginPadding = horizontal_from_px(25, 5);
/// Blank rows between blocks inside a quote (same as the root flow).
pub const QUOTE_FLOW_SPACING: u16 = rows_from_px(25);

/// Builds the widget for each block kind.
///
/// Every method has a default; override the ones you want to restyle. The dispatch methods
/// forward to [`add_markdown_component`] and [`add_list_item`], so an override can handle
/// a few block kinds and hand the rest back to the defaults.
pub trait MarkdownComponentFactory {
    fn add_markdown_component(&self, block: &MarkdownBlock, container: &mut FillFlow, layer_index: usize) {
        add_markdown_component(self, block, container, layer_index);
    }

    fn add_list_item(&self, item: &ListItemBlock, container: &mut FillFlow, layer_index: usize) {
        add_list_item(self, item, container, layer_index);
    }

    fn create_heading(&self, heading: &HeadingBlock) -> MarkdownNode {
        MarkdownNode::Heading(MarkdownHeading::new(heading))
    }

    fn create_text_flow(&self, paragraph: &ParagraphBlock, layer_index: usize) -> MarkdownNode {
        MarkdownNode::TextFlow(MarkdownTextFlow::for_paragraph(paragraph, layer_index))
    }

    fn create_quote(&self, quote: &QuoteBlock, content: FillFlow) -> MarkdownNode {
        MarkdownNode::Quote(MarkdownQuoteBlock::new(quote.kind, content))
    }

    fn create_quote_content_flow(&self) -> FillFlow {
        FillFlow::new().with_spacing(QUOTE_FLOW_SPACING)
    }

    fn create_fenced_code(&self, code: &CodeBlock) -> MarkdownNode {
        MarkdownNode::FencedCode(MarkdownFencedCodeBlock::new(code))
    }

    fn create_table(&self, table: &TableBlock) -> MarkdownNode {
        MarkdownNode::Table(MarkdownTable::new(table))
    }

    /// Container for the items of a nested list.
    fn create_child_flow(&self) -> FillFlow {
        FillFlow::new()
            .with_spacing(CHILD_FLOW_SPACING)
            .with_padding(CHILD_FLOW_PADDING)
    }

    fn create_separator(&self) -> MarkdownNode {
        MarkdownNode::Separator(MarkdownSeparator)
    }

    fn create_not_implemented(&self, block: &MarkdownBlock) -> MarkdownNode {
        MarkdownNode::NotImplemented(NotImplementedMarkdown::new(block))
    }
}

/// The stock widget set.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultMarkdownFactory;

impl MarkdownComponentFactory for DefaultMarkdownFactory {}

/// Adds the widget(s) for `block` to `container`.
///
/// Level 1 and 2 headings get a separator after them. Lists open a child flow whose items
/// sit one layer deeper. HTML blocks add nothing.
pub fn add_markdown_component<F>(factory: &F, block: &MarkdownBlock, container: &mut FillFlow, layer_index: usize)
where
    F: MarkdownComponentFactory + ?Sized,
{
    match block {
        MarkdownBlock::Heading(heading) => {
            container.add(factory.create_heading(heading));
            if heading.level < 3 {
                container.add(factory.create_separator());
            }
        }
        MarkdownBlock::Paragraph(paragraph) => {
            container.add(factory.create_text_flow(paragraph, layer_index));
        }
        MarkdownBlock::Quote(quote) => {
            let mut content = factory.create_quote_content_flow();
            for child in &quote.children {
                factory.add_markdown_component(child, &mut content, layer_index);
            }
            container.add(factory.create_quote(quote, content));
        }
        MarkdownBlock::FencedCode(code) | MarkdownBlock::IndentedCode(code) => {
            container.add(factory.create_fenced_code(code));
        }
        MarkdownBlock::Table(table) => container.add(factory.create_table(table)),
        MarkdownBlock::List(list) => {
            let mut child = factory.create_child_flow();
            for item in &list.items {
                factory.add_list_item(item, &mut child, layer_index + 1);
            }
            container.add(MarkdownNode::Flow(child));
        }
        MarkdownBlock::Html(_) => {}
        MarkdownBlock::ThematicBreak => container.add(factory.create_separator()),
        other => {
            trace!("no widget for {} block, adding placeholder", other.kind_name());
            container.add(factory.create_not_implemented(other));
        }
    }
}

/// Adds a list item's blocks straight into `container` at `layer_index`.
///
/// A task item's checkbox goes in front of the first text flow the item produced.
pub fn add_list_item<F>(factory: &F, item: &ListItemBlock, container: &mut FillFlow, layer_index: usize)
where
    F: MarkdownComponentFactory + ?Sized,
{
    let first = container.len();
    for child in &item.children {
        factory.add_markdown_component(child, container, layer_index);
    }
    let Some(checked) = item.task else {
        return;
    };
    if let Some(flow) = container.children_mut()[first..]
        .iter_mut()
        .find_map(MarkdownNode::as_text_flow_mut)
    {
        flow.add_task_marker(checked);
    }
}
