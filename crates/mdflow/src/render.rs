use mdflow_core::theme::Theme;
use ratatui::text::Text;

use crate::container::MarkdownContainer;
use crate::container::MarkdownContainerOptions;

/// One-shot layout of `input` at `width` with default options.
///
/// For repeated draws keep a [`MarkdownContainer`] around instead; it caches the parse and
/// the layout.
pub fn render_markdown(input: &str, width: u16, theme: &Theme) -> Text<'static> {
    render_markdown_with(input, width, theme, MarkdownContainerOptions::default())
}

pub fn render_markdown_with(
    input: &str,
    width: u16,
    theme: &Theme,
    options: MarkdownContainerOptions,
) -> Text<'static> {
    let mut container = MarkdownContainer::with_options(options);
    container.set_text(input);
    Text::from(container.lines_for_width(width, theme))
}
