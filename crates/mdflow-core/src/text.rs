use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Span;

/// Highlights code block contents line by line.
///
/// `language` is the normalized fence info string (`rs`, `python`, ...), or `None` for
/// indented blocks and fences without one.
pub trait CodeHighlighter {
    fn highlight_lines(&self, language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>>;

    /// Preferred background for code boxes, if the backend's theme has one.
    fn background_color(&self) -> Option<Color> {
        None
    }
}

/// Passes code through unstyled.
pub struct NoHighlight;

impl CodeHighlighter for NoHighlight {
    fn highlight_lines(&self, _language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>> {
        lines
            .iter()
            .map(|l| vec![Span::styled((*l).to_string(), Style::default())])
            .collect()
    }
}
