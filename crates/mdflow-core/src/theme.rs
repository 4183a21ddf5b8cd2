use ratatui::style::Color;
use ratatui::style::Style;

/// Styles shared by every markdown widget.
///
/// Widgets never hardcode colours; they pick one of these roles and layer modifiers on top
/// (bold for headings, italic for emphasis, and so on).
#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    /// Secondary text: list-depth markers, quote bars, separators, table rules.
    pub text_muted: Style,
    pub accent: Style,
    /// Placeholders for blocks that have no widget.
    pub danger: Style,
    pub code_inline: Style,
    /// Background box behind fenced code blocks.
    pub code_block: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            danger: Style::default().red(),
            code_inline: Style::default().cyan(),
            code_block: Style::default().bg(Color::Indexed(236)),
        }
    }
}
