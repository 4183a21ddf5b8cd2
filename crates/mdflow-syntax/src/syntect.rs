use mdflow_core::text::CodeHighlighter;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::FontStyle;
use syntect::highlighting::Style as SynStyle;
use syntect::highlighting::Theme;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxReference;
use syntect::parsing::SyntaxSet;

const DEFAULT_THEME: &str = "base16-ocean.dark";

pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self::with_theme_name(DEFAULT_THEME)
    }

    /// Uses one of syntect's bundled themes, falling back to the first bundled theme when
    /// `name` is unknown.
    pub fn with_theme_name(name: &str) -> Self {
        let syntax_set = SyntaxSet::load_defaults_nonewlines();
        let theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .get(name)
            .cloned()
            .or_else(|| theme_set.themes.values().next().cloned())
            .unwrap_or_default();
        Self { syntax_set, theme }
    }

    fn syntax_for(&self, language: Option<&str>) -> &SyntaxReference {
        language
            .and_then(|lang| {
                self.syntax_set
                    .find_syntax_by_extension(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_token(lang))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight_lines(&self, language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>> {
        let syntax = self.syntax_for(language);
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        lines
            .iter()
            .map(|line| {
                let regions = highlighter
                    .highlight_line(line, &self.syntax_set)
                    .unwrap_or_default();
                let spans: Vec<Span<'static>> = regions
                    .into_iter()
                    .filter(|(_, s)| !s.is_empty())
                    .map(|(style, s)| Span::styled(s.to_string(), syn_style_to_ratatui(style)))
                    .collect();
                if spans.is_empty() {
                    vec![Span::raw((*line).to_string())]
                } else {
                    spans
                }
            })
            .collect()
    }

    fn background_color(&self) -> Option<Color> {
        self.theme
            .settings
            .background
            .map(|c| Color::Rgb(c.r, c.g, c.b))
    }
}

fn syn_style_to_ratatui(s: SynStyle) -> Style {
    let mut out = Style::default().fg(Color::Rgb(s.foreground.r, s.foreground.g, s.foreground.b));

    if s.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if s.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if s.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_one_row_per_line() {
        let h = SyntectHighlighter::new();
        let rows = h.highlight_lines(Some("rs"), &["fn main() {", "}", ""]);
        assert_eq!(rows.len(), 3);
        let first: String = rows[0].iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "fn main() {");
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let h = SyntectHighlighter::new();
        let rows = h.highlight_lines(Some("no-such-language"), &["hello"]);
        assert_eq!(rows.len(), 1);
        assert!(h.background_color().is_some());
    }
}
