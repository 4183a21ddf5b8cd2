use std::sync::Arc;

use log::debug;
use mdflow_core::render::spans_width;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::ast::CodeBlock;
use crate::layout::Component;
use crate::layout::LayoutContext;
use crate::layout::LayoutOutput;

/// Code block on a filled background, optionally highlighted and line-numbered.
///
/// Rows are never wrapped; wide lines overflow and the container scrolls sideways.
#[derive(Clone, Debug)]
pub struct MarkdownFencedCodeBlock {
    language: Option<String>,
    lines: Arc<[String]>,
}

impl MarkdownFencedCodeBlock {
    pub fn new(code: &CodeBlock) -> Self {
        Self {
            language: code.language.clone(),
            lines: code.lines.clone().into(),
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn highlight(&self, cx: &LayoutContext<'_>) -> Option<Vec<Vec<Span<'static>>>> {
        let highlighter = cx.highlighter?;
        if self.lines.len() > cx.max_highlight_lines {
            debug!(
                "skipping highlight for {} line code block (limit {})",
                self.lines.len(),
                cx.max_highlight_lines
            );
            return None;
        }
        let lines: Vec<&str> = self.lines.iter().map(String::as_str).collect();
        Some(highlighter.highlight_lines(self.language.as_deref(), &lines))
    }
}

impl Component for MarkdownFencedCodeBlock {
    fn layout(&self, width: u16, cx: &LayoutContext<'_>, out: &mut LayoutOutput) {
        let box_style = match cx.highlighter.and_then(|h| h.background_color()) {
            Some(bg) => cx.theme.code_block.bg(bg),
            None => cx.theme.code_block,
        };
        let highlighted = self.highlight(cx);
        let gutter_w = if cx.show_code_line_numbers {
            digits(self.lines.len())
        } else {
            0
        };

        let empty = [String::new()];
        let lines: &[String] = if self.lines.is_empty() { &empty } else { &self.lines };
        for (i, line) in lines.iter().enumerate() {
            let mut spans: Vec<Span<'static>> = Vec::new();
            if cx.code_block_indent > 0 {
                spans.push(Span::styled(
                    " ".repeat(cx.code_block_indent as usize),
                    box_style,
                ));
            }
            if gutter_w > 0 {
                spans.push(Span::styled(
                    format!("{:>gutter_w$} │ ", i + 1),
                    box_style.patch(cx.theme.text_muted),
                ));
            }
            match highlighted.as_ref().and_then(|rows| rows.get(i)) {
                Some(row) => spans.extend(
                    row.iter()
                        .map(|s| Span::styled(s.content.clone(), patch_code_style(box_style, s.style))),
                ),
                None => spans.push(Span::styled(line.clone(), box_style)),
            }
            let used = spans_width(&spans);
            if used < width as usize {
                spans.push(Span::styled(" ".repeat(width as usize - used), box_style));
            }
            out.push(Line::from(spans));
        }
    }
}

fn patch_code_style(box_style: Style, token: Style) -> Style {
    // Box background wins over token backgrounds.
    let mut style = box_style.patch(token);
    if box_style.bg.is_some() {
        style.bg = box_style.bg;
    }
    style
}

fn digits(n: usize) -> usize {
    let mut d = 1;
    let mut v = n / 10;
    while v > 0 {
        v /= 10;
        d += 1;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdflow_core::render::spans_plain;
    use mdflow_core::text::CodeHighlighter;
    use mdflow_core::theme::Theme;
    use ratatui::style::Color;

    struct Upper;

    impl CodeHighlighter for Upper {
        fn highlight_lines(&self, _: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>> {
            lines
                .iter()
                .map(|l| vec![Span::styled(l.to_uppercase(), Style::default().fg(Color::Red))])
                .collect()
        }

        fn background_color(&self) -> Option<Color> {
            Some(Color::Black)
        }
    }

    fn block(lines: &[&str]) -> MarkdownFencedCodeBlock {
        MarkdownFencedCodeBlock::new(&CodeBlock {
            language: Some("rust".into()),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        })
    }

    fn rows(out: &LayoutOutput) -> Vec<String> {
        out.lines()
            .iter()
            .map(|l| spans_plain(&l.spans).trim_end().to_string())
            .collect()
    }

    #[test]
    fn rows_are_indented_and_padded_to_width() {
        let theme = Theme::default();
        let cx = LayoutContext::new(&theme);
        let mut out = LayoutOutput::new();
        block(&["fn main() {}"]).layout(20, &cx, &mut out);
        assert_eq!(rows(&out), vec!["  fn main() {}"]);
        assert_eq!(spans_width(&out.lines()[0].spans), 20);
        assert!(out.lines()[0].spans.iter().all(|s| s.style.bg == theme.code_block.bg));
    }

    #[test]
    fn line_numbers_are_right_aligned() {
        let theme = Theme::default();
        let cx = LayoutContext {
            show_code_line_numbers: true,
            code_block_indent: 0,
            ..LayoutContext::new(&theme)
        };
        let lines: Vec<String> = (1..=10).map(|i| format!("l{i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut out = LayoutOutput::new();
        block(&refs).layout(20, &cx, &mut out);
        let rows = rows(&out);
        assert_eq!(rows[0], " 1 │ l1");
        assert_eq!(rows[9], "10 │ l10");
    }

    #[test]
    fn highlighter_output_and_background_are_used() {
        let theme = Theme::default();
        let cx = LayoutContext {
            highlighter: Some(&Upper),
            ..LayoutContext::new(&theme)
        };
        let mut out = LayoutOutput::new();
        block(&["let x"]).layout(10, &cx, &mut out);
        assert_eq!(rows(&out), vec!["  LET X"]);
        let token = &out.lines()[0].spans[1];
        assert_eq!(token.style.fg, Some(Color::Red));
        assert_eq!(token.style.bg, Some(Color::Black));
    }

    #[test]
    fn long_blocks_skip_highlighting() {
        let theme = Theme::default();
        let cx = LayoutContext {
            highlighter: Some(&Upper),
            max_highlight_lines: 1,
            ..LayoutContext::new(&theme)
        };
        let mut out = LayoutOutput::new();
        block(&["a", "b"]).layout(10, &cx, &mut out);
        assert_eq!(rows(&out), vec!["  a", "  b"]);
    }

    #[test]
    fn empty_block_keeps_one_row() {
        let theme = Theme::default();
        let cx = LayoutContext::new(&theme);
        let mut out = LayoutOutput::new();
        block(&[]).layout(4, &cx, &mut out);
        assert_eq!(out.len(), 1);
    }
}
