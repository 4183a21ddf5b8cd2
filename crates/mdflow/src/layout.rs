//! Width-driven layout of widget trees into terminal rows.

use std::fmt;

use mdflow_core::render::spans_width;
use mdflow_core::text::CodeHighlighter;
use mdflow_core::theme::Theme;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::table::TableStyle;

/// Everything a widget needs besides its own data to lay itself out.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub theme: &'a Theme,
    pub highlighter: Option<&'a (dyn CodeHighlighter + Send + Sync)>,
    pub table_style: TableStyle,
    pub code_block_indent: u16,
    pub show_code_line_numbers: bool,
    pub max_highlight_lines: usize,
    pub show_link_destinations: bool,
    pub base_url: Option<&'a str>,
}

impl<'a> LayoutContext<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            highlighter: None,
            table_style: TableStyle::default(),
            code_block_indent: 2,
            show_code_line_numbers: false,
            max_highlight_lines: 2_000,
            show_link_destinations: false,
            base_url: None,
        }
    }
}

impl fmt::Debug for LayoutContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutContext")
            .field("theme", self.theme)
            .field("highlighter", &self.highlighter.is_some())
            .field("table_style", &self.table_style)
            .field("code_block_indent", &self.code_block_indent)
            .field("show_code_line_numbers", &self.show_code_line_numbers)
            .field("max_highlight_lines", &self.max_highlight_lines)
            .field("show_link_destinations", &self.show_link_destinations)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Rows produced by a layout pass, plus the row index of every anchor seen.
#[derive(Clone, Debug, Default)]
pub struct LayoutOutput {
    lines: Vec<Line<'static>>,
    anchors: Vec<(String, usize)>,
}

impl LayoutOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    pub fn push_blank(&mut self) {
        self.lines.push(Line::default());
    }

    /// Records `id` at the next row to be pushed.
    pub fn mark_anchor(&mut self, id: &str) {
        self.anchors.push((id.to_string(), self.lines.len()));
    }

    /// Moves `other` below the current rows, prepending `prefix` to each of its rows.
    pub fn append_prefixed(&mut self, other: LayoutOutput, prefix: &[Span<'static>]) {
        let offset = self.lines.len();
        self.anchors.extend(
            other
                .anchors
                .into_iter()
                .map(|(id, row)| (id, row + offset)),
        );
        if prefix.is_empty() {
            self.lines.extend(other.lines);
            return;
        }
        for line in other.lines {
            let mut spans = prefix.to_vec();
            spans.extend(line.spans);
            self.lines.push(Line {
                spans,
                ..line
            });
        }
    }

    /// Like [`append_prefixed`](Self::append_prefixed), but blank rows stay blank.
    pub fn append_indented(&mut self, other: LayoutOutput, prefix: &[Span<'static>]) {
        let offset = self.lines.len();
        self.anchors.extend(
            other
                .anchors
                .into_iter()
                .map(|(id, row)| (id, row + offset)),
        );
        for line in other.lines {
            if line.spans.iter().all(|s| s.content.is_empty()) {
                self.lines.push(line);
                continue;
            }
            let mut spans = prefix.to_vec();
            spans.extend(line.spans);
            self.lines.push(Line {
                spans,
                ..line
            });
        }
    }

    pub fn append(&mut self, other: LayoutOutput) {
        self.append_prefixed(other, &[]);
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut [Line<'static>] {
        &mut self.lines
    }

    pub fn into_lines(self) -> Vec<Line<'static>> {
        self.lines
    }

    pub fn anchors(&self) -> &[(String, usize)] {
        &self.anchors
    }

    pub fn anchor_row(&self, id: &str) -> Option<usize> {
        self.anchors
            .iter()
            .find(|(anchor, _)| anchor == id)
            .map(|(_, row)| *row)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Widest row in columns.
    pub fn max_width(&self) -> u32 {
        self.lines
            .iter()
            .map(|l| spans_width(&l.spans) as u32)
            .max()
            .unwrap_or(0)
    }
}

/// A node in the widget tree.
///
/// Implementations append their rows for a given `width` to `out`. Rows may be wider
/// than `width` only when the content can't be broken (code, tables); the container
/// scrolls horizontally for those.
pub trait Component: fmt::Debug {
    fn layout(&self, width: u16, cx: &LayoutContext<'_>, out: &mut LayoutOutput);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdflow_core::render::spans_plain;

    #[test]
    fn appended_anchors_are_offset() {
        let mut inner = LayoutOutput::new();
        inner.push(Line::from("a"));
        inner.mark_anchor("x");
        inner.push(Line::from("b"));

        let mut outer = LayoutOutput::new();
        outer.push_blank();
        outer.append_prefixed(inner, &[Span::raw("> ")]);

        assert_eq!(outer.anchor_row("x"), Some(2));
        assert_eq!(spans_plain(&outer.lines()[2].spans), "> b");
        assert_eq!(outer.max_width(), 3);
    }
}
