use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

use crate::ast::ColumnAlign;
use crate::ast::Inline;
use crate::ast::TableBlock;
use crate::layout::Component;
use crate::layout::LayoutContext;
use crate::layout::LayoutOutput;
use crate::segment::Segment;
use crate::segment::append_inlines;
use crate::segment::segments_to_spans;
use crate::segment::segments_width;
use crate::segment::wrap_segments;
use mdflow_core::render::spans_width;
use mdflow_core::theme::Theme;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableStyle {
    /// Inner separators only, single-line headers.
    #[default]
    Glow,
    /// Full box-drawing borders.
    Box,
}

type Cell = Vec<Segment>;

#[derive(Clone, Debug)]
pub struct MarkdownTable {
    aligns: Vec<ColumnAlign>,
    head: Vec<Cell>,
    rows: Vec<Vec<Cell>>,
}

impl MarkdownTable {
    pub fn new(table: &TableBlock) -> Self {
        Self {
            aligns: table.aligns.clone(),
            head: table.head.iter().map(|c| cell_segments(c)).collect(),
            rows: table
                .rows
                .iter()
                .map(|row| row.iter().map(|c| cell_segments(c)).collect())
                .collect(),
        }
    }

    pub fn column_count(&self) -> usize {
        std::iter::once(&self.head)
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header row and body rows. Headerless tables promote their first row.
    fn split_rows(&self) -> (Option<&[Cell]>, &[Vec<Cell>]) {
        if !self.head.is_empty() {
            (Some(self.head.as_slice()), self.rows.as_slice())
        } else if let Some((first, rest)) = self.rows.split_first() {
            (Some(first.as_slice()), rest)
        } else {
            (None, &[])
        }
    }

    /// Natural column widths, shrunk one column at a time (widest first) to fit `available`.
    fn column_widths(&self, cols: usize, available: u16, min_col_w: u16) -> Vec<u16> {
        let mut col_w = vec![min_col_w; cols];
        for row in std::iter::once(&self.head).chain(self.rows.iter()) {
            for (ci, cell) in row.iter().enumerate() {
                let w = segments_width(cell).min(u16::MAX as usize) as u16;
                col_w[ci] = col_w[ci].max(w);
            }
        }
        if min_col_w.saturating_mul(cols as u16) > available {
            col_w.fill((available / cols as u16).max(1));
            return col_w;
        }
        let mut total: u16 = col_w.iter().fold(0u16, |acc, w| acc.saturating_add(*w));
        while total > available {
            let Some((idx, _)) = col_w
                .iter()
                .enumerate()
                .filter(|(_, w)| **w > min_col_w)
                .max_by_key(|(_, w)| **w)
            else {
                break;
            };
            col_w[idx] -= 1;
            total -= 1;
        }
        col_w
    }

    fn layout_glow(&self, width: u16, theme: &Theme, out: &mut LayoutOutput) {
        let cols = self.column_count();
        if cols == 0 || width == 0 {
            return;
        }
        let chrome_w = (cols as u16 - 1).saturating_add(2 * cols as u16);
        if chrome_w >= width {
            return;
        }
        let col_w = self.column_widths(cols, width - chrome_w, 1);
        let (head, body) = self.split_rows();

        if let Some(head) = head {
            let cells: Vec<Vec<Vec<Span<'static>>>> = col_w
                .iter()
                .enumerate()
                .map(|(ci, w)| {
                    let spans = segments_to_spans(cell_at(head, ci), header_style(theme), theme);
                    vec![truncate_spans_with_ellipsis(spans, *w as usize, theme.text_primary)]
                })
                .collect();
            self.push_row(&cells, &col_w, theme, Frame::Inner, out);
            out.push(Line::from(Span::styled(
                border_line(&col_w, Border::Glow),
                theme.text_muted,
            )));
        }
        for row in body {
            let cells = wrap_cells(row, &col_w, theme.text_primary, theme);
            self.push_row(&cells, &col_w, theme, Frame::Inner, out);
        }
    }

    fn layout_box(&self, width: u16, theme: &Theme, out: &mut LayoutOutput) {
        let cols = self.column_count();
        if cols == 0 || width == 0 {
            return;
        }
        let chrome_w = 3u16.saturating_mul(cols as u16).saturating_add(1);
        if chrome_w >= width {
            return;
        }
        let col_w = self.column_widths(cols, width - chrome_w, 3);
        let (head, body) = self.split_rows();

        out.push(Line::from(Span::styled(
            border_line(&col_w, Border::Top),
            theme.text_muted,
        )));
        if let Some(head) = head {
            let cells = wrap_cells(head, &col_w, header_style(theme), theme);
            self.push_row(&cells, &col_w, theme, Frame::Outer, out);
            out.push(Line::from(Span::styled(
                border_line(&col_w, Border::HeaderSep),
                theme.text_muted,
            )));
        }
        for row in body {
            let cells = wrap_cells(row, &col_w, theme.text_primary, theme);
            self.push_row(&cells, &col_w, theme, Frame::Outer, out);
        }
        out.push(Line::from(Span::styled(
            border_line(&col_w, Border::Bottom),
            theme.text_muted,
        )));
    }

    fn push_row(
        &self,
        cells: &[Vec<Vec<Span<'static>>>],
        col_w: &[u16],
        theme: &Theme,
        frame: Frame,
        out: &mut LayoutOutput,
    ) {
        let height = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        for li in 0..height {
            let mut spans: Vec<Span<'static>> = Vec::new();
            if frame == Frame::Outer {
                spans.push(Span::styled("│", theme.text_muted));
            }
            for (ci, w) in col_w.iter().copied().enumerate() {
                if ci > 0 && frame == Frame::Inner {
                    spans.push(Span::styled("│", theme.text_muted));
                }
                let cell = cells
                    .get(ci)
                    .and_then(|rows| rows.get(li))
                    .cloned()
                    .unwrap_or_default();
                let align = self.aligns.get(ci).copied().unwrap_or_default();
                spans.push(Span::raw(" "));
                spans.extend(pad_spans(cell, w, align));
                spans.push(Span::raw(" "));
                if frame == Frame::Outer {
                    spans.push(Span::styled("│", theme.text_muted));
                }
            }
            out.push(Line::from(spans));
        }
    }
}

impl Component for MarkdownTable {
    fn layout(&self, width: u16, cx: &LayoutContext<'_>, out: &mut LayoutOutput) {
        match cx.table_style {
            TableStyle::Glow => self.layout_glow(width, cx.theme, out),
            TableStyle::Box => self.layout_box(width, cx.theme, out),
        }
    }
}

fn cell_segments(cell: &[Inline]) -> Cell {
    let mut lines = Vec::new();
    append_inlines(&mut lines, cell, false);
    lines.into_iter().flatten().collect()
}

fn cell_at(row: &[Cell], ci: usize) -> &[Segment] {
    row.get(ci).map(Vec::as_slice).unwrap_or(&[])
}

fn header_style(theme: &Theme) -> Style {
    theme.text_primary.add_modifier(Modifier::BOLD)
}

fn wrap_cells(
    row: &[Cell],
    col_w: &[u16],
    base: Style,
    theme: &Theme,
) -> Vec<Vec<Vec<Span<'static>>>> {
    col_w
        .iter()
        .enumerate()
        .map(|(ci, w)| {
            wrap_segments(&[], &[], cell_at(row, ci), *w, base, theme)
                .into_iter()
                .map(|l| l.spans)
                .collect()
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Inner,
    Outer,
}

#[derive(Clone, Copy, Debug)]
enum Border {
    Glow,
    Top,
    HeaderSep,
    Bottom,
}

fn border_line(col_w: &[u16], kind: Border) -> String {
    let (left, mid, right) = match kind {
        Border::Glow => ("", '┼', ""),
        Border::Top => ("┌", '┬', "┐"),
        Border::HeaderSep => ("├", '┼', "┤"),
        Border::Bottom => ("└", '┴', "┘"),
    };
    let mut s = String::from(left);
    for (i, w) in col_w.iter().enumerate() {
        if i > 0 {
            s.push(mid);
        }
        s.push_str(&"─".repeat(*w as usize + 2));
    }
    s.push_str(right);
    s
}

fn pad_spans(mut spans: Vec<Span<'static>>, width: u16, align: ColumnAlign) -> Vec<Span<'static>> {
    let pad = (width as usize).saturating_sub(spans_width(&spans));
    let (left, right) = match align {
        ColumnAlign::Right => (pad, 0),
        ColumnAlign::Center => (pad / 2, pad - pad / 2),
        ColumnAlign::Left | ColumnAlign::None => (0, pad),
    };
    if left > 0 {
        spans.insert(0, Span::raw(" ".repeat(left)));
    }
    if right > 0 {
        spans.push(Span::raw(" ".repeat(right)));
    }
    spans
}

/// Cuts spans to `max_cols`, replacing the last visible column with `…` when anything
/// was dropped.
fn truncate_spans_with_ellipsis(
    spans: Vec<Span<'static>>,
    max_cols: usize,
    ellipsis_style: Style,
) -> Vec<Span<'static>> {
    if spans_width(&spans) <= max_cols {
        return spans;
    }
    if max_cols == 0 {
        return Vec::new();
    }
    let target = max_cols - 1;
    let mut out = Vec::new();
    let mut cols = 0usize;
    'spans: for span in spans {
        let mut buf = String::new();
        for ch in span.content.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if cols + w > target {
                if !buf.is_empty() {
                    out.push(Span::styled(buf, span.style));
                }
                break 'spans;
            }
            cols += w;
            buf.push(ch);
        }
        if !buf.is_empty() {
            out.push(Span::styled(buf, span.style));
        }
    }
    out.push(Span::styled("…", ellipsis_style));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MarkdownPipeline;
    use crate::ast::MarkdownBlock;
    use mdflow_core::render::spans_plain;

    fn table(md: &str) -> MarkdownTable {
        let doc = MarkdownPipeline::default().parse(md);
        match &doc.blocks[0] {
            MarkdownBlock::Table(t) => MarkdownTable::new(t),
            other => panic!("expected table, got {other:?}"),
        }
    }

    fn rows(table: &MarkdownTable, style: TableStyle, width: u16) -> Vec<String> {
        let theme = Theme::default();
        let cx = LayoutContext {
            table_style: style,
            ..LayoutContext::new(&theme)
        };
        let mut out = LayoutOutput::new();
        table.layout(width, &cx, &mut out);
        out.lines().iter().map(|l| spans_plain(&l.spans)).collect()
    }

    #[test]
    fn glow_uses_inner_separators() {
        let t = table("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(
            rows(&t, TableStyle::Glow, 40),
            vec![" a │ b ", "───┼───", " 1 │ 2 "]
        );
    }

    #[test]
    fn box_draws_full_borders() {
        let t = table("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(
            rows(&t, TableStyle::Box, 40),
            vec![
                "┌─────┬─────┐",
                "│ a   │ b   │",
                "├─────┼─────┤",
                "│ 1   │ 2   │",
                "└─────┴─────┘",
            ]
        );
    }

    #[test]
    fn alignment_pads_cells() {
        let t = table("| left | right |\n|:-----|------:|\n| x | y |\n");
        let got = rows(&t, TableStyle::Glow, 40);
        assert_eq!(got[2], " x    │     y ");
    }

    #[test]
    fn narrow_widths_shrink_widest_column_and_truncate_headers() {
        let t = table("| heading | b |\n|---|---|\n| some long words | c |\n");
        let got = rows(&t, TableStyle::Glow, 14);
        // chrome: 1 separator + 4 padding; 9 columns left for content.
        assert_eq!(
            got,
            vec![
                " heading  │ b ",
                "──────────┼───",
                " some     │ c ",
                " long     │   ",
                " words    │   ",
            ]
        );

        let narrower = rows(&t, TableStyle::Glow, 10);
        assert_eq!(narrower[0], " hea… │ b ");
    }

    #[test]
    fn header_cells_are_bold() {
        let t = table("| a |\n|---|\n| 1 |\n");
        let theme = Theme::default();
        let cx = LayoutContext::new(&theme);
        let mut out = LayoutOutput::new();
        t.layout(20, &cx, &mut out);
        let header = out.lines()[0]
            .spans
            .iter()
            .find(|s| s.content == "a")
            .map(|s| s.style);
        assert!(header.is_some_and(|s| s.add_modifier.contains(Modifier::BOLD)));
        assert_eq!(t.column_count(), 1);
        assert_eq!(t.row_count(), 1);
    }
}
