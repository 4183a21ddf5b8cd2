use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::viewport::ViewportState;

const TAB_COLS: usize = 4;

/// Draws a one-column scrollbar track with a thumb sized to the visible fraction.
///
/// When the content fits the viewport the track is blanked instead.
pub fn render_scrollbar(area: Rect, buf: &mut Buffer, state: &ViewportState, style: Style) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }
    if state.content_h <= state.viewport_h as u32 || state.content_h == 0 {
        for dy in 0..area.height {
            buf.set_stringn(area.x, area.y + dy, " ", 1, style);
        }
        return;
    }

    let track_h = area.height as f64;
    let thumb_h = ((state.viewport_h as f64 / state.content_h as f64) * track_h)
        .round()
        .clamp(1.0, track_h) as u16;

    let max_y = state
        .content_h
        .saturating_sub(state.viewport_h as u32)
        .max(1) as f64;
    let thumb_top = ((state.y as f64 / max_y) * (track_h - thumb_h as f64))
        .round()
        .clamp(0.0, (track_h - thumb_h as f64).max(0.0)) as u16;

    for dy in 0..area.height {
        let ch = if dy >= thumb_top && dy < thumb_top + thumb_h {
            "█"
        } else {
            " "
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

/// Writes cells left to right, skipping the first `start_col` columns and stopping at
/// `max_cols`. Wide characters that straddle either edge are dropped.
struct ClippedWriter<'a> {
    buf: &'a mut Buffer,
    x: u16,
    y: u16,
    start_col: usize,
    max_cols: usize,
    col: usize,
    out_cols: usize,
}

impl ClippedWriter<'_> {
    /// Returns `false` once the right edge is reached.
    fn put(&mut self, ch: char, style: Style) -> bool {
        if ch == '\t' {
            for _ in 0..TAB_COLS {
                if !self.put(' ', style) {
                    return false;
                }
            }
            return true;
        }

        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w == 0 {
            return true;
        }
        if self.col < self.start_col {
            self.col += w;
            return true;
        }
        if self.out_cols + w > self.max_cols {
            return false;
        }

        let mut tmp = [0u8; 4];
        let x = self.x + self.out_cols as u16;
        if let Some(cell) = self.buf.cell_mut((x, self.y)) {
            cell.set_style(style);
            cell.set_symbol(ch.encode_utf8(&mut tmp));
        }
        if w == 2
            && let Some(cell) = self.buf.cell_mut((x + 1, self.y))
        {
            cell.set_style(style);
            cell.set_symbol("");
        }
        self.out_cols += w;
        self.col += w;
        true
    }
}

/// Renders `spans` on row `y`, horizontally scrolled by `start_col`.
///
/// Spans without a style of their own fall back to `fallback_style`.
pub fn render_spans_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    spans: &[Span<'static>],
    fallback_style: Style,
) {
    if max_cols == 0 {
        return;
    }

    let mut w = ClippedWriter {
        buf,
        x,
        y,
        start_col: start_col as usize,
        max_cols: max_cols as usize,
        col: 0,
        out_cols: 0,
    };

    for span in spans {
        let style = if span.style == Style::default() {
            fallback_style
        } else {
            fallback_style.patch(span.style)
        };
        for ch in span.content.chars() {
            if !w.put(ch, style) {
                return;
            }
        }
    }
}

/// Display width of a row of spans in terminal cells.
pub fn spans_width(spans: &[Span<'_>]) -> usize {
    spans
        .iter()
        .map(|s| UnicodeWidthStr::width(s.content.as_ref()))
        .sum()
}

/// Concatenates span contents without styling.
pub fn spans_plain(spans: &[Span<'_>]) -> String {
    let mut out = String::new();
    for s in spans {
        out.push_str(s.content.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, w: u16) -> String {
        (0..w)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn render_spans_clipped_expands_tabs() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        let spans = vec![Span::raw("\t1")];
        render_spans_clipped(0, 0, 0, 6, &mut buf, &spans, Style::default());
        assert!(row(&buf, 6).starts_with("    1"));
    }

    #[test]
    fn render_spans_clipped_scrolls_and_clips() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        let spans = vec![Span::raw("ab"), Span::raw("cdef")];
        render_spans_clipped(0, 0, 1, 3, &mut buf, &spans, Style::default());
        assert_eq!(row(&buf, 3), "bcd");
    }

    #[test]
    fn render_spans_clipped_stops_before_overflowing_wide_char() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        let spans = vec![Span::raw("a你好")];
        render_spans_clipped(0, 0, 0, 3, &mut buf, &spans, Style::default());
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "a");
        assert_eq!(buf.cell((1, 0)).unwrap().symbol(), "你");
        assert_eq!(buf.cell((2, 0)).unwrap().symbol(), "");
    }

    #[test]
    fn spans_width_counts_wide_chars() {
        let spans = vec![Span::raw("ab"), Span::raw("你")];
        assert_eq!(spans_width(&spans), 4);
        assert_eq!(spans_plain(&spans), "ab你");
    }

    #[test]
    fn render_scrollbar_does_not_panic() {
        let mut state = ViewportState::default();
        state.set_viewport(10, 5);
        state.set_content(10, 50);
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 5));
        render_scrollbar(Rect::new(0, 0, 1, 5), &mut buf, &state, Style::default());
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "█");
    }
}
