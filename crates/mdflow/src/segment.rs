//! Styled text runs and the word-wrapper shared by every text-bearing widget.

use std::sync::Arc;

use mdflow_core::render::spans_width;
use mdflow_core::theme::Theme;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::ast::Inline;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct InlineFlags {
    pub emphasis: bool,
    pub strong: bool,
    pub strike: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    #[default]
    Text,
    Code,
    Muted,
    Reference,
}

/// A run of text sharing one style. Styles resolve against the owning widget's base
/// style at layout time.
#[derive(Clone, Debug, Default)]
pub(crate) struct Segment {
    pub text: String,
    pub kind: SegmentKind,
    pub flags: InlineFlags,
    pub link: Option<Arc<str>>,
    /// Explicit style patched over everything else (`add_text`, markers).
    pub style: Option<Style>,
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style: Some(style),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: SegmentKind) -> Self {
        self.kind = kind;
        self
    }

    fn with_text(&self, text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..self.clone()
        }
    }

    pub fn resolve_style(&self, base: Style, theme: &Theme) -> Style {
        let mut style = match self.kind {
            SegmentKind::Text => base,
            SegmentKind::Code => base.patch(theme.code_inline),
            SegmentKind::Muted => theme.text_muted,
            SegmentKind::Reference => theme.accent,
        };
        if self.link.is_some() {
            style = style.patch(theme.accent).add_modifier(Modifier::UNDERLINED);
        }
        if self.flags.emphasis {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.flags.strong {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.flags.strike {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        if let Some(explicit) = self.style {
            style = style.patch(explicit);
        }
        style
    }
}

pub(crate) fn segments_plain(segs: &[Segment]) -> String {
    let mut out = String::new();
    for s in segs {
        out.push_str(&s.text);
    }
    out
}

pub(crate) fn segments_width(segs: &[Segment]) -> usize {
    segs.iter().map(|s| UnicodeWidthStr::width(s.text.as_str())).sum()
}

pub(crate) fn segments_to_spans(segs: &[Segment], base: Style, theme: &Theme) -> Vec<Span<'static>> {
    segs.iter()
        .filter(|s| !s.text.is_empty())
        .map(|s| Span::styled(s.text.clone(), s.resolve_style(base, theme)))
        .collect()
}

/// Appends inline content to `lines`, one `Vec<Segment>` per hard-broken line.
///
/// With `hard_breaks == false` hard breaks become spaces (table cells).
pub(crate) fn append_inlines(lines: &mut Vec<Vec<Segment>>, inlines: &[Inline], hard_breaks: bool) {
    if lines.is_empty() {
        lines.push(Vec::new());
    }
    push_inlines(lines, inlines, InlineFlags::default(), None, hard_breaks);
}

fn push_inlines(
    lines: &mut Vec<Vec<Segment>>,
    inlines: &[Inline],
    flags: InlineFlags,
    link: Option<&Arc<str>>,
    hard_breaks: bool,
) {
    let push = |lines: &mut Vec<Vec<Segment>>, seg: Segment| {
        if let Some(line) = lines.last_mut() {
            line.push(Segment {
                flags,
                link: seg.link.or_else(|| link.cloned()),
                ..seg
            });
        }
    };
    for inline in inlines {
        match inline {
            Inline::Text(t) => push(lines, Segment::text(t.as_str())),
            Inline::Code(c) => push(lines, Segment::text(c.as_str()).with_kind(SegmentKind::Code)),
            Inline::Emphasis(children) => push_inlines(
                lines,
                children,
                InlineFlags {
                    emphasis: true,
                    ..flags
                },
                link,
                hard_breaks,
            ),
            Inline::Strong(children) => push_inlines(
                lines,
                children,
                InlineFlags {
                    strong: true,
                    ..flags
                },
                link,
                hard_breaks,
            ),
            Inline::Strikethrough(children) => push_inlines(
                lines,
                children,
                InlineFlags {
                    strike: true,
                    ..flags
                },
                link,
                hard_breaks,
            ),
            Inline::Link { dest, children, .. } => {
                let dest: Arc<str> = Arc::from(dest.as_str());
                push_inlines(lines, children, flags, Some(&dest), hard_breaks);
            }
            Inline::Image { dest, alt, .. } => {
                let alt = Inline::plain_text(alt);
                let text = if alt.trim().is_empty() {
                    "[image]".to_string()
                } else {
                    format!("[image: {}]", alt.trim())
                };
                push(
                    lines,
                    Segment {
                        link: Some(Arc::from(dest.as_str())),
                        ..Segment::text(text).with_kind(SegmentKind::Muted)
                    },
                );
            }
            Inline::SoftBreak => push(lines, Segment::text(" ")),
            Inline::HardBreak => {
                if hard_breaks {
                    lines.push(Vec::new());
                } else {
                    push(lines, Segment::text(" "));
                }
            }
            Inline::Html(html) => {
                let text = html_to_text(html);
                if !text.is_empty() {
                    push(lines, Segment::text(text).with_kind(SegmentKind::Muted));
                }
            }
            Inline::FootnoteReference(label) => push(
                lines,
                Segment::text(format!("[^{label}]")).with_kind(SegmentKind::Reference),
            ),
            Inline::Math { tex, display } => {
                let text = if *display {
                    format!("$${tex}$$")
                } else {
                    format!("${tex}$")
                };
                push(lines, Segment::text(text).with_kind(SegmentKind::Code));
            }
        }
    }
}

pub(crate) fn html_to_text(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if in_tag => {}
            _ => out.push(ch),
        }
    }
    let decoded = out
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Greedy word wrap.
///
/// `initial` prefixes the first row and `subsequent` every following row. Words wider than
/// the row are split, URLs preferably after URL punctuation. Returns no rows when there is
/// neither content nor prefix.
pub(crate) fn wrap_segments(
    initial: &[Span<'static>],
    subsequent: &[Span<'static>],
    segments: &[Segment],
    width: u16,
    base: Style,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if width == 0 {
        return Vec::new();
    }
    let mut rows = Rows {
        out: Vec::new(),
        prefix: initial.to_vec(),
        cur: Vec::new(),
        cols: spans_width(initial),
        width: width as usize,
        base,
        theme,
    };

    for tok in segments.iter().flat_map(split_segment_ws) {
        let tok_cols = UnicodeWidthStr::width(tok.text.as_str());
        if is_all_ws(&tok.text) {
            if rows.cur.is_empty() {
                continue;
            }
            if rows.cols + tok_cols <= rows.width {
                rows.push(tok, tok_cols);
            } else {
                rows.break_row(subsequent);
            }
            continue;
        }
        if rows.cols + tok_cols <= rows.width {
            rows.push(tok, tok_cols);
            continue;
        }
        if !rows.cur.is_empty() {
            rows.break_row(subsequent);
        }
        let mut remaining = tok;
        loop {
            let remaining_cols = UnicodeWidthStr::width(remaining.text.as_str());
            if remaining.text.is_empty() {
                break;
            }
            if rows.cols + remaining_cols <= rows.width {
                rows.push(remaining, remaining_cols);
                break;
            }
            let max = rows.width.saturating_sub(rows.cols).max(1);
            let (head, tail) = split_to_width_prefer_url_breaks(&remaining, max);
            let head_cols = UnicodeWidthStr::width(head.text.as_str());
            rows.push(head, head_cols);
            rows.break_row(subsequent);
            remaining = tail;
        }
    }

    rows.finish()
}

struct Rows<'a> {
    out: Vec<Line<'static>>,
    prefix: Vec<Span<'static>>,
    cur: Vec<Segment>,
    cols: usize,
    width: usize,
    base: Style,
    theme: &'a Theme,
}

impl Rows<'_> {
    fn push(&mut self, seg: Segment, cols: usize) {
        self.cur.push(seg);
        self.cols += cols;
    }

    fn emit(&mut self) {
        while self.cur.last().is_some_and(|s| is_all_ws(&s.text)) {
            self.cur.pop();
        }
        let mut spans = std::mem::take(&mut self.prefix);
        spans.extend(segments_to_spans(&self.cur, self.base, self.theme));
        self.out.push(Line::from(spans));
        self.cur.clear();
    }

    fn break_row(&mut self, subsequent: &[Span<'static>]) {
        self.emit();
        self.prefix = subsequent.to_vec();
        self.cols = spans_width(subsequent);
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.cur.is_empty() || !self.prefix.is_empty() {
            self.emit();
        }
        self.out
    }
}

fn split_segment_ws(seg: &Segment) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut last_ws: Option<bool> = None;
    for (i, ch) in seg.text.char_indices() {
        let ws = ch.is_whitespace();
        if last_ws.is_some_and(|prev| prev != ws) {
            out.push(seg.with_text(&seg.text[start..i]));
            start = i;
        }
        last_ws = Some(ws);
    }
    if start < seg.text.len() {
        out.push(seg.with_text(&seg.text[start..]));
    }
    out
}

fn split_to_width_prefer_url_breaks(seg: &Segment, max_cols: usize) -> (Segment, Segment) {
    if looks_like_url(&seg.text)
        && let Some(idx) = last_url_breakpoint_before(&seg.text, max_cols)
    {
        let (a, b) = seg.text.split_at(idx);
        return (seg.with_text(a), seg.with_text(b));
    }
    split_to_width(seg, max_cols)
}

fn looks_like_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

fn last_url_breakpoint_before(s: &str, max_cols: usize) -> Option<usize> {
    let mut cols = 0usize;
    let mut best = None;
    for (i, ch) in s.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if cols + w > max_cols {
            break;
        }
        cols += w;
        if matches!(ch, '/' | '.' | '-' | '_' | '~' | '?' | '&' | '#' | '=') {
            best = Some(i + ch.len_utf8());
        }
    }
    best
}

/// Splits after at most `max_cols` columns. Always moves at least one char into the head
/// so callers make progress on wide glyphs in narrow rows.
fn split_to_width(seg: &Segment, max_cols: usize) -> (Segment, Segment) {
    let mut cols = 0usize;
    let mut idx = 0usize;
    for (i, ch) in seg.text.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if cols + w > max_cols {
            if idx == 0 {
                idx = i + ch.len_utf8();
            }
            break;
        }
        cols += w;
        idx = i + ch.len_utf8();
    }
    let (a, b) = seg.text.split_at(idx);
    (seg.with_text(a), seg.with_text(b))
}

fn is_all_ws(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdflow_core::render::spans_plain;

    fn plain(lines: &[Line<'static>]) -> Vec<String> {
        lines.iter().map(|l| spans_plain(&l.spans)).collect()
    }

    fn wrap(text: &str, width: u16) -> Vec<String> {
        let theme = Theme::default();
        plain(&wrap_segments(
            &[],
            &[],
            &[Segment::text(text)],
            width,
            theme.text_primary,
            &theme,
        ))
    }

    #[test]
    fn wraps_at_word_boundaries() {
        assert_eq!(wrap("alpha beta gamma", 11), vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn prefers_url_punctuation_when_splitting_urls() {
        let rows = wrap("https://example.com/some/path", 16);
        assert_eq!(rows[0], "https://example.");
        assert_eq!(rows.concat(), "https://example.com/some/path");
    }

    #[test]
    fn wide_glyph_in_one_column_still_progresses() {
        assert_eq!(wrap("界界", 1), vec!["界", "界"]);
    }

    #[test]
    fn hanging_prefix_applies_to_following_rows() {
        let theme = Theme::default();
        let rows = wrap_segments(
            &[Span::raw("@ ")],
            &[Span::raw("  ")],
            &[Segment::text("one two three")],
            9,
            theme.text_primary,
            &theme,
        );
        assert_eq!(plain(&rows), vec!["@ one two", "  three"]);
    }

    #[test]
    fn inline_flags_map_to_modifiers() {
        let mut lines = Vec::new();
        append_inlines(
            &mut lines,
            &[Inline::Strong(vec![Inline::Emphasis(vec![Inline::Text("x".into())])])],
            true,
        );
        let theme = Theme::default();
        let style = lines[0][0].resolve_style(theme.text_primary, &theme);
        assert!(style.add_modifier.contains(Modifier::BOLD | Modifier::ITALIC));
    }

    #[test]
    fn hard_breaks_start_new_lines_only_when_enabled() {
        let inlines = [
            Inline::Text("a".into()),
            Inline::HardBreak,
            Inline::Text("b".into()),
        ];
        let mut broken = Vec::new();
        append_inlines(&mut broken, &inlines, true);
        assert_eq!(broken.len(), 2);

        let mut joined = Vec::new();
        append_inlines(&mut joined, &inlines, false);
        assert_eq!(segments_plain(&joined[0]), "a b");
    }

    #[test]
    fn html_is_stripped_and_decoded() {
        assert_eq!(html_to_text("<b>a &amp;  b</b>"), "a & b");
    }
}
