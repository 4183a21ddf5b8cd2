//! Inline text widget: paragraphs, heading text and list-item bodies.

use std::borrow::Cow;
use std::sync::Arc;

use mdflow_core::theme::Theme;
use ratatui::style::Style;
use ratatui::text::Span;
use url::Url;

use crate::ast::Inline;
use crate::ast::ParagraphBlock;
use crate::heading::heading_style;
use crate::layout::Component;
use crate::layout::LayoutContext;
use crate::layout::LayoutOutput;
use crate::segment::Segment;
use crate::segment::SegmentKind;
use crate::segment::append_inlines;
use crate::segment::segments_plain;
use crate::segment::segments_to_spans;
use crate::segment::segments_width;
use crate::segment::wrap_segments;

/// Indentation marker drawn in front of paragraphs nested `layer_index` lists deep.
pub fn layer_marker(layer_index: usize) -> Option<&'static str> {
    match layer_index {
        1 => Some("@ "),
        2 => Some("# "),
        3 | 4 => Some("+ "),
        _ => None,
    }
}

/// Task-list checkbox put in front of a list item's first text flow.
pub fn task_marker(checked: bool) -> &'static str {
    if checked { "[✓] " } else { "[ ] " }
}

/// What a text flow is used for; decides its base style.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TextRole {
    #[default]
    Body,
    Heading {
        font_size: f32,
    },
}

impl TextRole {
    pub fn base_style(self, theme: &Theme) -> Style {
        match self {
            TextRole::Body => theme.text_primary,
            TextRole::Heading { font_size } => heading_style(theme, font_size),
        }
    }
}

/// Word-wrapped inline content.
///
/// The marker prefix (list-depth marker, task checkbox) hangs: wrapped rows are indented
/// by its width.
#[derive(Clone, Debug)]
pub struct MarkdownTextFlow {
    role: TextRole,
    marker: Vec<Segment>,
    lines: Vec<Vec<Segment>>,
}

impl Default for MarkdownTextFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownTextFlow {
    pub fn new() -> Self {
        Self::with_role(TextRole::Body)
    }

    pub fn with_role(role: TextRole) -> Self {
        Self {
            role,
            marker: Vec::new(),
            lines: vec![Vec::new()],
        }
    }

    /// Paragraph text flow with the marker for `layer_index`.
    pub fn for_paragraph(paragraph: &ParagraphBlock, layer_index: usize) -> Self {
        let mut flow = Self::new();
        if let Some(marker) = layer_marker(layer_index) {
            flow.marker
                .push(Segment::text(marker).with_kind(SegmentKind::Muted));
        }
        flow.add_inline_text(&paragraph.inline);
        flow
    }

    pub fn role(&self) -> TextRole {
        self.role
    }

    /// Appends `text` to the current line in `style`.
    pub fn add_text(&mut self, text: &str, style: Style) {
        if let Some(line) = self.lines.last_mut() {
            line.push(Segment::styled(text, style));
        }
    }

    pub fn add_inline_text(&mut self, inlines: &[Inline]) {
        append_inlines(&mut self.lines, inlines, true);
    }

    /// Appends to the hanging prefix in front of the first row.
    pub fn add_marker(&mut self, text: &str, style: Style) {
        self.marker.push(Segment::styled(text, style));
    }

    /// Appends a task checkbox to the marker: accent when checked, muted otherwise.
    pub fn add_task_marker(&mut self, checked: bool) {
        let kind = if checked {
            SegmentKind::Reference
        } else {
            SegmentKind::Muted
        };
        self.marker
            .push(Segment::text(task_marker(checked)).with_kind(kind));
    }

    pub fn new_line(&mut self) {
        self.lines.push(Vec::new());
    }

    pub fn marker_text(&self) -> String {
        segments_plain(&self.marker)
    }

    /// Content without the marker; hard-broken lines joined with `\n`.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| segments_plain(l))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.iter().all(|s| s.text.is_empty()))
    }
}

impl Component for MarkdownTextFlow {
    fn layout(&self, width: u16, cx: &LayoutContext<'_>, out: &mut LayoutOutput) {
        let base = self.role.base_style(cx.theme);
        let marker = segments_to_spans(&self.marker, base, cx.theme);
        let hang: Vec<Span<'static>> = match segments_width(&self.marker) {
            0 => Vec::new(),
            w => vec![Span::raw(" ".repeat(w))],
        };
        for (i, line) in self.lines.iter().enumerate() {
            let initial = if i == 0 { &marker } else { &hang };
            let line: Cow<'_, [Segment]> = if cx.show_link_destinations {
                Cow::Owned(with_link_destinations(line, cx.base_url))
            } else {
                Cow::Borrowed(line)
            };
            for row in wrap_segments(initial, &hang, &line, width, base, cx.theme) {
                out.push(row);
            }
        }
    }
}

/// Appends ` (destination)` after each link run whose text differs from its target.
fn with_link_destinations(line: &[Segment], base_url: Option<&str>) -> Vec<Segment> {
    let mut out = Vec::with_capacity(line.len() + 1);
    let mut run_text = String::new();
    for (i, seg) in line.iter().enumerate() {
        out.push(seg.clone());
        let Some(dest) = seg.link.as_ref() else {
            continue;
        };
        run_text.push_str(&seg.text);
        let next_same = line
            .get(i + 1)
            .and_then(|n| n.link.as_ref())
            .is_some_and(|n| Arc::ptr_eq(n, dest) || **n == **dest);
        if next_same {
            continue;
        }
        let text = std::mem::take(&mut run_text);
        if dest.starts_with('#') || dest.is_empty() || text.trim() == dest.trim() {
            continue;
        }
        let resolved = resolve_url(base_url, dest);
        out.push(Segment::text(format!(" ({resolved})")).with_kind(SegmentKind::Muted));
    }
    out
}

/// Resolves a link destination against `base_url`.
///
/// Absolute destinations and anchors pass through. Relative ones are joined with
/// [`Url::join`] when the base parses as a URL, else appended as a path.
pub fn resolve_url(base_url: Option<&str>, dest: &str) -> String {
    let dest = dest.trim();
    if dest.is_empty() || is_absolute_url(dest) {
        return dest.to_string();
    }
    let Some(base) = base_url.map(str::trim).filter(|s| !s.is_empty()) else {
        return dest.to_string();
    };
    if let Ok(base) = Url::parse(base) {
        return base
            .join(dest)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| dest.to_string());
    }
    let base = base.trim_end_matches(['/', '\\']);
    let mut rel = dest;
    while let Some(rest) = rel.strip_prefix("./") {
        rel = rest;
    }
    format!("{base}/{}", rel.trim_start_matches('/'))
}

fn is_absolute_url(dest: &str) -> bool {
    dest.starts_with('#')
        || dest.starts_with('/')
        || ["mailto:", "http://", "https://", "file://"]
            .iter()
            .any(|scheme| dest.starts_with(scheme))
}
