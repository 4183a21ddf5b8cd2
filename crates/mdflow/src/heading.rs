use mdflow_core::theme::Theme;
use ratatui::style::Modifier;
use ratatui::style::Style;

use crate::ast::HeadingBlock;
use crate::layout::Component;
use crate::layout::LayoutContext;
use crate::layout::LayoutOutput;
use crate::text_flow::MarkdownTextFlow;
use crate::text_flow::TextRole;

/// Nominal font size for a heading level, in framework pixels.
pub fn font_size_by_level(level: u8) -> f32 {
    match level {
        1 => 54.0,
        2 => 40.0,
        3 => 30.0,
        4 => 26.0,
        _ => 20.0,
    }
}

/// Terminal rendition of a font size: cells can't grow, so size maps to emphasis.
pub fn heading_style(theme: &Theme, font_size: f32) -> Style {
    let base = theme.text_primary;
    if font_size >= 54.0 {
        base.patch(theme.accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else if font_size >= 40.0 {
        base.patch(theme.accent).add_modifier(Modifier::BOLD)
    } else if font_size >= 30.0 {
        base.add_modifier(Modifier::BOLD)
    } else if font_size >= 26.0 {
        base.add_modifier(Modifier::BOLD | Modifier::ITALIC)
    } else {
        base.add_modifier(Modifier::ITALIC)
    }
}

#[derive(Clone, Debug)]
pub struct MarkdownHeading {
    level: u8,
    id: Option<String>,
    text_flow: MarkdownTextFlow,
}

impl MarkdownHeading {
    pub fn new(heading: &HeadingBlock) -> Self {
        let mut text_flow = MarkdownTextFlow::with_role(TextRole::Heading {
            font_size: font_size_by_level(heading.level),
        });
        text_flow.add_inline_text(&heading.inline);
        Self {
            level: heading.level,
            id: heading.id.clone(),
            text_flow,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn font_size(&self) -> f32 {
        font_size_by_level(self.level)
    }

    pub fn text_flow(&self) -> &MarkdownTextFlow {
        &self.text_flow
    }
}

impl Component for MarkdownHeading {
    fn layout(&self, width: u16, cx: &LayoutContext<'_>, out: &mut LayoutOutput) {
        if let Some(id) = &self.id {
            out.mark_anchor(id);
        }
        self.text_flow.layout(width, cx, out);
    }
}
