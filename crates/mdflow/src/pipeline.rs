use pulldown_cmark::Options;
use pulldown_cmark::Parser;

use crate::ast::AutoIdentifiers;
use crate::ast::MarkdownDocument;
use crate::ast::build_document;
use crate::extensions::TextExtensions;

/// Parser configuration.
///
/// The default enables the "advanced extensions" set: tables, footnotes, strikethrough,
/// task lists, GFM alerts, heading attributes, math, definition lists, bare-URL autolinks,
/// emoji shortcodes and smileys, and GitHub-style heading ids.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarkdownPipeline {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    pub gfm_alerts: bool,
    pub heading_attributes: bool,
    pub math: bool,
    pub definition_lists: bool,
    /// Link bare `http(s)://` URLs found in text.
    pub autolinks: bool,
    /// Replace `:shortcode:` names and smileys such as `:)` with emoji.
    pub emoji: bool,
    pub smart_punctuation: bool,
    /// YAML (`---`) and TOML (`+++`) front matter.
    pub metadata_blocks: bool,
    pub auto_identifiers: AutoIdentifiers,
}

impl Default for MarkdownPipeline {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            gfm_alerts: true,
            heading_attributes: true,
            math: true,
            definition_lists: true,
            autolinks: true,
            emoji: true,
            smart_punctuation: false,
            metadata_blocks: false,
            auto_identifiers: AutoIdentifiers::GitHub,
        }
    }
}

impl MarkdownPipeline {
    /// Plain CommonMark: no extensions, no generated ids.
    pub fn commonmark() -> Self {
        Self {
            tables: false,
            footnotes: false,
            strikethrough: false,
            task_lists: false,
            gfm_alerts: false,
            heading_attributes: false,
            math: false,
            definition_lists: false,
            autolinks: false,
            emoji: false,
            smart_punctuation: false,
            metadata_blocks: false,
            auto_identifiers: AutoIdentifiers::None,
        }
    }

    pub fn options(&self) -> Options {
        let mut opts = Options::empty();
        opts.set(Options::ENABLE_TABLES, self.tables);
        opts.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        opts.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        opts.set(Options::ENABLE_TASKLISTS, self.task_lists);
        opts.set(Options::ENABLE_GFM, self.gfm_alerts);
        opts.set(Options::ENABLE_HEADING_ATTRIBUTES, self.heading_attributes);
        opts.set(Options::ENABLE_MATH, self.math);
        opts.set(Options::ENABLE_DEFINITION_LIST, self.definition_lists);
        opts.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        opts.set(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS, self.metadata_blocks);
        opts.set(Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS, self.metadata_blocks);
        opts
    }

    pub fn parse(&self, text: &str) -> MarkdownDocument {
        let events = Parser::new_ext(text, self.options());
        build_document(
            TextExtensions::new(events, self.emoji, self.autolinks),
            self.auto_identifiers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline;
    use crate::ast::MarkdownBlock;

    #[test]
    fn default_enables_tables_and_alerts() {
        let opts = MarkdownPipeline::default().options();
        assert!(opts.contains(Options::ENABLE_TABLES));
        assert!(opts.contains(Options::ENABLE_GFM));
        assert!(!opts.contains(Options::ENABLE_SMART_PUNCTUATION));
    }

    #[test]
    fn commonmark_leaves_tables_as_text() {
        let doc = MarkdownPipeline::commonmark().parse("| a |\n|---|\n| 1 |\n");
        assert!(matches!(doc.blocks[0], MarkdownBlock::Paragraph(_)));
    }

    #[test]
    fn metadata_blocks_are_opt_in() {
        let md = "---\ntitle: x\n---\n\nbody\n";
        let off = MarkdownPipeline::default().parse(md);
        assert!(!off.iter().any(|b| matches!(b, MarkdownBlock::Metadata(_))));

        let on = MarkdownPipeline {
            metadata_blocks: true,
            ..MarkdownPipeline::default()
        }
        .parse(md);
        assert!(matches!(&on.blocks[0], MarkdownBlock::Metadata(m) if m.contains("title: x")));
    }

    #[test]
    fn default_rewrites_emoji_and_bare_urls() {
        let doc = MarkdownPipeline::default().parse(":smile: :) see https://example.com\n");
        let MarkdownBlock::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(Inline::plain_text(&p.inline), "😄 🙂 see https://example.com");
        assert!(p.inline.iter().any(|i| matches!(
            i,
            Inline::Link { dest, .. } if dest == "https://example.com"
        )));

        let plain = MarkdownPipeline::commonmark().parse(":smile: https://example.com\n");
        let MarkdownBlock::Paragraph(p) = &plain.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.inline, vec![Inline::Text(":smile: https://example.com".into())]);
    }

    #[test]
    fn definition_lists_are_parsed_when_enabled() {
        let md = "Term\n: def\n";
        let doc = MarkdownPipeline::default().parse(md);
        assert!(matches!(doc.blocks[0], MarkdownBlock::DefinitionList(_)));
        let off = MarkdownPipeline {
            definition_lists: false,
            ..MarkdownPipeline::default()
        }
        .parse(md);
        assert!(matches!(off.blocks[0], MarkdownBlock::Paragraph(_)));
    }

    #[test]
    fn link_reference_definitions_produce_no_block() {
        let doc = MarkdownPipeline::default().parse("[a]: https://example.com\n\ntext\n");
        assert_eq!(doc.len(), 1);
    }
}
