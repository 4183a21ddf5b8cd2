//! Markdown documents as a tree of ratatui widgets.
//!
//! A document is parsed once (pulldown-cmark) into an owned block tree, then every block is
//! mapped to one widget inside a vertical fill-flow container: headings (with a rule under
//! levels 1 and 2), paragraphs, quotes, code blocks, tables and nested lists. Paragraphs in
//! nested lists carry a depth marker (`@ `, `# `, `+ `).
//!
//! ## Layers
//!
//! - [`container::MarkdownContainer`]: the interactive widget (viewport, scrolling,
//!   anchors, scrollbar).
//! - [`factory::MarkdownComponentFactory`]: one constructor per block kind; override any of
//!   them to swap in your own widgets.
//! - [`pipeline::MarkdownPipeline`] and [`ast`]: parser configuration and the block tree,
//!   for callers that only want the parsed document.
//!
//! ```
//! use mdflow::container::MarkdownContainer;
//! use mdflow_core::theme::Theme;
//!
//! let mut md = MarkdownContainer::new();
//! md.set_text("# Hello\n\nSome *markdown*.\n");
//! let lines = md.lines_for_width(40, &Theme::default());
//! assert!(!lines.is_empty());
//! ```
pub mod ast;
pub mod code;
pub mod container;
pub mod extensions;
pub mod factory;
pub mod flow;
pub mod heading;
pub mod layout;
pub mod node;
pub mod not_implemented;
pub mod pipeline;
pub mod quote;
pub mod render;
mod segment;
pub mod separator;
pub mod table;
pub mod text_flow;

pub use container::MarkdownContainer;
pub use container::MarkdownContainerOptions;
pub use factory::MarkdownComponentFactory;
pub use pipeline::MarkdownPipeline;
