//! Syntax highlighting backends for mdflow code blocks.
//!
//! Backends implement [`mdflow_core::text::CodeHighlighter`] and are handed to a
//! `MarkdownContainer` with `set_highlighter`.
//!
//! - `syntect` (feature: `syntect`)
#[cfg(feature = "syntect")]
pub mod syntect;

#[cfg(feature = "syntect")]
pub use crate::syntect::SyntectHighlighter;
