//! `mdflow-core` holds the framework-level pieces the markdown widgets are built from.
//!
//! Nothing in here knows about markdown. The crate provides:
//!
//! - [`theme::Theme`]: the handful of styles every widget draws with.
//! - [`layout::MarginPadding`]: the box model used by fill-flow containers.
//! - [`text::CodeHighlighter`]: the seam for syntax highlighting backends.
//! - [`viewport::ViewportState`] + [`scroll::ScrollBindings`]: scroll state and key bindings.
//! - [`render`]: span-level drawing helpers (clipping, wide chars, scrollbar).
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you drive input + rendering from your app.
//! - No async runtime: everything runs on the caller's thread.
pub mod theme;

pub mod layout;
pub mod text;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod input;
pub mod keymap;
pub mod render;
pub mod scroll;
pub mod viewport;
