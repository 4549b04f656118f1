//! quiz-html: HTML formatting of quiz question and answer text
//!
//! This crate provides:
//! - The [`Renderer`] trait, turning raw markup into styled HTML
//! - [`PlainRenderer`], a dependency-free renderer handling line breaks and code spans
//! - `MarkdownRenderer` (feature `markdown`), a CommonMark renderer built on pulldown-cmark
//! - [`Formatter`], which validates code-span delimiters and flattens the
//!   rendered HTML into a single tab-free field
//!
//! ## Example
//!
//! ```rust
//! use quiz_html::{Block, Formatter, PlainRenderer};
//!
//! let formatter = Formatter::new(PlainRenderer::default());
//! let html = formatter.format("Call #main()#\nnow", Block::Answer).unwrap();
//! assert!(html.contains("Courier New"));
//! assert!(html.contains("<br>"));
//! ```

pub mod format;
#[cfg(feature = "markdown")]
pub mod markdown;
pub mod render;

pub use format::{FormatError, Formatter, single_line};
#[cfg(feature = "markdown")]
pub use markdown::MarkdownRenderer;
pub use render::{
    Block, PlainRenderer, Renderer, RendererKind, escape_html, normalize_line_breaks,
};
