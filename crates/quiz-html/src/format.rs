//! Field formatter
//!
//! Wraps a [`Renderer`] with the checks and flattening every export field
//! needs: balanced code-span delimiters going in, a single tab-free line
//! coming out.

use thiserror::Error;

use crate::render::{Block, LINE_BREAK, NBSP_RUN, Renderer, normalize_line_breaks};

/// Formatting errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Orphan '{delimiter}' ({count} found, expected pairs) in: {text}")]
    UnbalancedDelimiter {
        delimiter: char,
        count: usize,
        text: String,
    },
}

/// Formats raw question/answer text into export fields
#[derive(Debug, Clone)]
pub struct Formatter<R> {
    renderer: R,
}

impl<R: Renderer> Formatter<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Format one block of raw text
    pub fn format(&self, raw: &str, block: Block) -> Result<String, FormatError> {
        if let Some(delimiter) = self.renderer.code_delimiter() {
            check_balanced(raw, delimiter)?;
        }
        let html = self.renderer.render(raw, block);
        Ok(single_line(&html))
    }
}

/// Fail when `delimiter` occurs an odd number of times
fn check_balanced(raw: &str, delimiter: char) -> Result<(), FormatError> {
    let count = raw.matches(delimiter).count();
    if count % 2 != 0 {
        return Err(FormatError::UnbalancedDelimiter {
            delimiter,
            count,
            text: raw.trim().to_string(),
        });
    }
    Ok(())
}

/// Collapse line breaks to `<br>` and tabs to non-breaking spaces
pub fn single_line(html: &str) -> String {
    normalize_line_breaks(html, LINE_BREAK).replace('\t', NBSP_RUN)
}
