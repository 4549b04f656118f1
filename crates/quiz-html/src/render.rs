//! Renderers turning raw question/answer text into HTML

use serde::{Deserialize, Serialize};

/// Non-breaking spaces standing in for a tab or an indentation step
pub const NBSP_RUN: &str = "&nbsp;&nbsp;&nbsp;&nbsp;";

/// Inline line-break marker
pub const LINE_BREAK: &str = "<br>";

const CODE_SPAN_OPEN: &str = r#"<span style="font-family: 'Courier New';">"#;
const CODE_SPAN_CLOSE: &str = "</span>";

const QUESTION_OPEN: &str = r#"<p style="font-size: medium;">"#;
const QUESTION_CLOSE: &str = "</p>";
const ANSWER_OPEN: &str = r#"<span style="font-size: medium;">"#;
const ANSWER_CLOSE: &str = "</span>";

/// Which part of a record is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Question,
    Answer,
}

/// Available renderer implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    Plain,
    Markdown,
}

impl RendererKind {
    /// Markdown when this build supports it, plain otherwise
    pub fn preferred() -> Self {
        if cfg!(feature = "markdown") {
            Self::Markdown
        } else {
            Self::Plain
        }
    }

    /// Build a renderer of this kind
    ///
    /// Falls back to [`PlainRenderer`] when markdown support is not compiled in.
    pub fn build(self, code_delimiter: Option<char>) -> Box<dyn Renderer> {
        match self {
            Self::Plain => Box::new(PlainRenderer::new(code_delimiter)),
            #[cfg(feature = "markdown")]
            Self::Markdown => Box::new(crate::MarkdownRenderer::new(code_delimiter)),
            #[cfg(not(feature = "markdown"))]
            Self::Markdown => {
                tracing::warn!("markdown support not compiled in, using the plain renderer");
                Box::new(PlainRenderer::new(code_delimiter))
            }
        }
    }
}

/// Text-to-HTML rendering capability
pub trait Renderer {
    /// Render raw text of a question or answer
    ///
    /// The output may still contain line breaks and tabs; [`crate::Formatter`]
    /// flattens it afterwards.
    fn render(&self, text: &str, block: Block) -> String;

    /// Paired delimiter marking code spans, if this renderer handles them
    fn code_delimiter(&self) -> Option<char> {
        None
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&self, text: &str, block: Block) -> String {
        (**self).render(text, block)
    }

    fn code_delimiter(&self) -> Option<char> {
        (**self).code_delimiter()
    }
}

/// Minimal renderer: HTML escaping, code spans, indentation and line breaks
#[derive(Debug, Clone)]
pub struct PlainRenderer {
    code_delimiter: Option<char>,
}

impl PlainRenderer {
    pub fn new(code_delimiter: Option<char>) -> Self {
        Self { code_delimiter }
    }
}

impl Default for PlainRenderer {
    fn default() -> Self {
        Self::new(Some('#'))
    }
}

impl Renderer for PlainRenderer {
    fn render(&self, text: &str, block: Block) -> String {
        let text = trim_keeping_indent(text);
        let body = match self.code_delimiter {
            Some(delimiter) => {
                alternate_spans(text, delimiter, CODE_SPAN_OPEN, CODE_SPAN_CLOSE, escape_html)
            }
            None => escape_html(text),
        };
        let body = normalize_line_breaks(&body.replace("    ", NBSP_RUN), LINE_BREAK);

        match block {
            Block::Question => format!("{QUESTION_OPEN}{body}{QUESTION_CLOSE}"),
            Block::Answer => format!("{ANSWER_OPEN}{body}{ANSWER_CLOSE}"),
        }
    }

    fn code_delimiter(&self) -> Option<char> {
        self.code_delimiter
    }
}

/// Trim surrounding whitespace, keeping an indentation of four or more
/// spaces in front of the first line
fn trim_keeping_indent(text: &str) -> &str {
    let text = text.trim_end();
    let content = text.trim_start();
    let lead = &text[..text.len() - content.len()];
    let spaces = lead.len() - lead.trim_end_matches(' ').len();
    if spaces >= 4 {
        &text[lead.len() - spaces..]
    } else {
        content
    }
}

/// Replace delimiter pairs with `open`/`close`, alternating from `open`,
/// passing the text between delimiters through `segment`
fn alternate_spans(
    text: &str,
    delimiter: char,
    open: &str,
    close: &str,
    segment: impl Fn(&str) -> String,
) -> String {
    let mut result = String::with_capacity(text.len());
    let mut opening = true;
    for (i, part) in text.split(delimiter).enumerate() {
        if i > 0 {
            result.push_str(if opening { open } else { close });
            opening = !opening;
        }
        result.push_str(&segment(part));
    }
    result
}

/// Replace `\r\n`, `\r` and `\n` with a single marker each
pub fn normalize_line_breaks(text: &str, marker: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', marker)
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}
