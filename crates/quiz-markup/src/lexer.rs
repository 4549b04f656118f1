//! Quiz markup lexer
//!
//! Splits the source into lines and classifies each one by its leading
//! marker token. Line endings are kept on the yielded text so continuation
//! lines can be appended verbatim.

use serde::{Deserialize, Serialize};

/// Byte-order mark stripped from the very start of the input
const BOM: char = '\u{feff}';

/// Separator between the type tag and the rest of a line in line syntax
pub const TAG_SEPARATOR: char = '|';

/// Question-start marker in block syntax
pub const BLOCK_QUESTION_MARKER: &str = "Q-";

/// Answer marker in block syntax
pub const BLOCK_ANSWER_MARKER: &str = "A-";

/// Input syntax variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// `TAG|text` lines: `Q`, `QT`, `QF`, `A+`, `A-`
    #[default]
    Lines,
    /// `Q-` starts a question, `A-` starts an answer; the first answer is correct
    Blocks,
}

impl Syntax {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Blocks => "blocks",
        }
    }
}

impl std::str::FromStr for Syntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lines" | "line" => Ok(Self::Lines),
            "blocks" | "block" => Ok(Self::Blocks),
            _ => Err(format!("unknown syntax '{s}', expected 'lines' or 'blocks'")),
        }
    }
}

/// Role of one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Start of a new record
    Question {
        tag: crate::QuestionTag,
        rest: &'a str,
    },
    /// An answer; `correct` is `None` when correctness is positional
    Answer { correct: Option<bool>, rest: &'a str },
    /// Anything else, appended to the open text
    Text(&'a str),
}

/// Source location of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Starting byte offset
    pub start: usize,
    /// Ending byte offset (exclusive, includes the line ending)
    pub end: usize,
    /// Line number (1-indexed)
    pub line: usize,
}

/// A classified line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: LineKind<'a>,
    pub span: Span,
}

/// Line lexer for quiz markup
pub struct Lexer<'a> {
    input: &'a str,
    syntax: Syntax,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer, stripping a leading byte-order mark
    pub fn new(input: &'a str, syntax: Syntax) -> Self {
        let pos = if input.starts_with(BOM) {
            BOM.len_utf8()
        } else {
            0
        };
        Self {
            input,
            syntax,
            pos,
            line: 0,
        }
    }

    /// Classify a single line
    pub fn classify(line: &'a str, syntax: Syntax) -> LineKind<'a> {
        match syntax {
            Syntax::Lines => {
                let Some((tag, rest)) = line.split_once(TAG_SEPARATOR) else {
                    return LineKind::Text(line);
                };
                if let Some(tag) = crate::QuestionTag::parse(tag) {
                    return LineKind::Question { tag, rest };
                }
                match tag {
                    "A+" => LineKind::Answer {
                        correct: Some(true),
                        rest,
                    },
                    "A-" => LineKind::Answer {
                        correct: Some(false),
                        rest,
                    },
                    _ => LineKind::Text(line),
                }
            }
            Syntax::Blocks => {
                if let Some(rest) = line.strip_prefix(BLOCK_QUESTION_MARKER) {
                    LineKind::Question {
                        tag: crate::QuestionTag::Choice,
                        rest,
                    }
                } else if let Some(rest) = line.strip_prefix(BLOCK_ANSWER_MARKER) {
                    LineKind::Answer {
                        correct: None,
                        rest,
                    }
                } else {
                    LineKind::Text(line)
                }
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }
        let remaining = &self.input[self.pos..];
        let len = remaining.find('\n').map_or(remaining.len(), |i| i + 1);
        let text = &remaining[..len];

        let start = self.pos;
        self.pos += len;
        self.line += 1;

        Some(Token {
            kind: Self::classify(text, self.syntax),
            span: Span {
                start,
                end: self.pos,
                line: self.line,
            },
        })
    }
}
