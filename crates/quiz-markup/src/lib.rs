//! quiz-markup: Parser for the plain-text quiz markup
//!
//! This crate provides:
//! - Line classification (lexer)
//! - Question/answer record types and their validation
//! - Line-oriented and block-split parsers
//!
//! # Example
//!
//! ```
//! use quiz_markup::{parse, QuestionKind, Syntax};
//!
//! let source = "Q|What is 2+2?\nA+|4\nA-|5\n";
//!
//! let questions = parse(source, Syntax::Lines, 10).unwrap();
//! assert_eq!(questions.len(), 1);
//! assert_eq!(questions[0].kind().unwrap(), QuestionKind::SingleAnswer);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

// Re-export main types for convenient access
pub use ast::{Answer, Question, QuestionKind, QuestionTag, ValidationError};
pub use lexer::{Lexer, LineKind, Span, Syntax, Token};
pub use parser::{ParseError, ParseResult, Parser, parse, questions};
