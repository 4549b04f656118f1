//! quiz2tsv-core: Core library for converting quiz markup to tab-delimited LMS import files
//!
//! This crate provides:
//! - Answer shuffling
//! - Export record serialization (tab-delimited line and console echo)
//! - The conversion driver tying parsing, formatting, shuffling and writing together

pub mod convert;
pub mod shuffle;
pub mod writer;

pub use convert::{ConvertError, ConvertOptions, Converter, DEFAULT_MAX_ANSWERS, Summary};
pub use quiz_html::{Block, Formatter, Renderer, RendererKind};
pub use quiz_markup::{Answer, Question, QuestionKind, QuestionTag, Syntax};
pub use shuffle::shuffle_answers;
pub use writer::{ExportRecord, TsvWriter, echo};
