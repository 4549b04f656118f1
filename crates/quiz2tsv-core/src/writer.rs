//! Export record serialization
//!
//! One record becomes one tab-separated line:
//!
//! ```text
//! MC<TAB>question<TAB>answer<TAB>correct<TAB>answer<TAB>incorrect ...
//! TF<TAB>question<TAB>true
//! ```

use std::io::{self, Write};

use quiz_markup::{Answer, Question, QuestionKind};

/// A finalized record: formatted text, answers in their final order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub kind: QuestionKind,
    /// Formatted question field
    pub question: String,
    /// Formatted answer fields with their correctness
    pub answers: Vec<Answer>,
}

impl ExportRecord {
    /// Tab-separated export line, terminated by `\n`
    pub fn to_line(&self) -> String {
        let mut fields = vec![self.kind.code(), self.question.as_str()];
        match self.kind {
            QuestionKind::TrueFalseTrue | QuestionKind::TrueFalseFalse => {
                fields.push(self.kind.label());
            }
            QuestionKind::SingleAnswer | QuestionKind::MultiAnswer => {
                for answer in &self.answers {
                    fields.push(&answer.text);
                    fields.push(answer.correctness());
                }
            }
        }
        let mut line = fields.join("\t");
        line.push('\n');
        line
    }
}

/// Human-readable echo of a record, answers in input order
pub fn echo(question: &Question, kind: QuestionKind) -> String {
    let mut output = format!("QUESTION ({}): {}", kind.label(), question.text.trim());
    for answer in &question.answers {
        output.push_str(&format!(
            "\nANSWER ({}): {}",
            answer.correctness(),
            answer.text.trim()
        ));
    }
    output
}

/// Appends export lines to an output stream
pub struct TsvWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Append one record as one line
    pub fn write_record(&mut self, record: &ExportRecord) -> io::Result<()> {
        self.inner.write_all(record.to_line().as_bytes())?;
        self.written += 1;
        Ok(())
    }

    /// Number of lines written so far
    pub fn records_written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
