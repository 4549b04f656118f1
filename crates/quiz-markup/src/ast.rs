//! Quiz record types
//!
//! A [`Question`] is one record of the export: the question text plus its
//! ordered answers. Its [`QuestionKind`] is derived, never stored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a finished record breaks the record invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("True or False question does not require answers (line {line}). Question: {question}")]
    TrueFalseWithAnswers { line: usize, question: String },

    #[error("Multiple choice question has no answers (line {line}). Question: {question}")]
    NoAnswers { line: usize, question: String },

    #[error("Question has no correct answers (line {line}). Question: {question}")]
    NoCorrectAnswer { line: usize, question: String },
}

/// Question subtype carried by the new-question marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionTag {
    /// `QT`: a true/false statement that is true
    True,
    /// `QF`: a true/false statement that is false
    False,
    /// `Q` (or `Q-` in block syntax): a question with answers
    Choice,
}

impl QuestionTag {
    /// Parse a line-syntax type tag
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Q" => Some(Self::Choice),
            "QT" => Some(Self::True),
            "QF" => Some(Self::False),
            _ => None,
        }
    }
}

/// Record type, derived from the tag and the answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    TrueFalseTrue,
    TrueFalseFalse,
    SingleAnswer,
    MultiAnswer,
}

impl QuestionKind {
    /// Type code written as the first field of an export line
    pub fn code(&self) -> &'static str {
        match self {
            Self::TrueFalseTrue | Self::TrueFalseFalse => "TF",
            Self::SingleAnswer => "MC",
            Self::MultiAnswer => "MA",
        }
    }

    /// Human-readable label used in the console echo
    pub fn label(&self) -> &'static str {
        match self {
            Self::TrueFalseTrue => "true",
            Self::TrueFalseFalse => "false",
            Self::SingleAnswer => "Multiple Choice",
            Self::MultiAnswer => "Multiple Answers",
        }
    }
}

/// One answer of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Raw answer text, possibly spanning several lines
    pub text: String,
    pub correct: bool,
}

impl Answer {
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }

    /// `correct` or `incorrect`
    pub fn correctness(&self) -> &'static str {
        if self.correct { "correct" } else { "incorrect" }
    }
}

/// A question record under construction or ready for export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub tag: QuestionTag,
    /// Raw question text, possibly spanning several lines
    pub text: String,
    /// Answers in input order
    pub answers: Vec<Answer>,
    /// Line (1-indexed) of the new-question marker
    pub line: usize,
}

impl Question {
    pub fn new(tag: QuestionTag, text: impl Into<String>, line: usize) -> Self {
        Self {
            tag,
            text: text.into(),
            answers: Vec::new(),
            line,
        }
    }

    /// Add a new answer
    pub fn add_answer(&mut self, text: impl Into<String>, correct: bool) {
        self.answers.push(Answer::new(text, correct));
    }

    /// Append a continuation line to whichever text is open: the most
    /// recent answer if any answer exists, the question text otherwise
    pub fn add_line(&mut self, line: &str) {
        match self.answers.last_mut() {
            Some(answer) => answer.text.push_str(line),
            None => self.text.push_str(line),
        }
    }

    pub fn has_answers(&self) -> bool {
        !self.answers.is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.correct).count()
    }

    /// Derive the record type, checking the record invariants
    pub fn kind(&self) -> Result<QuestionKind, ValidationError> {
        match self.tag {
            QuestionTag::True | QuestionTag::False => {
                if self.has_answers() {
                    return Err(ValidationError::TrueFalseWithAnswers {
                        line: self.line,
                        question: self.text.trim().to_string(),
                    });
                }
                Ok(if self.tag == QuestionTag::True {
                    QuestionKind::TrueFalseTrue
                } else {
                    QuestionKind::TrueFalseFalse
                })
            }
            QuestionTag::Choice => {
                if !self.has_answers() {
                    return Err(ValidationError::NoAnswers {
                        line: self.line,
                        question: self.text.trim().to_string(),
                    });
                }
                match self.correct_count() {
                    0 => Err(ValidationError::NoCorrectAnswer {
                        line: self.line,
                        question: self.text.trim().to_string(),
                    }),
                    1 => Ok(QuestionKind::SingleAnswer),
                    _ => Ok(QuestionKind::MultiAnswer),
                }
            }
        }
    }
}
