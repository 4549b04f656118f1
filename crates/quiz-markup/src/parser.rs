//! Quiz markup parser
//!
//! Builds [`Question`] records from classified lines. The parser owns at most
//! one record under construction and yields it as soon as the next
//! new-question marker (or the end of input) is reached.

use crate::ast::Question;
use crate::lexer::{Lexer, LineKind, Syntax, Token};
use thiserror::Error;
use tracing::{debug, warn};

/// Parser errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Line {line} has no question to belong to: {text}")]
    OrphanLine { line: usize, text: String },
}

/// Parse result type
pub type ParseResult<T> = Result<T, ParseError>;

/// Streaming record parser
///
/// Yields one `ParseResult<Question>` per record. After the first error the
/// iterator is exhausted.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    syntax: Syntax,
    max_answers: usize,
    current: Option<Question>,
    /// Set while skipping the lines of an answer beyond `max_answers`
    dropping: bool,
    failed: bool,
}

impl<'a> Parser<'a> {
    /// Create a new parser from source text
    pub fn new(source: &'a str, syntax: Syntax, max_answers: usize) -> Self {
        Self {
            lexer: Lexer::new(source, syntax),
            syntax,
            max_answers,
            current: None,
            dropping: false,
            failed: false,
        }
    }

    /// Feed one token; returns the finished record when a new one starts
    fn push(&mut self, token: Token<'a>) -> ParseResult<Option<Question>> {
        let line = token.span.line;
        match token.kind {
            LineKind::Question { tag, rest } => {
                self.dropping = false;
                Ok(self.current.replace(Question::new(tag, rest, line)))
            }
            LineKind::Answer { correct, rest } => {
                let Some(question) = self.current.as_mut() else {
                    return self.before_first_question(line, rest, false);
                };
                if question.answers.len() >= self.max_answers {
                    warn!(
                        line,
                        question = question.line,
                        max = self.max_answers,
                        "dropping answer beyond the maximum"
                    );
                    self.dropping = true;
                    return Ok(None);
                }
                // Block syntax: the first answer is the correct one
                let correct = correct.unwrap_or(question.answers.is_empty());
                question.add_answer(rest, correct);
                Ok(None)
            }
            LineKind::Text(text) => {
                let Some(question) = self.current.as_mut() else {
                    return self.before_first_question(line, text, true);
                };
                if !self.dropping {
                    question.add_line(text);
                }
                Ok(None)
            }
        }
    }

    /// Handle an answer or text line seen before any record started
    fn before_first_question(
        &self,
        line: usize,
        text: &str,
        continuation: bool,
    ) -> ParseResult<Option<Question>> {
        match self.syntax {
            // Preamble before the first `Q-` is not part of any question
            Syntax::Blocks => Ok(None),
            Syntax::Lines if continuation && text.trim().is_empty() => Ok(None),
            Syntax::Lines => Err(ParseError::OrphanLine {
                line,
                text: text.trim_end().to_string(),
            }),
        }
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = ParseResult<Question>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while let Some(token) = self.lexer.next() {
            match self.push(token) {
                Ok(Some(question)) => {
                    debug!(
                        line = question.line,
                        answers = question.answers.len(),
                        "record finished"
                    );
                    return Some(Ok(question));
                }
                Ok(None) => {}
                Err(e) => {
                    self.failed = true;
                    self.current = None;
                    return Some(Err(e));
                }
            }
        }
        let question = self.current.take()?;
        debug!(
            line = question.line,
            answers = question.answers.len(),
            "record finished"
        );
        Some(Ok(question))
    }
}

/// Iterate the records of a source
pub fn questions(source: &str, syntax: Syntax, max_answers: usize) -> Parser<'_> {
    Parser::new(source, syntax, max_answers)
}

/// Parse all records of a source
pub fn parse(source: &str, syntax: Syntax, max_answers: usize) -> ParseResult<Vec<Question>> {
    questions(source, syntax, max_answers).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Answer, QuestionKind, QuestionTag};

    #[test]
    fn test_parse_line_syntax() {
        let source = "Q|What is 2+2?\nA+|4\nA-|5\nQT|The sky is blue\n";
        let questions = parse(source, Syntax::Lines, 10).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].tag, QuestionTag::Choice);
        assert_eq!(questions[0].text, "What is 2+2?\n");
        assert_eq!(
            questions[0].answers,
            vec![Answer::new("4\n", true), Answer::new("5\n", false)]
        );
        assert_eq!(questions[0].line, 1);
        assert_eq!(questions[1].tag, QuestionTag::True);
        assert!(questions[1].answers.is_empty());
        assert_eq!(questions[1].line, 4);
    }

    #[test]
    fn test_continuation_lines() {
        let source = "Q|Look at this:\n    let x = 1;\nA+|one\nspanning two lines\nA-|two\n";
        let questions = parse(source, Syntax::Lines, 10).unwrap();

        assert_eq!(questions[0].text, "Look at this:\n    let x = 1;\n");
        assert_eq!(questions[0].answers[0].text, "one\nspanning two lines\n");
        assert_eq!(questions[0].answers[1].text, "two\n");
    }

    #[test]
    fn test_multi_answer() {
        let source = "Q|Pick primes\nA+|2\nA+|3\nA-|4\n";
        let questions = parse(source, Syntax::Lines, 10).unwrap();
        assert_eq!(questions[0].kind(), Ok(QuestionKind::MultiAnswer));
    }

    #[test]
    fn test_orphan_answer_is_error() {
        let err = parse("A+|4\nQ|What?\n", Syntax::Lines, 10).unwrap_err();
        assert_eq!(
            err,
            ParseError::OrphanLine {
                line: 1,
                text: "4".to_string()
            }
        );
    }

    #[test]
    fn test_orphan_text_is_error() {
        let err = parse("\nintro text\nQ|What?\nA+|x\n", Syntax::Lines, 10).unwrap_err();
        assert!(matches!(err, ParseError::OrphanLine { line: 2, .. }));
    }

    #[test]
    fn test_leading_blank_lines_ignored() {
        let questions = parse("\n\r\nQ|What?\nA+|x\n", Syntax::Lines, 10).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].line, 3);
    }

    #[test]
    fn test_line_syntax_drops_extra_answers() {
        let mut source = String::from("Q|Pick\nA+|a0\n");
        for i in 1..=10 {
            source.push_str(&format!("A-|a{i}\ncontinues a{i}\n"));
        }
        source.push_str("QT|Next\n");

        let questions = parse(&source, Syntax::Lines, 10).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].answers.len(), 10);
        assert_eq!(questions[0].answers[0], Answer::new("a0\n", true));
        assert_eq!(questions[0].answers[9].text, "a9\ncontinues a9\n");
        assert_eq!(questions[1].tag, QuestionTag::True);
    }

    #[test]
    fn test_dropped_correct_answer_fails_validation() {
        let questions = parse("Q|What?\nA-|a\nA-|b\nA+|c\n", Syntax::Lines, 2).unwrap();
        assert_eq!(questions[0].answers.len(), 2);
        assert!(matches!(
            questions[0].kind(),
            Err(crate::ValidationError::NoCorrectAnswer { line: 1, .. })
        ));
    }

    #[test]
    fn test_parser_stops_after_error() {
        let mut parser = questions("oops\nQ|What?\nA+|a\n", Syntax::Lines, 10);
        assert!(matches!(parser.next(), Some(Err(_))));
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_records_are_yielded_one_at_a_time() {
        let mut parser = questions("Q|one\nA+|a\nQ|two\nA+|b\n", Syntax::Lines, 10);
        assert_eq!(parser.next().unwrap().unwrap().text, "one\n");
        assert_eq!(parser.next().unwrap().unwrap().text, "two\n");
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_block_syntax_first_answer_correct() {
        let source = "Q-What is 2+2?\nA-4\nA-3\nA-5\n";
        let questions = parse(source, Syntax::Blocks, 10).unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(
            questions[0].answers,
            vec![
                Answer::new("4\n", true),
                Answer::new("3\n", false),
                Answer::new("5\n", false),
            ]
        );
        assert_eq!(questions[0].kind(), Ok(QuestionKind::SingleAnswer));
    }

    #[test]
    fn test_block_syntax_ignores_preamble() {
        let source = "Quiz title\nA-not an answer\n\nQ-Real question\nA-yes\n";
        let questions = parse(source, Syntax::Blocks, 10).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "Real question\n");
        assert_eq!(questions[0].answers.len(), 1);
    }

    #[test]
    fn test_block_syntax_drops_extra_answers() {
        let source = "Q-Pick\nA-a\nA-b\nA-c\nmore c\nQ-Next\nA-x\n";
        let questions = parse(source, Syntax::Blocks, 2).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(
            questions[0].answers,
            vec![Answer::new("a\n", true), Answer::new("b\n", false)]
        );
        assert_eq!(questions[1].text, "Next\n");
        assert_eq!(questions[1].answers, vec![Answer::new("x\n", true)]);
    }

    #[test]
    fn test_block_without_answers_fails_validation() {
        let questions = parse("Q-Lonely question\n", Syntax::Blocks, 10).unwrap();
        assert!(questions[0].kind().is_err());
    }

    #[test]
    fn test_empty_source() {
        assert!(parse("", Syntax::Lines, 10).unwrap().is_empty());
        assert!(parse("\u{feff}", Syntax::Blocks, 10).unwrap().is_empty());
    }

    #[test]
    fn test_questions_serialize() {
        let questions = parse("QF|Water is dry\n", Syntax::Lines, 10).unwrap();
        let json = serde_json::to_value(&questions).unwrap();
        assert_eq!(json[0]["tag"], "false");
        assert_eq!(json[0]["text"], "Water is dry\n");
        assert_eq!(json[0]["line"], 1);
    }
}
