//! Conversion driver
//!
//! Runs each record through validate → format → shuffle → echo → write, one
//! record at a time. The first error stops the run; lines already written
//! are left in place.

use std::io::{self, Write};

use quiz_html::{Block, FormatError, Formatter, Renderer, RendererKind};
use quiz_markup::{Answer, ParseError, Question, Syntax, ValidationError, questions};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::shuffle::shuffle_answers;
use crate::writer::{ExportRecord, TsvWriter, echo};

/// Default cap on answers per question
pub const DEFAULT_MAX_ANSWERS: usize = 10;

/// Default paired delimiter for code spans
pub const DEFAULT_CODE_DELIMITER: char = '#';

/// Conversion errors
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cannot format question at line {line}")]
    Format {
        line: usize,
        #[source]
        source: FormatError,
    },

    #[error("Failed to write output")]
    Io(#[from] io::Error),
}

/// Options for the conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub syntax: Syntax,
    pub max_answers: usize,
    pub renderer: RendererKind,
    /// Paired delimiter marking code spans (`None` disables them)
    pub code_delimiter: Option<char>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            syntax: Syntax::Lines,
            max_answers: DEFAULT_MAX_ANSWERS,
            renderer: RendererKind::preferred(),
            code_delimiter: Some(DEFAULT_CODE_DELIMITER),
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records written to the output
    pub records: usize,
}

/// Quiz markup to TSV converter
pub struct Converter {
    options: ConvertOptions,
    formatter: Formatter<Box<dyn Renderer>>,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        let formatter = Formatter::new(options.renderer.build(options.code_delimiter));
        Self { options, formatter }
    }

    /// Convert `source`, appending one line per record to `writer` and one
    /// echo per record to `echo_out`
    pub fn convert<W: Write>(
        &self,
        source: &str,
        writer: &mut TsvWriter<W>,
        echo_out: &mut dyn Write,
    ) -> Result<Summary, ConvertError> {
        self.convert_with_rng(source, writer, echo_out, &mut rand::thread_rng())
    }

    /// Like [`Converter::convert`], drawing answer order from `rng`
    pub fn convert_with_rng<W: Write, R: Rng + ?Sized>(
        &self,
        source: &str,
        writer: &mut TsvWriter<W>,
        echo_out: &mut dyn Write,
        rng: &mut R,
    ) -> Result<Summary, ConvertError> {
        let mut summary = Summary::default();
        for question in questions(source, self.options.syntax, self.options.max_answers) {
            let question = question?;
            let (record, echo_text) = self.finalize(&question, rng)?;
            writeln!(echo_out, "{echo_text}")?;
            writer.write_record(&record)?;
            summary.records += 1;
        }
        info!(records = summary.records, "conversion finished");
        Ok(summary)
    }

    /// Validate, format and shuffle one record
    pub fn finalize<R: Rng + ?Sized>(
        &self,
        question: &Question,
        rng: &mut R,
    ) -> Result<(ExportRecord, String), ConvertError> {
        let kind = question.kind()?;
        let format_error = |source| ConvertError::Format {
            line: question.line,
            source,
        };

        let text = self
            .formatter
            .format(&question.text, Block::Question)
            .map_err(format_error)?;
        let mut answers = question
            .answers
            .iter()
            .map(|answer| -> Result<Answer, FormatError> {
                let text = self.formatter.format(&answer.text, Block::Answer)?;
                Ok(Answer::new(text, answer.correct))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(format_error)?;
        shuffle_answers(&mut answers, rng);

        debug!(line = question.line, code = kind.code(), "record finalized");
        Ok((
            ExportRecord {
                kind,
                question: text,
                answers,
            },
            echo(question, kind),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_markup::QuestionKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn plain(syntax: Syntax) -> Converter {
        Converter::new(ConvertOptions {
            syntax,
            renderer: RendererKind::Plain,
            ..ConvertOptions::default()
        })
    }

    fn run(converter: &Converter, source: &str) -> (Result<Summary, ConvertError>, String, String) {
        let mut writer = TsvWriter::new(Vec::new());
        let mut echo_out = Vec::new();
        let result = converter.convert(source, &mut writer, &mut echo_out);
        (
            result,
            String::from_utf8(writer.into_inner()).unwrap(),
            String::from_utf8(echo_out).unwrap(),
        )
    }

    #[test]
    fn test_block_syntax_example() {
        let (result, output, _) = run(&plain(Syntax::Blocks), "Q-What is 2+2?\nA-4\nA-3\nA-5\n");
        assert_eq!(result.unwrap(), Summary { records: 1 });

        let line = output.strip_suffix('\n').unwrap();
        assert!(!line.contains('\n'));
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 8);
        assert_eq!(fields[0], "MC");
        assert_eq!(fields[1], r#"<p style="font-size: medium;">What is 2+2?</p>"#);

        let pairs: Vec<(&str, &str)> = fields[2..].chunks(2).map(|c| (c[0], c[1])).collect();
        let correct: Vec<_> = pairs.iter().filter(|(_, c)| *c == "correct").collect();
        assert_eq!(correct.len(), 1);
        assert_eq!(correct[0].0, r#"<span style="font-size: medium;">4</span>"#);
        assert_eq!(pairs.iter().filter(|(_, c)| *c == "incorrect").count(), 2);
    }

    #[test]
    fn test_one_line_per_record() {
        let source = "Q|one\nA+|a\nQT|two\nQF|three\nQ|four\nA+|x\nA+|y\n";
        let (result, output, _) = run(&plain(Syntax::Lines), source);
        assert_eq!(result.unwrap().records, 4);

        let codes: Vec<&str> = output
            .lines()
            .map(|l| l.split('\t').next().unwrap())
            .collect();
        assert_eq!(codes, vec!["MC", "TF", "TF", "MA"]);
    }

    #[test]
    fn test_true_false_output() {
        let (_, output, echo_text) = run(&plain(Syntax::Lines), "QT|The sky is blue\n");
        assert_eq!(
            output,
            "TF\t<p style=\"font-size: medium;\">The sky is blue</p>\ttrue\n"
        );
        assert_eq!(echo_text, "QUESTION (true): The sky is blue\n");
    }

    #[test]
    fn test_unbalanced_delimiter_stops_without_line() {
        let source = "Q|first\nA+|ok\nQ|a #b c\nA+|x\nQ|never\nA+|y\n";
        let (result, output, _) = run(&plain(Syntax::Lines), source);
        let err = result.unwrap_err();
        assert!(matches!(err, ConvertError::Format { line: 3, .. }));
        // The first record stays written; nothing after the failure
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("first"));
    }

    #[test]
    fn test_unbalanced_delimiter_in_answer() {
        let (result, output, _) = run(&plain(Syntax::Lines), "Q|pick\nA+|#open\n");
        assert!(matches!(result, Err(ConvertError::Format { line: 1, .. })));
        assert!(output.is_empty());
    }

    #[test]
    fn test_no_answers_stops() {
        let (result, output, _) = run(&plain(Syntax::Blocks), "Q-Lonely\n");
        assert!(matches!(
            result,
            Err(ConvertError::Validation(ValidationError::NoAnswers { .. }))
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn test_true_false_with_answers_rejected() {
        let (result, output, _) = run(&plain(Syntax::Lines), "QT|Sky is blue\nA+|yes\n");
        assert!(matches!(
            result,
            Err(ConvertError::Validation(
                ValidationError::TrueFalseWithAnswers { .. }
            ))
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn test_orphan_line_stops() {
        let (result, _, _) = run(&plain(Syntax::Lines), "A+|4\n");
        assert!(matches!(result, Err(ConvertError::Parse(_))));
    }

    #[test]
    fn test_empty_input() {
        let (result, output, echo_text) = run(&plain(Syntax::Lines), "");
        assert_eq!(result.unwrap().records, 0);
        assert!(output.is_empty());
        assert!(echo_text.is_empty());
    }

    #[test]
    fn test_finalize_with_seeded_rng_keeps_pairs() {
        let converter = plain(Syntax::Lines);
        let mut question = Question::new(quiz_markup::QuestionTag::Choice, "Pick\n", 1);
        question.add_answer("a\n", true);
        question.add_answer("b\n", false);
        question.add_answer("c\n", true);

        let (record, echo_text) = converter
            .finalize(&question, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(record.kind, QuestionKind::MultiAnswer);

        let mut pairs: Vec<_> = record
            .answers
            .iter()
            .map(|a| (a.text.clone(), a.correct))
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                (r#"<span style="font-size: medium;">a</span>"#.to_string(), true),
                (r#"<span style="font-size: medium;">b</span>"#.to_string(), false),
                (r#"<span style="font-size: medium;">c</span>"#.to_string(), true),
            ]
        );
        assert!(echo_text.starts_with("QUESTION (Multiple Answers): Pick"));
    }

    #[test]
    fn test_output_fields_never_contain_tabs() {
        let source = "Q|tab\there\nA+|x\ty\n";
        let (result, output, _) = run(&plain(Syntax::Lines), source);
        result.unwrap();
        // type, question, answer, correctness
        assert_eq!(output.trim_end().split('\t').count(), 4);
    }
}
