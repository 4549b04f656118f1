//! quiz2tsv: CLI tool to convert quiz markup to tab-delimited LMS import files

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use config::{CONFIG_FILE_NAME, Config};
use quiz2tsv_core::{ConvertOptions, Converter, DEFAULT_MAX_ANSWERS, RendererKind, Syntax, TsvWriter};

const DEFAULT_INPUT: &str = "multiple_choice.txt";
const DEFAULT_OUTPUT: &str = "multiple_choice_output.txt";

#[derive(Parser, Debug)]
#[command(name = "quiz2tsv")]
#[command(about = "Process a quiz file and output it in tab-delimited import format")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "Examples:
  quiz2tsv                                  # multiple_choice.txt -> multiple_choice_output.txt
  quiz2tsv -i week1.txt -o week1.tsv        # Convert a specific file
  quiz2tsv -i old.txt -s blocks --plain     # Q-/A- markup, first answer correct
  quiz2tsv init                             # Write a sample _quiz2tsv.toml")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    convert: ConvertArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sample configuration file or its JSON schema
    Init {
        /// Output file (defaults to _quiz2tsv.toml, or stdout with --schema)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit the JSON schema instead of a sample configuration
        #[arg(long)]
        schema: bool,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Maximum number of answers allowed (default: 10)
    #[arg(short, long, value_name = "INT")]
    max_answers: Option<usize>,

    /// Input file
    #[arg(short, long = "input-file", value_name = "FILE", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output file
    #[arg(short, long = "output-file", value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Input markup syntax: lines or blocks (default: lines)
    #[arg(short, long, value_name = "SYNTAX")]
    syntax: Option<Syntax>,

    /// Render question and answer text as Markdown
    #[arg(long, conflicts_with = "plain")]
    markdown: bool,

    /// Render question and answer text with line breaks and code spans only
    #[arg(long)]
    plain: bool,

    /// Character marking code spans in pairs (default: #)
    #[arg(long, value_name = "CHAR")]
    code_delimiter: Option<char>,

    /// Disable code spans
    #[arg(long, conflicts_with = "code_delimiter")]
    no_code_delimiter: bool,

    /// Configuration file (defaults to _quiz2tsv.toml next to the input file)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.convert.verbose, cli.convert.quiet);

    match cli.command {
        Some(Command::Init { output, schema }) => init(output.as_deref(), schema),
        None => convert(&cli.convert),
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the flags
fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Convert the input file to the output file
fn convert(args: &ConvertArgs) -> Result<()> {
    let config = load_config(args)?;
    let options = resolve_options(args, &config)?;

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read: {}", args.input.display()))?;

    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        syntax = options.syntax.as_str(),
        renderer = ?options.renderer,
        "converting"
    );

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to write: {}", args.output.display()))?;
    let mut writer = TsvWriter::new(BufWriter::new(file));

    let mut stdout = io::stdout().lock();
    let mut sink = io::sink();
    let echo: &mut dyn Write = if args.quiet { &mut sink } else { &mut stdout };

    let converter = Converter::new(options);
    let summary = converter
        .convert(&source, &mut writer, echo)
        .with_context(|| format!("Failed to convert: {}", args.input.display()))?;

    writer
        .flush()
        .with_context(|| format!("Failed to write: {}", args.output.display()))?;

    writeln!(echo, "\nTotal questions formed: {}", summary.records)?;

    Ok(())
}

/// Explicit `--config`, else `_quiz2tsv.toml` beside the input, else defaults
fn load_config(args: &ConvertArgs) -> Result<Config> {
    if let Some(path) = &args.config {
        return Config::load(path);
    }
    let dir = args
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let config = Config::load_from_dir(dir)?;
    if config.is_some() {
        tracing::debug!(path = %dir.join(CONFIG_FILE_NAME).display(), "loaded config");
    }
    Ok(config.unwrap_or_default())
}

/// Merge command-line flags over the configuration file
fn resolve_options(args: &ConvertArgs, config: &Config) -> Result<ConvertOptions> {
    let defaults = ConvertOptions::default();

    let syntax = match (args.syntax, &config.input.syntax) {
        (Some(syntax), _) => syntax,
        (None, Some(name)) => name
            .parse::<Syntax>()
            .map_err(anyhow::Error::msg)
            .context("Invalid input.syntax in config")?,
        (None, None) => defaults.syntax,
    };

    let max_answers = args
        .max_answers
        .or(config.answers.max)
        .unwrap_or(DEFAULT_MAX_ANSWERS);

    let renderer = if args.plain {
        RendererKind::Plain
    } else if args.markdown {
        RendererKind::Markdown
    } else {
        match config.format.renderer.as_deref() {
            None => defaults.renderer,
            Some("plain") => RendererKind::Plain,
            Some("markdown") => RendererKind::Markdown,
            Some(other) => anyhow::bail!(
                "Invalid format.renderer in config: {other:?} (expected \"markdown\" or \"plain\")"
            ),
        }
    };

    let code_delimiter = if args.no_code_delimiter {
        None
    } else if let Some(c) = args.code_delimiter {
        Some(c)
    } else {
        config.code_delimiter()?.unwrap_or(defaults.code_delimiter)
    };

    Ok(ConvertOptions {
        syntax,
        max_answers,
        renderer,
        code_delimiter,
    })
}

/// Write a sample config or the JSON schema
fn init(output: Option<&Path>, schema: bool) -> Result<()> {
    let content = if schema {
        Config::json_schema_string()?
    } else {
        Config::sample().to_toml_with_schema()?
    };

    let path = match (output, schema) {
        (Some(path), _) => path.to_path_buf(),
        (None, true) => {
            println!("{content}");
            return Ok(());
        }
        (None, false) => {
            let path = PathBuf::from(CONFIG_FILE_NAME);
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            path
        }
    };

    fs::write(&path, &content).with_context(|| format!("Failed to write: {}", path.display()))?;
    eprintln!("Wrote {}", path.display());

    Ok(())
}
