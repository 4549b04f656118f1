//! Configuration file support for quiz2tsv CLI
//!
//! Loads settings from a `_quiz2tsv.toml` configuration file. Command-line
//! flags take precedence over anything set here.

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up next to the input file
pub const CONFIG_FILE_NAME: &str = "_quiz2tsv.toml";

/// File name `init --schema` suggests for the JSON schema
pub const SCHEMA_FILE_NAME: &str = "quiz2tsv.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Input markup configuration
    #[serde(skip_serializing_if = "InputConfig::is_empty")]
    pub input: InputConfig,
    /// Answer limits
    #[serde(skip_serializing_if = "AnswersConfig::is_empty")]
    pub answers: AnswersConfig,
    /// Text formatting configuration
    #[serde(skip_serializing_if = "FormatConfig::is_empty")]
    pub format: FormatConfig,
}

/// Input markup configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct InputConfig {
    /// Markup syntax: "lines" (`Q|`, `QT|`, `QF|`, `A+|`, `A-|` tags) or
    /// "blocks" (`Q-`/`A-` markers, first answer correct) (default: "lines")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
}

impl InputConfig {
    fn is_empty(&self) -> bool {
        self.syntax.is_none()
    }
}

/// Answer limits
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct AnswersConfig {
    /// Maximum number of answers per question (default: 10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl AnswersConfig {
    fn is_empty(&self) -> bool {
        self.max.is_none()
    }
}

/// Text formatting configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct FormatConfig {
    /// Renderer: "markdown" or "plain" (default: "markdown")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    /// Character marking code spans in pairs; empty string disables them (default: "#")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_delimiter: Option<String>,
}

impl FormatConfig {
    fn is_empty(&self) -> bool {
        self.renderer.is_none() && self.code_delimiter.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_quiz2tsv.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema ./{}\n\n{}", SCHEMA_FILE_NAME, toml_content))
    }

    /// Code delimiter setting: `Some(None)` when explicitly disabled
    pub fn code_delimiter(&self) -> Result<Option<Option<char>>> {
        let Some(value) = &self.format.code_delimiter else {
            return Ok(None);
        };
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(Some(None)),
            (Some(c), None) => Ok(Some(Some(c))),
            _ => anyhow::bail!(
                "format.code_delimiter must be a single character, got {:?}",
                value
            ),
        }
    }

    /// Create a sample configuration with common defaults for init command
    pub fn sample() -> Self {
        Config {
            input: InputConfig {
                syntax: Some("lines".to_string()),
            },
            answers: AnswersConfig { max: Some(10) },
            format: FormatConfig {
                renderer: Some("markdown".to_string()),
                code_delimiter: Some("#".to_string()),
            },
        }
    }
}
