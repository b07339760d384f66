//! Command-line argument parsing for askdb.

use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, ConnectionConfig};
use crate::error::Result;

/// Printed around every report.
pub const SEPARATOR: &str =
    "================================================================================";

/// Words that end the interactive prompt, compared case-insensitively.
pub const EXIT_COMMANDS: [&str; 2] = ["quit", "exit"];

/// Ask a relational database questions in plain language.
#[derive(Parser, Debug)]
#[command(name = "askdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Questions to answer; starts an interactive prompt when omitted
    #[arg(value_name = "QUESTION")]
    pub questions: Vec<String>,

    /// Database connection string (postgres://..., sqlite://path, sqlite::memory:)
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,

    /// Use named connection from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// LLM provider (openai, anthropic, mock, canned)
    #[arg(long, env = "LLM_PROVIDER", value_name = "PROVIDER")]
    pub llm: Option<String>,

    /// Model name passed to the LLM provider
    #[arg(long, env = "LLM_MODEL", value_name = "MODEL")]
    pub model: Option<String>,

    /// Sampling temperature (0 to 2)
    #[arg(long, env = "LLM_TEMPERATURE", value_name = "TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Whether to reuse the schema snapshot between questions
    #[arg(
        long,
        env = "AGENT_CACHE_SCHEMA",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_schema: Option<bool>,

    /// Introspect the schema for every question
    #[arg(long)]
    pub no_cache: bool,

    /// Run generated statements even if they contain destructive keywords
    #[arg(long)]
    pub allow_unsafe: bool,

    /// Maximum characters per result cell
    #[arg(long, value_name = "N")]
    pub max_cell_width: Option<usize>,

    /// SQL script to run against the database before answering
    #[arg(long, value_name = "PATH")]
    pub seed: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log filter (e.g. "debug" or "askdb=trace"); overrides RUST_LOG
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns the named connection to use, if specified.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    /// Returns true when questions should be read interactively.
    pub fn is_interactive(&self) -> bool {
        self.questions.is_empty()
    }

    /// Converts `--database-url` to a ConnectionConfig.
    pub fn to_connection_config(&self) -> Result<Option<ConnectionConfig>> {
        self.database_url
            .as_deref()
            .map(ConnectionConfig::from_connection_string)
            .transpose()
    }

    /// Applies LLM and pipeline overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(provider) = &self.llm {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(cache_schema) = self.cache_schema {
            config.pipeline.cache_schema = cache_schema;
        }
        if self.no_cache {
            config.pipeline.cache_schema = false;
        }
        if self.allow_unsafe {
            config.pipeline.check_safety = false;
        }
        if let Some(width) = self.max_cell_width {
            config.pipeline.max_cell_width = width;
        }
    }
}

/// Returns true if `input` asks the interactive prompt to stop.
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_COMMANDS
        .iter()
        .any(|command| input.eq_ignore_ascii_case(command))
}
