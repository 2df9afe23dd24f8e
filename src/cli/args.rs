//! Command-line argument parsing for kbqa
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::config::{Config, EncoderBackend};
use crate::knowledge::MalformedLinePolicy;

/// kbqa - Answer questions from a curated question/answer knowledge base
#[derive(Parser, Debug)]
#[command(name = "kbqa")]
#[command(version)]
#[command(about = "Answer questions by semantic match against a question/answer knowledge base", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Knowledge base file (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    pub kb: Option<PathBuf>,

    /// Encoder backend (overrides config)
    #[arg(long, global = true, value_enum)]
    pub backend: Option<EncoderBackend>,

    /// Show the fallback message when the best score is below this value
    #[arg(long, global = true, value_name = "SCORE")]
    pub min_confidence: Option<f32>,

    /// Skip malformed knowledge base lines instead of failing the load
    #[arg(long, global = true)]
    pub skip_malformed: bool,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Answer a single question
    Ask {
        /// The question (multiple words are joined with spaces)
        #[arg(required = true, value_name = "QUESTION")]
        question: Vec<String>,

        /// Print the reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive question loop
    Chat,

    /// Show knowledge base statistics
    Inspect,

    /// Display effective configuration
    Config {
        /// Also write it to the config file (--config, or ~/.kbqa/config.toml)
        #[arg(long)]
        save: bool,
    },
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Where `config --save` writes: the `--config` file, else the default location
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Config::default_path)
    }

    /// Fold command-line overrides into a loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(kb) = &self.kb {
            config.knowledge.path = kb.to_string_lossy().into_owned();
        }
        if let Some(backend) = self.backend {
            config.encoder.backend = backend;
        }
        if self.min_confidence.is_some() {
            config.responder.min_confidence = self.min_confidence;
        }
        if self.skip_malformed {
            config.knowledge.on_malformed = MalformedLinePolicy::Skip;
        }
    }
}

impl Commands {
    /// Question text for `ask`
    pub fn question(&self) -> Option<String> {
        match self {
            Commands::Ask { question, .. } => Some(question.join(" ")),
            _ => None,
        }
    }
}

impl Verbosity {
    /// Default tracing filter for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "kbqa=error",
            Verbosity::Normal => "kbqa=warn",
            Verbosity::Verbose => "kbqa=info",
            Verbosity::VeryVerbose => "kbqa=debug",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show scores and matched questions
    pub fn show_details(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
