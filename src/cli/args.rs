//! Command-line argument parsing for RagBuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::errors::Result;
use crate::rag::types::Language;

/// RagBuddy - Answer questions from local documents in English or Arabic
#[derive(Parser, Debug)]
#[command(name = "ragbuddy")]
#[command(version)]
#[command(about = "Bilingual retrieval-augmented question answering over local documents", long_about = None)]
pub struct Args {
    /// Answer language (en or ar)
    #[arg(short, long, global = true, default_value = "en")]
    pub lang: String,

    /// Chunks retrieved per question (configured default when omitted)
    #[arg(short = 'k', long, global = true)]
    pub top_k: Option<usize>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only answers and errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Answer a single question and exit
    Ask {
        /// The question
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Documents to index
        #[arg(value_name = "DOCS", required = true)]
        docs: Vec<PathBuf>,
    },

    /// Start interactive question loop
    Start {
        /// Documents to index
        #[arg(value_name = "DOCS", required = true)]
        docs: Vec<PathBuf>,
    },

    /// Index documents and show statistics
    Stats {
        /// Documents to index
        #[arg(value_name = "DOCS")]
        docs: Vec<PathBuf>,
    },

    /// Display current configuration
    Config,
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

    /// Parsed answer language
    pub fn language(&self) -> Result<Language> {
        self.lang.parse()
    }

    /// Check flag combinations
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.top_k == Some(0) {
            return Err("--top-k must be at least 1.".to_string());
        }

        if self.language().is_err() {
            return Err(format!(
                "Unsupported language '{}'. Use 'en' or 'ar'.",
                self.lang
            ));
        }

        Ok(())
    }
}

impl Commands {
    /// Document paths named on the command line
    pub fn docs(&self) -> &[PathBuf] {
        match self {
            Commands::Ask { docs, .. } | Commands::Start { docs } | Commands::Stats { docs } => {
                docs
            }
            Commands::Config => &[],
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if the per-query report should be printed
    pub fn show_report(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if retrieved chunks should be printed
    pub fn show_chunks(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
