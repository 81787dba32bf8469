//! Command line argument parsing for the htmldiff-tokens CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// htmldiff-tokens - Inspect how HTML documents are split for diffing
#[derive(Parser, Debug, Clone)]
#[command(name = "htmldiff-tokens")]
#[command(about = "Tokenize HTML documents the way an HTML-aware differ sees them")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct HtmlDiffArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl HtmlDiffArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// Log filter directive for the effective verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity() {
            0 => "error",
            1 => "warn",
            2 => "info",
            _ => "debug",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the token sequence of one document
    Tokenize(TokenizeArgs),

    /// Print the token sequences of two documents and where they diverge
    Compare(CompareArgs),
}

/// Tokenizer settings shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct TokenizerOptions {
    /// Configuration file (JSON); flags below override its values
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Input encoding
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// Keep whitespace runs verbatim
    #[arg(long)]
    pub keep_new_lines: bool,

    /// Special-case characters, e.g. ".,()'" (replaces the configured set)
    #[arg(long, value_name = "CHARS")]
    pub special_chars: Option<String>,

    /// Run the sanitizer before tokenizing
    #[arg(long)]
    pub sanitize: bool,

    /// Split on extended grapheme clusters instead of codepoints
    #[arg(long)]
    pub grapheme: bool,
}

/// Arguments for tokenizing one document
#[derive(Parser, Debug, Clone)]
pub struct TokenizeArgs {
    /// Document to tokenize
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub options: TokenizerOptions,
}

/// Arguments for comparing two documents
#[derive(Parser, Debug, Clone)]
pub struct CompareArgs {
    /// Old document
    #[arg(value_name = "OLD")]
    pub old: PathBuf,

    /// New document
    #[arg(value_name = "NEW")]
    pub new: PathBuf,

    #[command(flatten)]
    pub options: TokenizerOptions,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// Table format
    Table,
}
