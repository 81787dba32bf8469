//! Command implementations for the htmldiff-tokens CLI.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::analysis::grapheme::Granularity;
use crate::analysis::token::{Token, TokenSequence};
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::html::HtmlTokenizer;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::DiffConfig;
use crate::error::{HtmlDiffError, Result};
use crate::sanitize::SanitizerAdapter;
use crate::session::DiffSession;

/// Execute a CLI command.
pub fn execute_command(args: HtmlDiffArgs) -> Result<()> {
    match &args.command {
        Command::Tokenize(tokenize_args) => tokenize_file(tokenize_args, &args),
        Command::Compare(compare_args) => compare_files(compare_args, &args),
    }
}

/// Tokenize one document.
fn tokenize_file(args: &TokenizeArgs, cli_args: &HtmlDiffArgs) -> Result<()> {
    let config = build_config(&args.options)?;
    let encoding = config.text_encoding()?;

    let bytes = read_input(&args.file)?;
    let text = encoding.decode(&bytes)?;
    let text = SanitizerAdapter::from_config(&config)?.sanitize(&text)?;
    let tokens = HtmlTokenizer::from_config(&config).tokenize(&text)?;

    output_result(
        "Tokenized document",
        &TokenizeResult::new(
            args.file.display().to_string(),
            encoding.name().to_string(),
            &tokens,
        ),
        cli_args,
    )
}

/// Tokenize two documents and report where they diverge.
fn compare_files(args: &CompareArgs, cli_args: &HtmlDiffArgs) -> Result<()> {
    let config = build_config(&args.options)?;
    let encoding = config.text_encoding()?;

    let old_bytes = read_input(&args.old)?;
    let new_bytes = read_input(&args.new)?;
    let mut session = DiffSession::from_bytes(&old_bytes, &new_bytes, config)?;
    let (old_tokens, new_tokens) = session.tokens()?;

    let (common_prefix, common_suffix) = shared_edges(old_tokens, new_tokens);
    let result = CompareResult {
        old: TokenizeResult::new(
            args.old.display().to_string(),
            encoding.name().to_string(),
            old_tokens,
        ),
        new: TokenizeResult::new(
            args.new.display().to_string(),
            encoding.name().to_string(),
            new_tokens,
        ),
        common_prefix,
        common_suffix,
    };

    output_result("Compared documents", &result, cli_args)
}

/// Build the configuration from an optional file plus flag overrides.
pub fn build_config(options: &TokenizerOptions) -> Result<DiffConfig> {
    let mut config = match &options.config {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            DiffConfig::from_file(path)?
        }
        None => DiffConfig::default(),
    };

    if let Some(encoding) = &options.encoding {
        config.encoding = encoding.clone();
    }
    if options.keep_new_lines {
        config.keep_new_lines = true;
    }
    if let Some(chars) = &options.special_chars {
        config.set_special_case_chars(chars.chars());
    }
    if options.sanitize {
        config.sanitize = true;
    }
    if options.grapheme {
        config.granularity = Granularity::Grapheme;
    }

    config.validate()?;
    Ok(config)
}

/// Count tokens shared at the start and at the end of both sequences.
///
/// The two counts never overlap, so a token is attributed to the prefix
/// before it is considered for the suffix.
pub fn shared_edges(old: &TokenSequence, new: &TokenSequence) -> (usize, usize) {
    let same = |a: &Token, b: &Token| {
        a.kind == b.kind && a.text == b.text
    };

    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| same(a, b))
        .count();

    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| same(a, b))
        .count();

    (prefix, suffix)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        HtmlDiffError::invalid_argument(format!("cannot read {}: {e}", path.display()))
    })
}
