//! Output formatting for CLI commands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::token::{Token, TokenSequence};
use crate::cli::args::{HtmlDiffArgs, OutputFormat};
use crate::error::Result;

/// One token as printed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRow {
    pub position: usize,
    pub kind: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl From<&Token> for TokenRow {
    fn from(token: &Token) -> Self {
        TokenRow {
            position: token.position,
            kind: token.kind.to_string(),
            text: token.text.clone(),
            start: token.start_offset,
            end: token.end_offset,
        }
    }
}

/// Tokens of one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizeResult {
    pub file: String,
    pub encoding: String,
    pub token_count: usize,
    pub kinds: BTreeMap<String, usize>,
    pub tokens: Vec<TokenRow>,
}

impl TokenizeResult {
    pub fn new(file: String, encoding: String, tokens: &TokenSequence) -> Self {
        let mut kinds = BTreeMap::new();
        for token in tokens {
            *kinds.entry(token.kind.to_string()).or_insert(0) += 1;
        }
        TokenizeResult {
            file,
            encoding,
            token_count: tokens.len(),
            kinds,
            tokens: tokens.iter().map(TokenRow::from).collect(),
        }
    }
}

/// Tokens of two documents and the extent of their shared edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResult {
    pub old: TokenizeResult,
    pub new: TokenizeResult,
    pub common_prefix: usize,
    pub common_suffix: usize,
}

/// Results that know how to print themselves for people.
pub trait HumanOutput {
    /// Print as plain text.
    fn print_human(&self, args: &HtmlDiffArgs);

    /// Print as aligned columns.
    fn print_table(&self, args: &HtmlDiffArgs);
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &HtmlDiffArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            print_message(message, args);
            result.print_human(args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
        OutputFormat::Table => {
            print_message(message, args);
            result.print_table(args);
            Ok(())
        }
    }
}

fn print_message(message: &str, args: &HtmlDiffArgs) {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }
}

fn output_json<T: Serialize>(result: &T, args: &HtmlDiffArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

impl HumanOutput for TokenizeResult {
    fn print_human(&self, args: &HtmlDiffArgs) {
        println!("{} ({}): {} tokens", self.file, self.encoding, self.token_count);
        if args.verbosity() > 1 {
            let kinds: Vec<String> = self
                .kinds
                .iter()
                .map(|(kind, count)| format!("{kind}={count}"))
                .collect();
            println!("  {}", kinds.join(" "));
        }
        for row in &self.tokens {
            println!("  {:>5}  {:<11} {}", row.position, row.kind, format_text(&row.text));
        }
    }

    fn print_table(&self, _args: &HtmlDiffArgs) {
        print_token_table(&self.tokens);
    }
}

impl HumanOutput for CompareResult {
    fn print_human(&self, args: &HtmlDiffArgs) {
        self.old.print_human(args);
        println!();
        self.new.print_human(args);
        println!();
        self.print_summary();
    }

    fn print_table(&self, _args: &HtmlDiffArgs) {
        println!("Old: {}", self.old.file);
        print_token_table(&self.old.tokens);
        println!();
        println!("New: {}", self.new.file);
        print_token_table(&self.new.tokens);
        println!();
        self.print_summary();
    }
}

impl CompareResult {
    fn print_summary(&self) {
        println!("Common prefix: {} tokens", self.common_prefix);
        println!("Common suffix: {} tokens", self.common_suffix);
        println!(
            "Changed: {} old tokens, {} new tokens",
            self.old.token_count - self.common_prefix - self.common_suffix,
            self.new.token_count - self.common_prefix - self.common_suffix
        );
    }
}

fn print_token_table(rows: &[TokenRow]) {
    let text_width = rows
        .iter()
        .map(|row| format_text(&row.text).chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    println!(
        "{:>5} | {:<11} | {:>7} | {:>7} | {:<text_width$}",
        "pos", "kind", "start", "end", "text"
    );
    println!(
        "{}-+-{}-+-{}-+-{}-+-{}",
        "-".repeat(5),
        "-".repeat(11),
        "-".repeat(7),
        "-".repeat(7),
        "-".repeat(text_width)
    );
    for row in rows {
        println!(
            "{:>5} | {:<11} | {:>7} | {:>7} | {:<text_width$}",
            row.position,
            row.kind,
            row.start,
            row.end,
            format_text(&row.text)
        );
    }
}

/// Quote token text so whitespace tokens stay visible.
fn format_text(text: &str) -> String {
    format!("{text:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::TokenKind;

    #[test]
    fn test_tokenize_result_counts_kinds() {
        let mut tokens = TokenSequence::new();
        tokens.push(TokenKind::Tag, "<p>", 0, 3);
        tokens.push(TokenKind::Word, "Hi", 3, 5);
        tokens.push(TokenKind::Tag, "</p>", 5, 9);

        let result = TokenizeResult::new("a.html".to_string(), "UTF-8".to_string(), &tokens);
        assert_eq!(result.token_count, 3);
        assert_eq!(result.kinds.get("tag"), Some(&2));
        assert_eq!(result.kinds.get("word"), Some(&1));
        assert_eq!(result.tokens[1].start, 3);
    }

    #[test]
    fn test_format_text_escapes_whitespace() {
        assert_eq!(format_text(" "), "\" \"");
        assert_eq!(format_text("\n"), "\"\\n\"");
    }
}
