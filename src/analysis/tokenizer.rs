//! Tokenizer implementations for HTML diffing.
//!
//! A tokenizer turns one document into a [`TokenSequence`]. The diff engine
//! compares two such sequences, so tokenization has to be deterministic:
//! the same text and configuration always yield the same tokens.
//!
//! # Available Tokenizers
//!
//! - [`html::HtmlTokenizer`] - Tag/word/whitespace state machine with
//!   special-case joining
//!
//! # Examples
//!
//! ```
//! use htmldiff_tokens::analysis::tokenizer::Tokenizer;
//! use htmldiff_tokens::analysis::tokenizer::html::HtmlTokenizer;
//! use htmldiff_tokens::config::DiffConfig;
//!
//! let tokenizer = HtmlTokenizer::from_config(&DiffConfig::default());
//! let tokens = tokenizer.tokenize("<p>Hello world</p>").unwrap();
//! assert_eq!(tokens.texts(), vec!["<p>", "Hello", " ", "world", "</p>"]);
//! ```

use crate::analysis::token::TokenSequence;
use crate::error::Result;

/// Trait for tokenizers that convert a document into tokens.
///
/// # Examples
///
/// Implementing a custom tokenizer:
///
/// ```
/// use htmldiff_tokens::analysis::token::{TokenKind, TokenSequence};
/// use htmldiff_tokens::analysis::tokenizer::Tokenizer;
/// use htmldiff_tokens::error::Result;
///
/// struct LineTokenizer;
///
/// impl Tokenizer for LineTokenizer {
///     fn tokenize(&self, text: &str) -> Result<TokenSequence> {
///         let mut tokens = TokenSequence::new();
///         let mut start = 0;
///         for line in text.split_inclusive('\n') {
///             tokens.push(TokenKind::Word, line, start, start + line.len());
///             start += line.len();
///         }
///         Ok(tokens)
///     }
///
///     fn name(&self) -> &'static str {
///         "line"
///     }
/// }
///
/// let tokens = LineTokenizer.tokenize("a\nb").unwrap();
/// assert_eq!(tokens.texts(), vec!["a\n", "b"]);
/// ```
pub trait Tokenizer: Send + Sync {
    /// Tokenize one document.
    fn tokenize(&self, text: &str) -> Result<TokenSequence>;

    /// Get the name of this tokenizer (for debugging and logging).
    fn name(&self) -> &'static str;
}

pub mod html;
