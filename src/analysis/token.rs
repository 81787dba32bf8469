//! Token types produced by the HTML tokenizer.
//!
//! A [`Token`] is one atomic comparison unit: a whole tag, a word, a run of
//! whitespace or a punctuation mark. Tokens are collected into an
//! append-only [`TokenSequence`], one per compared document.
//!
//! Every token keeps the byte span it was cut from, so the source document
//! can always be rebuilt from a sequence, even when whitespace runs were
//! collapsed to a single space in the token text.
//!
//! # Examples
//!
//! ```
//! use htmldiff_tokens::analysis::token::{TokenKind, TokenSequence};
//!
//! let source = "<b>hi</b>";
//! let mut tokens = TokenSequence::new();
//! tokens.push(TokenKind::Tag, "<b>", 0, 3);
//! tokens.push(TokenKind::Word, "hi", 3, 5);
//! tokens.push(TokenKind::Tag, "</b>", 5, 9);
//!
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[1].position, 1);
//! assert_eq!(tokens.joined_text(), source);
//! assert_eq!(tokens.source_text(source).as_deref(), Some(source));
//! ```

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Classification of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// A complete `<...>` span, or the unterminated remainder of the input.
    Tag,
    /// Letters and digits, possibly joined by special-case characters.
    Word,
    /// A run of whitespace.
    Whitespace,
    /// Any other non-whitespace unit.
    Punctuation,
}

impl TokenKind {
    /// Short lowercase name, as used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Tag => "tag",
            TokenKind::Word => "word",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Punctuation => "punctuation",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single comparison unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// What kind of unit this is
    pub kind: TokenKind,

    /// The token text as the diff engine sees and renders it
    pub text: String,

    /// Ordinal position in the owning sequence (0-based)
    pub position: usize,

    /// Byte offset where the token starts in the tokenized input
    pub start_offset: usize,

    /// Byte offset where the token ends in the tokenized input
    pub end_offset: usize,
}

impl Token {
    /// Create a token without source offsets.
    pub fn new<S: Into<String>>(kind: TokenKind, text: S, position: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
        }
    }

    /// Create a token with its source byte span.
    pub fn with_offsets<S: Into<String>>(
        kind: TokenKind,
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
            start_offset,
            end_offset,
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether this token is a tag.
    pub fn is_tag(&self) -> bool {
        self.kind == TokenKind::Tag
    }

    /// Whether this token is whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Whether this token is a closing tag such as `</p>`.
    pub fn is_closing_tag(&self) -> bool {
        self.is_tag() && self.text.starts_with("</")
    }

    /// Whether this token is an opening (or self-closing) tag.
    pub fn is_opening_tag(&self) -> bool {
        self.is_tag() && !self.is_closing_tag() && self.tag_name().is_some()
    }

    /// Element name of a tag token, e.g. `strong` for `<strong class="x">`.
    ///
    /// Returns `None` for non-tag tokens and for tags without a name
    /// (comments, doctypes, `<>`).
    pub fn tag_name(&self) -> Option<&str> {
        if !self.is_tag() {
            return None;
        }
        let body = self.text.strip_prefix('<')?;
        let body = body.strip_prefix('/').unwrap_or(body).trim_start();
        let end = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':'))
            .unwrap_or(body.len());
        let name = &body[..end];
        if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            None
        } else {
            Some(name)
        }
    }

    /// The slice of `source` this token was cut from.
    pub fn source_slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start_offset..self.end_offset)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.text.as_str()
    }
}

/// Ordered, append-only list of tokens for one document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSequence {
    tokens: Vec<Token>,
}

impl TokenSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        TokenSequence { tokens: Vec::new() }
    }

    /// Create an empty sequence with room for `capacity` tokens.
    pub fn with_capacity(capacity: usize) -> Self {
        TokenSequence {
            tokens: Vec::with_capacity(capacity),
        }
    }

    /// Append a token; its position is assigned from the current length.
    pub fn push<S: Into<String>>(
        &mut self,
        kind: TokenKind,
        text: S,
        start_offset: usize,
        end_offset: usize,
    ) -> &Token {
        let position = self.tokens.len();
        self.tokens.push(Token::with_offsets(
            kind,
            text,
            position,
            start_offset,
            end_offset,
        ));
        &self.tokens[position]
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the sequence holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Get the token at `position`.
    pub fn get(&self, position: usize) -> Option<&Token> {
        self.tokens.get(position)
    }

    /// Iterate over the tokens in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// View the tokens as a slice.
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// The token texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Concatenation of every token's text.
    pub fn joined_text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Rebuild the tokenized input from the tokens' source spans.
    ///
    /// Returns `None` if a span does not fit `source`, i.e. the sequence was
    /// produced from a different document.
    pub fn source_text(&self, source: &str) -> Option<String> {
        let mut rebuilt = String::with_capacity(source.len());
        for token in &self.tokens {
            rebuilt.push_str(token.source_slice(source)?);
        }
        Some(rebuilt)
    }

    /// Count tokens of the given kind.
    pub fn count_kind(&self, kind: TokenKind) -> usize {
        self.tokens.iter().filter(|t| t.kind == kind).count()
    }

    /// Consume the sequence, returning the tokens.
    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }
}

impl Index<usize> for TokenSequence {
    type Output = Token;

    fn index(&self, position: usize) -> &Token {
        &self.tokens[position]
    }
}

impl<'a> IntoIterator for &'a TokenSequence {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl IntoIterator for TokenSequence {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new(TokenKind::Word, "hello", 0);
        assert_eq!(token.text, "hello");
        assert_eq!(token.position, 0);
        assert_eq!(token.start_offset, 0);
        assert_eq!(token.end_offset, 0);
        assert_eq!(token.len(), 5);
        assert!(!token.is_tag());
    }

    #[test]
    fn test_tag_name() {
        let open = Token::new(TokenKind::Tag, "<strong class=\"x\">", 0);
        assert_eq!(open.tag_name(), Some("strong"));
        assert!(open.is_opening_tag());
        assert!(!open.is_closing_tag());

        let close = Token::new(TokenKind::Tag, "</P>", 1);
        assert_eq!(close.tag_name(), Some("P"));
        assert!(close.is_closing_tag());

        let self_closing = Token::new(TokenKind::Tag, "<br/>", 2);
        assert_eq!(self_closing.tag_name(), Some("br"));

        let comment = Token::new(TokenKind::Tag, "<!-- note -->", 3);
        assert_eq!(comment.tag_name(), None);
        assert!(!comment.is_opening_tag());

        let word = Token::new(TokenKind::Word, "strong", 4);
        assert_eq!(word.tag_name(), None);
    }

    #[test]
    fn test_sequence_positions_and_source() {
        let source = "a  b";
        let mut tokens = TokenSequence::with_capacity(3);
        tokens.push(TokenKind::Word, "a", 0, 1);
        tokens.push(TokenKind::Whitespace, " ", 1, 3);
        tokens.push(TokenKind::Word, "b", 3, 4);

        let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(tokens.joined_text(), "a b");
        assert_eq!(tokens.source_text(source).as_deref(), Some(source));
        assert_eq!(tokens.source_text("a"), None);
        assert_eq!(tokens.count_kind(TokenKind::Word), 2);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&TokenKind::Whitespace).unwrap();
        assert_eq!(json, "\"whitespace\"");
        assert_eq!(TokenKind::Punctuation.to_string(), "punctuation");
    }
}
