//! HTML tokenizer state machine.
//!
//! The tokenizer walks the input one unit at a time in one of three states:
//!
//! ```text
//! state       unit          action                          next state
//! ----------  ------------  ------------------------------  ----------
//! Character   '<'           flush word, start tag           Tag
//! Character   whitespace    flush word, start run           Whitespace
//! Character   other         extend or flush (WordRules)     Character
//! Tag         '>'           close and flush tag             Whitespace
//! Tag         other         extend tag                      Tag
//! Whitespace  '<'           flush run, start tag            Tag
//! Whitespace  whitespace    extend run                      Whitespace
//! Whitespace  other         flush run, start word           Character
//! ```
//!
//! Tags are emitted whole, whitespace runs become a single token, and the
//! remaining units are grouped into words by [`WordRules`]. An unterminated
//! `<` swallows the rest of the input as one tag token; it is not an error.

use crate::analysis::grapheme::GraphemeSplitter;
use crate::analysis::token::{TokenKind, TokenSequence};
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::word::WordRules;
use crate::config::DiffConfig;
use crate::error::Result;

/// Scanner state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenizerState {
    /// Accumulating a word or punctuation.
    #[default]
    Character,
    /// Inside `<...>`.
    Tag,
    /// Accumulating a whitespace run.
    Whitespace,
}

/// Splits HTML into tag, word, whitespace and punctuation tokens.
///
/// # Examples
///
/// ```
/// use htmldiff_tokens::analysis::token::TokenKind;
/// use htmldiff_tokens::analysis::tokenizer::Tokenizer;
/// use htmldiff_tokens::analysis::tokenizer::html::HtmlTokenizer;
/// use htmldiff_tokens::config::DiffConfig;
///
/// let tokenizer = HtmlTokenizer::from_config(&DiffConfig::default());
/// let tokens = tokenizer.tokenize("don't stop.").unwrap();
///
/// assert_eq!(tokens.texts(), vec!["don't", " ", "stop", "."]);
/// assert_eq!(tokens[3].kind, TokenKind::Punctuation);
/// ```
#[derive(Clone, Debug)]
pub struct HtmlTokenizer {
    rules: WordRules,
    splitter: GraphemeSplitter,
    keep_new_lines: bool,
}

impl HtmlTokenizer {
    /// Create a tokenizer from explicit parts.
    pub fn new(rules: WordRules, splitter: GraphemeSplitter, keep_new_lines: bool) -> Self {
        HtmlTokenizer {
            rules,
            splitter,
            keep_new_lines,
        }
    }

    /// Create a tokenizer for the given configuration.
    pub fn from_config(config: &DiffConfig) -> Self {
        HtmlTokenizer::new(
            WordRules::new(config.special_case_chars.clone(), config.granularity),
            GraphemeSplitter::new(config.granularity),
            config.keep_new_lines,
        )
    }

    /// Whether whitespace runs are kept verbatim.
    pub fn keep_new_lines(&self) -> bool {
        self.keep_new_lines
    }

    /// The word-continuation rules in use.
    pub fn rules(&self) -> &WordRules {
        &self.rules
    }
}

impl Tokenizer for HtmlTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenSequence> {
        let mut scan = Scan::new(self, text.len());
        let mut units = self.splitter.split(text).peekable();

        while let Some((offset, unit)) = units.next() {
            let next = units.peek().map(|&(_, next)| next);
            scan.step(offset, unit, next);
        }

        Ok(scan.finish())
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

/// Mutable state of one tokenization run.
struct Scan<'t> {
    tokenizer: &'t HtmlTokenizer,
    tokens: TokenSequence,
    state: TokenizerState,
    current: String,
    start: usize,
    end: usize,
}

impl<'t> Scan<'t> {
    fn new(tokenizer: &'t HtmlTokenizer, input_len: usize) -> Self {
        Scan {
            tokenizer,
            // Rough guess: one token per five bytes of HTML.
            tokens: TokenSequence::with_capacity(input_len / 5),
            state: TokenizerState::Character,
            current: String::new(),
            start: 0,
            end: 0,
        }
    }

    fn step(&mut self, offset: usize, unit: &str, next: Option<&str>) {
        match self.state {
            TokenizerState::Character => {
                if is_start_of_tag(unit) {
                    self.flush_word();
                    self.append(offset, unit);
                    self.state = TokenizerState::Tag;
                } else if is_whitespace(unit) {
                    self.flush_word();
                    self.append_whitespace(offset, unit);
                    self.state = TokenizerState::Whitespace;
                } else if self
                    .tokenizer
                    .rules
                    .continues_word(&self.current, unit, next)
                {
                    self.append(offset, unit);
                } else {
                    self.flush_word();
                    self.append(offset, unit);
                }
            }
            TokenizerState::Tag => {
                self.append(offset, unit);
                if is_end_of_tag(unit) {
                    self.flush(TokenKind::Tag);
                    // The terminator itself is tested, not the unit after it.
                    // '>' never starts with whitespace, so this always lands
                    // in Whitespace.
                    self.state = if starts_with_whitespace(unit) {
                        TokenizerState::Character
                    } else {
                        TokenizerState::Whitespace
                    };
                }
            }
            TokenizerState::Whitespace => {
                if is_start_of_tag(unit) {
                    self.flush(TokenKind::Whitespace);
                    self.append(offset, unit);
                    self.state = TokenizerState::Tag;
                } else if is_whitespace(unit) {
                    self.append_whitespace(offset, unit);
                } else {
                    self.flush(TokenKind::Whitespace);
                    self.append(offset, unit);
                    self.state = TokenizerState::Character;
                }
            }
        }
    }

    fn finish(mut self) -> TokenSequence {
        match self.state {
            TokenizerState::Character => self.flush_word(),
            TokenizerState::Tag => self.flush(TokenKind::Tag),
            TokenizerState::Whitespace => self.flush(TokenKind::Whitespace),
        }
        self.tokens
    }

    fn append(&mut self, offset: usize, unit: &str) {
        if self.current.is_empty() {
            self.start = offset;
        }
        self.current.push_str(unit);
        self.end = offset + unit.len();
    }

    fn append_whitespace(&mut self, offset: usize, unit: &str) {
        if self.current.is_empty() {
            self.start = offset;
            self.current
                .push_str(if self.tokenizer.keep_new_lines { unit } else { " " });
        } else if self.tokenizer.keep_new_lines {
            self.current.push_str(unit);
        }
        self.end = offset + unit.len();
    }

    fn flush_word(&mut self) {
        let kind = if self.tokenizer.rules.is_part_of_word(&self.current) {
            TokenKind::Word
        } else {
            TokenKind::Punctuation
        };
        self.flush(kind);
    }

    fn flush(&mut self, kind: TokenKind) {
        if self.current.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.current);
        self.tokens.push(kind, text, self.start, self.end);
    }
}

fn is_start_of_tag(unit: &str) -> bool {
    unit == "<"
}

fn is_end_of_tag(unit: &str) -> bool {
    unit == ">"
}

fn is_whitespace(unit: &str) -> bool {
    !unit.is_empty() && unit.chars().all(char::is_whitespace)
}

fn starts_with_whitespace(unit: &str) -> bool {
    unit.chars().next().is_some_and(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::grapheme::Granularity;

    fn tokenize(text: &str) -> TokenSequence {
        HtmlTokenizer::from_config(&DiffConfig::default())
            .tokenize(text)
            .unwrap()
    }

    fn kinds(tokens: &TokenSequence) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_paragraph() {
        let tokens = tokenize("<p>Hello world</p>");
        assert_eq!(tokens.texts(), vec!["<p>", "Hello", " ", "world", "</p>"]);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Tag,
                TokenKind::Word,
                TokenKind::Whitespace,
                TokenKind::Word,
                TokenKind::Tag
            ]
        );
    }

    #[test]
    fn test_special_case_joining() {
        let tokens = tokenize("don't stop.");
        assert_eq!(tokens.texts(), vec!["don't", " ", "stop", "."]);

        let tokens = tokenize("pi is 3.14, roughly");
        assert_eq!(
            tokens.texts(),
            vec!["pi", " ", "is", " ", "3.14", ",", " ", "roughly"]
        );
    }

    #[test]
    fn test_leading_special_char_does_not_join() {
        // The quote binds to "tis", but "'" alone is not yet a word so the
        // letters that follow start a new token.
        let tokens = tokenize("'tis");
        assert_eq!(tokens.texts(), vec!["'", "tis"]);
        assert_eq!(tokens[0].kind, TokenKind::Punctuation);
    }

    #[test]
    fn test_plain_punctuation_splits() {
        let tokens = tokenize("a-b!!");
        assert_eq!(tokens.texts(), vec!["a", "-", "b", "!", "!"]);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Word,
                TokenKind::Punctuation,
                TokenKind::Word,
                TokenKind::Punctuation,
                TokenKind::Punctuation
            ]
        );
    }

    #[test]
    fn test_tag_followed_by_whitespace_or_word() {
        let tokens = tokenize("<b> x");
        assert_eq!(tokens.texts(), vec!["<b>", " ", "x"]);

        let tokens = tokenize("<b>x");
        assert_eq!(tokens.texts(), vec!["<b>", "x"]);

        let tokens = tokenize("<b>.x");
        assert_eq!(tokens.texts(), vec!["<b>", ".", "x"]);

        let tokens = tokenize("<b><i>");
        assert_eq!(tokens.texts(), vec!["<b>", "<i>"]);
    }

    #[test]
    fn test_whitespace_collapsing() {
        let tokens = tokenize("a \t\n\u{a0} b");
        assert_eq!(tokens.texts(), vec!["a", " ", "b"]);
        assert_eq!(tokens[1].start_offset, 1);
        assert_eq!(tokens[1].end_offset, 1 + " \t\n\u{a0} ".len());
    }

    #[test]
    fn test_keep_new_lines() {
        let config = DiffConfig::default().with_keep_new_lines(true);
        let tokens = HtmlTokenizer::from_config(&config)
            .tokenize("a\n\n b</p>\n")
            .unwrap();
        assert_eq!(tokens.texts(), vec!["a", "\n\n ", "b", "</p>", "\n"]);
    }

    #[test]
    fn test_unterminated_tag_consumes_rest() {
        let tokens = tokenize("x <a href=\"y\" <b>z");
        assert_eq!(tokens.texts(), vec!["x", " ", "<a href=\"y\" <b>", "z"]);

        let tokens = tokenize("x <a href");
        assert_eq!(tokens.texts(), vec!["x", " ", "<a href"]);
        assert_eq!(tokens[2].kind, TokenKind::Tag);
    }

    #[test]
    fn test_multibyte_words() {
        let tokens = tokenize("caf\u{e9} \u{65e5}\u{672c}\u{8a9e}");
        assert_eq!(tokens.texts(), vec!["café", " ", "日本語"]);
        assert_eq!(tokens[2].start_offset, "café ".len());
    }

    #[test]
    fn test_grapheme_granularity_keeps_marks() {
        let input = "cafe\u{301} ok";
        let codepoint = tokenize(input);
        assert_eq!(codepoint.texts(), vec!["cafe", "\u{301}", " ", "ok"]);

        let config = DiffConfig::default().with_granularity(Granularity::Grapheme);
        let grapheme = HtmlTokenizer::from_config(&config).tokenize(input).unwrap();
        assert_eq!(grapheme.texts(), vec!["cafe\u{301}", " ", "ok"]);
    }

    #[test]
    fn test_grapheme_granularity_with_marked_delimiters() {
        let config = DiffConfig::default().with_granularity(Granularity::Grapheme);
        let tokenizer = HtmlTokenizer::from_config(&config);

        let input = "a<\u{301}b>\u{301}c</b> d";
        let tokens = tokenizer.tokenize(input).unwrap();
        assert_eq!(
            tokens.texts(),
            vec!["a", "<\u{301}b>", "\u{301}", "c", "</b>", " ", "d"]
        );
        assert_eq!(tokens[1].kind, TokenKind::Tag);
        assert_eq!(tokens[2].kind, TokenKind::Punctuation);
        assert_eq!(tokens.source_text(input).as_deref(), Some(input));
    }

    #[test]
    fn test_only_letters_and_ascii_digits_form_words() {
        // Letter numbers and spacing vowel signs are not letters.
        let tokens = tokenize("a\u{216b}b");
        assert_eq!(tokens.texts(), vec!["a", "\u{216b}", "b"]);
        assert_eq!(tokens[1].kind, TokenKind::Punctuation);

        let tokens = tokenize("\u{915}\u{947}");
        assert_eq!(tokens.texts(), vec!["\u{915}", "\u{947}"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_source_spans_rebuild_input() {
        let input = "<div class=\"a\">  Hi,\tthere (friend).</div>\r\n<br>";
        let tokens = tokenize(input);
        assert_eq!(tokens.source_text(input).as_deref(), Some(input));
    }
}
