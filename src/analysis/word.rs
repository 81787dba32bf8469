//! Word-continuation rules.
//!
//! These decide whether a unit extends the word being accumulated or starts
//! a new token. Letters and ASCII digits always belong to words. Special-case
//! characters (by default `. , ( ) '`) only bind into a word when a word unit
//! follows them, which keeps `don't` and `3.14` whole while `stop.` still
//! splits into `stop` and `.`.

use std::collections::BTreeSet;

use unicode_categories::UnicodeCategories;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::grapheme::Granularity;

/// Special-case joining rules for one tokenization run.
#[derive(Clone, Debug, Default)]
pub struct WordRules {
    special_case_chars: BTreeSet<char>,
    granularity: Granularity,
}

impl WordRules {
    /// Create rules from a set of special-case characters.
    pub fn new(special_case_chars: BTreeSet<char>, granularity: Granularity) -> Self {
        WordRules {
            special_case_chars,
            granularity,
        }
    }

    /// The configured special-case characters.
    pub fn special_case_chars(&self) -> &BTreeSet<char> {
        &self.special_case_chars
    }

    /// Whether `unit` is exactly one special-case character.
    pub fn is_special_case(&self, unit: &str) -> bool {
        let mut chars = unit.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.special_case_chars.contains(&c),
            _ => false,
        }
    }

    /// Whether `text` is non-empty and made only of word units.
    pub fn is_alphanumeric(&self, text: &str) -> bool {
        let mut units = self.units(text).peekable();
        units.peek().is_some() && units.all(is_word_unit)
    }

    /// Whether `text` is a word once special-case characters are removed.
    ///
    /// A string consisting only of special-case characters is not a word.
    pub fn is_part_of_word(&self, text: &str) -> bool {
        let mut remaining = self
            .units(text)
            .filter(|unit| !self.is_special_case(unit))
            .peekable();
        remaining.peek().is_some() && remaining.all(is_word_unit)
    }

    /// Decide whether `unit` extends `current`, given the unit after it.
    ///
    /// `unit` is never whitespace or `<`; the tokenizer handles those first.
    pub fn continues_word(&self, current: &str, unit: &str, next: Option<&str>) -> bool {
        (is_word_unit(unit) && (current.is_empty() || self.is_part_of_word(current)))
            || (self.is_special_case(unit) && next.is_some_and(|n| self.is_part_of_word(n)))
    }

    fn units<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match self.granularity {
            Granularity::Codepoint => Box::new(
                text.char_indices()
                    .map(move |(i, c)| &text[i..i + c.len_utf8()]),
            ),
            Granularity::Grapheme => Box::new(text.graphemes(true)),
        }
    }
}

/// A unit is a word unit when its base character is a letter (general
/// category L) or an ASCII digit.
///
/// Other numerals (letter numbers, superscripts, non-ASCII digits) and marks
/// count as punctuation.
pub fn is_word_unit(unit: &str) -> bool {
    unit.chars()
        .next()
        .is_some_and(|c| c.is_letter() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SPECIAL_CASE_CHARS;

    fn default_rules() -> WordRules {
        WordRules::new(
            DEFAULT_SPECIAL_CASE_CHARS.iter().copied().collect(),
            Granularity::Codepoint,
        )
    }

    #[test]
    fn test_word_units() {
        assert!(is_word_unit("a"));
        assert!(is_word_unit("\u{e9}"));
        assert!(is_word_unit("7"));
        assert!(is_word_unit("\u{65e5}"));
        assert!(!is_word_unit("\u{663}"));
        assert!(!is_word_unit("\u{216b}"));
        assert!(!is_word_unit("\u{947}"));
        assert!(is_word_unit("\u{915}\u{947}"));
        assert!(!is_word_unit("-"));
        assert!(!is_word_unit(""));
    }

    #[test]
    fn test_is_part_of_word() {
        let rules = default_rules();
        assert!(rules.is_part_of_word("don'"));
        assert!(rules.is_part_of_word("3.14"));
        assert!(!rules.is_part_of_word("'"));
        assert!(!rules.is_part_of_word(""));
        assert!(!rules.is_part_of_word("a-b"));
        assert!(!rules.is_alphanumeric("don't"));
        assert!(rules.is_alphanumeric("dont"));
    }

    #[test]
    fn test_continues_word() {
        let rules = default_rules();
        assert!(rules.continues_word("", "d", Some("o")));
        assert!(rules.continues_word("don", "'", Some("t")));
        assert!(rules.continues_word("don'", "t", None));
        assert!(!rules.continues_word("stop", ".", None));
        assert!(!rules.continues_word("stop", ".", Some(" ")));
        assert!(!rules.continues_word("stop", "!", Some("x")));
        assert!(!rules.continues_word("'", "t", Some("i")));
    }

    #[test]
    fn test_narrow_special_chars() {
        let rules = WordRules::new(BTreeSet::from(['.']), Granularity::Codepoint);
        assert!(!rules.continues_word("don", "'", Some("t")));
        assert!(rules.continues_word("3", ".", Some("1")));
        assert!(rules.is_part_of_word("dont"));
    }

    #[test]
    fn test_grapheme_granularity() {
        let decomposed = "cafe\u{301}";
        let codepoint = default_rules();
        assert!(!codepoint.is_part_of_word(decomposed));

        let grapheme = WordRules::new(
            DEFAULT_SPECIAL_CASE_CHARS.iter().copied().collect(),
            Granularity::Grapheme,
        );
        assert!(grapheme.is_part_of_word(decomposed));
    }
}
