//! Diff configuration.
//!
//! [`DiffConfig`] holds every option that changes how documents are
//! tokenized and how the downstream diff engine treats the tokens. A session
//! validates its configuration before tokenizing anything, and any later
//! change discards the token sequences built under the old settings.
//!
//! # Examples
//!
//! ```
//! use htmldiff_tokens::config::DiffConfig;
//!
//! let config = DiffConfig::default()
//!     .with_keep_new_lines(true)
//!     .with_match_threshold(60);
//! assert!(config.validate().is_ok());
//! assert!(config.is_special_case_char('\''));
//! assert!(config.is_special_case_tag("STRONG"));
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analysis::encoding::TextEncoding;
use crate::analysis::grapheme::Granularity;
use crate::analysis::word::is_word_unit;
use crate::cache::provider::ProviderHandle;
use crate::error::{HtmlDiffError, Result};
use crate::sanitize::SanitizerConfig;

/// Characters that may bind into an adjacent word.
pub const DEFAULT_SPECIAL_CASE_CHARS: [char; 5] = ['.', ',', '(', ')', '\''];

/// Inline tags the diff engine may group changes across.
pub const DEFAULT_SPECIAL_CASE_TAGS: [&str; 11] = [
    "strong", "b", "i", "big", "small", "u", "sub", "sup", "strike", "s", "p",
];

/// Default minimum match percentage for the diff engine.
pub const DEFAULT_MATCH_THRESHOLD: u32 = 80;

/// Default encoding label.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Options shared by tokenization and the downstream diff engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Encoding label applied to both documents.
    pub encoding: String,

    /// Punctuation allowed to join into adjacent words.
    pub special_case_chars: BTreeSet<char>,

    /// Inline tags eligible for diff grouping (stored lowercase).
    pub special_case_tags: BTreeSet<String>,

    /// Keep whitespace runs verbatim instead of collapsing them to one space.
    pub keep_new_lines: bool,

    /// Minimum contiguous-match percentage the diff engine treats as significant.
    pub match_threshold: u32,

    /// Whether the diff engine groups adjacent changes.
    pub group_diffs: bool,

    /// Size of one comparison unit.
    pub granularity: Granularity,

    /// Run the sanitizer before tokenizing.
    pub sanitize: bool,

    /// Sanitizer settings; `None` uses [`SanitizerConfig::default`].
    pub sanitizer: Option<SanitizerConfig>,

    /// Cache provider scoping memoized diff results.
    #[serde(skip)]
    pub cache_provider: Option<ProviderHandle>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            special_case_chars: DEFAULT_SPECIAL_CASE_CHARS.into_iter().collect(),
            special_case_tags: DEFAULT_SPECIAL_CASE_TAGS
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            keep_new_lines: false,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            group_diffs: true,
            granularity: Granularity::Codepoint,
            sanitize: false,
            sanitizer: None,
            cache_provider: None,
        }
    }
}

impl DiffConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DiffConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON. The cache provider is not included.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Hex SHA-256 of the serialized settings.
    ///
    /// Two configurations that tokenize and diff identically share a digest;
    /// the cache provider is not part of it.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    /// Set the encoding label.
    pub fn with_encoding<S: Into<String>>(mut self, encoding: S) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Replace the special-case characters.
    pub fn with_special_case_chars<I: IntoIterator<Item = char>>(mut self, chars: I) -> Self {
        self.set_special_case_chars(chars);
        self
    }

    /// Replace the special-case tags.
    pub fn with_special_case_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_special_case_tags(tags);
        self
    }

    /// Set whether whitespace is kept verbatim.
    pub fn with_keep_new_lines(mut self, keep: bool) -> Self {
        self.keep_new_lines = keep;
        self
    }

    /// Set the match threshold.
    pub fn with_match_threshold(mut self, threshold: u32) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Set whether diffs are grouped.
    pub fn with_group_diffs(mut self, group: bool) -> Self {
        self.group_diffs = group;
        self
    }

    /// Set the unit granularity.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Enable sanitization with the given settings.
    pub fn with_sanitizer(mut self, sanitizer: SanitizerConfig) -> Self {
        self.sanitize = true;
        self.sanitizer = Some(sanitizer);
        self
    }

    /// Enable or disable sanitization.
    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    /// Attach a cache provider.
    pub fn with_cache_provider(mut self, provider: ProviderHandle) -> Self {
        self.cache_provider = Some(provider);
        self
    }

    /// Replace the special-case characters.
    pub fn set_special_case_chars<I: IntoIterator<Item = char>>(&mut self, chars: I) {
        self.special_case_chars = chars.into_iter().collect();
    }

    /// Add a special-case character.
    pub fn add_special_case_char(&mut self, c: char) {
        self.special_case_chars.insert(c);
    }

    /// Remove a special-case character.
    pub fn remove_special_case_char(&mut self, c: char) {
        self.special_case_chars.remove(&c);
    }

    /// Whether `c` is a special-case character.
    pub fn is_special_case_char(&self, c: char) -> bool {
        self.special_case_chars.contains(&c)
    }

    /// Replace the special-case tags.
    pub fn set_special_case_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.special_case_tags = tags.into_iter().map(|tag| normalize_tag(tag.as_ref())).collect();
    }

    /// Add a special-case tag.
    pub fn add_special_case_tag(&mut self, tag: &str) {
        self.special_case_tags.insert(normalize_tag(tag));
    }

    /// Remove a special-case tag.
    pub fn remove_special_case_tag(&mut self, tag: &str) {
        self.special_case_tags.remove(&normalize_tag(tag));
    }

    /// Whether `tag` names a special-case tag (case-insensitive).
    pub fn is_special_case_tag(&self, tag: &str) -> bool {
        self.special_case_tags.contains(&normalize_tag(tag))
    }

    /// Whether a cache provider is configured.
    pub fn has_cache_provider(&self) -> bool {
        self.cache_provider.is_some()
    }

    /// Resolve the encoding label.
    pub fn text_encoding(&self) -> Result<TextEncoding> {
        TextEncoding::from_label(&self.encoding)
    }

    /// Sanitizer settings in effect (explicit or default).
    pub fn sanitizer_config(&self) -> SanitizerConfig {
        self.sanitizer.clone().unwrap_or_default()
    }

    /// Reject contradictory settings before any tokenization.
    pub fn validate(&self) -> Result<()> {
        self.text_encoding()?;

        if self.special_case_chars.is_empty() {
            return Err(HtmlDiffError::configuration(
                "at least one special-case character is required",
            ));
        }
        if self.special_case_tags.is_empty() {
            return Err(HtmlDiffError::configuration(
                "at least one special-case tag is required",
            ));
        }

        for &c in &self.special_case_chars {
            if c.is_whitespace() || c == '<' || c == '>' {
                return Err(HtmlDiffError::configuration(format!(
                    "special-case character {c:?} would split tags or whitespace"
                )));
            }
            if is_word_unit(c.encode_utf8(&mut [0; 4])) {
                return Err(HtmlDiffError::configuration(format!(
                    "special-case character {c:?} is already a word character"
                )));
            }
        }

        for tag in &self.special_case_tags {
            if tag.is_empty() {
                return Err(HtmlDiffError::configuration(
                    "special-case tag names must not be empty",
                ));
            }
            if !tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':')
            {
                return Err(HtmlDiffError::configuration(format!(
                    "special-case tag '{tag}' is not a bare element name"
                )));
            }
        }

        if self.match_threshold > 100 {
            return Err(HtmlDiffError::configuration(format!(
                "match threshold {} is above 100",
                self.match_threshold
            )));
        }

        Ok(())
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiffConfig::default();
        assert_eq!(config.encoding, "UTF-8");
        assert_eq!(config.special_case_chars.len(), 5);
        assert_eq!(config.special_case_tags.len(), 11);
        assert!(!config.keep_new_lines);
        assert_eq!(config.match_threshold, 80);
        assert!(config.group_diffs);
        assert!(!config.sanitize);
        assert!(!config.has_cache_provider());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_special_case_mutation() {
        let mut config = DiffConfig::default();
        config.add_special_case_char('-');
        assert!(config.is_special_case_char('-'));
        config.remove_special_case_char('\'');
        assert!(!config.is_special_case_char('\''));

        config.add_special_case_tag(" EM ");
        assert!(config.is_special_case_tag("em"));
        config.remove_special_case_tag("P");
        assert!(!config.is_special_case_tag("p"));

        config.set_special_case_tags(["em"]);
        assert_eq!(config.special_case_tags.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_special_case_sets_are_rejected() {
        let config = DiffConfig::default().with_special_case_chars(Vec::<char>::new());
        assert!(matches!(
            config.validate(),
            Err(HtmlDiffError::Configuration(_))
        ));

        let config = DiffConfig::default().with_special_case_tags(Vec::<String>::new());
        assert!(matches!(
            config.validate(),
            Err(HtmlDiffError::Configuration(_))
        ));

        let mut config = DiffConfig::default().with_special_case_chars(['.']);
        config.remove_special_case_char('.');
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_failures() {
        let config = DiffConfig::default().with_encoding("klingon");
        assert!(matches!(
            config.validate(),
            Err(HtmlDiffError::Configuration(_))
        ));

        let config = DiffConfig::default().with_special_case_chars(['<']);
        assert!(config.validate().is_err());

        let config = DiffConfig::default().with_special_case_chars([' ']);
        assert!(config.validate().is_err());

        let config = DiffConfig::default().with_special_case_chars(['a']);
        assert!(config.validate().is_err());

        let config = DiffConfig::default().with_special_case_tags(["b", ""]);
        assert!(config.validate().is_err());

        let config = DiffConfig::default().with_special_case_tags(["<b>"]);
        assert!(config.validate().is_err());

        let config = DiffConfig::default().with_match_threshold(101);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = DiffConfig::default()
            .with_keep_new_lines(true)
            .with_special_case_chars(['.', '-']);
        let json = config.to_json().unwrap();
        let parsed = DiffConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_digest_follows_settings() {
        let base = DiffConfig::default();
        let digest = base.digest().unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, DiffConfig::default().digest().unwrap());

        let provider = ProviderHandle::register(crate::cache::MemoryCacheProvider::new());
        assert_eq!(
            base.clone().with_cache_provider(provider).digest().unwrap(),
            digest
        );
        assert_ne!(base.clone().with_keep_new_lines(true).digest().unwrap(), digest);
        assert_ne!(base.with_match_threshold(50).digest().unwrap(), digest);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed = DiffConfig::from_json(r#"{ "keep_new_lines": true }"#).unwrap();
        assert!(parsed.keep_new_lines);
        assert_eq!(parsed.match_threshold, DEFAULT_MATCH_THRESHOLD);

        let err = DiffConfig::from_json(r#"{ "match_threshold": 500 }"#).unwrap_err();
        assert!(matches!(err, HtmlDiffError::Configuration(_)));
    }
}
