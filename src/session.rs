//! Diff sessions.
//!
//! A [`DiffSession`] holds one old/new document pair from input to finished
//! diff. It validates the configuration, runs the sanitizer at most once per
//! document, tokenizes both documents, coordinates per-provider caches, and
//! hands the token sequences to a [`DiffEngine`].
//!
//! # Examples
//!
//! ```
//! use htmldiff_tokens::config::DiffConfig;
//! use htmldiff_tokens::session::DiffSession;
//!
//! let mut session = DiffSession::new(
//!     "<p>Hello world</p>",
//!     "<p>Hello there world</p>",
//!     DiffConfig::default(),
//! )
//! .unwrap();
//!
//! let (old, new) = session.tokens().unwrap();
//! assert_eq!(old.texts(), ["<p>", "Hello", " ", "world", "</p>"]);
//! assert_eq!(new.len(), old.len() + 2);
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{Level, debug, info, warn};
use uuid::Uuid;

use crate::analysis::encoding::TextEncoding;
use crate::analysis::token::TokenSequence;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::html::HtmlTokenizer;
use crate::cache::{CacheCoordinator, CacheLookup, Generation, ProviderHandle};
use crate::config::DiffConfig;
use crate::error::{HtmlDiffError, Result};
use crate::sanitize::{Sanitizer, SanitizerAdapter};

/// Everything a diff engine receives for one run.
#[derive(Debug, Clone, Copy)]
pub struct DiffInput<'a> {
    /// Tokens of the old document.
    pub old: &'a TokenSequence,

    /// Tokens of the new document.
    pub new: &'a TokenSequence,

    /// Configuration in effect (match threshold, grouping, special-case tags).
    pub config: &'a DiffConfig,

    /// Cache for the configured provider, if any.
    pub cache: Option<&'a CacheLookup>,
}

impl DiffInput<'_> {
    /// Minimum contiguous-match percentage.
    pub fn match_threshold(&self) -> u32 {
        self.config.match_threshold
    }

    /// Whether adjacent changes should be grouped.
    pub fn group_diffs(&self) -> bool {
        self.config.group_diffs
    }
}

/// Downstream diff algorithm consuming two token sequences.
pub trait DiffEngine {
    /// Produce the diff content for `input`.
    fn diff(&self, input: &DiffInput<'_>) -> Result<String>;
}

impl<F> DiffEngine for F
where
    F: Fn(&DiffInput<'_>) -> Result<String>,
{
    fn diff(&self, input: &DiffInput<'_>) -> Result<String> {
        self(input)
    }
}

/// One old/new document pair and the state derived from it.
pub struct DiffSession {
    id: Uuid,
    config: DiffConfig,
    old_html: String,
    new_html: String,
    prepared: bool,
    old_tokens: Option<TokenSequence>,
    new_tokens: Option<TokenSequence>,
    custom_tokens: bool,
    sanitizer: Option<SanitizerAdapter>,
    caches: CacheCoordinator,
    content: Option<String>,
}

impl DiffSession {
    /// Create a session over two strings.
    ///
    /// The configuration is validated and both texts are checked against the
    /// configured encoding before anything else happens.
    pub fn new<O, N>(old_html: O, new_html: N, config: DiffConfig) -> Result<Self>
    where
        O: Into<String>,
        N: Into<String>,
    {
        config.validate()?;
        let encoding = config.text_encoding()?;
        let old_html = old_html.into();
        let new_html = new_html.into();
        encoding.check(&old_html)?;
        encoding.check(&new_html)?;

        Ok(Self::build(old_html, new_html, config))
    }

    /// Create a session over two raw byte buffers in the configured encoding.
    pub fn from_bytes(old_html: &[u8], new_html: &[u8], config: DiffConfig) -> Result<Self> {
        config.validate()?;
        let encoding = config.text_encoding()?;
        let old_html = encoding.decode(old_html)?;
        let new_html = encoding.decode(new_html)?;

        Ok(Self::build(old_html, new_html, config))
    }

    fn build(old_html: String, new_html: String, config: DiffConfig) -> Self {
        let id = Uuid::new_v4();
        debug!(
            session_id = %id,
            old_len = old_html.len(),
            new_len = new_html.len(),
            "session_created"
        );
        DiffSession {
            id,
            config,
            old_html,
            new_html,
            prepared: false,
            old_tokens: None,
            new_tokens: None,
            custom_tokens: false,
            sanitizer: None,
            caches: CacheCoordinator::new(),
            content: None,
        }
    }

    /// Unique id of this session, used in log spans.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Encoding the inputs were validated against.
    pub fn encoding(&self) -> Result<TextEncoding> {
        self.config.text_encoding()
    }

    /// The configuration in effect.
    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// Any token sequences built under the previous configuration are
    /// discarded. Once the inputs have been prepared, changes to the encoding
    /// or the sanitizer settings are rejected since sanitization runs at
    /// most once per input.
    pub fn set_config(&mut self, config: DiffConfig) -> Result<()> {
        config.validate()?;

        if self.prepared {
            if config.encoding != self.config.encoding {
                return Err(HtmlDiffError::configuration(
                    "encoding cannot change after the inputs were prepared",
                ));
            }
            if config.sanitize != self.config.sanitize
                || config.sanitizer != self.config.sanitizer
            {
                return Err(HtmlDiffError::configuration(
                    "sanitizer settings cannot change after the inputs were prepared",
                ));
            }
        } else if config.encoding != self.config.encoding {
            let encoding = config.text_encoding()?;
            encoding.check(&self.old_html)?;
            encoding.check(&self.new_html)?;
        }

        if config != self.config {
            self.config = config;
            self.invalidate_tokens();
        }
        Ok(())
    }

    /// Apply `f` to a copy of the configuration and install the result.
    pub fn update_config<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut DiffConfig),
    {
        let mut config = self.config.clone();
        f(&mut config);
        self.set_config(config)
    }

    /// Add a special-case character.
    pub fn add_special_case_char(&mut self, c: char) -> Result<()> {
        self.update_config(|config| config.add_special_case_char(c))
    }

    /// Remove a special-case character.
    pub fn remove_special_case_char(&mut self, c: char) -> Result<()> {
        self.update_config(|config| config.remove_special_case_char(c))
    }

    /// Replace the special-case characters.
    pub fn set_special_case_chars<I: IntoIterator<Item = char>>(&mut self, chars: I) -> Result<()> {
        self.update_config(|config| config.set_special_case_chars(chars))
    }

    /// Add a special-case tag.
    pub fn add_special_case_tag(&mut self, tag: &str) -> Result<()> {
        self.update_config(|config| config.add_special_case_tag(tag))
    }

    /// Remove a special-case tag.
    pub fn remove_special_case_tag(&mut self, tag: &str) -> Result<()> {
        self.update_config(|config| config.remove_special_case_tag(tag))
    }

    /// Replace the special-case tags.
    pub fn set_special_case_tags<I, S>(&mut self, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.update_config(|config| config.set_special_case_tags(tags))
    }

    /// Set whether whitespace is kept verbatim.
    pub fn set_keep_new_lines(&mut self, keep: bool) -> Result<()> {
        self.update_config(|config| config.keep_new_lines = keep)
    }

    /// Set the match threshold.
    pub fn set_match_threshold(&mut self, threshold: u32) -> Result<()> {
        self.update_config(|config| config.match_threshold = threshold)
    }

    /// Set whether diffs are grouped.
    pub fn set_group_diffs(&mut self, group: bool) -> Result<()> {
        self.update_config(|config| config.group_diffs = group)
    }

    /// Attach or detach the cache provider.
    pub fn set_cache_provider(&mut self, provider: Option<ProviderHandle>) -> Result<()> {
        self.update_config(|config| config.cache_provider = provider)
    }

    /// Use `sanitizer` instead of the one the configuration describes.
    ///
    /// The override always runs, regardless of `config.sanitize`.
    pub fn set_sanitizer(&mut self, sanitizer: Arc<dyn Sanitizer>) -> Result<()> {
        if self.prepared {
            return Err(HtmlDiffError::configuration(
                "sanitizer cannot change after the inputs were prepared",
            ));
        }
        self.sanitizer = Some(SanitizerAdapter::with_sanitizer(sanitizer));
        Ok(())
    }

    /// Whether the inputs went through the sanitizer stage.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Run the sanitizer over both inputs, once.
    ///
    /// On failure the session stays unprepared and the inputs are untouched.
    pub fn prepare(&mut self) -> Result<()> {
        if self.prepared {
            return Ok(());
        }

        let adapter = match &self.sanitizer {
            Some(adapter) => adapter.clone(),
            None => SanitizerAdapter::from_config(&self.config)?,
        };

        if adapter.is_enabled() {
            let old_html = adapter.sanitize(&self.old_html)?;
            let new_html = adapter.sanitize(&self.new_html)?;
            self.old_html = old_html;
            self.new_html = new_html;
        }

        self.prepared = true;
        debug!(session_id = %self.id, sanitized = adapter.is_enabled(), "session_prepared");
        Ok(())
    }

    /// Prepare the inputs and tokenize both documents.
    pub fn split_inputs_to_words(&mut self) -> Result<()> {
        self.prepare()?;

        let start = Instant::now();
        let tokenizer = HtmlTokenizer::from_config(&self.config);
        let old_tokens = tokenizer.tokenize(&self.old_html)?;
        let new_tokens = tokenizer.tokenize(&self.new_html)?;

        info!(
            session_id = %self.id,
            tokenizer = tokenizer.name(),
            old_tokens = old_tokens.len(),
            new_tokens = new_tokens.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "tokenized"
        );

        self.set_old_tokens(old_tokens);
        self.set_new_tokens(new_tokens);
        self.custom_tokens = false;
        Ok(())
    }

    /// Replace the old token sequence. Cached results become stale.
    ///
    /// Until the documents are tokenized again, [`DiffSession::run`] neither
    /// reads nor writes provider results, since they are keyed by document
    /// text rather than by tokens.
    pub fn set_old_tokens(&mut self, tokens: TokenSequence) -> Generation {
        self.old_tokens = Some(tokens);
        self.custom_tokens = true;
        self.sequences_replaced()
    }

    /// Replace the new token sequence. Cached results become stale.
    pub fn set_new_tokens(&mut self, tokens: TokenSequence) -> Generation {
        self.new_tokens = Some(tokens);
        self.custom_tokens = true;
        self.sequences_replaced()
    }

    /// Tokens of the old document, if tokenized.
    pub fn old_tokens(&self) -> Option<&TokenSequence> {
        self.old_tokens.as_ref()
    }

    /// Tokens of the new document, if tokenized.
    pub fn new_tokens(&self) -> Option<&TokenSequence> {
        self.new_tokens.as_ref()
    }

    /// Both token sequences, tokenizing first if needed.
    pub fn tokens(&mut self) -> Result<(&TokenSequence, &TokenSequence)> {
        if self.old_tokens.is_none() || self.new_tokens.is_none() {
            self.split_inputs_to_words()?;
        }
        match (&self.old_tokens, &self.new_tokens) {
            (Some(old), Some(new)) => Ok((old, new)),
            _ => Err(HtmlDiffError::other("token sequences are missing")),
        }
    }

    /// The old document, after sanitization once prepared.
    pub fn old_html(&self) -> &str {
        &self.old_html
    }

    /// The new document, after sanitization once prepared.
    pub fn new_html(&self) -> &str {
        &self.new_html
    }

    /// Whether a cache provider is configured.
    pub fn has_cache(&self) -> bool {
        self.config.has_cache_provider()
    }

    /// The cache for the configured provider, or `None` without one.
    pub fn get_cache(&self) -> Option<CacheLookup> {
        self.config
            .cache_provider
            .as_ref()
            .map(|provider| self.caches.get_cache(provider))
    }

    /// The cache coordinator of this session.
    pub fn caches(&self) -> &CacheCoordinator {
        &self.caches
    }

    /// Produce the diff with `engine`, consulting the cache first.
    pub fn run<E: DiffEngine + ?Sized>(&mut self, engine: &E) -> Result<&str> {
        let span = tracing::span!(Level::INFO, "session.run", session_id = %self.id);
        let _guard = span.enter();
        let start = Instant::now();

        match self.run_inner(engine) {
            Ok(cached) => {
                info!(
                    cached,
                    elapsed_micros = start.elapsed().as_micros(),
                    "diff_success"
                );
            }
            Err(err) => {
                warn!(
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros(),
                    "diff_failure"
                );
                return Err(err);
            }
        }

        self.difference()
            .ok_or_else(|| HtmlDiffError::other("diff produced no content"))
    }

    fn run_inner<E: DiffEngine + ?Sized>(&mut self, engine: &E) -> Result<bool> {
        self.prepare()?;
        let digest = self.config.digest()?;

        if !self.custom_tokens
            && let Some(lookup) = self.get_cache()
            && let Some(content) = lookup.cache.fetch(&self.old_html, &self.new_html, &digest)
        {
            self.content = Some(content);
            return Ok(true);
        }

        if self.old_tokens.is_none() || self.new_tokens.is_none() {
            self.split_inputs_to_words()?;
        }
        let lookup = self.get_cache();

        let content = match (&self.old_tokens, &self.new_tokens) {
            (Some(old), Some(new)) => engine.diff(&DiffInput {
                old,
                new,
                config: &self.config,
                cache: lookup.as_ref(),
            })?,
            _ => return Err(HtmlDiffError::other("token sequences are missing")),
        };

        if let Some(lookup) = &lookup
            && !self.custom_tokens
        {
            lookup
                .cache
                .save(&self.old_html, &self.new_html, &digest, &content)?;
        }
        self.content = Some(content);
        Ok(false)
    }

    /// The last diff produced by [`DiffSession::run`].
    pub fn difference(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Forget the last diff.
    pub fn clear_content(&mut self) {
        self.content = None;
    }

    fn sequences_replaced(&mut self) -> Generation {
        self.content = None;
        self.caches.advance_generation()
    }

    fn invalidate_tokens(&mut self) {
        let had_old = self.old_tokens.take().is_some();
        let had_new = self.new_tokens.take().is_some();
        if had_old || had_new {
            self.caches.advance_generation();
        }
        self.custom_tokens = false;
        self.content = None;
    }
}

impl std::fmt::Debug for DiffSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffSession")
            .field("id", &self.id)
            .field("prepared", &self.prepared)
            .field("old_tokens", &self.old_tokens.as_ref().map(TokenSequence::len))
            .field("new_tokens", &self.new_tokens.as_ref().map(TokenSequence::len))
            .field("custom_tokens", &self.custom_tokens)
            .field("sanitizer", &self.sanitizer)
            .field("generation", &self.caches.generation())
            .finish()
    }
}
