//! Optional HTML sanitization before tokenization.
//!
//! A sanitizer cleans raw HTML (comments, scripts, event handlers, tags
//! outside an allow-list) before the tokenizer sees it. It runs at most once
//! per document per session and only when the configuration enables it. If
//! it fails, the session fails: tokenization never proceeds on unsanitized
//! input once sanitization was requested.
//!
//! # Available Sanitizers
//!
//! - [`pattern::PatternSanitizer`] - Regex-driven cleaner configured by
//!   [`SanitizerConfig`]
//!
//! Callers may plug in any other implementation of [`Sanitizer`] through
//! [`SanitizerAdapter::with_sanitizer`].

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DiffConfig;
use crate::error::Result;

pub mod pattern;

pub use pattern::PatternSanitizer;

/// Trait for HTML sanitizers run before tokenization.
pub trait Sanitizer: Send + Sync {
    /// Return a cleaned copy of `html`.
    fn sanitize(&self, html: &str) -> Result<String>;

    /// Get the name of this sanitizer (for debugging and logging).
    fn name(&self) -> &'static str;
}

/// Settings for the built-in [`PatternSanitizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Remove `<!-- ... -->` comments.
    pub strip_comments: bool,

    /// Elements removed together with their content.
    pub strip_elements: Vec<String>,

    /// Remove inline `on*` event-handler attributes.
    pub strip_event_attributes: bool,

    /// If set, only these tags keep their markup; other tags are removed
    /// while their text content stays.
    pub allowed_tags: Option<Vec<String>>,

    /// Additional regular expressions whose matches are removed.
    pub extra_patterns: Vec<String>,

    /// Directory where the compiled definition is persisted.
    pub cache_location: Option<PathBuf>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            strip_comments: true,
            strip_elements: vec!["script".to_string(), "style".to_string()],
            strip_event_attributes: true,
            allowed_tags: None,
            extra_patterns: Vec::new(),
            cache_location: None,
        }
    }
}

impl SanitizerConfig {
    /// Set the definition cache directory.
    pub fn with_cache_location<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_location = Some(path.into());
        self
    }

    /// Restrict markup to the given tags.
    pub fn with_allowed_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Add a removal pattern.
    pub fn with_extra_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.extra_patterns.push(pattern.into());
        self
    }
}

/// Runs the configured sanitizer, or passes input through when disabled.
#[derive(Clone, Default)]
pub struct SanitizerAdapter {
    sanitizer: Option<Arc<dyn Sanitizer>>,
}

impl SanitizerAdapter {
    /// An adapter that returns input unchanged.
    pub fn disabled() -> Self {
        SanitizerAdapter { sanitizer: None }
    }

    /// An adapter that always runs `sanitizer`.
    pub fn with_sanitizer(sanitizer: Arc<dyn Sanitizer>) -> Self {
        SanitizerAdapter {
            sanitizer: Some(sanitizer),
        }
    }

    /// Build the adapter described by `config`.
    ///
    /// Returns a disabled adapter unless `config.sanitize` is set; otherwise
    /// builds a [`PatternSanitizer`], which fails on invalid settings.
    pub fn from_config(config: &DiffConfig) -> Result<Self> {
        if !config.sanitize {
            return Ok(Self::disabled());
        }
        let sanitizer = PatternSanitizer::new(config.sanitizer_config())?;
        Ok(Self::with_sanitizer(Arc::new(sanitizer)))
    }

    /// Whether a sanitizer will run.
    pub fn is_enabled(&self) -> bool {
        self.sanitizer.is_some()
    }

    /// Sanitize `html`, or return it unchanged when disabled.
    pub fn sanitize(&self, html: &str) -> Result<String> {
        match &self.sanitizer {
            Some(sanitizer) => {
                let cleaned = sanitizer.sanitize(html)?;
                debug!(
                    sanitizer = sanitizer.name(),
                    input_len = html.len(),
                    output_len = cleaned.len(),
                    "sanitized document"
                );
                Ok(cleaned)
            }
            None => Ok(html.to_string()),
        }
    }
}

impl std::fmt::Debug for SanitizerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SanitizerAdapter")
            .field("sanitizer", &self.sanitizer.as_ref().map(|s| s.name()))
            .finish()
    }
}
