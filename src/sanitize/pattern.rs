//! Regex-driven HTML sanitizer.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{Sanitizer, SanitizerConfig};
use crate::error::{HtmlDiffError, Result};

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9:-]*)([^>]*)>").expect("valid tag pattern")
});

static EVENT_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("valid event attribute pattern")
});

/// A sanitizer built from a [`SanitizerConfig`].
///
/// # Examples
///
/// ```
/// use htmldiff_tokens::sanitize::{PatternSanitizer, Sanitizer, SanitizerConfig};
///
/// let sanitizer = PatternSanitizer::new(SanitizerConfig::default()).unwrap();
/// let html = r#"<p onclick="evil()">Hi<!-- note --></p><script>x()</script>"#;
/// assert_eq!(sanitizer.sanitize(html).unwrap(), "<p>Hi</p>");
/// ```
#[derive(Debug)]
pub struct PatternSanitizer {
    config: SanitizerConfig,
    elements: Vec<Regex>,
    extra: Vec<Regex>,
    allowed_tags: Option<BTreeSet<String>>,
    definition_path: Option<PathBuf>,
}

impl PatternSanitizer {
    /// Compile the configuration.
    ///
    /// Fails with a sanitization error on malformed element names or
    /// patterns, or when the definition cache cannot be written.
    pub fn new(config: SanitizerConfig) -> Result<Self> {
        let mut elements = Vec::with_capacity(config.strip_elements.len() * 2);
        for name in &config.strip_elements {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(HtmlDiffError::sanitization(format!(
                    "invalid element name '{name}'"
                )));
            }
            let name = regex::escape(name);
            elements.push(compile(&format!(r"(?is)<{name}\b[^>]*>.*?</{name}\s*>"))?);
            // Unclosed or stray tags of the same element.
            elements.push(compile(&format!(r"(?i)</?{name}\b[^>]*>"))?);
        }

        let extra = config
            .extra_patterns
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>>>()?;

        let allowed_tags = config.allowed_tags.as_ref().map(|tags| {
            tags.iter()
                .map(|tag| tag.trim().to_ascii_lowercase())
                .collect::<BTreeSet<_>>()
        });

        let definition_path = match &config.cache_location {
            Some(dir) => Some(write_definition(dir, &config)?),
            None => None,
        };

        Ok(PatternSanitizer {
            config,
            elements,
            extra,
            allowed_tags,
            definition_path,
        })
    }

    /// The configuration this sanitizer was built from.
    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Where the compiled definition was persisted, if anywhere.
    pub fn definition_path(&self) -> Option<&Path> {
        self.definition_path.as_deref()
    }

    fn clean_tag(&self, caps: &Captures) -> String {
        let name = caps[2].to_ascii_lowercase();
        if let Some(allowed) = &self.allowed_tags
            && !allowed.contains(&name)
        {
            return String::new();
        }

        if self.config.strip_event_attributes {
            let attributes = EVENT_ATTRIBUTE.replace_all(&caps[3], "");
            format!("<{}{}{}>", &caps[1], &caps[2], attributes)
        } else {
            caps[0].to_string()
        }
    }
}

impl Sanitizer for PatternSanitizer {
    fn sanitize(&self, html: &str) -> Result<String> {
        let mut text = html.to_string();

        if self.config.strip_comments {
            text = COMMENT.replace_all(&text, "").into_owned();
        }
        for pattern in self.elements.iter().chain(&self.extra) {
            text = pattern.replace_all(&text, "").into_owned();
        }
        if self.config.strip_event_attributes || self.allowed_tags.is_some() {
            text = TAG
                .replace_all(&text, |caps: &Captures| self.clean_tag(caps))
                .into_owned();
        }

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| HtmlDiffError::sanitization(format!("invalid pattern '{pattern}': {e}")))
}

fn write_definition(dir: &Path, config: &SanitizerConfig) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(config)?;
    let digest = hex::encode(Sha256::digest(json.as_bytes()));
    let path = dir.join(format!("pattern-{}.json", &digest[..16]));

    if path.exists() {
        return Ok(path);
    }

    fs::create_dir_all(dir).map_err(|e| {
        HtmlDiffError::sanitization(format!(
            "cannot create cache directory {}: {e}",
            dir.display()
        ))
    })?;
    fs::write(&path, json).map_err(|e| {
        HtmlDiffError::sanitization(format!("cannot write {}: {e}", path.display()))
    })?;
    debug!(path = %path.display(), "persisted sanitizer definition");

    Ok(path)
}
