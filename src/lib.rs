//! # htmldiff-tokens
//!
//! The tokenization front-end of an HTML-aware text differ.
//!
//! ## Features
//!
//! - Tag, word, whitespace and punctuation tokens with byte offsets
//! - Configurable special-case characters that bind into words
//! - Codepoint or grapheme-cluster units
//! - Optional regex-driven sanitization before tokenizing
//! - Diff caches scoped by cache-provider identity
//! - Sessions that hand both token sequences to a pluggable diff engine

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod sanitize;
pub mod session;

pub mod prelude {
    pub use crate::analysis::token::{Token, TokenKind, TokenSequence};
    pub use crate::analysis::tokenizer::Tokenizer;
    pub use crate::analysis::tokenizer::html::HtmlTokenizer;
    pub use crate::cache::{CacheProvider, MemoryCacheProvider, ProviderHandle};
    pub use crate::config::DiffConfig;
    pub use crate::error::{HtmlDiffError, Result};
    pub use crate::sanitize::{PatternSanitizer, Sanitizer, SanitizerConfig};
    pub use crate::session::{DiffEngine, DiffInput, DiffSession};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
