//! Text analysis for HTML diffing.
//!
//! This module turns decoded HTML into token sequences: encodings decode raw
//! input, the grapheme splitter yields comparison units, word rules decide how
//! punctuation binds into words, and the tokenizer drives the state machine.

pub mod encoding;
pub mod grapheme;
pub mod token;
pub mod tokenizer;
pub mod word;
