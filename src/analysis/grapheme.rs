//! Splitting text into atomic display units.
//!
//! The tokenizer never looks at bytes directly. It consumes the units
//! produced here, each a `&str` slice of the input together with its byte
//! offset, so a multi-byte codepoint is never cut in half.
//!
//! # Examples
//!
//! ```
//! use htmldiff_tokens::analysis::grapheme::{Granularity, GraphemeSplitter};
//!
//! let splitter = GraphemeSplitter::new(Granularity::Codepoint);
//! let units: Vec<_> = splitter.split("a\u{e9}b").map(|(_, unit)| unit).collect();
//! assert_eq!(units, vec!["a", "\u{e9}", "b"]);
//! ```

use std::str::CharIndices;

use serde::{Deserialize, Serialize};
use unicode_segmentation::{GraphemeIndices, UnicodeSegmentation};

/// The size of one comparison unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One unit per Unicode scalar value.
    #[default]
    Codepoint,
    /// One unit per extended grapheme cluster (UAX #29). A tag delimiter
    /// (`<` or `>`) is always a unit of its own, even when combining marks
    /// follow it.
    Grapheme,
}

/// Splits a string into units of the configured [`Granularity`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphemeSplitter {
    granularity: Granularity,
}

impl GraphemeSplitter {
    /// Create a splitter with the given granularity.
    pub fn new(granularity: Granularity) -> Self {
        GraphemeSplitter { granularity }
    }

    /// The granularity used by this splitter.
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Lazily split `text` into `(byte_offset, unit)` pairs.
    ///
    /// The iterator is `Clone`; a copy can be advanced for lookahead, and
    /// calling `split` again starts over from the beginning.
    pub fn split<'a>(&self, text: &'a str) -> Units<'a> {
        let inner = match self.granularity {
            Granularity::Codepoint => UnitsInner::Codepoints {
                text,
                chars: text.char_indices(),
            },
            Granularity::Grapheme => UnitsInner::Clusters {
                clusters: text.grapheme_indices(true),
                pending: None,
            },
        };
        Units { inner }
    }

    /// Iterate over the units of `text` without offsets.
    pub fn units<'a>(&self, text: &'a str) -> impl Iterator<Item = &'a str> + Clone + 'a {
        self.split(text).map(|(_, unit)| unit)
    }
}

/// Iterator over `(byte_offset, unit)` pairs.
#[derive(Clone, Debug)]
pub struct Units<'a> {
    inner: UnitsInner<'a>,
}

#[derive(Clone, Debug)]
enum UnitsInner<'a> {
    Codepoints {
        text: &'a str,
        chars: CharIndices<'a>,
    },
    Clusters {
        clusters: GraphemeIndices<'a>,
        pending: Option<(usize, &'a str)>,
    },
}

impl<'a> Iterator for Units<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            UnitsInner::Codepoints { text, chars } => chars
                .next()
                .map(|(offset, c)| (offset, &text[offset..offset + c.len_utf8()])),
            UnitsInner::Clusters { clusters, pending } => {
                if let Some(rest) = pending.take() {
                    return Some(rest);
                }
                let (offset, cluster) = clusters.next()?;
                match cluster.as_bytes().first() {
                    Some(b'<' | b'>') if cluster.len() > 1 => {
                        *pending = Some((offset + 1, &cluster[1..]));
                        Some((offset, &cluster[..1]))
                    }
                    _ => Some((offset, cluster)),
                }
            }
        }
    }
}
