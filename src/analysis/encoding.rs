//! Text encodings accepted for diff inputs.
//!
//! A diff session applies one encoding to both documents. Raw bytes are
//! decoded strictly: a malformed sequence is an [`HtmlDiffError::Encoding`]
//! and nothing is tokenized.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HtmlDiffError, Result};

/// A supported text encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    /// UTF-8
    #[default]
    Utf8,
    /// UTF-16, little endian
    Utf16Le,
    /// UTF-16, big endian
    Utf16Be,
    /// 7-bit US-ASCII
    Ascii,
    /// ISO-8859-1 (Latin-1)
    Latin1,
}

impl TextEncoding {
    /// Resolve an encoding label such as `"UTF-8"` or `"latin1"`.
    ///
    /// Labels are matched case-insensitively with `_` treated like `-`.
    ///
    /// # Examples
    ///
    /// ```
    /// use htmldiff_tokens::analysis::encoding::TextEncoding;
    ///
    /// assert_eq!(TextEncoding::from_label("utf8").unwrap(), TextEncoding::Utf8);
    /// assert_eq!(TextEncoding::from_label("ISO_8859-1").unwrap(), TextEncoding::Latin1);
    /// assert!(TextEncoding::from_label("EBCDIC").is_err());
    /// ```
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "utf-16le" | "utf16le" => Ok(TextEncoding::Utf16Le),
            "utf-16be" | "utf16be" => Ok(TextEncoding::Utf16Be),
            "us-ascii" | "ascii" => Ok(TextEncoding::Ascii),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(TextEncoding::Latin1),
            _ => Err(HtmlDiffError::configuration(format!(
                "unsupported encoding '{label}'"
            ))),
        }
    }

    /// Canonical name of this encoding.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Ascii => "US-ASCII",
            TextEncoding::Latin1 => "ISO-8859-1",
        }
    }

    /// Decode raw bytes into a string, rejecting malformed input.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| {
                HtmlDiffError::encoding(format!(
                    "invalid UTF-8 at byte {}",
                    e.utf8_error().valid_up_to()
                ))
            }),
            TextEncoding::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
            TextEncoding::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
            TextEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(HtmlDiffError::encoding(format!(
                    "non-ASCII byte 0x{:02x} at offset {pos}",
                    bytes[pos]
                ))),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    /// Check that an already-decoded string is representable in this encoding.
    pub fn check(&self, text: &str) -> Result<()> {
        let limit = match self {
            TextEncoding::Utf8 | TextEncoding::Utf16Le | TextEncoding::Utf16Be => return Ok(()),
            TextEncoding::Ascii => '\u{7f}',
            TextEncoding::Latin1 => '\u{ff}',
        };

        match text.char_indices().find(|&(_, c)| c > limit) {
            Some((offset, c)) => Err(HtmlDiffError::encoding(format!(
                "character U+{:04X} at byte {offset} is not valid {}",
                c as u32,
                self.name()
            ))),
            None => Ok(()),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn decode_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(HtmlDiffError::encoding(format!(
            "UTF-16 input has odd length {}",
            bytes.len()
        )));
    }

    let units = bytes.chunks_exact(2).map(|pair| read([pair[0], pair[1]]));
    char::decode_utf16(units)
        .enumerate()
        .map(|(index, unit)| {
            unit.map_err(|e| {
                HtmlDiffError::encoding(format!(
                    "unpaired surrogate 0x{:04x} at code unit {index}",
                    e.unpaired_surrogate()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(TextEncoding::from_label("UTF-8").unwrap(), TextEncoding::Utf8);
        assert_eq!(
            TextEncoding::from_label("utf-16le").unwrap(),
            TextEncoding::Utf16Le
        );
        assert_eq!(TextEncoding::from_label("ASCII").unwrap(), TextEncoding::Ascii);

        let err = TextEncoding::from_label("shift-jis").unwrap_err();
        assert!(matches!(err, HtmlDiffError::Configuration(_)));
    }

    #[test]
    fn test_utf8_decode() {
        let text = TextEncoding::Utf8.decode("caf\u{e9}".as_bytes()).unwrap();
        assert_eq!(text, "café");

        let err = TextEncoding::Utf8.decode(&[b'a', 0xff, b'b']).unwrap_err();
        assert!(matches!(err, HtmlDiffError::Encoding(_)));
        assert!(err.to_string().contains("byte 1"));
    }

    #[test]
    fn test_utf16_decode() {
        let bytes: Vec<u8> = "h\u{e9}".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        assert_eq!(TextEncoding::Utf16Le.decode(&bytes).unwrap(), "hé");

        let bytes: Vec<u8> = "h\u{e9}".encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        assert_eq!(TextEncoding::Utf16Be.decode(&bytes).unwrap(), "hé");

        assert!(TextEncoding::Utf16Le.decode(&[0x61]).is_err());
        // Lone high surrogate.
        assert!(TextEncoding::Utf16Le.decode(&[0x00, 0xd8]).is_err());
    }

    #[test]
    fn test_single_byte_encodings() {
        assert_eq!(TextEncoding::Latin1.decode(&[0x63, 0xe9]).unwrap(), "cé");
        assert!(TextEncoding::Ascii.decode(&[0x63, 0xe9]).is_err());
        assert!(TextEncoding::Ascii.check("plain").is_ok());
        assert!(TextEncoding::Ascii.check("café").is_err());
        assert!(TextEncoding::Latin1.check("café").is_ok());
        assert!(TextEncoding::Latin1.check("日本").is_err());
    }
}
