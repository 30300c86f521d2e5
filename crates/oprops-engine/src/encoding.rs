//! Character encodings understood by the engine.

use std::fmt;

use crate::error::{EngineError, Result};

/// A character encoding for XML documents and text byte streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Latin1,
    Ascii,
}

impl Encoding {
    /// Resolve an encoding label such as `"UTF-8"` or `"ISO-8859-1"`.
    ///
    /// Matching is case-insensitive and accepts the common aliases.
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "iso8859-1" | "8859-1" | "latin1" | "latin-1" | "l1" => {
                Ok(Self::Latin1)
            }
            "us-ascii" | "ascii" => Ok(Self::Ascii),
            _ => Err(EngineError::UnsupportedEncoding(label.to_string())),
        }
    }

    /// Canonical label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
            Self::Ascii => "US-ASCII",
        }
    }

    /// Returns `true` if `c` has a direct representation in this encoding.
    pub fn can_encode(&self, c: char) -> bool {
        match self {
            Self::Utf8 => true,
            Self::Latin1 => u32::from(c) <= 0xFF,
            Self::Ascii => c.is_ascii(),
        }
    }

    /// Encode `s`. Characters outside the encoding become `?`.
    pub fn encode(&self, s: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => s.as_bytes().to_vec(),
            Self::Latin1 | Self::Ascii => s
                .chars()
                .map(|c| {
                    if self.can_encode(c) {
                        u32::from(c) as u8
                    } else {
                        b'?'
                    }
                })
                .collect(),
        }
    }

    /// Decode `bytes`. Invalid UTF-8 and non-ASCII bytes in an ASCII stream
    /// are rejected.
    pub fn decode(&self, bytes: &[u8]) -> std::result::Result<String, String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string()),
            Self::Latin1 => Ok(decode_latin1(bytes)),
            Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(format!("non-ASCII byte at offset {pos}")),
                None => Ok(decode_latin1(bytes)),
            },
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every byte maps to the code point of the same value.
pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
