//! Character encodings tried when reading transcript bytes as text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Byte order mark some exporters prepend to UTF-8 text.
const UTF8_BOM: &str = "\u{feff}";

/// Windows-1252 code points for 0x80..=0x9F. `None` marks undefined bytes.
#[rustfmt::skip]
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None,             Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None,             Some('\u{017D}'), None,
    None,             Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None,             Some('\u{017E}'), Some('\u{0178}'),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Encoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl Encoding {
    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
            Encoding::Windows1252 => "cp1252",
        }
    }

    /// Decode strictly. `None` when the bytes are not valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            // Every byte maps to the code point with the same value.
            Encoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Encoding::Windows1252 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
                    _ => Some(char::from(b)),
                })
                .collect(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Encoding::Latin1),
            "cp1252" | "windows-1252" => Ok(Encoding::Windows1252),
            other => Err(format!("unsupported encoding '{}'", other)),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Encoding> for String {
    fn from(encoding: Encoding) -> Self {
        encoding.label().to_string()
    }
}

/// Text decoded from downloaded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: Encoding,
}

/// Try each encoding in order and return the first successful decode.
pub fn decode_chain(bytes: &[u8], encodings: &[Encoding]) -> Option<Decoded> {
    decode_chain_with(bytes, encodings, |encoding, bytes| encoding.decode(bytes))
}

/// [`decode_chain`] with a custom per-encoding attempt.
pub fn decode_chain_with<F>(bytes: &[u8], encodings: &[Encoding], mut attempt: F) -> Option<Decoded>
where
    F: FnMut(Encoding, &[u8]) -> Option<String>,
{
    encodings.iter().find_map(|&encoding| {
        attempt(encoding, bytes).map(|text| Decoded {
            text: strip_bom(text),
            encoding,
        })
    })
}

/// UTF-8 with invalid sequences replaced.
pub fn decode_lossy(bytes: &[u8]) -> String {
    strip_bom(String::from_utf8_lossy(bytes).into_owned())
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}
