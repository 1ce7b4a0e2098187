//! Document charsets.
//!
//! The charset only selects how accumulated bytes become text and how
//! numeric character references are encoded: as UTF-8 sequences, or as a
//! single byte for the single-byte charsets.

use std::borrow::Cow;
use std::str::Utf8Error;

use strum_macros::{Display, EnumString};

/// The fixed table of charsets a document may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Charset {
    /// UTF-8, the default.
    #[default]
    #[strum(to_string = "UTF-8", serialize = "utf8")]
    Utf8,
    /// ISO-8859-1 (Latin-1).
    #[strum(
        to_string = "ISO-8859-1",
        serialize = "iso8859-1",
        serialize = "iso_8859-1",
        serialize = "latin1",
        serialize = "latin-1",
        serialize = "l1"
    )]
    Iso8859_1,
    /// 7-bit US-ASCII. Bytes above 0x7F are read as Latin-1.
    #[strum(to_string = "US-ASCII", serialize = "ascii")]
    UsAscii,
    /// Windows-1252, Latin-1 with printable characters in 0x80-0x9F.
    #[strum(to_string = "windows-1252", serialize = "cp1252")]
    Windows1252,
}

/// Unicode code points for bytes 0x80-0x9F in Windows-1252.
/// Undefined positions map to the C1 control with the same value.
const WINDOWS_1252_HIGH: [u16; 32] = [
    0x20AC, 0x0081, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160,
    0x2039, 0x0152, 0x008D, 0x017D, 0x008F, 0x0090, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022,
    0x2013, 0x2014, 0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x009D, 0x017E, 0x0178,
];

impl Charset {
    /// Map a declared charset name to a [`Charset`].
    ///
    /// Unknown names fall back to UTF-8 without an error.
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        name.trim().parse().unwrap_or_else(|_| {
            log::debug!(target: "quire.markup", "unknown charset '{name}', using UTF-8");
            Self::Utf8
        })
    }

    /// Returns `true` if numeric character references are encoded as
    /// multi-byte UTF-8 sequences.
    #[must_use]
    pub const fn is_multibyte(self) -> bool {
        matches!(self, Self::Utf8)
    }

    /// Decode raw document bytes into text.
    ///
    /// # Errors
    ///
    /// Returns the UTF-8 validation error if the charset is UTF-8 and the
    /// bytes are not well formed. Single-byte charsets never fail.
    pub fn decode(self, bytes: &[u8]) -> Result<Cow<'_, str>, Utf8Error> {
        if self.is_multibyte() || bytes.is_ascii() {
            return std::str::from_utf8(bytes).map(Cow::Borrowed);
        }
        Ok(Cow::Owned(
            bytes.iter().map(|&b| self.decode_byte(b)).collect(),
        ))
    }

    fn decode_byte(self, byte: u8) -> char {
        match (self, byte) {
            (Self::Windows1252, 0x80..=0x9F) => {
                let code = WINDOWS_1252_HIGH[usize::from(byte - 0x80)];
                char::from_u32(u32::from(code)).unwrap_or(char::REPLACEMENT_CHARACTER)
            }
            _ => char::from(byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(Charset::resolve("UTF-8"), Charset::Utf8);
        assert_eq!(Charset::resolve("utf8"), Charset::Utf8);
        assert_eq!(Charset::resolve("Latin1"), Charset::Iso8859_1);
        assert_eq!(Charset::resolve("ISO-8859-1"), Charset::Iso8859_1);
        assert_eq!(Charset::resolve("cp1252"), Charset::Windows1252);
        assert_eq!(Charset::resolve("klingon"), Charset::Utf8);
    }

    #[test]
    fn test_single_byte_decoding() {
        assert_eq!(Charset::Iso8859_1.decode(b"caf\xe9").unwrap(), "café");
        assert_eq!(Charset::Windows1252.decode(b"\x80 5").unwrap(), "€ 5");
        assert!(Charset::Utf8.decode(b"caf\xe9").is_err());
    }
}
