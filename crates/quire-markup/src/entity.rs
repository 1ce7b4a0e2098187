//! Entity decoding.
//!
//! Only the five XML named entities are recognised. Numeric references are
//! encoded according to the document charset: as UTF-8 for multi-byte
//! documents, or as one raw byte otherwise.

use crate::charset::Charset;
use crate::error::ParseErrorKind;

/// Longest entity name the parser accumulates before giving up.
pub const MAX_ENTITY_LENGTH: usize = 32;

/// Decode the entity `&name;` and append its bytes to `out`.
///
/// # Errors
///
/// - [`ParseErrorKind::UnknownEntity`] for any unrecognised named entity
/// - [`ParseErrorKind::InvalidCharacterReference`] for malformed numeric
///   references or code points that are not characters
/// - [`ParseErrorKind::CharacterOutOfRange`] for code points above 255 in a
///   single-byte charset
pub fn decode_entity(name: &str, charset: Charset, out: &mut Vec<u8>) -> Result<(), ParseErrorKind> {
    let literal = match name {
        "lt" => b'<',
        "gt" => b'>',
        "amp" => b'&',
        "quot" => b'"',
        "apos" => b'\'',
        _ => {
            let Some(number) = name.strip_prefix('#') else {
                return Err(ParseErrorKind::UnknownEntity(name.to_string()));
            };
            let code = parse_code_point(number)
                .ok_or_else(|| ParseErrorKind::InvalidCharacterReference(name.to_string()))?;
            return push_code_point(name, code, charset, out);
        }
    };
    out.push(literal);
    Ok(())
}

/// Parse the digits of `#NN` or `#xHH`.
fn parse_code_point(number: &str) -> Option<u32> {
    let (digits, radix) = match number.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (number, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

fn push_code_point(
    name: &str,
    code: u32,
    charset: Charset,
    out: &mut Vec<u8>,
) -> Result<(), ParseErrorKind> {
    if charset.is_multibyte() {
        let ch = char::from_u32(code)
            .filter(|&c| c != '\0')
            .ok_or_else(|| ParseErrorKind::InvalidCharacterReference(name.to_string()))?;
        let mut utf8 = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    } else {
        let byte = u8::try_from(code).map_err(|_| ParseErrorKind::CharacterOutOfRange {
            reference: name.to_string(),
            charset,
        })?;
        out.push(byte);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(name: &str, charset: Charset) -> Result<Vec<u8>, ParseErrorKind> {
        let mut out = Vec::new();
        decode_entity(name, charset, &mut out).map(|()| out)
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(decode("#65", Charset::Utf8).unwrap(), b"A");
        assert_eq!(decode("#x41", Charset::Utf8).unwrap(), b"A");
        assert_eq!(decode("#X20AC", Charset::Utf8).unwrap(), "€".as_bytes());
        assert_eq!(decode("#233", Charset::Iso8859_1).unwrap(), vec![0xE9]);
    }

    #[test]
    fn test_out_of_range_single_byte() {
        assert!(matches!(
            decode("#8364", Charset::Iso8859_1),
            Err(ParseErrorKind::CharacterOutOfRange { .. })
        ));
    }

    #[test]
    fn test_malformed_references() {
        assert!(matches!(
            decode("#", Charset::Utf8),
            Err(ParseErrorKind::InvalidCharacterReference(_))
        ));
        assert!(matches!(
            decode("#x", Charset::Utf8),
            Err(ParseErrorKind::InvalidCharacterReference(_))
        ));
        assert!(matches!(
            decode("#xD800", Charset::Utf8),
            Err(ParseErrorKind::InvalidCharacterReference(_))
        ));
        assert!(matches!(
            decode("nbsp", Charset::Utf8),
            Err(ParseErrorKind::UnknownEntity(_))
        ));
    }
}
