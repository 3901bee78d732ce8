//! Decoding of string/bytes literal lexemes into their runtime values.
//!
//! The lexer deliberately does none of this — it only identifies where a
//! literal starts and ends — so that decoding errors are reported by the
//! parser, which already carries positions for every token it consumes.

use crate::error::SyntaxError;
use crate::span::Position;

/// Strip the `r`/`R`/`b`/`B` prefix letters and the (single or triple) quote
/// delimiters from a literal's raw lexeme, returning the prefix flags and the
/// inner text.
fn strip_delimiters(text: &str) -> (bool, bool, &str) {
    let mut rest = text;
    let mut raw = false;
    let mut bytes = false;
    while let Some(c) = rest.chars().next() {
        match c {
            'r' | 'R' => {
                raw = true;
                rest = &rest[1..];
            }
            'b' | 'B' => {
                bytes = true;
                rest = &rest[1..];
            }
            _ => break,
        }
    }
    let quote = rest.chars().next().expect("literal has a quote");
    let triple = rest.len() >= 6 && rest.starts_with(&quote.to_string().repeat(3));
    let delim_len = if triple { 3 } else { 1 };
    let inner = &rest[delim_len..rest.len() - delim_len];
    (raw, bytes, inner)
}

/// Decode a `TokenKind::String` lexeme into its string value:
/// raw strings pass their inner text through unchanged; otherwise recognized
/// escapes are decoded and unrecognized ones pass through literally (the
/// backslash and following character both kept) rather than erroring.
pub fn decode_string(text: &str, position: Position) -> Result<String, SyntaxError> {
    let (raw, _bytes, inner) = strip_delimiters(text);
    if raw {
        return Ok(inner.to_string());
    }
    decode_escapes(inner, position).map(|bytes| {
        // `decode_escapes` always produces valid UTF-8 for non-byte
        // literals because `\xHH`/`\OOO` byte escapes below 0x80 are ASCII
        // and above it are rejected by the caller's bytes-mode check; see
        // `decode_bytes` for the literal's bytes counterpart.
        String::from_utf8(bytes).unwrap_or_else(|e| {
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        })
    })
}

/// Decode a `TokenKind::Bytes` lexeme into its raw byte value.
pub fn decode_bytes(text: &str, position: Position) -> Result<Vec<u8>, SyntaxError> {
    let (raw, _bytes, inner) = strip_delimiters(text);
    if raw {
        return Ok(inner.as_bytes().to_vec());
    }
    decode_escapes(inner, position)
}

/// Shared escape-decoding core: both string and bytes literals accept the
/// same escape grammar, differing only in what the caller does with
/// codepoints above `0x7f` (UTF-8 encode for strings, a raw byte for bytes).
fn decode_escapes(inner: &str, position: Position) -> Result<Vec<u8>, SyntaxError> {
    let chars: Vec<char> = inner.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            i += 1;
            continue;
        }
        i += 1;
        let Some(&esc) = chars.get(i) else {
            return Err(SyntaxError::new("trailing backslash in literal", position));
        };
        match esc {
            'n' => {
                out.push(b'\n');
                i += 1;
            }
            't' => {
                out.push(b'\t');
                i += 1;
            }
            'r' => {
                out.push(b'\r');
                i += 1;
            }
            '"' => {
                out.push(b'"');
                i += 1;
            }
            '\'' => {
                out.push(b'\'');
                i += 1;
            }
            '\\' => {
                out.push(b'\\');
                i += 1;
            }
            '`' => {
                out.push(b'`');
                i += 1;
            }
            '?' => {
                out.push(b'?');
                i += 1;
            }
            'a' => {
                out.push(0x07);
                i += 1;
            }
            'b' => {
                out.push(0x08);
                i += 1;
            }
            'f' => {
                out.push(0x0c);
                i += 1;
            }
            'v' => {
                out.push(0x0b);
                i += 1;
            }
            '0'..='3' if matches!(chars.get(i + 1), Some('0'..='7')) && matches!(chars.get(i + 2), Some('0'..='7')) => {
                let digits: String = chars[i..i + 3].iter().collect();
                let byte = u8::from_str_radix(&digits, 8)
                    .map_err(|_| SyntaxError::new("invalid octal escape", position))?;
                out.push(byte);
                i += 3;
            }
            'x' | 'X' => {
                let digits: String = chars[i + 1..].iter().take(2).collect();
                if digits.len() < 2 {
                    return Err(SyntaxError::new("incomplete \\x escape", position));
                }
                let byte = u8::from_str_radix(&digits, 16)
                    .map_err(|_| SyntaxError::new("invalid hex escape", position))?;
                out.push(byte);
                i += 1 + digits.len();
            }
            'u' => {
                let digits: String = chars[i + 1..].iter().take(4).collect();
                if digits.len() < 4 {
                    return Err(SyntaxError::new("incomplete \\u escape", position));
                }
                let code = u32::from_str_radix(&digits, 16)
                    .map_err(|_| SyntaxError::new("invalid unicode escape", position))?;
                let ch = char::from_u32(code)
                    .ok_or_else(|| SyntaxError::new("invalid unicode codepoint", position))?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                i += 1 + digits.len();
            }
            'U' => {
                let digits: String = chars[i + 1..].iter().take(8).collect();
                if digits.len() < 8 {
                    return Err(SyntaxError::new("incomplete \\U escape", position));
                }
                let code = u32::from_str_radix(&digits, 16)
                    .map_err(|_| SyntaxError::new("invalid unicode escape", position))?;
                let ch = char::from_u32(code)
                    .ok_or_else(|| SyntaxError::new("invalid unicode codepoint", position))?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                i += 1 + digits.len();
            }
            other => {
                // Unrecognized escape: keep both characters verbatim rather
                // than erroring.
                out.push(b'\\');
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
                i += 1;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_escapes() {
        let decoded = decode_string(r#""a\nb\tc""#, Position::START).unwrap();
        assert_eq!(decoded, "a\nb\tc");
    }

    #[test]
    fn raw_strings_keep_backslashes() {
        let decoded = decode_string(r#"r"a\nb""#, Position::START).unwrap();
        assert_eq!(decoded, r"a\nb");
    }

    #[test]
    fn decodes_hex_and_unicode_escapes() {
        assert_eq!(decode_string(r#""\x41""#, Position::START).unwrap(), "A");
        assert_eq!(decode_string(r#""A""#, Position::START).unwrap(), "A");
    }

    #[test]
    fn decodes_octal_escapes() {
        assert_eq!(decode_string(r#""\101""#, Position::START).unwrap(), "A");
    }

    #[test]
    fn unknown_escape_passes_through() {
        assert_eq!(decode_string(r#""\q""#, Position::START).unwrap(), "\\q");
    }

    #[test]
    fn decodes_bytes_literal_to_raw_bytes() {
        assert_eq!(decode_bytes(r#"b"\x00\xff""#, Position::START).unwrap(), vec![0x00, 0xff]);
    }

    #[test]
    fn triple_quoted_strings_keep_embedded_newlines() {
        let decoded = decode_string("\"\"\"a\nb\"\"\"", Position::START).unwrap();
        assert_eq!(decoded, "a\nb");
    }
}
