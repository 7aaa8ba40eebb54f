// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Deferred escape decoding for double-quoted scalars.
//!
//! The scanner validates escape sequences (unknown escape characters and
//! short hex runs fail there) but emits the raw escape text, keeping the
//! tokenizer allocation-lean. The parser calls [`decode_double_quoted`] when
//! it turns the scalar token into an event. Escaped line breaks never reach
//! this function; the scanner swallows them while folding.

use crate::error::ErrorKind;

/// Decode the backslash escapes of a double-quoted scalar body.
///
/// Errors are only reachable when the input did not come from the scanner
/// (a hex escape naming a code point outside the Unicode range is the one
/// case the scanner does not reject).
pub(crate) fn decode_double_quoted(raw: &str) -> Result<String, ErrorKind> {
    if !raw.contains('\\') {
        return Ok(raw.to_owned());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape = chars.next().ok_or(ErrorKind::UnexpectedEndOfStream)?;
        match escape {
            '0' => out.push('\0'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            't' | '\t' => out.push('\t'),
            'n' => out.push('\n'),
            'v' => out.push('\x0B'),
            'f' => out.push('\x0C'),
            'r' => out.push('\r'),
            'e' => out.push('\x1B'),
            ' ' => out.push(' '),
            '"' => out.push('"'),
            '/' => out.push('/'),
            '\\' => out.push('\\'),
            'N' => out.push('\u{0085}'),
            '_' => out.push('\u{00A0}'),
            'L' => out.push('\u{2028}'),
            'P' => out.push('\u{2029}'),
            'x' => out.push(decode_hex(&mut chars, 2)?),
            'u' => out.push(decode_hex(&mut chars, 4)?),
            'U' => out.push(decode_hex(&mut chars, 8)?),
            other => return Err(ErrorKind::UnknownEscape(other)),
        }
    }
    Ok(out)
}

fn decode_hex(chars: &mut std::str::Chars<'_>, width: usize) -> Result<char, ErrorKind> {
    let mut code = 0u32;
    for _ in 0..width {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| ErrorKind::Expected {
                expected: "a hexadecimal digit",
                found: "end of escape sequence".to_owned(),
            })?;
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or(ErrorKind::Expected {
        expected: "a valid Unicode code point",
        found: format!("{code:#x}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_passthrough() {
        assert_eq!(decode_double_quoted("hello").unwrap(), "hello");
        assert_eq!(decode_double_quoted("").unwrap(), "");
    }

    #[test]
    fn test_named_escapes() {
        assert_eq!(decode_double_quoted("a\\tb").unwrap(), "a\tb");
        assert_eq!(decode_double_quoted("\\n\\r\\0").unwrap(), "\n\r\0");
        assert_eq!(decode_double_quoted("\\\"\\\\\\/").unwrap(), "\"\\/");
        assert_eq!(decode_double_quoted("\\N\\_\\L\\P").unwrap(), "\u{0085}\u{00A0}\u{2028}\u{2029}");
        assert_eq!(decode_double_quoted("\\e\\a\\b\\v\\f").unwrap(), "\x1B\x07\x08\x0B\x0C");
    }

    #[test]
    fn test_hex_escapes() {
        assert_eq!(decode_double_quoted("\\x41").unwrap(), "A");
        assert_eq!(decode_double_quoted("\\u00e9").unwrap(), "\u{e9}");
        assert_eq!(decode_double_quoted("\\U0001F600").unwrap(), "\u{1F600}");
    }

    #[test]
    fn test_unknown_escape() {
        assert_eq!(
            decode_double_quoted("\\q").unwrap_err(),
            ErrorKind::UnknownEscape('q')
        );
    }

    #[test]
    fn test_surrogate_is_rejected() {
        assert!(matches!(
            decode_double_quoted("\\uD800").unwrap_err(),
            ErrorKind::Expected { .. }
        ));
    }
}
