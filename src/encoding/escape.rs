//! Unescapes textual keys, as printed in TiDB/TiKV logs and error messages,
//! back into raw bytes. Supports the C-style escapes:
//!
//! \xHH:  a hex byte, exactly 2 digits.
//! \OOO:  an octal byte, exactly 3 digits.
//! \a \b \f \n \r \t \v \\ \' \":  the usual single-character escapes.
//!
//! Scanning is byte-wise, not UTF-8 aware: escape arguments are taken as raw
//! bytes, and unescaped bytes pass through unchanged.

use crate::error::{Error, Result};

/// Single-character escapes and the bytes they represent.
const NAMED: [(u8, u8); 10] = [
    (b'a', 0x07),
    (b'b', 0x08),
    (b'f', 0x0c),
    (b'n', b'\n'),
    (b'r', b'\r'),
    (b't', b'\t'),
    (b'v', 0x0b),
    (b'\\', b'\\'),
    (b'\'', b'\''),
    (b'"', b'"'),
];

/// Unescapes a textual key into raw bytes.
pub fn unescape(text: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(text.len());
    let mut input = text;
    while let Some((&byte, rest)) = input.split_first() {
        input = rest;
        if byte != b'\\' {
            output.push(byte);
            continue;
        }
        let Some((&escape, rest)) = input.split_first() else {
            return Err(Error::UnterminatedEscape(format!("trailing backslash in {text:x?}")));
        };
        input = rest;
        if let Some((_, byte)) = NAMED.iter().find(|(name, _)| *name == escape) {
            output.push(*byte);
            continue;
        }
        let byte = match escape {
            b'x' => parse_digits(take_digits(&mut input, 2)?, 16)?,
            leading => {
                let digits = [&[leading][..], take_digits(&mut input, 2)?].concat();
                parse_digits(&digits, 8)?
            }
        };
        output.push(byte);
    }
    Ok(output)
}

/// Chops off the next len digit bytes of an escape sequence.
fn take_digits<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    if input.len() < len {
        return Err(Error::UnterminatedEscape(format!(
            "expected {len} more escape digits, got {:x?}",
            input
        )));
    }
    let (digits, rest) = input.split_at(len);
    *input = rest;
    Ok(digits)
}

/// Parses escape digits in the given radix as a single byte.
fn parse_digits(digits: &[u8], radix: u32) -> Result<u8> {
    std::str::from_utf8(digits)
        .ok()
        .filter(|s| s.chars().all(|c| c.is_digit(radix)))
        .and_then(|s| u8::from_str_radix(s, radix).ok())
        .ok_or_else(|| {
            Error::MalformedEscapeDigits(format!("{digits:x?} is not a base {radix} byte"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(r"" => b"".to_vec(); "empty")]
    #[test_case(r"t_r" => b"t_r".to_vec(); "plain")]
    #[test_case(r"\x80\x00\x7f\xFF" => vec![0x80, 0x00, 0x7f, 0xff]; "hex")]
    #[test_case(r"\200\000\377" => vec![0x80, 0x00, 0xff]; "octal")]
    #[test_case(r#"\a\b\f\n\r\t\v\\\'\""# => b"\x07\x08\x0c\n\r\t\x0b\\'\"".to_vec(); "named")]
    #[test_case(r"\010;\272" => vec![0x08, b';', 0xba]; "octal mixed with plain")]
    #[test_case("\u{1f44b}\\x01" => vec![0xf0, 0x9f, 0x91, 0x8b, 0x01]; "utf8 passthrough")]
    fn unescape_ok(text: &str) -> Vec<u8> {
        unescape(text.as_bytes()).expect("unescape failed")
    }

    #[test_case(r"\"; "trailing backslash")]
    #[test_case(r"t\x8"; "short hex")]
    #[test_case(r"t\x"; "bare hex")]
    #[test_case(r"\20"; "short octal")]
    fn unescape_unterminated(text: &str) {
        assert!(matches!(unescape(text.as_bytes()), Err(Error::UnterminatedEscape(_))));
    }

    #[test_case(r"\xzz"; "hex letters")]
    #[test_case(r"\x+1"; "hex sign")]
    #[test_case(r"\800"; "octal 8")]
    #[test_case(r"\777"; "octal overflow")]
    #[test_case(r"\q00"; "unknown escape")]
    fn unescape_malformed(text: &str) {
        assert!(matches!(unescape(text.as_bytes()), Err(Error::MalformedEscapeDigits(_))));
    }

    /// Strings without backslashes decode to themselves.
    #[test]
    fn unescape_identity() -> Result<()> {
        for text in ["", "t", "abc def", "t\u{80}_r", "\u{0}\u{1}\u{7f}", "日本語"] {
            assert_eq!(unescape(text.as_bytes())?, text.as_bytes());
        }
        Ok(())
    }
}
