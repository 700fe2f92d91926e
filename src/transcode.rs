#![doc = r#"
Textual input

[`MidiFile::read`](crate::prelude::MidiFile::read) accepts either binary
Standard MIDI File bytes or a textual rendering of them. Input that does not
begin with `MThd` is handed to a [`TextTranscoder`] first.

The bundled [`HexTranscoder`] reads the format produced by
[`MidiFile::hex_dump`](crate::prelude::MidiFile::hex_dump): hex digit pairs
separated by whitespace, with `;` and `#` starting a comment that runs to the
end of the line.

```rust
# use smfkit::prelude::*;
let text = b"4d 54 68 64 ; MThd\n00 00 00 06\n";
let bytes = HexTranscoder.transcode(text).unwrap();
assert_eq!(bytes, [b'M', b'T', b'h', b'd', 0, 0, 0, 6]);
```
"#]

use alloc::vec::Vec;
use thiserror::Error;

/// Why textual input could not be turned into bytes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    /// A character that is not a hex digit
    #[error("Line {line}: '{found}' is not a hex digit")]
    InvalidDigit {
        /// 1-based line number
        line: usize,
        /// The offending character
        found: char,
    },
    /// A token with an odd number of digits
    #[error("Line {line}: token has an odd number of hex digits")]
    OddDigitCount {
        /// 1-based line number
        line: usize,
    },
    /// The input is not UTF-8
    #[error("Input is neither a binary MIDI file nor text")]
    NotText,
    /// The input held no bytes at all
    #[error("Input holds no data")]
    Empty,
}

/// Turns a textual rendering of a MIDI file into binary bytes
pub trait TextTranscoder {
    /// Convert `text` into the bytes of a Standard MIDI File
    fn transcode(&self, text: &[u8]) -> Result<Vec<u8>, TranscodeError>;
}

/// Reads whitespace separated hex byte pairs with `;`/`#` line comments
#[derive(Debug, Clone, Copy, Default)]
pub struct HexTranscoder;

impl TextTranscoder for HexTranscoder {
    fn transcode(&self, text: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        let text = core::str::from_utf8(text).map_err(|_| TranscodeError::NotText)?;
        let mut out = Vec::with_capacity(text.len() / 3);

        for (number, line) in text.lines().enumerate() {
            let line_number = number + 1;
            let content = line.split(['#', ';']).next().unwrap_or_default();
            for token in content.split_whitespace() {
                if let Some(found) = token.chars().find(|c| !c.is_ascii_hexdigit()) {
                    return Err(TranscodeError::InvalidDigit {
                        line: line_number,
                        found,
                    });
                }
                if token.len() % 2 != 0 {
                    return Err(TranscodeError::OddDigitCount { line: line_number });
                }
                out.extend(
                    token
                        .as_bytes()
                        .chunks(2)
                        .map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1])),
                );
            }
        }

        if out.is_empty() {
            return Err(TranscodeError::Empty);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(bytes = out.len(), "Transcoded hex text input");
        Ok(out)
    }
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

#[test]
fn comments_and_whitespace() {
    let bytes = HexTranscoder
        .transcode(b"# header\n  ff\t2F 00 ; end\n\n0a0B")
        .unwrap();
    assert_eq!(bytes, [0xFF, 0x2F, 0x00, 0x0A, 0x0B]);
}

#[test]
fn rejects_bad_tokens() {
    assert_eq!(
        HexTranscoder.transcode(b"00\nfg"),
        Err(TranscodeError::InvalidDigit {
            line: 2,
            found: 'g'
        })
    );
    assert_eq!(
        HexTranscoder.transcode(b"123"),
        Err(TranscodeError::OddDigitCount { line: 1 })
    );
    assert_eq!(HexTranscoder.transcode(b"; nothing"), Err(TranscodeError::Empty));
    assert_eq!(HexTranscoder.transcode(&[0xFF, 0xFE]), Err(TranscodeError::NotText));
}
