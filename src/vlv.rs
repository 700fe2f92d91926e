#![doc = r#"
Variable length values

MIDI stores delta times and the lengths of meta and system exclusive payloads
as variable length values: seven data bits per byte, most significant group
first, with the high bit set on every byte except the last.

```text
        0 -> 00
      127 -> 7F
      128 -> 81 00
    16383 -> FF 7F
    16384 -> 81 80 00
0x0FFFFFFF -> FF FF FF 7F
```

Encoding is always minimal. Values wider than 28 bits are rejected.
"#]

use alloc::vec::Vec;
use thiserror::Error;

/// Largest value that can be encoded (28 bits).
pub const MAX_VALUE: u32 = 0x0FFF_FFFF;

/// A decoder accepts at most this many bytes.
pub const MAX_DECODE_LEN: usize = 5;

/// Problems encoding or decoding a variable length value
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VlvError {
    /// The value is wider than 28 bits
    #[error("{0} does not fit in 28 bits")]
    TooLarge(u64),
    /// The value runs past five bytes or does not fit in 32 bits
    #[error("Value continues past {MAX_DECODE_LEN} bytes")]
    Overflow,
    /// The input ended before the final byte
    #[error("Value was cut off")]
    Truncated,
}

/// Returns the number of bytes `value` occupies once encoded.
pub const fn encoded_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        _ => 4,
    }
}

/// Appends the encoding of `value` to `out`, returning how many bytes were written.
pub fn write(value: u32, out: &mut Vec<u8>) -> Result<usize, VlvError> {
    if value > MAX_VALUE {
        return Err(VlvError::TooLarge(value as u64));
    }
    let len = encoded_len(value);
    for group in (0..len).rev() {
        let mut byte = ((value >> (group * 7)) & 0x7F) as u8;
        if group != 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
    Ok(len)
}

/// Encodes `value` into a new buffer.
pub fn encode(value: u32) -> Result<Vec<u8>, VlvError> {
    let mut out = Vec::with_capacity(4);
    write(value, &mut out)?;
    Ok(out)
}

/// Decodes a value from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(u32, usize), VlvError> {
    let mut value: u64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        if i == MAX_DECODE_LEN {
            return Err(VlvError::Overflow);
        }
        value = (value << 7) | (byte & 0x7F) as u64;
        if byte & 0x80 == 0 {
            let value = u32::try_from(value).map_err(|_| VlvError::Overflow)?;
            return Ok((value, i + 1));
        }
    }
    if bytes.len() >= MAX_DECODE_LEN {
        Err(VlvError::Overflow)
    } else {
        Err(VlvError::Truncated)
    }
}

#[test]
fn round_trip_boundaries() {
    let cases: [(u32, usize); 9] = [
        (0, 1),
        (1, 1),
        (127, 1),
        (128, 2),
        (16383, 2),
        (16384, 3),
        ((1 << 21) - 1, 3),
        (1 << 21, 4),
        ((1 << 28) - 1, 4),
    ];
    for (value, len) in cases {
        let bytes = encode(value).unwrap();
        assert_eq!(bytes.len(), len, "length of {value}");
        assert_eq!(decode(&bytes).unwrap(), (value, len));
    }
}

#[test]
fn multiples_of_128_keep_their_last_byte() {
    assert_eq!(encode(128).unwrap(), [0x81, 0x00]);
    assert_eq!(encode(256).unwrap(), [0x82, 0x00]);
    assert_eq!(encode(0x4000).unwrap(), [0x81, 0x80, 0x00]);
    assert_eq!(encode(0x20_0000).unwrap(), [0x81, 0x80, 0x80, 0x00]);
}

#[test]
fn zero_is_one_byte() {
    assert_eq!(encode(0).unwrap(), [0x00]);
}

#[test]
fn too_large_to_encode() {
    assert_eq!(encode(1 << 28), Err(VlvError::TooLarge(1 << 28)));
}

#[test]
fn decode_stops_at_first_clear_high_bit() {
    assert_eq!(decode(&[0x81, 0x00, 0x7F]).unwrap(), (128, 2));
}

#[test]
fn decode_rejects_sixth_byte() {
    assert_eq!(
        decode(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00]),
        Err(VlvError::Overflow)
    );
    assert_eq!(decode(&[0x81, 0x80]), Err(VlvError::Truncated));
}
