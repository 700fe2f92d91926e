use crate::file::timing::SmpteFps;
use thiserror::Error;

/// Problems found in the five data bytes of an `FF 54` message
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SmpteError {
    /// The payload is not five bytes long
    #[error("SMPTE offset must be 5 bytes, found {0}")]
    Length(usize),
    /// The two rate bits (with the reserved top bit) are out of range
    #[error("Invalid SMPTE offset frame rate bits {0}")]
    TrackFrame(u8),
    /// Hours above 23
    #[error("Invalid SMPTE offset hour {0}")]
    HourOffset(u8),
    /// Minutes above 59
    #[error("Invalid SMPTE offset minute {0}")]
    MinuteOffset(u8),
    /// Seconds above 59
    #[error("Invalid SMPTE offset second {0}")]
    SecondOffset(u8),
    /// Hundredths of a frame above 99
    #[error("Invalid SMPTE offset subframe {0}")]
    Subframe(u8),
}

#[doc = r#"
The time at which a track is meant to start, from an `FF 54 05` meta message.

```rust
# use smfkit::prelude::*;
let offset = SmpteOffset::parse(&[0x61, 0, 10, 15, 0]).unwrap();
assert_eq!(offset.fps, SmpteFps::Thirty);
assert_eq!(offset.hour, 1);
assert!((offset.as_seconds() - 3610.5).abs() < 1e-9);

let message = MidiMessage::smpte_offset_meta(&offset);
assert_eq!(message.smpte_offset(), Some(offset));
```
"#]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmpteOffset {
    /// Frame rate the frames and subframes are counted in
    pub fps: SmpteFps,
    /// `0..=23`
    pub hour: u8,
    /// `0..=59`
    pub minute: u8,
    /// `0..=59`
    pub second: u8,
    /// Frame within the second. Not range checked
    pub frame: u8,
    /// Hundredths of a frame, `0..=99`
    pub subframe: u8,
}

impl SmpteOffset {
    /// Decode the payload of an `FF 54` message (`0rrhhhhh mm ss ff sf`)
    pub const fn parse(data: &[u8]) -> Result<Self, SmpteError> {
        if data.len() != 5 {
            return Err(SmpteError::Length(data.len()));
        }
        let bits = data[0] >> 5;
        let Some(fps) = SmpteFps::from_offset_bits(bits) else {
            return Err(SmpteError::TrackFrame(bits));
        };
        let hour = data[0] & 0x1F;
        if hour > 23 {
            return Err(SmpteError::HourOffset(hour));
        }
        if data[1] > 59 {
            return Err(SmpteError::MinuteOffset(data[1]));
        }
        if data[2] > 59 {
            return Err(SmpteError::SecondOffset(data[2]));
        }
        if data[4] > 99 {
            return Err(SmpteError::Subframe(data[4]));
        }
        Ok(Self {
            fps,
            hour,
            minute: data[1],
            second: data[2],
            frame: data[3],
            subframe: data[4],
        })
    }

    /// The five payload bytes of an `FF 54` message
    pub const fn to_bytes(&self) -> [u8; 5] {
        [
            (self.fps.offset_bits() << 5) | (self.hour & 0x1F),
            self.minute,
            self.second,
            self.frame,
            self.subframe,
        ]
    }

    /// The offset in seconds, counting frames at the offset's own rate
    pub const fn as_seconds(&self) -> f64 {
        self.as_seconds_at(self.fps)
    }

    /// The offset in seconds, counting frames at `fps`.
    ///
    /// Files with SMPTE timing count frames at the header's rate.
    pub const fn as_seconds_at(&self, fps: SmpteFps) -> f64 {
        let whole = self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32;
        let frames = self.frame as f64 + self.subframe as f64 / 100.;
        whole as f64 + frames / fps.as_f64()
    }
}

#[test]
fn parse_smpte_offset() {
    use pretty_assertions::assert_eq;
    let offset = SmpteOffset::parse(&[0x41, 0x17, 0x2D, 0x0C, 0x22]).unwrap();

    assert_eq!(offset.fps, SmpteFps::TwentyNine);
    assert_eq!(offset.hour, 1);
    assert_eq!(offset.minute, 23);
    assert_eq!(offset.second, 45);
    assert_eq!(offset.frame, 12);
    assert_eq!(offset.subframe, 34);
    assert_eq!(offset.to_bytes(), [0x41, 0x17, 0x2D, 0x0C, 0x22]);
}

#[test]
fn parse_invalid_smpte_offset() {
    use pretty_assertions::assert_eq;
    let err = SmpteOffset::parse(&[0x81, 0x17, 0x2D, 0x0C, 0x22]).unwrap_err();
    assert_eq!(err, SmpteError::TrackFrame(4));
    let err = SmpteOffset::parse(&[0x7F, 0x17, 0x2D, 0x0C, 0x22]).unwrap_err();
    assert_eq!(err, SmpteError::HourOffset(31));

    let err = SmpteOffset::parse(&[0x41, 0x50, 0x2D, 0x0C, 0x22]).unwrap_err();
    assert_eq!(err, SmpteError::MinuteOffset(80));
}
