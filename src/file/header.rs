use crate::{
    FormatError,
    file::{builder::chunk, timing::Timing},
    reader::{ReadResult, Reader, inv_data},
};
use alloc::vec::Vec;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The format field of the `MThd` chunk.
///
/// Format 2 (sequentially independent tracks) is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum FormatType {
    /// Format 0: one track holding every channel
    SingleMultiChannel = 0,
    /// Format 1: tracks played simultaneously
    Simultaneous = 1,
}

impl FormatType {
    /// The format a file with `track_count` tracks is written as
    pub const fn for_track_count(track_count: usize) -> Self {
        if track_count == 1 {
            Self::SingleMultiChannel
        } else {
            Self::Simultaneous
        }
    }
}

#[doc = r#"
The contents of the `MThd` chunk

```text
"MThd" | length (u32 = 6) | format (u16) | track count (u16) | division (u16)
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiFileHeader {
    format: FormatType,
    track_count: u16,
    timing: Timing,
}

impl MidiFileHeader {
    /// Create a header. Format 0 is only accepted with exactly one track.
    pub fn new(format: FormatType, track_count: u16, timing: Timing) -> Result<Self, FormatError> {
        if track_count == 0 {
            return Err(FormatError::NoTracks);
        }
        if format == FormatType::SingleMultiChannel && track_count != 1 {
            return Err(FormatError::SingleTrackMismatch(track_count));
        }
        Ok(Self {
            format,
            track_count,
            timing,
        })
    }

    /// The header written for a file with `track_count` tracks
    pub(crate) const fn for_tracks(track_count: u16, timing: Timing) -> Self {
        Self {
            format: FormatType::for_track_count(track_count as usize),
            track_count,
            timing,
        }
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        chunk::expect_id(reader, chunk::HEADER_ID)?;
        let length = reader.read_u32()?;
        if length != 6 {
            return Err(inv_data(reader, FormatError::HeaderLength(length)));
        }
        let raw_format = reader.read_u16()?;
        let format = FormatType::try_from(raw_format)
            .map_err(|_| inv_data(reader, FormatError::UnsupportedFormat(raw_format)))?;
        let track_count = reader.read_u16()?;
        let division = reader.read_u16()?;
        let timing = Timing::from_division(division).map_err(|e| inv_data(reader, e))?;
        Self::new(format, track_count, timing).map_err(|e| inv_data(reader, e))
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&chunk::HEADER_ID);
        out.extend_from_slice(&6u32.to_be_bytes());
        out.extend_from_slice(&u16::from(self.format).to_be_bytes());
        out.extend_from_slice(&self.track_count.to_be_bytes());
        out.extend_from_slice(&self.timing.to_division().to_be_bytes());
    }

    /// Format 0 or 1
    pub const fn format(&self) -> FormatType {
        self.format
    }

    /// Number of `MTrk` chunks that follow
    pub const fn track_count(&self) -> u16 {
        self.track_count
    }

    /// Get the timing props
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }
}

#[test]
fn header_validation() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&[0, 0, 0, 6, 0, 2, 0, 1, 0, 96]);
    let err = MidiFileHeader::read(&mut Reader::from_byte_slice(&bytes)).unwrap_err();
    assert!(matches!(
        err.error_kind(),
        crate::reader::ReaderErrorKind::Format(FormatError::UnsupportedFormat(2))
    ));

    bytes[9] = 0;
    bytes[11] = 3;
    let err = MidiFileHeader::read(&mut Reader::from_byte_slice(&bytes)).unwrap_err();
    assert!(matches!(
        err.error_kind(),
        crate::reader::ReaderErrorKind::Format(FormatError::SingleTrackMismatch(3))
    ));
}

#[test]
fn header_round_trip() {
    let header = MidiFileHeader::new(
        FormatType::Simultaneous,
        3,
        Timing::new_ticks_per_quarter_note(480),
    )
    .unwrap();
    let mut bytes = Vec::new();
    header.write(&mut bytes);
    assert_eq!(bytes.len(), 14);
    assert_eq!(
        MidiFileHeader::read(&mut Reader::from_byte_slice(&bytes)).unwrap(),
        header
    );
}
