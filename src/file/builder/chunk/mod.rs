#![doc = r#"
Chunk framing

A MIDI file is a sequence of chunks, each a four character identifier, a
big-endian `u32` length and that many bytes.

```text
[Header Chunk: "MThd"]
[Track Chunk 1: "MTrk"]
...
[Track Chunk N: "MTrk"]
```

The header chunk always has a fixed length of 6 bytes. Track lengths are
read but not trusted: a track ends at its end-of-track message, or where the
bytes run out.
"#]

use crate::{
    FormatError,
    reader::{ReadResult, Reader, inv_data},
};

/// `MThd`
pub const HEADER_ID: [u8; 4] = *b"MThd";
/// `MTrk`
pub const TRACK_ID: [u8; 4] = *b"MTrk";

/// The eight byte preamble of a track chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackChunkHeader {
    length: u32,
}

impl TrackChunkHeader {
    pub(crate) fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        expect_id(reader, TRACK_ID)?;
        let length = reader.read_u32()?;
        Ok(Self { length })
    }

    /// The byte length the chunk declares
    pub const fn len(&self) -> u32 {
        self.length
    }

    /// True if the declared length is zero
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}

pub(crate) fn expect_id(reader: &mut Reader<'_>, expected: [u8; 4]) -> ReadResult<()> {
    let found: [u8; 4] = reader.read_exact_size()?;
    if found != expected {
        return Err(inv_data(
            reader,
            FormatError::InvalidMagic { expected, found },
        ));
    }
    Ok(())
}

#[test]
fn wrong_chunk_id() {
    let mut reader = Reader::from_byte_slice(b"MTrx\0\0\0\0");
    let err = TrackChunkHeader::read(&mut reader).unwrap_err();
    assert!(err.is_format_error());

    let mut reader = Reader::from_byte_slice(b"MTrk\0\0\0\x04");
    assert_eq!(TrackChunkHeader::read(&mut reader).unwrap().len(), 4);
}
