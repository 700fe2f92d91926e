use thiserror::Error;

use crate::vlv::VlvError;

#[doc = r#"
Structural problems with the chunks of a MIDI file.

These are raised while decoding the `MThd` header and the `MTrk` chunk headers.
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The four byte chunk identifier did not match
    #[error("Expected chunk {expected:?}, found {found:?}")]
    InvalidMagic {
        /// The identifier that should have been read
        expected: [u8; 4],
        /// What was actually in the file
        found: [u8; 4],
    },
    /// The header chunk must always be six bytes long
    #[error("Header length must be 6, found {0}")]
    HeaderLength(u32),
    /// Only format 0 and format 1 files are supported
    #[error("Unsupported MIDI file format type {0}")]
    UnsupportedFormat(u16),
    /// A format 0 file must contain exactly one track
    #[error("A format 0 file must hold exactly one track, header declares {0}")]
    SingleTrackMismatch(u16),
    /// The header declares no tracks at all
    #[error("The header declares zero tracks")]
    NoTracks,
    /// The SMPTE frame code in the division field is not -24, -25, -29 or -30
    #[error("Invalid SMPTE frames per second code {0}")]
    SmpteFps(i8),
}

#[doc = r#"
Errors found in the event stream of a track.
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A data byte was found where a status byte was expected,
    /// and there is no running status to fall back on
    #[error("Data byte {0:#04X} found without a running status")]
    NoRunningStatus(u8),
    /// Running status is not allowed to continue a meta or system exclusive message
    #[error("Running status is not allowed after status {status:#04X} (data byte {data:#04X})")]
    RunningStatusAfterSystem {
        /// The meta/sysex status that preceded the data byte
        status: u8,
        /// The offending data byte
        data: u8,
    },
    /// A status byte was found where a channel message parameter was expected
    #[error("Status byte {0:#04X} found where a data byte was expected")]
    UnexpectedStatus(u8),
    /// The status byte does not identify a message that can appear in a file
    #[error("Undefined status byte {0:#04X}")]
    UndefinedStatus(u8),
    /// A variable length value in the stream was malformed
    #[error("Variable length value: {0}")]
    Vlv(#[from] VlvError),
}

#[doc = r#"
Errors raised while encoding a [`MidiFile`](crate::prelude::MidiFile) to bytes.
"#]
#[derive(Debug, Error)]
pub enum WriteError {
    /// An event is earlier than the event that precedes it in its track
    #[error("Track {track}, event {index}: negative delta time {delta}")]
    NegativeDelta {
        /// Track container index
        track: usize,
        /// Event index in the track
        index: usize,
        /// The delta that would have been written
        delta: i64,
    },
    /// A value could not be stored as a variable length value
    #[error("Variable length value: {0}")]
    Vlv(#[from] VlvError),
    /// The track count does not fit in the 16 bit header field
    #[error("Too many tracks to write: {0}")]
    TooManyTracks(usize),
    /// A message had no bytes to write
    #[error("Track {track}, event {index}: empty message")]
    EmptyMessage {
        /// Track container index
        track: usize,
        /// Event index in the track
        index: usize,
    },
    /// A track chunk is longer than its 32 bit length field allows
    #[error("Track {track} is too long for a chunk")]
    TrackTooLong {
        /// Track container index
        track: usize,
    },
    /// Writing to the sink failed
    #[cfg(feature = "std")]
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

/// The Write Result type (see [`WriteError`])
pub type WriteResult<T> = Result<T, WriteError>;
