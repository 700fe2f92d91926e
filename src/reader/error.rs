use super::Reader;
use crate::{EncodingError, FormatError, transcode::TranscodeError, vlv::VlvError};
use thiserror::Error;

#[doc = r#"
A set of errors that can occur while reading bytes into a [`MidiFile`](crate::prelude::MidiFile)
"#]
#[derive(Debug, Error)]
#[error("Reading at Position {position}, {kind}")]
pub struct ReaderError {
    position: usize,
    pub(crate) kind: ReaderErrorKind,
}

/// A kind of error that a reader can produce
#[derive(Debug, Error)]
pub enum ReaderErrorKind {
    /// Chunk structure errors
    #[error("Format {0}")]
    Format(#[from] FormatError),
    /// Event stream errors
    #[error("Encoding {0}")]
    Encoding(#[from] EncodingError),
    /// Reading out of bounds.
    #[error("Read out of bounds!")]
    OutOfBounds,
    /// Textual input could not be turned into binary
    #[error("Transcoding {0}")]
    Transcode(#[from] TranscodeError),
    /// The byte source failed
    #[cfg(feature = "std")]
    #[error("IO {0}")]
    Io(#[from] std::io::Error),
}

impl From<VlvError> for ReaderErrorKind {
    fn from(value: VlvError) -> Self {
        match value {
            VlvError::Truncated => Self::OutOfBounds,
            other => Self::Encoding(EncodingError::Vlv(other)),
        }
    }
}

impl ReaderError {
    /// Create a reader error from a position and kind
    pub const fn new(position: usize, kind: ReaderErrorKind) -> Self {
        Self { position, kind }
    }
    /// True if out of bounds or unexpected end of file
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::OutOfBounds)
    }
    /// True if the chunk structure of the file was wrong
    pub const fn is_format_error(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::Format(_))
    }
    /// True if a track's event stream was malformed
    pub const fn is_encoding_error(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::Encoding(_))
    }
    /// Returns the error kind of the reader.
    pub fn error_kind(&self) -> &ReaderErrorKind {
        &self.kind
    }
    /// Returns the position where the read error occurred.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Create a new out of bounds error
    pub const fn oob(position: usize) -> Self {
        Self {
            position,
            kind: ReaderErrorKind::OutOfBounds,
        }
    }
}

/// The Read Result type (see [`ReaderError`])
pub type ReadResult<T> = Result<T, ReaderError>;

pub(crate) fn inv_data(reader: &mut Reader<'_>, v: impl Into<ReaderErrorKind>) -> ReaderError {
    reader.set_last_error_offset(reader.buffer_position());
    ReaderError::new(reader.buffer_position(), v.into())
}
