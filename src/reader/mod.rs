#![doc = r#"
A cursor over the bytes of a MIDI file.

The [`Reader`] knows how to pull the primitive pieces of a Standard MIDI File
out of a buffer: fixed size big-endian integers, chunk identifiers, variable
length values and whole messages (following running status). The chunk level
state machine lives in [`MidiFileBuilder`](crate::file::builder::MidiFileBuilder).
"#]

mod error;
pub use error::*;

use crate::{EncodingError, message::MidiMessage, vlv};
use alloc::{borrow::Cow, vec::Vec};

/// Reads primitive values out of a MIDI byte buffer.
pub struct Reader<'a> {
    data: Cow<'a, [u8]>,
    position: usize,
    last_error_offset: Option<usize>,
}

impl<'a> Reader<'a> {
    /// Create a reader over owned or borrowed bytes
    pub fn from_bytes<B>(bytes: B) -> Self
    where
        B: Into<Cow<'a, [u8]>>,
    {
        Self {
            data: bytes.into(),
            position: 0,
            last_error_offset: None,
        }
    }

    /// Create a reader over a borrowed slice
    pub const fn from_byte_slice(bytes: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(bytes),
            position: 0,
            last_error_offset: None,
        }
    }

    /// The offset of the next byte to be read
    pub const fn buffer_position(&self) -> usize {
        self.position
    }

    /// Where the last error was raised, if any
    pub const fn last_error_offset(&self) -> Option<usize> {
        self.last_error_offset
    }

    pub(crate) const fn set_last_error_offset(&mut self, offset: usize) {
        self.last_error_offset = Some(offset);
    }

    /// True if every byte has been consumed
    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Look at the next byte without consuming it
    pub fn peek_next(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    /// Consume one byte
    pub fn read_next(&mut self) -> ReadResult<u8> {
        let byte = self
            .peek_next()
            .ok_or_else(|| ReaderError::oob(self.position))?;
        self.position += 1;
        Ok(byte)
    }

    /// Consume `len` bytes
    pub fn read_slice(&mut self, len: usize) -> ReadResult<&[u8]> {
        let start = self.position;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| ReaderError::oob(self.data.len()))?;
        self.position = end;
        Ok(&self.data[start..end])
    }

    /// Consume exactly `N` bytes into an array
    pub fn read_exact_size<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let slice = self.read_slice(N)?;
        let mut out = [0; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Big-endian `u16`
    pub fn read_u16(&mut self) -> ReadResult<u16> {
        self.read_exact_size().map(u16::from_be_bytes)
    }

    /// Big-endian `u32`
    pub fn read_u32(&mut self) -> ReadResult<u32> {
        self.read_exact_size().map(u32::from_be_bytes)
    }

    /// Consume a variable length value
    pub fn read_vlv(&mut self) -> ReadResult<u32> {
        let start = self.position;
        match vlv::decode(&self.data[start.min(self.data.len())..]) {
            Ok((value, len)) => {
                self.position += len;
                Ok(value)
            }
            Err(e) => {
                let kind = ReaderErrorKind::from(e);
                if matches!(kind, ReaderErrorKind::OutOfBounds) {
                    self.position = self.data.len();
                }
                Err(inv_data(self, kind))
            }
        }
    }

    /// Read one message from a track body.
    ///
    /// `running_status` holds the status byte of the previous message in the track and
    /// is updated with the status of the message that was read. A data byte in status
    /// position reuses it, which is only legal for channel messages.
    pub fn read_message(&mut self, running_status: &mut Option<u8>) -> ReadResult<MidiMessage> {
        let first = self.read_next()?;

        let (status, running) = if first >= 0x80 {
            (first, false)
        } else {
            match *running_status {
                None => return Err(inv_data(self, EncodingError::NoRunningStatus(first))),
                Some(status) if status >= 0xF0 => {
                    return Err(inv_data(
                        self,
                        EncodingError::RunningStatusAfterSystem {
                            status,
                            data: first,
                        },
                    ));
                }
                Some(status) => (status, true),
            }
        };

        let mut bytes = Vec::with_capacity(3);
        bytes.push(status);
        if running {
            bytes.push(first);
        }

        match status & 0xF0 {
            0x80 | 0x90 | 0xA0 | 0xB0 | 0xE0 => {
                let needed = if running { 1 } else { 2 };
                bytes.extend_from_slice(self.read_slice(needed)?);
                check_data_bytes(self, &bytes)?;
            }
            0xC0 | 0xD0 => {
                if !running {
                    bytes.push(self.read_next()?);
                }
                check_data_bytes(self, &bytes)?;
            }
            _ => match status {
                0xFF => {
                    let meta_type = self.read_next()?;
                    let len = self.read_vlv()?;
                    bytes.push(meta_type);
                    vlv::write(len, &mut bytes).map_err(|e| inv_data(self, e))?;
                    bytes.extend_from_slice(self.read_slice(len as usize)?);
                }
                0xF0 | 0xF7 => {
                    let len = self.read_vlv()?;
                    bytes.extend_from_slice(self.read_slice(len as usize)?);
                }
                other => return Err(inv_data(self, EncodingError::UndefinedStatus(other))),
            },
        }

        *running_status = Some(status);
        Ok(MidiMessage::from_bytes_unchecked(bytes))
    }
}

/// Channel message parameters are seven bit
fn check_data_bytes(reader: &mut Reader<'_>, bytes: &[u8]) -> ReadResult<()> {
    match bytes[1..].iter().find(|b| **b >= 0x80) {
        Some(&byte) => Err(inv_data(reader, EncodingError::UnexpectedStatus(byte))),
        None => Ok(()),
    }
}

#[test]
fn running_status_reuses_previous_command() {
    let mut reader = Reader::from_byte_slice(&[0x90, 60, 100, 62, 90]);
    let mut status = None;
    let first = reader.read_message(&mut status).unwrap();
    let second = reader.read_message(&mut status).unwrap();
    assert_eq!(first.bytes(), [0x90, 60, 100]);
    assert_eq!(second.bytes(), [0x90, 62, 90]);
    assert!(reader.is_at_end());
}

#[test]
fn running_status_after_meta_is_rejected() {
    let mut reader = Reader::from_byte_slice(&[0xFF, 0x01, 0x01, b'a', 0x3C, 0x40]);
    let mut status = None;
    reader.read_message(&mut status).unwrap();
    let err = reader.read_message(&mut status).unwrap_err();
    assert!(err.is_encoding_error());
}

#[test]
fn data_byte_without_status_is_rejected() {
    let mut reader = Reader::from_byte_slice(&[0x3C, 0x40]);
    let err = reader.read_message(&mut None).unwrap_err();
    assert!(matches!(
        err.error_kind(),
        ReaderErrorKind::Encoding(EncodingError::NoRunningStatus(0x3C))
    ));
}

#[test]
fn one_parameter_commands() {
    let mut reader = Reader::from_byte_slice(&[0xC2, 0x05, 0x07, 0xD2, 0x40]);
    let mut status = None;
    assert_eq!(reader.read_message(&mut status).unwrap().bytes(), [0xC2, 0x05]);
    assert_eq!(reader.read_message(&mut status).unwrap().bytes(), [0xC2, 0x07]);
    assert_eq!(reader.read_message(&mut status).unwrap().bytes(), [0xD2, 0x40]);
}

#[test]
fn sysex_keeps_marker_and_drops_length() {
    let mut reader = Reader::from_byte_slice(&[0xF0, 0x03, 0x43, 0x12, 0xF7]);
    let message = reader.read_message(&mut None).unwrap();
    assert_eq!(message.bytes(), [0xF0, 0x43, 0x12, 0xF7]);
}

#[test]
fn truncated_message_is_out_of_bounds() {
    let mut reader = Reader::from_byte_slice(&[0x90, 0x3C]);
    assert!(reader.read_message(&mut None).unwrap_err().is_out_of_bounds());

    let mut reader = Reader::from_byte_slice(&[0xFF, 0x03, 0x05, b'a']);
    assert!(reader.read_message(&mut None).unwrap_err().is_out_of_bounds());
}

#[test]
fn status_byte_in_parameter_position() {
    let mut reader = Reader::from_byte_slice(&[0x9F, 0xFF, 0x40]);
    let err = reader.read_message(&mut None).unwrap_err();
    assert!(matches!(
        err.error_kind(),
        ReaderErrorKind::Encoding(EncodingError::UnexpectedStatus(0xFF))
    ));

    let mut reader = Reader::from_byte_slice(&[0x90, 60, 100, 62, 0x80]);
    let mut status = None;
    reader.read_message(&mut status).unwrap();
    let err = reader.read_message(&mut status).unwrap_err();
    assert!(matches!(
        err.error_kind(),
        ReaderErrorKind::Encoding(EncodingError::UnexpectedStatus(0x80))
    ));
}

#[test]
fn undefined_status() {
    let mut reader = Reader::from_byte_slice(&[0xF4, 0x00]);
    let err = reader.read_message(&mut None).unwrap_err();
    assert!(matches!(
        err.error_kind(),
        ReaderErrorKind::Encoding(EncodingError::UndefinedStatus(0xF4))
    ));
}
