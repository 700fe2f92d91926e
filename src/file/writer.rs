#![doc = r#"
Encoding a [`MidiFile`] back into Standard MIDI File bytes.

Each container becomes one `MTrk` chunk. Events are written in container
order with their delta ticks, without running status. End-of-track messages
inside a container are dropped and a single one is written last, at the
latest end-of-track tick or the last event, whichever is later.
"#]

use crate::{
    WriteError, WriteResult,
    file::{MidiFile, MidiFileHeader, builder::chunk::TRACK_ID},
    message::MidiMessage,
    vlv,
};
use alloc::{format, string::String, vec::Vec};

impl MidiFile {
    /// Encode the file.
    ///
    /// One container is written as format 0, more as format 1. A joined file
    /// is written as its single container.
    pub fn to_bytes(&self) -> WriteResult<Vec<u8>> {
        let count = self.tracks.len();
        let track_count = u16::try_from(count).map_err(|_| WriteError::TooManyTracks(count))?;

        let mut out = Vec::with_capacity(14 + self.total_event_count() * 4);
        MidiFileHeader::for_tracks(track_count, self.timing).write(&mut out);
        let mut body = Vec::new();
        for track in 0..count {
            body.clear();
            self.encode_track(track, &mut body)?;
            let length =
                u32::try_from(body.len()).map_err(|_| WriteError::TrackTooLong { track })?;
            out.extend_from_slice(&TRACK_ID);
            out.extend_from_slice(&length.to_be_bytes());
            out.extend_from_slice(&body);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            tracks = count,
            events = self.total_event_count(),
            bytes = out.len(),
            "Encoded MIDI file"
        );
        Ok(out)
    }

    fn encode_track(&self, track: usize, out: &mut Vec<u8>) -> WriteResult<()> {
        let ticks = self.absolute_ticks_of(track);
        let Some(container) = self.track(track) else {
            return Ok(());
        };
        let mut previous = 0;
        let mut end_tick = 0;
        for (index, (event, tick)) in container.iter().zip(ticks).enumerate() {
            if event.message.is_end_of_track() {
                end_tick = end_tick.max(tick);
                continue;
            }
            write_delta(tick - previous, track, index, out)?;
            previous = tick;
            write_message(&event.message, track, index, out)?;
        }
        write_delta((end_tick - previous).max(0), track, container.len(), out)?;
        out.extend_from_slice(MidiMessage::end_of_track().bytes());
        Ok(())
    }

    /// Write the encoded file to `sink`
    #[cfg(feature = "std")]
    pub fn write_to<W: std::io::Write>(&self, mut sink: W) -> WriteResult<()> {
        let bytes = self.to_bytes()?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }

    /// Write the encoded file to disk
    #[cfg(feature = "std")]
    pub fn write_path<P: AsRef<std::path::Path>>(&self, path: P) -> WriteResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
    }

    /// The encoded file as lowercase hex pairs, `width` bytes per line.
    ///
    /// A width of 0 puts everything on one line. The output reads back
    /// through [`MidiFile::parse`].
    pub fn hex_dump(&self, width: usize) -> WriteResult<String> {
        let bytes = self.to_bytes()?;
        let mut text = String::with_capacity(bytes.len() * 3 + 1);
        for (i, byte) in bytes.iter().enumerate() {
            if i > 0 {
                let wrap = width > 0 && i % width == 0;
                text.push(if wrap { '\n' } else { ' ' });
            }
            text.push_str(&format!("{byte:02x}"));
        }
        text.push('\n');
        Ok(text)
    }
}

fn write_delta(delta: i64, track: usize, index: usize, out: &mut Vec<u8>) -> WriteResult<()> {
    let value = u32::try_from(delta).map_err(|_| {
        if delta < 0 {
            WriteError::NegativeDelta {
                track,
                index,
                delta,
            }
        } else {
            WriteError::Vlv(vlv::VlvError::TooLarge(delta as u64))
        }
    })?;
    vlv::write(value, out)?;
    Ok(())
}

fn write_message(
    message: &MidiMessage,
    track: usize,
    index: usize,
    out: &mut Vec<u8>,
) -> WriteResult<()> {
    let bytes = message.bytes();
    let Some((&status, payload)) = bytes.split_first() else {
        return Err(WriteError::EmptyMessage { track, index });
    };
    if message.is_sysex() {
        // the stored form has no length; it is derived from the payload
        out.push(status);
        let len = u32::try_from(payload.len())
            .map_err(|_| vlv::VlvError::TooLarge(payload.len() as u64))?;
        vlv::write(len, out)?;
        out.extend_from_slice(payload);
    } else {
        out.extend_from_slice(bytes);
    }
    Ok(())
}

#[test]
fn end_of_track_is_normalized() {
    let mut file = MidiFile::new();
    file.add_end_of_track(0, 5);
    file.add_note_on(0, 10, 0, 60, 100);
    file.add_note_off(0, 20, 0, 60, 0);
    let bytes = file.to_bytes().unwrap();
    assert_eq!(
        &bytes[14..],
        &[
            b'M', b'T', b'r', b'k', 0, 0, 0, 12, //
            10, 0x90, 60, 100, //
            10, 0x80, 60, 0, //
            0, 0xFF, 0x2F, 0x00,
        ]
    );
}

#[test]
fn late_end_of_track_keeps_its_tick() {
    let mut file = MidiFile::new();
    file.add_note_on(0, 0, 0, 60, 100);
    file.add_end_of_track(0, 96);
    let bytes = file.to_bytes().unwrap();
    assert_eq!(&bytes[bytes.len() - 4..], &[0x60, 0xFF, 0x2F, 0x00]);
}

#[test]
fn negative_delta_is_rejected() {
    let mut file = MidiFile::new();
    file.add_note_on(0, 10, 0, 60, 100);
    file.add_note_off(0, 5, 0, 60, 0);
    let err = file.to_bytes().unwrap_err();
    assert!(matches!(
        err,
        WriteError::NegativeDelta {
            track: 0,
            index: 1,
            delta: -5
        }
    ));
}

#[test]
fn sysex_length_is_derived() {
    let mut file = MidiFile::new();
    file.add_sysex(0, 0, &[0x7E, 0x7F, 0x09, 0x01, 0xF7]);
    let bytes = file.to_bytes().unwrap();
    assert_eq!(&bytes[22..29], &[0x00, 0xF0, 0x05, 0x7E, 0x7F, 0x09, 0x01]);
}

#[test]
fn hex_dump_wraps() {
    let file = MidiFile::new();
    let dump = file.hex_dump(8).unwrap();
    let mut lines = dump.lines();
    assert_eq!(lines.next(), Some("4d 54 68 64 00 00 00 06"));
    assert_eq!(lines.next(), Some("00 00 00 01 00 78 4d 54"));
    assert!(dump.ends_with("ff 2f 00\n"));
}
