#![doc = r#"
The decoding state machine behind [`MidiFile::parse`].

```text
HeaderPending -> TrackHeaderPending -> TrackBodyPending -> ... -> Done
```

Each call to [`MidiFileBuilder::step`] moves the machine forward by one
chunk header or one event. Any error ends decoding; the partially built
tracks are dropped with the builder.
"#]

pub mod chunk;

use crate::{
    EventId, MidiEvent,
    file::{
        MidiFile, MidiFileHeader, Track, builder::chunk::TrackChunkHeader, timing::Timing,
    },
    message::MidiMessage,
    reader::{ReadResult, Reader},
};
use alloc::{borrow::Cow, vec::Vec};

/// Where the decoder is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Nothing has been read
    HeaderPending,
    /// The next bytes are an `MTrk` preamble
    TrackHeaderPending,
    /// Reading the events of a track
    TrackBodyPending,
    /// Every declared track has been read
    Done,
}

/// Decodes a binary Standard MIDI File into a [`MidiFile`].
pub struct MidiFileBuilder<'a> {
    reader: Reader<'a>,
    stage: DecodeStage,
    timing: Timing,
    track_count: usize,
    tracks: Vec<Track>,
    running_status: Option<u8>,
    tick: i64,
    next_id: u64,
}

impl<'a> MidiFileBuilder<'a> {
    /// Start decoding the given bytes
    pub fn new<B>(bytes: B) -> Self
    where
        B: Into<Cow<'a, [u8]>>,
    {
        Self {
            reader: Reader::from_bytes(bytes),
            stage: DecodeStage::HeaderPending,
            timing: Timing::default(),
            track_count: 0,
            tracks: Vec::new(),
            running_status: None,
            tick: 0,
            next_id: 0,
        }
    }

    /// The current stage
    pub const fn stage(&self) -> DecodeStage {
        self.stage
    }

    /// Byte offset of the decoder
    pub const fn position(&self) -> usize {
        self.reader.buffer_position()
    }

    /// Advance by one chunk header or one event
    pub fn step(&mut self) -> ReadResult<DecodeStage> {
        match self.stage {
            DecodeStage::HeaderPending => self.read_header()?,
            DecodeStage::TrackHeaderPending => self.read_track_header()?,
            DecodeStage::TrackBodyPending => self.read_event()?,
            DecodeStage::Done => {}
        }
        Ok(self.stage)
    }

    /// Run to completion
    pub fn build(mut self) -> ReadResult<MidiFile> {
        while self.step()? != DecodeStage::Done {}
        let mut file = MidiFile::from_decoded(self.tracks, self.timing, self.next_id);
        file.mark_sequence();
        Ok(file)
    }

    fn read_header(&mut self) -> ReadResult<()> {
        let header = MidiFileHeader::read(&mut self.reader)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            format = ?header.format(),
            tracks = header.track_count(),
            timing = ?header.timing(),
            "Read MIDI file header"
        );
        self.timing = *header.timing();
        self.track_count = header.track_count() as usize;
        self.tracks = Vec::with_capacity(self.track_count);
        self.stage = DecodeStage::TrackHeaderPending;
        Ok(())
    }

    fn read_track_header(&mut self) -> ReadResult<()> {
        let header = TrackChunkHeader::read(&mut self.reader)?;
        // one event takes at least three bytes
        let hint = (header.len() as usize / 3).min(self.reader.remaining());
        self.tracks.push(Track::with_capacity(hint));
        self.running_status = None;
        self.tick = 0;
        self.stage = DecodeStage::TrackBodyPending;
        Ok(())
    }

    fn read_event(&mut self) -> ReadResult<()> {
        let track_index = self.tracks.len() - 1;
        if self.reader.is_at_end() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                track = track_index,
                "Track ended without an end-of-track message"
            );
            self.push(track_index, MidiMessage::end_of_track());
            return self.finish_track();
        }

        let delta = self.reader.read_vlv()?;
        self.tick += delta as i64;
        let message = self.reader.read_message(&mut self.running_status)?;
        let end = message.is_end_of_track();
        self.push(track_index, message);
        if end {
            self.finish_track()?;
        }
        Ok(())
    }

    fn push(&mut self, track_index: usize, message: MidiMessage) {
        let event = MidiEvent::new(EventId(self.next_id), self.tick, track_index, message);
        self.next_id += 1;
        self.tracks[track_index].push(event);
    }

    fn finish_track(&mut self) -> ReadResult<()> {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            track = self.tracks.len() - 1,
            events = self.tracks.last().map(Track::len),
            end_tick = self.tick,
            "Decoded track"
        );
        self.stage = if self.tracks.len() == self.track_count {
            DecodeStage::Done
        } else {
            DecodeStage::TrackHeaderPending
        };
        #[cfg(feature = "tracing")]
        if self.stage == DecodeStage::Done && !self.reader.is_at_end() {
            tracing::debug!(
                trailing = self.reader.remaining(),
                "Ignoring bytes after the last track"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
fn single_track(body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
    bytes.extend_from_slice(b"MTrk");
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}

#[test]
fn stages_advance_per_event() {
    let bytes = single_track(&[0x00, 0x90, 60, 100, 0x10, 60, 0, 0x00, 0xFF, 0x2F, 0x00]);
    let mut builder = MidiFileBuilder::new(&bytes[..]);
    assert_eq!(builder.step().unwrap(), DecodeStage::TrackHeaderPending);
    assert_eq!(builder.step().unwrap(), DecodeStage::TrackBodyPending);
    assert_eq!(builder.step().unwrap(), DecodeStage::TrackBodyPending);
    assert_eq!(builder.step().unwrap(), DecodeStage::TrackBodyPending);
    assert_eq!(builder.step().unwrap(), DecodeStage::Done);
    assert_eq!(builder.step().unwrap(), DecodeStage::Done);
}

#[test]
fn exhausted_track_gets_end_of_track() {
    let bytes = single_track(&[0x00, 0x90, 60, 100, 0x10, 0x80, 60, 0]);
    let file = MidiFileBuilder::new(bytes).build().unwrap();
    let track = file.track(0).unwrap();
    assert_eq!(track.len(), 3);
    assert!(track.ends_with_end_of_track());
    assert_eq!(track.last().unwrap().tick, 16);
}

#[test]
fn missing_track_is_out_of_bounds() {
    let mut bytes = single_track(&[0x00, 0xFF, 0x2F, 0x00]);
    // claim a second track that never arrives
    bytes[9] = 1;
    bytes[11] = 2;
    let err = MidiFileBuilder::new(bytes).build().unwrap_err();
    assert!(err.is_out_of_bounds());
}
