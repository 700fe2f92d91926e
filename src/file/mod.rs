#![doc = r#"
Rusty representation of a [`MidiFile`]

A [`MidiFile`] owns its [`Track`]s, the file's [`Timing`], and two pieces of
state describing how events are currently stored:

- [`TickState`]: event ticks are absolute, or relative to the previous event
  of the same track
- [`TrackState`]: one container per track, or every event joined into a single
  container

A tempo map for tick/second conversion is built on demand and discarded
whenever events, ticks or either state change.
"#]

pub mod builder;

mod header;
pub use header::*;

pub mod meta;

mod pairing;

mod state;
pub use state::*;

mod time_map;
pub use time_map::*;

mod timed_event_iter;
pub use timed_event_iter::*;

pub mod timing;
pub use timing::*;

mod track;
pub use track::*;

mod writer;

use crate::{
    EventId, MidiEvent,
    file::builder::MidiFileBuilder,
    message::{MetaType, MidiMessage},
    reader::{ReadResult, ReaderError, ReaderErrorKind},
    transcode::{HexTranscoder, TextTranscoder},
    vlv::VlvError,
};
use alloc::{borrow::Cow, vec::Vec};
use core::cell::OnceCell;

#[doc = r#"
A Standard MIDI File held in memory.

# Example
```rust
# use smfkit::prelude::*;
let mut file = MidiFile::new();
file.set_ticks_per_quarter_note(480);
file.add_track_name(0, 0, "Lead").unwrap();
file.add_note_on(1, 0, 0, 60, 100);
file.add_note_off(1, 480, 0, 60, 0);
assert_eq!(file.track_count(), 2);

file.join_tracks();
assert_eq!(file.track_count(), 1);
assert_eq!(file.track_count_as_type1(), 2);

file.split_tracks();
assert_eq!(file.track(1).unwrap().len(), 2);
```
"#]
#[derive(Debug, Clone)]
pub struct MidiFile {
    tracks: Vec<Track>,
    timing: Timing,
    tick_state: TickState,
    track_state: TrackState,
    next_event_id: u64,
    time_map: OnceCell<TimeMap>,
}

impl Default for MidiFile {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiFile {
    /// An empty file: one empty track, 120 ticks per quarter note, absolute
    /// ticks, split tracks.
    pub fn new() -> Self {
        Self {
            tracks: alloc::vec![Track::default()],
            timing: Timing::default(),
            tick_state: TickState::Absolute,
            track_state: TrackState::Split,
            next_event_id: 0,
            time_map: OnceCell::new(),
        }
    }

    pub(crate) fn from_decoded(tracks: Vec<Track>, timing: Timing, next_event_id: u64) -> Self {
        Self {
            tracks,
            timing,
            tick_state: TickState::Absolute,
            track_state: TrackState::Split,
            next_event_id,
            time_map: OnceCell::new(),
        }
    }

    /// Parse binary or textual MIDI data into a new file.
    ///
    /// Data that does not start with `MThd` is read as hex text through
    /// [`HexTranscoder`].
    pub fn parse<'a, B>(bytes: B) -> ReadResult<Self>
    where
        B: Into<Cow<'a, [u8]>>,
    {
        Self::parse_with(bytes, &HexTranscoder)
    }

    /// Parse binary MIDI data, or text converted by `transcoder`.
    pub fn parse_with<'a, B, T>(bytes: B, transcoder: &T) -> ReadResult<Self>
    where
        B: Into<Cow<'a, [u8]>>,
        T: TextTranscoder + ?Sized,
    {
        let bytes = bytes.into();
        if bytes.starts_with(&builder::chunk::HEADER_ID) {
            return MidiFileBuilder::new(bytes).build();
        }
        let binary = transcoder
            .transcode(&bytes)
            .map_err(|e| ReaderError::new(0, e.into()))?;
        MidiFileBuilder::new(binary).build()
    }

    /// Replace the contents of this file with parsed data.
    ///
    /// On failure the file is cleared to a single empty track.
    pub fn read(&mut self, bytes: &[u8]) -> ReadResult<()> {
        self.read_with(bytes, &HexTranscoder)
    }

    /// Like [`MidiFile::read`] with a custom text transcoder
    pub fn read_with<T>(&mut self, bytes: &[u8], transcoder: &T) -> ReadResult<()>
    where
        T: TextTranscoder + ?Sized,
    {
        match Self::parse_with(bytes, transcoder) {
            Ok(file) => {
                *self = file;
                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "Failed to read MIDI data");
                self.clear();
                Err(e)
            }
        }
    }

    /// Read everything from `source` and parse it into this file
    #[cfg(feature = "std")]
    pub fn read_from<R: std::io::Read>(&mut self, mut source: R) -> ReadResult<()> {
        let mut bytes = Vec::new();
        if let Err(e) = source.read_to_end(&mut bytes) {
            self.clear();
            return Err(ReaderError::new(bytes.len(), ReaderErrorKind::Io(e)));
        }
        self.read(&bytes)
    }

    /// Read a file from disk
    #[cfg(feature = "std")]
    pub fn read_path<P: AsRef<std::path::Path>>(&mut self, path: P) -> ReadResult<()> {
        match std::fs::File::open(path) {
            Ok(file) => self.read_from(std::io::BufReader::new(file)),
            Err(e) => {
                self.clear();
                Err(ReaderError::new(0, ReaderErrorKind::Io(e)))
            }
        }
    }

    /// Remove every event, leaving one empty split track with absolute ticks.
    ///
    /// The timing is kept.
    pub fn clear(&mut self) {
        self.tracks = alloc::vec![Track::default()];
        self.tick_state = TickState::Absolute;
        self.track_state = TrackState::Split;
        self.invalidate();
    }

    pub(crate) fn invalidate(&mut self) {
        self.time_map.take();
    }

    /// Returns header info
    pub const fn timing(&self) -> Timing {
        self.timing
    }

    /// Replace the timing
    pub fn set_timing(&mut self, timing: Timing) {
        self.timing = timing;
        self.invalidate();
    }

    /// Ticks per quarter note, or `None` with SMPTE timing
    pub const fn ticks_per_quarter_note(&self) -> Option<u16> {
        self.timing.ticks_per_quarter_note()
    }

    /// Use musical timing with the given resolution (1-32767)
    pub fn set_ticks_per_quarter_note(&mut self, ticks: u16) {
        self.set_timing(Timing::new_ticks_per_quarter_note(ticks));
    }

    /// Use SMPTE timing with one tick per millisecond
    pub fn set_millisecond_ticks(&mut self) {
        self.set_timing(Timing::milliseconds());
    }

    /// Number of track containers (1 while joined)
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// The number of tracks the file would have once split
    pub fn track_count_as_type1(&self) -> usize {
        match self.track_state {
            TrackState::Split => self.tracks.len(),
            TrackState::Joined => self.origin_track_count(),
        }
    }

    fn origin_track_count(&self) -> usize {
        self.tracks
            .iter()
            .flat_map(Track::iter)
            .map(|e| e.track + 1)
            .max()
            .unwrap_or(1)
    }

    /// All track containers
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// One track container
    pub fn track(&self, track: usize) -> Option<&Track> {
        self.tracks.get(track)
    }

    /// Number of events in a track container (0 if it does not exist)
    pub fn event_count(&self, track: usize) -> usize {
        self.track(track).map_or(0, Track::len)
    }

    /// Number of events in the whole file
    pub fn total_event_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    /// The event at `index` of `track`
    pub fn event(&self, track: usize, index: usize) -> Option<&MidiEvent> {
        self.tracks.get(track)?.event(index)
    }

    /// Mutable access to an event.
    ///
    /// Ticks written through this reference are read in the file's current
    /// tick state. The tempo map is discarded.
    pub fn event_mut(&mut self, track: usize, index: usize) -> Option<&mut MidiEvent> {
        self.invalidate();
        self.tracks.get_mut(track)?.event_mut(index)
    }

    /// Find an event by handle, returning its track and index
    pub fn locate(&self, id: EventId) -> Option<(usize, usize)> {
        self.tracks
            .iter()
            .enumerate()
            .find_map(|(t, track)| track.position(id).map(|i| (t, i)))
    }

    /// The event with the given handle
    pub fn event_by_id(&self, id: EventId) -> Option<&MidiEvent> {
        let (track, index) = self.locate(id)?;
        self.event(track, index)
    }

    /// Append an empty track, returning its index.
    ///
    /// While joined no container is created; the returned index is the next
    /// free origin track for events added to the joined container.
    pub fn add_track(&mut self) -> usize {
        match self.track_state {
            TrackState::Split => {
                self.tracks.push(Track::default());
                self.tracks.len() - 1
            }
            TrackState::Joined => self.origin_track_count(),
        }
    }

    /// Append `count` empty tracks, returning the index of the last one
    pub fn add_tracks(&mut self, count: usize) -> usize {
        match self.track_state {
            TrackState::Split => {
                self.tracks
                    .resize_with(self.tracks.len() + count, Track::default);
                self.tracks.len() - 1
            }
            TrackState::Joined => (self.origin_track_count() + count).saturating_sub(1),
        }
    }

    /// Remove a track. The last remaining track is never removed.
    ///
    /// Later tracks move down by one. Pairs with events of the removed track
    /// are unlinked. Returns false if nothing was removed.
    pub fn delete_track(&mut self, track: usize) -> bool {
        if track >= self.track_count_as_type1() || self.track_count_as_type1() < 2 {
            return false;
        }
        self.with_split_tracks(|file| {
            let removed = file.tracks.remove(track);
            for event in removed.iter() {
                if let Some(partner) = event.linked_id() {
                    file.clear_link_of(partner);
                }
            }
            file.renumber_tracks();
        });
        true
    }

    /// Move every event of `source` into `target` and remove `source`.
    ///
    /// The merged track is sorted. Tracks after `source` move down by one.
    /// This cannot be undone by splitting.
    pub fn merge_tracks(&mut self, target: usize, source: usize) -> bool {
        let count = self.track_count_as_type1();
        if target == source || target >= count || source >= count {
            return false;
        }
        self.with_split_tracks(|file| {
            file.with_absolute_ticks(|file| {
                let moved = file.tracks[source].take_events();
                file.tracks[target].extend(moved);
                file.tracks[target].sort();
                file.tracks.remove(source);
                file.renumber_tracks();
            });
        });
        true
    }

    /// Add an event, returning its handle.
    ///
    /// `tick` is read in the file's current tick state. While split, adding to
    /// a track past the end creates the missing tracks. While joined, the
    /// event goes to the joined container with `track` as its origin.
    pub fn add_event(&mut self, track: usize, tick: i64, message: MidiMessage) -> EventId {
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        let event = MidiEvent::new(id, tick, track, message);
        let container = match self.track_state {
            TrackState::Split => {
                if track >= self.tracks.len() {
                    self.tracks.resize_with(track + 1, Track::default);
                }
                track
            }
            TrackState::Joined => 0,
        };
        self.tracks[container].push(event);
        self.invalidate();
        id
    }

    /// Add a note-on
    pub fn add_note_on(
        &mut self,
        track: usize,
        tick: i64,
        channel: u8,
        key: u8,
        velocity: u8,
    ) -> EventId {
        self.add_event(track, tick, MidiMessage::note_on(channel, key, velocity))
    }

    /// Add a note-off
    pub fn add_note_off(
        &mut self,
        track: usize,
        tick: i64,
        channel: u8,
        key: u8,
        velocity: u8,
    ) -> EventId {
        self.add_event(track, tick, MidiMessage::note_off(channel, key, velocity))
    }

    /// Add a controller change
    pub fn add_controller(
        &mut self,
        track: usize,
        tick: i64,
        channel: u8,
        controller: u8,
        value: u8,
    ) -> EventId {
        self.add_event(
            track,
            tick,
            MidiMessage::controller(channel, controller, value),
        )
    }

    /// Add a program change
    pub fn add_patch_change(
        &mut self,
        track: usize,
        tick: i64,
        channel: u8,
        program: u8,
    ) -> EventId {
        self.add_event(track, tick, MidiMessage::patch_change(channel, program))
    }

    /// Add a pitch bend, `-1.0..=1.0` with 0 centered
    pub fn add_pitch_bend(&mut self, track: usize, tick: i64, channel: u8, amount: f64) -> EventId {
        self.add_event(track, tick, MidiMessage::pitch_bend(channel, amount))
    }

    /// Add a tempo change in quarter notes per minute
    pub fn add_tempo(&mut self, track: usize, tick: i64, bpm: f64) -> EventId {
        self.add_event(track, tick, MidiMessage::tempo(bpm))
    }

    /// Add a time signature, with 24 clocks per click and 8 thirty-seconds per quarter
    pub fn add_time_signature(
        &mut self,
        track: usize,
        tick: i64,
        numerator: u8,
        denominator: u8,
    ) -> EventId {
        self.add_event(
            track,
            tick,
            MidiMessage::time_signature(numerator, denominator, 24, 8),
        )
    }

    /// Add a key signature; negative `sharps` count flats
    pub fn add_key_signature(
        &mut self,
        track: usize,
        tick: i64,
        sharps: i8,
        minor: bool,
    ) -> EventId {
        self.add_event(track, tick, MidiMessage::key_signature(sharps, minor))
    }

    /// Add a meta message with an arbitrary type and payload
    pub fn add_meta(
        &mut self,
        track: usize,
        tick: i64,
        meta_type: u8,
        data: &[u8],
    ) -> Result<EventId, VlvError> {
        let message = MidiMessage::meta(meta_type, data)?;
        Ok(self.add_event(track, tick, message))
    }

    fn add_text_of(
        &mut self,
        meta_type: MetaType,
        track: usize,
        tick: i64,
        text: &str,
    ) -> Result<EventId, VlvError> {
        let message = MidiMessage::text(meta_type, text)?;
        Ok(self.add_event(track, tick, message))
    }

    /// Add a free text meta message
    pub fn add_text(&mut self, track: usize, tick: i64, text: &str) -> Result<EventId, VlvError> {
        self.add_text_of(MetaType::Text, track, tick, text)
    }

    /// Add a copyright notice
    pub fn add_copyright(
        &mut self,
        track: usize,
        tick: i64,
        text: &str,
    ) -> Result<EventId, VlvError> {
        self.add_text_of(MetaType::Copyright, track, tick, text)
    }

    /// Add a track name
    pub fn add_track_name(
        &mut self,
        track: usize,
        tick: i64,
        name: &str,
    ) -> Result<EventId, VlvError> {
        self.add_text_of(MetaType::TrackName, track, tick, name)
    }

    /// Add a marker
    pub fn add_marker(&mut self, track: usize, tick: i64, text: &str) -> Result<EventId, VlvError> {
        self.add_text_of(MetaType::Marker, track, tick, text)
    }

    /// Add a lyric
    pub fn add_lyric(&mut self, track: usize, tick: i64, text: &str) -> Result<EventId, VlvError> {
        self.add_text_of(MetaType::Lyric, track, tick, text)
    }

    /// Add a system exclusive message. The payload normally ends with `F7`.
    pub fn add_sysex(&mut self, track: usize, tick: i64, payload: &[u8]) -> EventId {
        self.add_event(track, tick, MidiMessage::sysex(payload))
    }

    /// Add an explicit end-of-track.
    ///
    /// Writing always ends each track with one; an explicit one only sets
    /// where the track ends.
    pub fn add_end_of_track(&mut self, track: usize, tick: i64) -> EventId {
        self.add_event(track, tick, MidiMessage::end_of_track())
    }

    /// Remove an event, unlinking its partner
    pub fn remove_event(&mut self, track: usize, index: usize) -> Option<MidiEvent> {
        let mut event = self.tracks.get_mut(track)?.remove(index)?;
        if let Some(partner) = event.linked_id() {
            self.clear_link_of(partner);
            event.set_link(None);
        }
        self.invalidate();
        Some(event)
    }

    /// Absolute tick of an event, whatever the tick state
    pub fn absolute_tick_of(&self, track: usize, index: usize) -> Option<i64> {
        let container = self.tracks.get(track)?;
        container.event(index)?;
        Some(match self.tick_state {
            TickState::Absolute => container.events()[index].tick,
            TickState::Delta => container.events()[..=index].iter().map(|e| e.tick).sum(),
        })
    }

    /// Absolute ticks of every event of a container, in container order
    pub(crate) fn absolute_ticks_of(&self, track: usize) -> Vec<i64> {
        let Some(container) = self.tracks.get(track) else {
            return Vec::new();
        };
        match self.tick_state {
            TickState::Absolute => container.iter().map(|e| e.tick).collect(),
            TickState::Delta => container
                .iter()
                .scan(0, |total, e| {
                    *total += e.tick;
                    Some(*total)
                })
                .collect(),
        }
    }

    /// The largest absolute tick of any event
    pub fn file_duration_in_ticks(&self) -> i64 {
        (0..self.tracks.len())
            .filter_map(|t| self.absolute_ticks_of(t).into_iter().max())
            .max()
            .unwrap_or(0)
    }

    /// Seconds at the last event of the file
    pub fn file_duration_in_seconds(&self) -> f64 {
        self.time_map().duration()
    }

    /// The tempo map, built if needed
    pub fn time_map(&self) -> &TimeMap {
        self.time_map.get_or_init(|| {
            let mut items: Vec<(i64, u64, u8, Option<u32>)> =
                Vec::with_capacity(self.total_event_count());
            for (t, track) in self.tracks.iter().enumerate() {
                let ticks = self.absolute_ticks_of(t);
                items.extend(track.iter().zip(ticks).map(|(e, tick)| {
                    (tick, e.seq, e.message.sort_rank(), e.message.tempo_micros())
                }));
            }
            items.sort_by_key(|&(tick, seq, rank, _)| (tick, seq, rank));
            TimeMap::build(
                &self.timing,
                items
                    .into_iter()
                    .map(|(tick, _, _, tempo)| TimedItem { tick, tempo }),
            )
        })
    }

    /// Seconds at an absolute tick, or `None` outside the file's events
    pub fn time_in_seconds(&self, tick: i64) -> Option<f64> {
        self.time_map().seconds_at(tick)
    }

    /// Absolute tick at a time in seconds, or `None` outside the file's events
    pub fn absolute_tick_time(&self, seconds: f64) -> Option<i64> {
        self.time_map().tick_at(seconds)
    }

    /// Seconds at which an event sounds
    pub fn time_in_seconds_of(&self, track: usize, index: usize) -> Option<f64> {
        self.time_in_seconds(self.absolute_tick_of(track, index)?)
    }

    /// Fill in [`MidiEvent::seconds`] for every event
    pub fn do_time_analysis(&mut self) {
        let seconds: Vec<Vec<f64>> = (0..self.tracks.len())
            .map(|t| {
                self.absolute_ticks_of(t)
                    .into_iter()
                    .map(|tick| self.time_in_seconds(tick).unwrap_or(0.))
                    .collect()
            })
            .collect();
        for (track, times) in self.tracks.iter_mut().zip(seconds) {
            for (event, time) in track.events_mut().iter_mut().zip(times) {
                event.seconds = time;
            }
        }
    }
}
