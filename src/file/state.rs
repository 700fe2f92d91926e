use crate::file::{MidiFile, Track};
use alloc::vec::Vec;

/// How event ticks are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickState {
    /// Ticks since the start of the file
    #[default]
    Absolute,
    /// Ticks since the previous event of the same container
    Delta,
}

/// How events are grouped into containers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackState {
    /// One container per track
    #[default]
    Split,
    /// Every event in a single container, in playback order
    Joined,
}

impl MidiFile {
    /// Current tick state
    pub const fn tick_state(&self) -> TickState {
        self.tick_state
    }

    /// Current track state
    pub const fn track_state(&self) -> TrackState {
        self.track_state
    }

    /// True if ticks are absolute
    pub fn is_absolute_ticks(&self) -> bool {
        self.tick_state == TickState::Absolute
    }

    /// True if ticks are deltas
    pub fn is_delta_ticks(&self) -> bool {
        self.tick_state == TickState::Delta
    }

    /// True if every event is in one container
    pub fn is_joined(&self) -> bool {
        self.track_state == TrackState::Joined
    }

    /// True if there is one container per track
    pub fn is_split(&self) -> bool {
        self.track_state == TrackState::Split
    }

    /// Store each tick as the distance from the previous event of its container
    pub fn delta_ticks(&mut self) {
        if self.tick_state == TickState::Delta {
            return;
        }
        for track in &mut self.tracks {
            let mut previous = 0;
            for event in track.events_mut() {
                let absolute = event.tick;
                event.tick -= previous;
                previous = absolute;
            }
        }
        self.tick_state = TickState::Delta;
        self.invalidate();
    }

    /// Store each tick as the distance from the start of the file
    pub fn absolute_ticks(&mut self) {
        if self.tick_state == TickState::Absolute {
            return;
        }
        for track in &mut self.tracks {
            let mut total = 0;
            for event in track.events_mut() {
                total += event.tick;
                event.tick = total;
            }
        }
        self.tick_state = TickState::Absolute;
        self.invalidate();
    }

    /// Run `f` with absolute ticks, then restore the previous tick state
    pub(crate) fn with_absolute_ticks<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.tick_state;
        self.absolute_ticks();
        let result = f(self);
        if previous == TickState::Delta {
            self.delta_ticks();
        }
        result
    }

    /// Run `f` with split tracks, then rejoin if the file was joined
    pub(crate) fn with_split_tracks<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.track_state;
        self.split_tracks();
        let result = f(self);
        if previous == TrackState::Joined {
            self.join_tracks();
        }
        self.invalidate();
        result
    }

    /// Move every event into a single container, sorted into playback order.
    ///
    /// Each event keeps its origin track, so [`MidiFile::split_tracks`] can undo this.
    pub fn join_tracks(&mut self) {
        if self.track_state == TrackState::Joined {
            return;
        }
        self.with_absolute_ticks(|file| {
            let mut joined = Track::with_capacity(file.total_event_count());
            for (index, track) in file.tracks.iter_mut().enumerate() {
                let mut events = track.take_events();
                for event in &mut events {
                    event.track = index;
                }
                joined.extend(events);
            }
            joined.sort();
            file.tracks = alloc::vec![joined];
            file.track_state = TrackState::Joined;
        });
        #[cfg(feature = "tracing")]
        tracing::trace!(events = self.total_event_count(), "Joined tracks");
        self.invalidate();
    }

    /// Distribute the events of the joined container back to their origin tracks
    pub fn split_tracks(&mut self) {
        if self.track_state == TrackState::Split {
            return;
        }
        let count = self.origin_track_count();
        self.with_absolute_ticks(|file| {
            let mut tracks: Vec<Track> = (0..count).map(|_| Track::default()).collect();
            for mut container in core::mem::take(&mut file.tracks) {
                for event in container.take_events() {
                    tracks[event.track].push(event);
                }
            }
            file.tracks = tracks;
            file.track_state = TrackState::Split;
        });
        self.invalidate();
    }

    /// Sort every container into playback order
    pub fn sort_tracks(&mut self) {
        self.with_absolute_ticks(|file| file.tracks.iter_mut().for_each(Track::sort));
        self.invalidate();
    }

    /// Sort one container into playback order
    pub fn sort_track(&mut self, track: usize) {
        if track >= self.tracks.len() {
            return;
        }
        self.with_absolute_ticks(|file| file.tracks[track].sort());
        self.invalidate();
    }

    /// Number every event in current container order, starting at 1.
    ///
    /// Sorting keeps events on the same tick in this order.
    pub fn mark_sequence(&mut self) {
        let mut seq = 0;
        for track in &mut self.tracks {
            for event in track.events_mut() {
                seq += 1;
                event.seq = seq;
            }
        }
    }

    /// While split, make every event's origin track its container index
    pub(crate) fn renumber_tracks(&mut self) {
        if self.track_state != TrackState::Split {
            return;
        }
        for (index, track) in self.tracks.iter_mut().enumerate() {
            for event in track.events_mut() {
                event.track = index;
            }
        }
    }
}

#[cfg(test)]
fn two_track_file() -> MidiFile {
    let mut file = MidiFile::new();
    file.add_note_on(0, 0, 0, 60, 100);
    file.add_note_off(0, 96, 0, 60, 0);
    file.add_note_on(1, 48, 1, 64, 100);
    file.add_note_off(1, 144, 1, 64, 0);
    file.mark_sequence();
    file
}

#[test]
fn delta_and_back() {
    let mut file = two_track_file();
    file.delta_ticks();
    assert!(file.is_delta_ticks());
    let deltas: Vec<i64> = file.track(1).unwrap().iter().map(|e| e.tick).collect();
    assert_eq!(deltas, [48, 96]);

    file.absolute_ticks();
    let ticks: Vec<i64> = file.track(1).unwrap().iter().map(|e| e.tick).collect();
    assert_eq!(ticks, [48, 144]);
}

#[test]
fn join_keeps_delta_state_per_origin_track() {
    let mut file = two_track_file();
    file.delta_ticks();
    file.join_tracks();
    assert!(file.is_joined());
    assert!(file.is_delta_ticks());
    // the joined container is sorted by absolute tick: 0, 48, 96, 144
    let deltas: Vec<i64> = file.track(0).unwrap().iter().map(|e| e.tick).collect();
    assert_eq!(deltas, [0, 48, 48, 48]);

    file.split_tracks();
    file.absolute_ticks();
    let ticks: Vec<i64> = file.track(1).unwrap().iter().map(|e| e.tick).collect();
    assert_eq!(ticks, [48, 144]);
}

#[test]
fn joined_adds_keep_origin_track() {
    let mut file = two_track_file();
    file.join_tracks();
    assert_eq!(file.add_track(), 2);
    file.add_note_on(2, 10, 2, 50, 90);
    assert_eq!(file.track_count_as_type1(), 3);
    file.split_tracks();
    assert_eq!(file.track_count(), 3);
    assert_eq!(file.track(2).unwrap().events()[0].tick, 10);
}
