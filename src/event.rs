use crate::message::MidiMessage;
use core::fmt;

/// A stable handle to an event, unique within the [`MidiFile`](crate::prelude::MidiFile)
/// that created it.
///
/// Handles survive sorting, joining and splitting, so they are what note pairs
/// point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventId(pub(crate) u64);

impl EventId {
    /// The raw number behind the handle
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[doc = r#"
A [`MidiMessage`] placed in time.

`tick` is absolute or relative to the previous event of the same track
depending on the tick state of the file that holds the event. `seconds` is
only meaningful after [`MidiFile::do_time_analysis`](crate::prelude::MidiFile::do_time_analysis).
"#]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiEvent {
    /// Absolute or delta ticks
    pub tick: i64,
    /// The track the event came from. Kept while tracks are joined.
    pub track: usize,
    /// Wall-clock time, filled in by time analysis
    pub seconds: f64,
    /// Tie breaker for events on the same tick
    pub seq: u64,
    /// The message
    pub message: MidiMessage,
    id: EventId,
    link: Option<EventId>,
}

impl MidiEvent {
    pub(crate) const fn new(id: EventId, tick: i64, track: usize, message: MidiMessage) -> Self {
        Self {
            tick,
            track,
            seconds: 0.,
            seq: 0,
            message,
            id,
            link: None,
        }
    }

    /// This event's handle
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// The handle of the paired event, if any
    pub const fn linked_id(&self) -> Option<EventId> {
        self.link
    }

    /// True if the event is paired with another
    pub const fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    pub(crate) const fn set_link(&mut self, link: Option<EventId>) {
        self.link = link;
    }

    pub(crate) fn sort_key(&self) -> (i64, u64, u8) {
        (self.tick, self.seq, self.message.sort_rank())
    }
}

impl core::ops::Deref for MidiEvent {
    type Target = MidiMessage;
    fn deref(&self) -> &Self::Target {
        &self.message
    }
}
