use crate::{EventId, MidiEvent};
use alloc::vec::Vec;

#[doc = r#"
An ordered list of events.

While a file is split each `Track` is one `MTrk` chunk. While it is joined
there is a single `Track` holding every event, and each event remembers the
track it came from.
"#]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    events: Vec<MidiEvent>,
}

impl Track {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the track holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in order
    pub fn events(&self) -> &[MidiEvent] {
        &self.events
    }

    /// Iterate over the events in order
    pub fn iter(&self) -> core::slice::Iter<'_, MidiEvent> {
        self.events.iter()
    }

    /// The event at `index`
    pub fn event(&self, index: usize) -> Option<&MidiEvent> {
        self.events.get(index)
    }

    /// The last event
    pub fn last(&self) -> Option<&MidiEvent> {
        self.events.last()
    }

    /// Index of the event with the given handle
    pub fn position(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|e| e.id() == id)
    }

    /// True if the last event is an end-of-track meta message
    pub fn ends_with_end_of_track(&self) -> bool {
        self.last().is_some_and(|e| e.message.is_end_of_track())
    }

    pub(crate) fn event_mut(&mut self, index: usize) -> Option<&mut MidiEvent> {
        self.events.get_mut(index)
    }

    pub(crate) fn events_mut(&mut self) -> &mut [MidiEvent] {
        &mut self.events
    }

    pub(crate) fn push(&mut self, event: MidiEvent) {
        self.events.push(event);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<MidiEvent> {
        (index < self.events.len()).then(|| self.events.remove(index))
    }

    pub(crate) fn take_events(&mut self) -> Vec<MidiEvent> {
        core::mem::take(&mut self.events)
    }

    pub(crate) fn extend(&mut self, events: impl IntoIterator<Item = MidiEvent>) {
        self.events.extend(events);
    }

    /// Stable sort by tick, then sequence number, then message kind.
    ///
    /// On the same tick and sequence number, meta messages come first, then
    /// other channel and system messages, note-offs, note-ons, and finally
    /// end-of-track. Only meaningful with absolute ticks.
    pub(crate) fn sort(&mut self) {
        self.events.sort_by_key(MidiEvent::sort_key);
    }

    /// Pair note-ons with note-offs of the same channel and key.
    ///
    /// A note-off closes the most recent open note-on, so overlapping notes of
    /// the same pitch pair up innermost first. Unmatched note-offs and malformed
    /// messages are skipped.
    /// Returns the number of pairs made.
    pub(crate) fn link_note_pairs(&mut self) -> usize {
        let mut open: Vec<Vec<usize>> = alloc::vec![Vec::new(); 16 * 128];
        let mut count = 0;
        for index in 0..self.events.len() {
            let message = &self.events[index].message;
            if !message.is_well_formed() {
                continue;
            }
            let (Some(channel), Some(key)) = (message.channel(), message.key_number()) else {
                continue;
            };
            let slot = usize::from(channel & 0x0F) * 128 + usize::from(key & 0x7F);
            if message.is_note_on() {
                open[slot].push(index);
            } else if message.is_note_off() {
                let Some(on) = open[slot].pop() else {
                    continue;
                };
                let on_id = self.events[on].id();
                let off_id = self.events[index].id();
                self.events[on].set_link(Some(off_id));
                self.events[index].set_link(Some(on_id));
                count += 1;
            }
        }
        count
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a MidiEvent;
    type IntoIter = core::slice::Iter<'a, MidiEvent>;
    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
fn event(id: u64, tick: i64, seq: u64, message: crate::message::MidiMessage) -> MidiEvent {
    let mut event = MidiEvent::new(EventId(id), tick, 0, message);
    event.seq = seq;
    event
}

#[test]
fn sort_breaks_ties_by_message_kind() {
    use crate::message::MidiMessage;
    let mut track = Track::default();
    track.push(event(0, 0, 0, MidiMessage::end_of_track()));
    track.push(event(1, 0, 0, MidiMessage::note_on(0, 60, 100)));
    track.push(event(2, 0, 0, MidiMessage::note_off(0, 60, 0)));
    track.push(event(3, 0, 0, MidiMessage::controller(0, 7, 100)));
    track.push(event(4, 0, 0, MidiMessage::tempo(100.)));

    track.sort();
    let order: Vec<u64> = track.iter().map(|e| e.id().get()).collect();
    assert_eq!(order, [4, 3, 2, 1, 0]);
}

#[test]
fn sequence_number_beats_message_kind() {
    use crate::message::MidiMessage;
    let mut track = Track::default();
    track.push(event(0, 5, 2, MidiMessage::tempo(100.)));
    track.push(event(1, 5, 1, MidiMessage::note_on(0, 60, 100)));
    track.push(event(2, 1, 3, MidiMessage::note_off(0, 60, 0)));

    track.sort();
    let order: Vec<u64> = track.iter().map(|e| e.id().get()).collect();
    assert_eq!(order, [2, 1, 0]);
}

#[test]
fn unmatched_note_off_is_skipped() {
    use crate::message::MidiMessage;
    let mut track = Track::default();
    track.push(event(0, 0, 0, MidiMessage::note_off(0, 60, 0)));
    track.push(event(1, 1, 0, MidiMessage::note_on(1, 60, 90)));
    track.push(event(2, 2, 0, MidiMessage::note_on(1, 60, 0)));

    assert_eq!(track.link_note_pairs(), 1);
    assert!(!track.events()[0].is_linked());
    assert_eq!(track.events()[1].linked_id(), Some(EventId(2)));
    assert_eq!(track.events()[2].linked_id(), Some(EventId(1)));
}

#[test]
fn malformed_notes_are_skipped() {
    use crate::message::MidiMessage;
    let mut track = Track::default();
    track.push(event(0, 0, 0, MidiMessage::from_bytes_unchecked(alloc::vec![0x9F, 0xFF, 0x40])));
    track.push(event(1, 0, 0, MidiMessage::from_bytes_unchecked(alloc::vec![0x90, 200, 0x40])));
    track.push(event(2, 1, 0, MidiMessage::note_off(1, 72, 0)));
    track.push(event(3, 2, 0, MidiMessage::from_bytes_unchecked(alloc::vec![0x8F, 0xFF, 0])));

    assert_eq!(track.link_note_pairs(), 0);
    assert!(track.iter().all(|e| !e.is_linked()));
}
