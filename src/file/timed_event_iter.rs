use crate::{MidiEvent, file::MidiFile};
use alloc::vec::Vec;

/// An event with its place in time, yielded by [`MidiFile::timed_events`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent<'a> {
    /// Absolute tick
    pub tick: i64,
    /// Seconds from the start of the file
    pub seconds: f64,
    /// Index of the container holding the event
    pub track: usize,
    /// The event
    pub event: &'a MidiEvent,
}

/// Iterator over every event of a file in playback order
pub struct TimedEventIterator<'a> {
    inner: alloc::vec::IntoIter<TimedEvent<'a>>,
}

impl<'a> Iterator for TimedEventIterator<'a> {
    type Item = TimedEvent<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TimedEventIterator<'_> {}

impl MidiFile {
    /// Every event of every container merged into playback order, with its
    /// absolute tick and time in seconds.
    ///
    /// Neither the file nor its tick or track state changes.
    pub fn timed_events(&self) -> TimedEventIterator<'_> {
        let map = self.time_map();
        let mut events: Vec<TimedEvent<'_>> = Vec::with_capacity(self.total_event_count());
        for (track, container) in self.tracks().iter().enumerate() {
            let ticks = self.absolute_ticks_of(track);
            events.extend(container.iter().zip(ticks).map(|(event, tick)| TimedEvent {
                tick,
                seconds: map.seconds_at(tick).unwrap_or_default(),
                track,
                event,
            }));
        }
        events.sort_by_key(|t| (t.tick, t.event.seq, t.event.message.sort_rank()));
        TimedEventIterator {
            inner: events.into_iter(),
        }
    }
}

#[test]
fn tracks_interleave_in_playback_order() {
    let mut file = MidiFile::new();
    file.set_ticks_per_quarter_note(480);
    file.add_tempo(0, 0, 120.);
    file.add_note_on(1, 480, 0, 60, 100);
    file.add_note_off(1, 960, 0, 60, 0);
    file.add_note_on(2, 240, 1, 64, 100);
    file.add_note_off(2, 960, 1, 64, 0);
    file.delta_ticks();

    let timed: Vec<(i64, usize)> = file.timed_events().map(|t| (t.tick, t.track)).collect();
    assert_eq!(timed, [(0, 0), (240, 2), (480, 1), (960, 1), (960, 2)]);

    let seconds: Vec<f64> = file.timed_events().map(|t| t.seconds).collect();
    assert!((seconds[1] - 0.25).abs() < 1e-9);
    assert!((seconds[4] - 1.0).abs() < 1e-9);
    assert!(file.is_delta_ticks());
}
