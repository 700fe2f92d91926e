use crate::{EventId, MidiEvent, file::MidiFile};

impl MidiFile {
    /// Pair every note-on with the note-off that ends it, per track container.
    ///
    /// Existing links are dropped first. Returns the number of pairs.
    pub fn link_note_pairs(&mut self) -> usize {
        self.clear_links();
        let count: usize = self.tracks.iter_mut().map(|t| t.link_note_pairs()).sum();
        #[cfg(feature = "tracing")]
        tracing::debug!(pairs = count, "Linked note pairs");
        count
    }

    /// Drop every link
    pub fn clear_links(&mut self) {
        for track in &mut self.tracks {
            for event in track.events_mut() {
                event.set_link(None);
            }
        }
    }

    /// Link two events to each other, unlinking any previous partners.
    ///
    /// Returns false if either event does not exist or both are the same.
    pub fn link_events(&mut self, first: (usize, usize), second: (usize, usize)) -> bool {
        if first == second {
            return false;
        }
        let (Some(a), Some(b)) = (
            self.event(first.0, first.1).map(MidiEvent::id),
            self.event(second.0, second.1).map(MidiEvent::id),
        ) else {
            return false;
        };
        self.unlink_event(first.0, first.1);
        self.unlink_event(second.0, second.1);
        self.set_link_at(first, Some(b));
        self.set_link_at(second, Some(a));
        true
    }

    /// Unlink an event and its partner
    pub fn unlink_event(&mut self, track: usize, index: usize) {
        let Some(partner) = self.event(track, index).and_then(MidiEvent::linked_id) else {
            return;
        };
        self.set_link_at((track, index), None);
        self.clear_link_of(partner);
    }

    /// The event linked to the event at `index` of `track`
    pub fn linked_event(&self, track: usize, index: usize) -> Option<&MidiEvent> {
        let partner = self.event(track, index)?.linked_id()?;
        self.event_by_id(partner)
    }

    /// Ticks between an event and its partner, `None` if unlinked
    pub fn tick_duration(&self, track: usize, index: usize) -> Option<i64> {
        let partner = self.event(track, index)?.linked_id()?;
        let (partner_track, partner_index) = self.locate(partner)?;
        let start = self.absolute_tick_of(track, index)?;
        let end = self.absolute_tick_of(partner_track, partner_index)?;
        Some((end - start).abs())
    }

    /// Seconds between an event and its partner, `None` if unlinked
    pub fn duration_in_seconds(&self, track: usize, index: usize) -> Option<f64> {
        let partner = self.event(track, index)?.linked_id()?;
        let (partner_track, partner_index) = self.locate(partner)?;
        let start = self.time_in_seconds_of(track, index)?;
        let end = self.time_in_seconds_of(partner_track, partner_index)?;
        Some((end - start).abs())
    }

    /// Remove the link held by the event with handle `id`
    pub(crate) fn clear_link_of(&mut self, id: EventId) {
        if let Some(location) = self.locate(id) {
            self.set_link_at(location, None);
        }
    }

    fn set_link_at(&mut self, (track, index): (usize, usize), link: Option<EventId>) {
        if let Some(event) = self.tracks.get_mut(track).and_then(|t| t.event_mut(index)) {
            event.set_link(link);
        }
    }
}

#[test]
fn overlapping_notes_pair_innermost_first() {
    let mut file = MidiFile::new();
    file.add_note_on(0, 0, 0, 60, 100);
    file.add_note_on(0, 10, 0, 60, 100);
    file.add_note_off(0, 20, 0, 60, 0);
    file.add_note_off(0, 30, 0, 60, 0);
    assert_eq!(file.link_note_pairs(), 2);
    assert_eq!(file.linked_event(0, 1).unwrap().tick, 20);
    assert_eq!(file.linked_event(0, 0).unwrap().tick, 30);
    assert_eq!(file.tick_duration(0, 0), Some(30));
    assert_eq!(file.tick_duration(0, 2), Some(10));
}

#[test]
fn relinking_drops_old_partners() {
    let mut file = MidiFile::new();
    file.add_note_on(0, 0, 0, 60, 100);
    file.add_note_off(0, 10, 0, 60, 0);
    file.add_note_off(0, 20, 0, 60, 0);
    file.link_note_pairs();
    assert!(file.event(0, 1).unwrap().is_linked());

    assert!(file.link_events((0, 0), (0, 2)));
    assert!(!file.event(0, 1).unwrap().is_linked());
    assert_eq!(file.tick_duration(0, 0), Some(20));

    file.unlink_event(0, 2);
    assert!(!file.event(0, 0).unwrap().is_linked());
    assert!(!file.link_events((0, 0), (0, 0)));
}

#[test]
fn removing_an_event_unlinks_its_partner() {
    let mut file = MidiFile::new();
    file.add_note_on(0, 0, 0, 60, 100);
    file.add_note_off(0, 10, 0, 60, 0);
    file.link_note_pairs();
    let removed = file.remove_event(0, 1).unwrap();
    assert!(!removed.is_linked());
    assert!(!file.event(0, 0).unwrap().is_linked());
}
