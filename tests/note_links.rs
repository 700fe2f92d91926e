use pretty_assertions::assert_eq;
use smfkit::prelude::*;

#[test]
fn overlapping_same_pitch_notes() {
    let mut file = MidiFile::new();
    let first_on = file.add_note_on(0, 0, 0, 60, 100);
    let second_on = file.add_note_on(0, 10, 0, 60, 100);
    let first_off = file.add_note_off(0, 20, 0, 60, 0);
    let second_off = file.add_note_off(0, 30, 0, 60, 0);

    assert_eq!(file.link_note_pairs(), 2);
    assert_eq!(file.event_by_id(second_on).unwrap().linked_id(), Some(first_off));
    assert_eq!(file.event_by_id(first_off).unwrap().linked_id(), Some(second_on));
    assert_eq!(file.event_by_id(first_on).unwrap().linked_id(), Some(second_off));
    assert_eq!(file.event_by_id(second_off).unwrap().linked_id(), Some(first_on));
}

#[test]
fn channels_and_keys_are_kept_apart() {
    let mut file = MidiFile::new();
    file.add_note_on(0, 0, 0, 60, 100);
    file.add_note_on(0, 0, 1, 60, 100);
    file.add_note_off(0, 5, 0, 61, 0);
    file.add_note_off(0, 10, 1, 60, 0);
    file.add_note_off(0, 20, 0, 60, 0);

    assert_eq!(file.link_note_pairs(), 2);
    assert_eq!(file.tick_duration(0, 0), Some(20));
    assert_eq!(file.tick_duration(0, 1), Some(10));
    assert!(!file.event(0, 2).unwrap().is_linked());
}

#[test]
fn zero_velocity_note_on_ends_a_note() {
    let bytes = [
        b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0, 96, //
        b'M', b'T', b'r', b'k', 0, 0, 0, 11, //
        0x00, 0x90, 64, 100, //
        0x60, 64, 0, //
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let mut file = MidiFile::parse(&bytes[..]).unwrap();
    assert_eq!(file.link_note_pairs(), 1);
    assert_eq!(file.linked_event(0, 0).unwrap().tick, 96);
    let seconds = file.duration_in_seconds(0, 0).unwrap();
    assert!((seconds - 0.5).abs() < 1e-9);
}

#[test]
fn joined_container_pairs_across_origin_tracks() {
    let mut file = MidiFile::new();
    file.add_note_on(0, 0, 0, 60, 100);
    file.add_note_off(0, 10, 0, 60, 0);
    file.link_note_pairs();

    // linking is per container; joined tracks pair across origin tracks
    file.add_note_on(1, 0, 2, 50, 100);
    file.add_note_off(1, 40, 2, 50, 0);
    file.join_tracks();
    assert_eq!(file.link_note_pairs(), 2);

    file.clear_links();
    assert!(file.track(0).unwrap().iter().all(|e| !e.is_linked()));
}

#[test]
fn links_survive_state_changes() {
    let mut file = MidiFile::new();
    file.add_note_on(0, 0, 0, 60, 100);
    file.add_note_on(1, 5, 0, 62, 100);
    file.add_note_off(0, 50, 0, 60, 0);
    file.add_note_off(1, 25, 0, 62, 0);
    file.link_note_pairs();

    file.delta_ticks();
    assert_eq!(file.tick_duration(0, 0), Some(50));
    assert_eq!(file.tick_duration(1, 1), Some(20));

    file.join_tracks();
    file.split_tracks();
    file.absolute_ticks();
    assert_eq!(file.linked_event(0, 0).unwrap().tick, 50);
}

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
fn highest_channel_and_key_pair_up() {
    let body = [
        0x00, 0x9F, 0x7F, 0x40, //
        0x00, 0x90, 0x00, 0x40, //
        0x10, 0x8F, 0x7F, 0x00, //
        0x08, 0x80, 0x00, 0x00, //
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let mut file = MidiFile::parse(&single_track(&body)[..]).unwrap();
    assert_eq!(file.link_note_pairs(), 2);
    assert_eq!(file.linked_event(0, 0).unwrap().tick, 16);
    assert_eq!(file.linked_event(0, 1).unwrap().tick, 24);
}

#[test]
fn out_of_range_keys_never_reach_pairing() {
    let body = [
        0x00, 0x9F, 0xFF, 0x40, //
        0x10, 0x8F, 0xFF, 0x00, //
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let err = MidiFile::parse(&single_track(&body)[..]).unwrap_err();
    assert!(err.is_encoding_error());
}
