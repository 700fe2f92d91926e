use pretty_assertions::assert_eq;
use smfkit::prelude::*;

/// A file with the given division and one chunk per track body
fn midi_file(format: u16, division: u16, tracks: &[&[u8]]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&6u32.to_be_bytes());
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    bytes.extend_from_slice(&division.to_be_bytes());
    for body in tracks {
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
    }
    bytes
}

const CONDUCTOR: &[u8] = &[
    0x00, 0xFF, 0x03, 0x04, b'S', b'o', b'n', b'g', //
    0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, //
    0x00, 0xFF, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08, //
    0x83, 0x60, 0xFF, 0x2F, 0x00,
];

const PIANO: &[u8] = &[
    0x00, 0xC0, 0x00, //
    0x00, 0x90, 60, 100, //
    0x00, 0x90, 64, 100, //
    0x83, 0x60, 0x80, 60, 0, //
    0x00, 0x80, 64, 0, //
    0x00, 0xFF, 0x2F, 0x00,
];

#[test]
fn format_1_round_trip_is_byte_identical() {
    let bytes = midi_file(1, 480, &[CONDUCTOR, PIANO]);
    let file = MidiFile::parse(&bytes[..]).unwrap();

    assert_eq!(file.track_count(), 2);
    assert_eq!(file.ticks_per_quarter_note(), Some(480));
    assert_eq!(file.event_count(0), 4);
    assert_eq!(file.event_count(1), 6);
    assert_eq!(file.event(0, 0).unwrap().message.meta_text().unwrap(), "Song");
    assert_eq!(file.event(0, 1).unwrap().message.tempo_bpm(), Some(120.));
    assert_eq!(file.event(1, 3).unwrap().tick, 480);

    assert_eq!(file.to_bytes().unwrap(), bytes);
}

#[test]
fn running_status_is_expanded_on_write() {
    let body: &[u8] = &[
        0x00, 0x90, 60, 100, //
        0x10, 62, 100, //
        0x10, 60, 0, //
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let file = MidiFile::parse(&midi_file(0, 96, &[body])[..]).unwrap();
    let notes: Vec<(i64, u8, u8)> = file
        .track(0)
        .unwrap()
        .iter()
        .filter(|e| e.message.is_note())
        .map(|e| (e.tick, e.message.key_number().unwrap(), e.message.velocity().unwrap()))
        .collect();
    assert_eq!(notes, [(0, 60, 100), (16, 62, 100), (32, 60, 0)]);

    let written = file.to_bytes().unwrap();
    let expected = midi_file(
        0,
        96,
        &[&[
            0x00, 0x90, 60, 100, //
            0x10, 0x90, 62, 100, //
            0x10, 0x90, 60, 0, //
            0x00, 0xFF, 0x2F, 0x00,
        ]],
    );
    assert_eq!(written, expected);
}

#[test]
fn missing_end_of_track_is_added_once() {
    let body: &[u8] = &[0x00, 0x90, 60, 100, 0x60, 0x80, 60, 0];
    let file = MidiFile::parse(&midi_file(0, 96, &[body])[..]).unwrap();
    assert!(file.track(0).unwrap().ends_with_end_of_track());

    let once = file.to_bytes().unwrap();
    let twice = MidiFile::parse(&once[..]).unwrap().to_bytes().unwrap();
    assert_eq!(once, twice);
    assert_eq!(&once[once.len() - 4..], &[0x00, 0xFF, 0x2F, 0x00]);
}

#[test]
fn sysex_and_escape_keep_their_marker() {
    let body: &[u8] = &[
        0x00, 0xF0, 0x03, 0x43, 0x12, 0xF7, //
        0x00, 0xF7, 0x02, 0xF3, 0x01, //
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let bytes = midi_file(0, 96, &[body]);
    let file = MidiFile::parse(&bytes[..]).unwrap();

    let sysex = &file.event(0, 0).unwrap().message;
    assert_eq!(sysex.bytes(), &[0xF0, 0x43, 0x12, 0xF7]);
    assert_eq!(sysex.sysex_data(), Some(&[0x43, 0x12, 0xF7][..]));
    let escape = &file.event(0, 1).unwrap().message;
    assert_eq!(escape.bytes(), &[0xF7, 0xF3, 0x01]);

    assert_eq!(file.to_bytes().unwrap(), bytes);
}

#[test]
fn delta_state_is_restored_after_write() {
    let bytes = midi_file(1, 480, &[CONDUCTOR, PIANO]);
    let mut file = MidiFile::parse(&bytes[..]).unwrap();
    file.delta_ticks();
    assert_eq!(file.to_bytes().unwrap(), bytes);
    assert!(file.is_delta_ticks());
}

#[test]
fn joined_file_is_written_as_format_0() {
    let bytes = midi_file(1, 480, &[CONDUCTOR, PIANO]);
    let mut file = MidiFile::parse(&bytes[..]).unwrap();
    file.join_tracks();
    let written = file.to_bytes().unwrap();
    // format 0, one track
    assert_eq!(&written[8..12], &[0, 0, 0, 1]);

    let reread = MidiFile::parse(&written[..]).unwrap();
    assert_eq!(reread.track_count(), 1);
    // both end-of-track messages collapse into one
    assert_eq!(reread.event_count(0), 9);
    assert_eq!(reread.file_duration_in_ticks(), 480);
}

#[test]
fn built_file_reads_back() {
    let mut file = MidiFile::new();
    file.set_ticks_per_quarter_note(480);
    file.add_track_name(0, 0, "Conductor").unwrap();
    file.add_tempo(0, 0, 90.);
    file.add_time_signature(0, 0, 3, 4);
    file.add_key_signature(0, 0, -2, false);
    file.add_patch_change(1, 0, 0, 40);
    file.add_controller(1, 0, 0, 7, 100);
    file.add_pitch_bend(1, 0, 0, 0.0);
    file.add_note_on(1, 0, 0, 67, 80);
    file.add_note_off(1, 480, 0, 67, 0);
    file.add_lyric(1, 480, "la").unwrap();

    let bytes = file.to_bytes().unwrap();
    let reread = MidiFile::parse(&bytes[..]).unwrap();
    assert_eq!(reread.track_count(), 2);

    let conductor = reread.track(0).unwrap();
    assert_eq!(conductor.events()[0].message.meta_text().unwrap(), "Conductor");
    let bpm = conductor.events()[1].message.tempo_bpm().unwrap();
    assert!((bpm - 90.).abs() < 1e-3);
    assert!(conductor.events()[2].message.is_time_signature());
    assert!(conductor.events()[3].message.is_key_signature());

    let part = reread.track(1).unwrap();
    assert_eq!(part.events()[0].message.patch(), Some(40));
    assert_eq!(part.events()[2].message.pitch_bend_amount(), Some(8192));
    let seconds = reread.time_in_seconds(480).unwrap();
    assert!((seconds - 60. / 90.).abs() < 1e-5);
}

#[cfg(feature = "std")]
#[test]
fn write_to_and_read_from_streams() {
    let bytes = midi_file(1, 480, &[CONDUCTOR, PIANO]);
    let file = MidiFile::parse(&bytes[..]).unwrap();

    let mut sink = Vec::new();
    file.write_to(&mut sink).unwrap();
    assert_eq!(sink, bytes);

    let mut reread = MidiFile::new();
    reread.read_from(std::io::Cursor::new(sink)).unwrap();
    assert_eq!(reread.total_event_count(), file.total_event_count());
}
