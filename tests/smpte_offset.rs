use pretty_assertions::assert_eq;
use smfkit::prelude::*;

/// A single track file with SMPTE timing whose first event is an offset
fn create_midi_with_smpte_offset(
    fps: SmpteFps,
    hour: u8,
    minute: u8,
    second: u8,
    frame: u8,
    subframe: u8,
) -> Vec<u8> {
    let mut bytes = Vec::new();

    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x06]);
    bytes.extend_from_slice(&[0x00, 0x00]); // format 0
    bytes.extend_from_slice(&[0x00, 0x01]);
    bytes.push(fps.code() as u8);
    bytes.push(40); // ticks per frame

    bytes.extend_from_slice(b"MTrk");
    let track_length_pos = bytes.len();
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    let track_start = bytes.len();

    bytes.extend_from_slice(&[0x00, 0xFF, 0x54, 0x05]);
    bytes.push((fps.offset_bits() << 5) | (hour & 0x1F));
    bytes.extend_from_slice(&[minute, second, frame, subframe]);

    bytes.extend_from_slice(&[0x00, 0x90, 0x3C, 0x64]);
    bytes.extend_from_slice(&[0x60, 0x80, 0x3C, 0x40]);
    bytes.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

    let track_length = bytes.len() - track_start;
    bytes[track_length_pos..track_length_pos + 4]
        .copy_from_slice(&(track_length as u32).to_be_bytes());

    bytes
}

fn offsets_of(file: &MidiFile) -> Vec<SmpteOffset> {
    file.tracks()
        .iter()
        .flat_map(Track::iter)
        .filter_map(|e| e.message.smpte_offset())
        .collect()
}

fn first_offset(bytes: &[u8]) -> SmpteOffset {
    let file = MidiFile::parse(bytes).unwrap();
    offsets_of(&file)[0]
}

#[test]
fn test_smpte_offset_24fps() {
    let midi_data = create_midi_with_smpte_offset(SmpteFps::TwentyFour, 12, 30, 15, 18, 50);
    let file = MidiFile::parse(&midi_data[..]).unwrap();

    match file.timing() {
        Timing::Smpte(smpte) => {
            assert_eq!(smpte.fps(), SmpteFps::TwentyFour);
            assert_eq!(smpte.ticks_per_frame(), 40);
        }
        Timing::TicksPerQuarterNote(_) => panic!("Expected SMPTE timing"),
    }
    assert_eq!(file.ticks_per_quarter_note(), None);

    let offset = offsets_of(&file)[0];
    assert_eq!(offset.fps, SmpteFps::TwentyFour);
    assert_eq!(offset.hour, 12);
    assert_eq!(offset.minute, 30);
    assert_eq!(offset.second, 15);
    assert_eq!(offset.frame, 18);
    assert_eq!(offset.subframe, 50);

    let expected = (12 * 3600 + 30 * 60 + 15) as f64 + 18.0 / 24.0 + 50.0 / 100.0 / 24.0;
    assert!((offset.as_seconds() - expected).abs() < 1e-9);
}

#[test]
fn test_smpte_offset_25fps_pal() {
    let offset = first_offset(&create_midi_with_smpte_offset(
        SmpteFps::TwentyFive,
        0,
        0,
        1,
        12,
        75,
    ));
    assert_eq!(
        offset,
        SmpteOffset {
            fps: SmpteFps::TwentyFive,
            hour: 0,
            minute: 0,
            second: 1,
            frame: 12,
            subframe: 75,
        }
    );
}

#[test]
fn test_smpte_offset_29_97_drop_frame() {
    let offset = first_offset(&create_midi_with_smpte_offset(
        SmpteFps::TwentyNine,
        23,
        59,
        59,
        28,
        99,
    ));
    assert_eq!(offset.fps, SmpteFps::TwentyNine);
    assert_eq!(offset.frame, 28);

    let expected = 86_399.0 + 28.0 / 29.97 + 0.99 / 29.97;
    assert!((offset.as_seconds() - expected).abs() < 1e-3);
}

#[test]
fn test_smpte_offset_with_override_fps() {
    let midi_data = create_midi_with_smpte_offset(SmpteFps::TwentyFour, 10, 20, 30, 12, 50);
    let file = MidiFile::parse(&midi_data[..]).unwrap();
    let Timing::Smpte(header) = file.timing() else {
        panic!("Expected SMPTE timing");
    };
    let offset = offsets_of(&file)[0];

    let own = offset.as_seconds();
    assert!((own - offset.as_seconds_at(header.fps())).abs() < 1e-9);
    assert!((own - offset.as_seconds_at(SmpteFps::Thirty)).abs() > 1e-3);
}

#[test]
fn test_smpte_timing_drives_seconds() {
    let midi_data = create_midi_with_smpte_offset(SmpteFps::TwentyFive, 0, 0, 0, 0, 0);
    let file = MidiFile::parse(&midi_data[..]).unwrap();
    // 25 frames of 40 ticks: one tick per millisecond
    let seconds = file.time_in_seconds(96).unwrap();
    assert!((seconds - 0.096).abs() < 1e-9);
}

#[test]
fn test_multiple_tracks_with_different_offsets() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x06, 0x00, 0x01, 0x00, 0x02, 0xE7, 40]);

    for minute_and_second in [[0x00, 0x0A], [0x01, 0x00]] {
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(&[0x00, 0xFF, 0x54, 0x05, 0x20]);
        bytes.extend_from_slice(&minute_and_second);
        bytes.extend_from_slice(&[0x00, 0x00]);
        bytes.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
    }

    let file = MidiFile::parse(&bytes[..]).unwrap();
    assert_eq!(file.track_count(), 2);
    let offsets = offsets_of(&file);
    assert_eq!(offsets.len(), 2);
    assert_eq!((offsets[0].minute, offsets[0].second), (0, 10));
    assert_eq!((offsets[1].minute, offsets[1].second), (1, 0));

    let diff = offsets[1].as_seconds() - offsets[0].as_seconds();
    assert!((diff - 50.0).abs() < 1e-9);
}

#[test]
fn test_smpte_offset_survives_rewrite() {
    let midi_data = create_midi_with_smpte_offset(SmpteFps::Thirty, 1, 23, 45, 15, 0);
    let file = MidiFile::parse(&midi_data[..]).unwrap();
    let rewritten = file.to_bytes().unwrap();
    assert_eq!(rewritten, midi_data);
}
