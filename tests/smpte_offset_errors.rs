use pretty_assertions::assert_eq;
use smfkit::prelude::*;

fn smpte_bytes(fps_bits: u8, hour: u8, minute: u8, second: u8, frame: u8, subframe: u8) -> Vec<u8> {
    vec![
        (fps_bits << 5) | (hour & 0x1F),
        minute,
        second,
        frame,
        subframe,
    ]
}

#[test]
fn test_smpte_offset_invalid_length() {
    assert_eq!(SmpteOffset::parse(&[0, 0, 0]), Err(SmpteError::Length(3)));
    assert_eq!(SmpteOffset::parse(&[0; 6]), Err(SmpteError::Length(6)));
    assert_eq!(SmpteOffset::parse(&[]), Err(SmpteError::Length(0)));
}

#[test]
fn test_smpte_offset_invalid_frame_type() {
    for bits in [0b100, 0b101, 0b111] {
        let data = smpte_bytes(bits, 12, 30, 15, 10, 50);
        assert_eq!(SmpteOffset::parse(&data), Err(SmpteError::TrackFrame(bits)));
    }
}

#[test]
fn test_smpte_offset_invalid_fields() {
    assert_eq!(
        SmpteOffset::parse(&[0x18, 0, 0, 0, 0]),
        Err(SmpteError::HourOffset(24))
    );
    assert_eq!(
        SmpteOffset::parse(&[0x1F, 0, 0, 0, 0]),
        Err(SmpteError::HourOffset(31))
    );
    for minute in [60, 99, 255] {
        let data = smpte_bytes(0, 12, minute, 30, 15, 50);
        assert_eq!(SmpteOffset::parse(&data), Err(SmpteError::MinuteOffset(minute)));
    }
    let data = smpte_bytes(1, 12, 30, 60, 15, 50);
    assert_eq!(SmpteOffset::parse(&data), Err(SmpteError::SecondOffset(60)));
    for subframe in [100, 150, 255] {
        let data = smpte_bytes(2, 12, 30, 45, 15, subframe);
        assert_eq!(SmpteOffset::parse(&data), Err(SmpteError::Subframe(subframe)));
    }
}

#[test]
fn test_smpte_offset_first_error_wins() {
    let data = smpte_bytes(0, 25, 61, 30, 15, 50);
    assert_eq!(SmpteOffset::parse(&data), Err(SmpteError::HourOffset(25)));

    let data = smpte_bytes(1, 23, 60, 60, 15, 50);
    assert_eq!(SmpteOffset::parse(&data), Err(SmpteError::MinuteOffset(60)));
}

#[test]
fn test_smpte_offset_boundary_values() {
    let cases = [
        (0, 0, 0, 0, 0, 0),
        (0, 23, 59, 59, 23, 99),
        (1, 23, 59, 59, 24, 99),
        (2, 23, 59, 59, 29, 99),
        (3, 23, 59, 59, 29, 99),
    ];
    for (fps_bits, hour, minute, second, frame, subframe) in cases {
        let data = smpte_bytes(fps_bits, hour, minute, second, frame, subframe);
        let offset = SmpteOffset::parse(&data).unwrap();
        assert_eq!(offset.fps.offset_bits(), fps_bits);
        assert_eq!(offset.to_bytes().to_vec(), data);
    }
}

#[test]
fn test_smpte_offset_fps_override() {
    let offset = SmpteOffset::parse(&smpte_bytes(0, 1, 0, 0, 12, 0)).unwrap();
    let expected = [
        (SmpteFps::TwentyFour, 12.0 / 24.0),
        (SmpteFps::TwentyFive, 12.0 / 25.0),
        (SmpteFps::TwentyNine, 12.0 * 1001.0 / 30000.0),
        (SmpteFps::Thirty, 12.0 / 30.0),
    ];
    for (fps, frames) in expected {
        assert!((offset.as_seconds_at(fps) - (3600.0 + frames)).abs() < 1e-9);
    }
}

#[test]
fn test_smpte_drop_frame_precision() {
    let offset = SmpteOffset::parse(&smpte_bytes(2, 0, 0, 0, 1, 0)).unwrap();
    assert!((offset.as_seconds() - 1001.0 / 30000.0).abs() < 1e-12);
}

#[test]
fn test_bad_offset_in_a_file_is_kept_as_raw_meta() {
    let mut file = MidiFile::new();
    file.add_meta(0, 0, 0x54, &[0x7F, 0, 0, 0, 0]).unwrap();
    let event = file.event(0, 0).unwrap();
    assert!(event.message.is_meta());
    assert_eq!(event.message.smpte_offset(), None);
}
