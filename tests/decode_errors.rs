use smfkit::prelude::*;

fn header(format: u16, tracks: u16, division: u16) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&6u32.to_be_bytes());
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&tracks.to_be_bytes());
    bytes.extend_from_slice(&division.to_be_bytes());
    bytes
}

fn with_track(mut bytes: Vec<u8>, body: &[u8]) -> Vec<u8> {
    bytes.extend_from_slice(b"MTrk");
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}

const EMPTY_TRACK: &[u8] = &[0x00, 0xFF, 0x2F, 0x00];

fn format_error(bytes: &[u8]) -> FormatError {
    let err = MidiFile::parse(bytes).unwrap_err();
    match err.error_kind() {
        ReaderErrorKind::Format(e) => e.clone(),
        other => panic!("expected a format error, got {other:?}"),
    }
}

fn encoding_error(bytes: &[u8]) -> EncodingError {
    let err = MidiFile::parse(bytes).unwrap_err();
    match err.error_kind() {
        ReaderErrorKind::Encoding(e) => e.clone(),
        other => panic!("expected an encoding error, got {other:?}"),
    }
}

#[test]
fn header_problems() {
    assert_eq!(
        format_error(&with_track(header(2, 1, 96), EMPTY_TRACK)),
        FormatError::UnsupportedFormat(2)
    );
    assert_eq!(
        format_error(&with_track(header(0, 2, 96), EMPTY_TRACK)),
        FormatError::SingleTrackMismatch(2)
    );
    assert_eq!(format_error(&header(1, 0, 96)), FormatError::NoTracks);
    assert_eq!(
        format_error(&with_track(header(0, 1, 0xE028), EMPTY_TRACK)),
        FormatError::SmpteFps(-32)
    );

    let mut long_header = header(0, 1, 96);
    long_header[7] = 7;
    assert_eq!(format_error(&long_header), FormatError::HeaderLength(7));
}

#[test]
fn bad_track_magic() {
    let mut bytes = with_track(header(0, 1, 96), EMPTY_TRACK);
    bytes[14..18].copy_from_slice(b"MTrx");
    assert_eq!(
        format_error(&bytes),
        FormatError::InvalidMagic {
            expected: *b"MTrk",
            found: *b"MTrx"
        }
    );
}

#[test]
fn event_stream_problems() {
    let bytes = with_track(header(0, 1, 96), &[0x00, 0x40, 0x40]);
    assert_eq!(encoding_error(&bytes), EncodingError::NoRunningStatus(0x40));

    let bytes = with_track(
        header(0, 1, 96),
        &[0x00, 0xFF, 0x01, 0x00, 0x00, 0x40, 0x00, 0xFF, 0x2F, 0x00],
    );
    assert_eq!(
        encoding_error(&bytes),
        EncodingError::RunningStatusAfterSystem {
            status: 0xFF,
            data: 0x40
        }
    );

    let bytes = with_track(
        header(0, 1, 96),
        &[0x00, 0x9F, 0xFF, 0x40, 0x10, 0x8F, 0xFF, 0x00, 0x00, 0xFF, 0x2F, 0x00],
    );
    assert_eq!(encoding_error(&bytes), EncodingError::UnexpectedStatus(0xFF));

    let bytes = with_track(
        header(0, 1, 96),
        &[0x00, 0x90, 0x3C, 0x40, 0x10, 0x3C, 0x85, 0x00, 0xFF, 0x2F, 0x00],
    );
    assert_eq!(encoding_error(&bytes), EncodingError::UnexpectedStatus(0x85));

    let bytes = with_track(header(0, 1, 96), &[0x00, 0xF4, 0x00, 0xFF, 0x2F, 0x00]);
    assert_eq!(encoding_error(&bytes), EncodingError::UndefinedStatus(0xF4));

    let bytes = with_track(header(0, 1, 96), &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
    assert_eq!(
        encoding_error(&bytes),
        EncodingError::Vlv(VlvError::Overflow)
    );
}

#[test]
fn truncation_is_out_of_bounds() {
    let bytes = with_track(header(0, 1, 96), &[0x00, 0x90, 60]);
    assert!(MidiFile::parse(&bytes[..]).unwrap_err().is_out_of_bounds());

    let bytes = with_track(header(0, 1, 96), &[0x00, 0xFF, 0x03, 0x05, b'a']);
    assert!(MidiFile::parse(&bytes[..]).unwrap_err().is_out_of_bounds());

    let bytes = header(0, 1, 96);
    assert!(MidiFile::parse(&bytes[..5]).unwrap_err().is_out_of_bounds());
}

#[test]
fn failed_read_leaves_an_empty_file() {
    let mut file = MidiFile::new();
    file.set_ticks_per_quarter_note(480);
    file.add_note_on(3, 0, 0, 60, 100);
    file.join_tracks();

    let bytes = with_track(header(0, 1, 96), &[0x00, 0x40]);
    assert!(file.read(&bytes).is_err());
    assert_eq!(file.track_count(), 1);
    assert_eq!(file.total_event_count(), 0);
    assert!(file.is_split());
    assert_eq!(file.ticks_per_quarter_note(), Some(480));
}

#[test]
fn trailing_bytes_are_ignored() {
    let mut bytes = with_track(header(0, 1, 96), EMPTY_TRACK);
    bytes.extend_from_slice(&[0xDE, 0xAD]);
    let file = MidiFile::parse(&bytes[..]).unwrap();
    assert_eq!(file.event_count(0), 1);
}

#[test]
fn step_by_step_decoding() {
    let bytes = with_track(header(0, 1, 96), &[0x00, 0x90, 60, 100, 0x00, 0xFF, 0x2F, 0x00]);
    let mut builder = MidiFileBuilder::new(&bytes[..]);
    assert_eq!(builder.stage(), DecodeStage::HeaderPending);
    let mut steps = 0;
    while builder.step().unwrap() != DecodeStage::Done {
        steps += 1;
    }
    assert_eq!(steps, 3);
    assert_eq!(builder.position(), bytes.len());
    let file = builder.build().unwrap();
    assert_eq!(file.event(0, 0).unwrap().seq, 1);
    assert_eq!(file.event(0, 1).unwrap().seq, 2);
}
