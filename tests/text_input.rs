use pretty_assertions::assert_eq;
use smfkit::prelude::*;

const HEX: &str = "\
; header
4d 54 68 64 00 00 00 06
00 00 00 01 00 60
# one track
4d 54 72 6b 00 00 00 0c
00 90 3c 64
60 80 3c 00
00 ff 2f 00
";

#[test]
fn hex_text_is_transcoded() {
    let file = MidiFile::parse(HEX.as_bytes()).unwrap();
    assert_eq!(file.track_count(), 1);
    assert_eq!(file.event_count(0), 3);
    assert_eq!(file.event(0, 1).unwrap().tick, 96);
}

#[test]
fn hex_dump_reads_back() {
    let file = MidiFile::parse(HEX.as_bytes()).unwrap();
    let dump = file.hex_dump(16).unwrap();
    assert!(dump.lines().all(|line| line.split(' ').count() <= 16));

    let reread = MidiFile::parse(dump.as_bytes()).unwrap();
    assert_eq!(reread.to_bytes().unwrap(), file.to_bytes().unwrap());

    let one_line = file.hex_dump(0).unwrap();
    assert_eq!(one_line.lines().count(), 1);
}

#[test]
fn bad_text_fails_cleanly() {
    let mut file = MidiFile::new();
    file.add_note_on(0, 0, 0, 60, 100);
    let err = file.read(b"4d 54 zz").unwrap_err();
    assert!(matches!(
        err.error_kind(),
        ReaderErrorKind::Transcode(TranscodeError::InvalidDigit { line: 1, found: 'z' })
    ));
    assert_eq!(file.total_event_count(), 0);

    // valid hex that is not a MIDI file
    let err = MidiFile::parse(&b"00 01 02 03 04 05 06 07"[..]).unwrap_err();
    assert!(err.is_format_error());
}

struct Reversed;

impl TextTranscoder for Reversed {
    fn transcode(&self, text: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        let bytes = HexTranscoder.transcode(text)?;
        Ok(bytes.into_iter().rev().collect())
    }
}

#[test]
fn custom_transcoder() {
    let binary = MidiFile::parse(HEX.as_bytes()).unwrap().to_bytes().unwrap();
    let reversed: String = binary
        .iter()
        .rev()
        .map(|b| format!("{b:02x} "))
        .collect();
    let file = MidiFile::parse_with(reversed.as_bytes(), &Reversed).unwrap();
    assert_eq!(file.to_bytes().unwrap(), binary);
}
