#![doc = r#"
Read, edit and write Standard MIDI Files.

`smfkit` keeps a whole MIDI file in memory as a list of tracks, each holding
timed [`MidiEvent`](crate::prelude::MidiEvent)s. Events can be moved between
absolute and delta ticks, merged into one track and split back apart, sorted,
paired up (note-on with note-off), and mapped onto wall-clock time through the
file's tempo changes.

# Reading a file
```rust
# use smfkit::prelude::*;
let bytes = [
    b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0,
    b'M', b'T', b'r', b'k', 0, 0, 0, 13,
    0x00, 0x90, 60, 100,
    0x83, 0x60, 0x80, 60, 0,
    0x00, 0xFF, 0x2F, 0x00,
];
let mut file = MidiFile::parse(&bytes[..]).unwrap();

assert_eq!(file.track_count(), 1);
assert_eq!(file.ticks_per_quarter_note(), Some(480));
assert_eq!(file.link_note_pairs(), 1);
let seconds = file.time_in_seconds(480).unwrap();
assert!((seconds - 0.5).abs() < 1e-9);
```

# Building a file
```rust
# use smfkit::prelude::*;
let mut file = MidiFile::new();
file.set_ticks_per_quarter_note(480);
file.add_tempo(0, 0, 90.);
file.add_note_on(0, 0, 0, 64, 90);
file.add_note_off(0, 960, 0, 64, 0);

let bytes = file.to_bytes().unwrap();
assert_eq!(&bytes[..4], b"MThd");
```
"#]
#![warn(missing_docs)]
#![warn(clippy::nursery)]
#![allow(clippy::module_inception)]
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod error;
pub use error::*;

pub mod vlv;

pub mod reader;

pub mod message;

mod event;
pub use event::*;

pub mod file;

mod note;
pub use note::*;

pub mod transcode;

/// Commonly used types
pub mod prelude {
    pub use crate::{
        error::*,
        event::*,
        file::{
            builder::{DecodeStage, MidiFileBuilder},
            meta::{SmpteError, SmpteOffset},
            *,
        },
        message::{channel::*, *},
        note::*,
        reader::{ReadResult, Reader, ReaderError, ReaderErrorKind},
        transcode::{HexTranscoder, TextTranscoder, TranscodeError},
        vlv::VlvError,
    };
}
