use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
The type byte of a meta message (`FF <type> <length> <data>`).

Meta messages never leave the file: they describe the sequence (names,
tempo, meter, key) rather than sound.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MetaType {
    /// `FF 00 02 ssss`
    SequenceNumber = 0x00,
    /// Free text
    Text = 0x01,
    /// Copyright notice
    Copyright = 0x02,
    /// Sequence or track name
    TrackName = 0x03,
    /// Instrument name
    InstrumentName = 0x04,
    /// A lyric syllable
    Lyric = 0x05,
    /// Rehearsal letter or section name
    Marker = 0x06,
    /// Cue point
    CuePoint = 0x07,
    /// Program name
    ProgramName = 0x08,
    /// Device name
    DeviceName = 0x09,
    /// `FF 20 01 cc`
    ChannelPrefix = 0x20,
    /// `FF 21 01 pp`
    MidiPort = 0x21,
    /// `FF 2F 00`, required at the end of every track
    EndOfTrack = 0x2F,
    /// `FF 51 03 tttttt` microseconds per quarter note
    Tempo = 0x51,
    /// `FF 54 05 hr mn se fr ff`
    SmpteOffset = 0x54,
    /// `FF 58 04 nn dd cc bb`
    TimeSignature = 0x58,
    /// `FF 59 02 sf mi`
    KeySignature = 0x59,
    /// Manufacturer specific data
    SequencerSpecific = 0x7F,
}

impl MetaType {
    /// True for the meta types whose payload is text
    pub const fn is_text(&self) -> bool {
        (*self as u8) >= 0x01 && (*self as u8) <= 0x09
    }
}
