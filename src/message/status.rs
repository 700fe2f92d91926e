use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The command nibble of a channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Command {
    /// `0x8n key velocity`
    NoteOff = 0x80,
    /// `0x9n key velocity`; a zero velocity means note off
    NoteOn = 0x90,
    /// `0xAn key pressure`
    Aftertouch = 0xA0,
    /// `0xBn controller value`
    Controller = 0xB0,
    /// `0xCn program`
    PatchChange = 0xC0,
    /// `0xDn pressure`
    ChannelPressure = 0xD0,
    /// `0xEn lsb msb`
    PitchBend = 0xE0,
}

impl Command {
    /// Reads the command out of a status byte. `None` for system messages.
    pub fn from_status(status: u8) -> Option<Self> {
        Self::try_from(status & 0xF0).ok()
    }

    /// Number of parameter bytes that follow the status byte
    pub const fn parameter_count(&self) -> usize {
        match self {
            Self::PatchChange | Self::ChannelPressure => 1,
            _ => 2,
        }
    }
}

#[test]
fn parameter_counts() {
    assert_eq!(Command::from_status(0x93), Some(Command::NoteOn));
    assert_eq!(Command::from_status(0xC3).unwrap().parameter_count(), 1);
    assert_eq!(Command::from_status(0xE0).unwrap().parameter_count(), 2);
    assert_eq!(Command::from_status(0xF0), None);
}
