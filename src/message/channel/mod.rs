#![doc = r#"
Typed views of channel messages

# Hierarchy
```text
                |-----------------|
                | Channel Message |
                |-----------------|
                 /               \
|-----------------------|   |----------------------|
| Channel Voice Message |   | Channel Mode Message |
|-----------------------|   |----------------------|
```

Mode messages share the controller status (`0xBn`) and use controller
numbers 120 through 127.
"#]

use crate::{Note, message::Command};

#[doc = r#"
The set of possible Channel messages
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelMessage {
    /// A channel voice message
    Voice(VoiceMessage),
    /// A channel mode message
    Mode(ModeMessage),
}

/// Messages that make or shape sound on one channel
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VoiceMessage {
    NoteOff { note: Note, velocity: u8 },
    NoteOn { note: Note, velocity: u8 },
    Aftertouch { note: Note, pressure: u8 },
    ControlChange { controller: u8, value: u8 },
    ProgramChange { program: u8 },
    ChannelPressure { pressure: u8 },
    /// 14 bit value, 8192 is centered
    PitchBend { value: u16 },
}

/// Controller numbers 120-127
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeMessage {
    /// Controller 120
    AllSoundOff,
    /// Controller 121
    ResetAllControllers,
    /// Controller 122
    LocalControl(bool),
    /// Controller 123
    AllNotesOff,
    /// Controller 124
    OmniOff,
    /// Controller 125
    OmniOn,
    /// Controller 126, with the number of channels requested (0 = all)
    MonoOn(u8),
    /// Controller 127
    PolyOn,
}

impl ChannelMessage {
    /// Interpret a status byte and its parameters.
    ///
    /// Returns `None` for system messages or when parameters are missing.
    pub fn from_parts(status: u8, params: &[u8]) -> Option<Self> {
        let command = Command::from_status(status)?;
        if params.len() < command.parameter_count() {
            return None;
        }
        let p1 = params[0] & 0x7F;
        let p2 = params.get(1).map(|b| b & 0x7F).unwrap_or(0);
        let note = || Note::from_key_number(p1);

        let voice = match command {
            Command::NoteOff => VoiceMessage::NoteOff {
                note: note()?,
                velocity: p2,
            },
            Command::NoteOn if p2 == 0 => VoiceMessage::NoteOff {
                note: note()?,
                velocity: 0,
            },
            Command::NoteOn => VoiceMessage::NoteOn {
                note: note()?,
                velocity: p2,
            },
            Command::Aftertouch => VoiceMessage::Aftertouch {
                note: note()?,
                pressure: p2,
            },
            Command::Controller if p1 >= 120 => {
                let mode = match p1 {
                    120 => ModeMessage::AllSoundOff,
                    121 => ModeMessage::ResetAllControllers,
                    122 => ModeMessage::LocalControl(p2 >= 64),
                    123 => ModeMessage::AllNotesOff,
                    124 => ModeMessage::OmniOff,
                    125 => ModeMessage::OmniOn,
                    126 => ModeMessage::MonoOn(p2),
                    _ => ModeMessage::PolyOn,
                };
                return Some(Self::Mode(mode));
            }
            Command::Controller => VoiceMessage::ControlChange {
                controller: p1,
                value: p2,
            },
            Command::PatchChange => VoiceMessage::ProgramChange { program: p1 },
            Command::ChannelPressure => VoiceMessage::ChannelPressure { pressure: p1 },
            Command::PitchBend => VoiceMessage::PitchBend {
                value: ((p2 as u16) << 7) | p1 as u16,
            },
        };
        Some(Self::Voice(voice))
    }
}

impl From<VoiceMessage> for ChannelMessage {
    fn from(value: VoiceMessage) -> Self {
        Self::Voice(value)
    }
}

impl From<ModeMessage> for ChannelMessage {
    fn from(value: ModeMessage) -> Self {
        Self::Mode(value)
    }
}

#[test]
fn zero_velocity_note_on_is_note_off() {
    let parsed = ChannelMessage::from_parts(0x91, &[60, 0]).unwrap();
    assert!(matches!(
        parsed,
        ChannelMessage::Voice(VoiceMessage::NoteOff { velocity: 0, .. })
    ));
}

#[test]
fn controllers_above_119_are_mode_messages() {
    assert_eq!(
        ChannelMessage::from_parts(0xB0, &[123, 0]),
        Some(ChannelMessage::Mode(ModeMessage::AllNotesOff))
    );
    assert_eq!(
        ChannelMessage::from_parts(0xB0, &[7, 100]),
        Some(ChannelMessage::Voice(VoiceMessage::ControlChange {
            controller: 7,
            value: 100
        }))
    );
}

#[test]
fn pitch_bend_is_lsb_first() {
    assert_eq!(
        ChannelMessage::from_parts(0xE0, &[0x00, 0x40]),
        Some(ChannelMessage::Voice(VoiceMessage::PitchBend { value: 8192 }))
    );
}
