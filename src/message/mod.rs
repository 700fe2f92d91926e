#![doc = r#"
The byte level MIDI message

A [`MidiMessage`] is the exact byte sequence that follows a delta time in a
track chunk (with the status byte always present, even if the file used
running status). It is one of

- a channel message: status byte `0x80..=0xEF` followed by one or two data bytes
- a meta message: `FF <type> <vlv length> <payload>`
- a system exclusive message: `F0 <payload>` or an escape `F7 <payload>`. The
  length prefix is not stored; it is recomputed whenever the message is written.
"#]

pub mod channel;

mod meta;
pub use meta::*;

mod status;
pub use status::*;

use crate::{file::meta::SmpteOffset, message::channel::ChannelMessage, vlv};
use alloc::{borrow::Cow, string::String, vec::Vec};
use core::fmt;

/// Microseconds per quarter note at 120 beats per minute
pub const DEFAULT_TEMPO_MICROS: u32 = 500_000;

#[doc = r#"
One MIDI message, stored as raw bytes.

# Example
```rust
# use smfkit::prelude::*;
let mut message = MidiMessage::note_on(2, 60, 100);
assert!(message.is_note_on());
assert_eq!(message.channel(), Some(2));

message.set_velocity(0);
assert!(message.is_note_off());
assert_eq!(message.bytes(), [0x92, 60, 0]);
```
"#]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiMessage(Vec<u8>);

impl MidiMessage {
    pub(crate) const fn from_bytes_unchecked(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Build a message from raw bytes, checking that the byte count matches the status.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        let message = Self(bytes);
        message.is_well_formed().then_some(message)
    }

    /// A channel message of any command.
    ///
    /// The channel is masked to four bits and parameters to seven.
    pub fn channel_message(command: Command, channel: u8, p1: u8, p2: u8) -> Self {
        let status = u8::from(command) | (channel & 0x0F);
        if command.parameter_count() == 1 {
            Self(alloc::vec![status, p1 & 0x7F])
        } else {
            Self(alloc::vec![status, p1 & 0x7F, p2 & 0x7F])
        }
    }

    /// `0x9n key velocity`
    pub fn note_on(channel: u8, key: u8, velocity: u8) -> Self {
        Self::channel_message(Command::NoteOn, channel, key, velocity)
    }

    /// `0x8n key velocity`
    pub fn note_off(channel: u8, key: u8, velocity: u8) -> Self {
        Self::channel_message(Command::NoteOff, channel, key, velocity)
    }

    /// `0xAn key pressure`
    pub fn aftertouch(channel: u8, key: u8, pressure: u8) -> Self {
        Self::channel_message(Command::Aftertouch, channel, key, pressure)
    }

    /// `0xBn controller value`
    pub fn controller(channel: u8, controller: u8, value: u8) -> Self {
        Self::channel_message(Command::Controller, channel, controller, value)
    }

    /// `0xCn program`
    pub fn patch_change(channel: u8, program: u8) -> Self {
        Self::channel_message(Command::PatchChange, channel, program, 0)
    }

    /// `0xDn pressure`
    pub fn channel_pressure(channel: u8, pressure: u8) -> Self {
        Self::channel_message(Command::ChannelPressure, channel, pressure, 0)
    }

    /// Pitch bend from a 14 bit value (8192 is centered)
    pub fn pitch_bend_value(channel: u8, value: u16) -> Self {
        let value = value.min(0x3FFF);
        Self::channel_message(
            Command::PitchBend,
            channel,
            (value & 0x7F) as u8,
            (value >> 7) as u8,
        )
    }

    /// Pitch bend from `-1.0..=1.0`, clamped.
    ///
    /// `-1.0` maps to 0, `0.0` to 8192 and `1.0` to 16383.
    pub fn pitch_bend(channel: u8, amount: f64) -> Self {
        let scaled = (amount + 1.) * 8192. + 0.5;
        let value = if scaled.is_nan() || scaled < 0. {
            0
        } else if scaled > 16383. {
            16383
        } else {
            scaled as u16
        };
        Self::pitch_bend_value(channel, value)
    }

    /// A meta message with the given type byte and payload
    pub fn meta(meta_type: u8, data: &[u8]) -> Result<Self, vlv::VlvError> {
        let len = u32::try_from(data.len())
            .map_err(|_| vlv::VlvError::TooLarge(data.len() as u64))?;
        let mut bytes = Vec::with_capacity(data.len() + 6);
        bytes.push(0xFF);
        bytes.push(meta_type & 0x7F);
        vlv::write(len, &mut bytes)?;
        bytes.extend_from_slice(data);
        Ok(Self(bytes))
    }

    /// A text-like meta message (track name, lyric, marker...)
    pub fn text(meta_type: MetaType, text: &str) -> Result<Self, vlv::VlvError> {
        Self::meta(meta_type.into(), text.as_bytes())
    }

    /// `FF 51 03 tttttt` from quarter notes per minute
    pub fn tempo(bpm: f64) -> Self {
        let mut message = Self::default();
        message.set_tempo(bpm);
        message
    }

    /// `FF 51 03 tttttt` from microseconds per quarter note (24 bits)
    pub fn tempo_from_micros(micros: u32) -> Self {
        let micros = micros.min(0xFF_FFFF);
        Self(alloc::vec![
            0xFF,
            MetaType::Tempo.into(),
            3,
            (micros >> 16) as u8,
            (micros >> 8) as u8,
            micros as u8,
        ])
    }

    /// `FF 58 04 nn dd cc bb`.
    ///
    /// `denominator` is the written value (4 for quarter notes) and is stored as
    /// a power of two, rounded down.
    pub fn time_signature(
        numerator: u8,
        denominator: u8,
        clocks_per_click: u8,
        thirty_seconds_per_quarter: u8,
    ) -> Self {
        let power = denominator.max(1).ilog2() as u8;
        Self(alloc::vec![
            0xFF,
            MetaType::TimeSignature.into(),
            4,
            numerator,
            power,
            clocks_per_click,
            thirty_seconds_per_quarter,
        ])
    }

    /// `FF 59 02 sf mi` where `sharps` is negative for flats
    pub fn key_signature(sharps: i8, minor: bool) -> Self {
        Self(alloc::vec![
            0xFF,
            MetaType::KeySignature.into(),
            2,
            sharps.clamp(-7, 7) as u8,
            minor as u8,
        ])
    }

    /// `FF 54 05 hr mn se fr ff`
    pub fn smpte_offset_meta(offset: &SmpteOffset) -> Self {
        let mut bytes = alloc::vec![0xFF, MetaType::SmpteOffset.into(), 5];
        bytes.extend_from_slice(&offset.to_bytes());
        Self(bytes)
    }

    /// `FF 2F 00`
    pub fn end_of_track() -> Self {
        Self(alloc::vec![0xFF, MetaType::EndOfTrack.into(), 0])
    }

    /// `F0 <payload>`. The payload normally finishes with `F7`.
    pub fn sysex(payload: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(payload.len() + 1);
        bytes.push(0xF0);
        bytes.extend_from_slice(payload);
        Self(bytes)
    }

    /// `F7 <payload>`: a sysex continuation or arbitrary escaped bytes
    pub fn escape(payload: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(payload.len() + 1);
        bytes.push(0xF7);
        bytes.extend_from_slice(payload);
        Self(bytes)
    }

    /// The raw bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the message into its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Number of bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no bytes at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if the byte count agrees with the status byte.
    pub fn is_well_formed(&self) -> bool {
        let Some(status) = self.status() else {
            return false;
        };
        if let Some(command) = Command::from_status(status) {
            return self.len() == command.parameter_count() + 1
                && self.0[1..].iter().all(|b| *b < 0x80);
        }
        match status {
            0xFF => self.meta_payload_range().is_some_and(|r| r.end == self.len()),
            0xF0 | 0xF7 => true,
            _ => false,
        }
    }

    /// The status byte
    pub fn status(&self) -> Option<u8> {
        self.0.first().copied()
    }

    /// The top four bits of the status byte (`0x80`, `0x90`...)
    pub fn command_nibble(&self) -> Option<u8> {
        self.status().map(|s| s & 0xF0)
    }

    /// The channel command, or `None` for meta and system messages
    pub fn command(&self) -> Option<Command> {
        self.status().and_then(Command::from_status)
    }

    /// The channel, `0..=15`, for channel messages
    pub fn channel(&self) -> Option<u8> {
        self.command()?;
        self.status().map(|s| s & 0x0F)
    }

    /// First data byte
    pub fn p1(&self) -> Option<u8> {
        self.0.get(1).copied()
    }

    /// Second data byte
    pub fn p2(&self) -> Option<u8> {
        self.0.get(2).copied()
    }

    /// A typed view of a channel message
    pub fn as_channel_message(&self) -> Option<ChannelMessage> {
        let (status, params) = self.0.split_first()?;
        ChannelMessage::from_parts(*status, params)
    }

    fn is_command(&self, command: Command) -> bool {
        self.command() == Some(command) && self.len() == command.parameter_count() + 1
    }

    /// True for channel voice and mode messages
    pub fn is_channel_message(&self) -> bool {
        self.command()
            .is_some_and(|c| self.len() == c.parameter_count() + 1)
    }

    /// `0x9n` with a non-zero velocity
    pub fn is_note_on(&self) -> bool {
        self.is_command(Command::NoteOn) && self.0[2] != 0
    }

    /// `0x8n`, or `0x9n` with a zero velocity
    pub fn is_note_off(&self) -> bool {
        self.is_command(Command::NoteOff) || (self.is_command(Command::NoteOn) && self.0[2] == 0)
    }

    /// Either kind of note message
    pub fn is_note(&self) -> bool {
        self.is_command(Command::NoteOn) || self.is_command(Command::NoteOff)
    }

    /// `0xAn`
    pub fn is_aftertouch(&self) -> bool {
        self.is_command(Command::Aftertouch)
    }

    /// `0xBn`
    pub fn is_controller(&self) -> bool {
        self.is_command(Command::Controller)
    }

    /// `0xCn`
    pub fn is_patch_change(&self) -> bool {
        self.is_command(Command::PatchChange)
    }

    /// `0xDn`
    pub fn is_pressure(&self) -> bool {
        self.is_command(Command::ChannelPressure)
    }

    /// `0xEn`
    pub fn is_pitch_bend(&self) -> bool {
        self.is_command(Command::PitchBend)
    }

    /// `F0` or `F7`
    pub fn is_sysex(&self) -> bool {
        matches!(self.status(), Some(0xF0 | 0xF7))
    }

    /// `FF` with at least a type and a length byte
    pub fn is_meta(&self) -> bool {
        self.status() == Some(0xFF) && self.len() >= 3
    }

    /// The raw meta type byte
    pub fn meta_type_byte(&self) -> Option<u8> {
        self.is_meta().then(|| self.0[1])
    }

    /// The meta type, if it is one this crate knows about
    pub fn meta_type(&self) -> Option<MetaType> {
        self.meta_type_byte()
            .and_then(|b| MetaType::try_from(b).ok())
    }

    fn meta_payload_range(&self) -> Option<core::ops::Range<usize>> {
        if !self.is_meta() {
            return None;
        }
        let (len, vlv_len) = vlv::decode(&self.0[2..]).ok()?;
        let start = 2 + vlv_len;
        let end = start.checked_add(len as usize)?;
        (end <= self.len()).then_some(start..end)
    }

    /// The payload of a meta message, after the length
    pub fn meta_data(&self) -> Option<&[u8]> {
        self.meta_payload_range().map(|r| &self.0[r])
    }

    /// The payload of a text meta message, decoded lossily
    pub fn meta_text(&self) -> Option<Cow<'_, str>> {
        if !self.meta_type()?.is_text() {
            return None;
        }
        self.meta_data().map(String::from_utf8_lossy)
    }

    /// The payload of a system exclusive or escape message, after the marker
    pub fn sysex_data(&self) -> Option<&[u8]> {
        self.is_sysex().then(|| &self.0[1..])
    }

    /// `FF 2F`
    pub fn is_end_of_track(&self) -> bool {
        self.meta_type_byte() == Some(MetaType::EndOfTrack.into())
    }

    /// `FF 51 03 tttttt`
    pub fn is_tempo(&self) -> bool {
        self.meta_type() == Some(MetaType::Tempo) && self.len() == 6
    }

    /// `FF 58`
    pub fn is_time_signature(&self) -> bool {
        self.meta_type() == Some(MetaType::TimeSignature)
    }

    /// `FF 59`
    pub fn is_key_signature(&self) -> bool {
        self.meta_type() == Some(MetaType::KeySignature)
    }

    /// Any of the text meta types
    pub fn is_text(&self) -> bool {
        self.meta_type().is_some_and(|t| t.is_text())
    }

    /// Microseconds per quarter note of a tempo message
    pub fn tempo_micros(&self) -> Option<u32> {
        if !self.is_tempo() {
            return None;
        }
        Some(((self.0[3] as u32) << 16) | ((self.0[4] as u32) << 8) | self.0[5] as u32)
    }

    /// Seconds per quarter note
    pub fn tempo_seconds(&self) -> Option<f64> {
        self.tempo_micros().map(|us| us as f64 / 1_000_000.)
    }

    /// Quarter notes per minute
    pub fn tempo_bpm(&self) -> Option<f64> {
        self.tempo_micros()
            .filter(|us| *us > 0)
            .map(|us| 60_000_000. / us as f64)
    }

    /// Ticks per second for a given resolution
    pub fn tempo_ticks_per_second(&self, ticks_per_quarter_note: u16) -> Option<f64> {
        self.tempo_micros()
            .filter(|us| *us > 0)
            .map(|us| ticks_per_quarter_note as f64 * 1_000_000. / us as f64)
    }

    /// Seconds per tick for a given resolution
    pub fn tempo_seconds_per_tick(&self, ticks_per_quarter_note: u16) -> Option<f64> {
        if ticks_per_quarter_note == 0 {
            return None;
        }
        self.tempo_micros()
            .map(|us| us as f64 / 1_000_000. / ticks_per_quarter_note as f64)
    }

    /// The decoded SMPTE offset of a `FF 54` message
    pub fn smpte_offset(&self) -> Option<SmpteOffset> {
        if self.meta_type() != Some(MetaType::SmpteOffset) {
            return None;
        }
        SmpteOffset::parse(self.meta_data()?).ok()
    }

    /// Key number of note and aftertouch messages
    pub fn key_number(&self) -> Option<u8> {
        if self.is_note() || self.is_aftertouch() {
            self.p1()
        } else {
            None
        }
    }

    /// Velocity of note messages
    pub fn velocity(&self) -> Option<u8> {
        if self.is_note() { self.p2() } else { None }
    }

    /// Controller number of controller messages
    pub fn controller_number(&self) -> Option<u8> {
        if self.is_controller() { self.p1() } else { None }
    }

    /// Controller value of controller messages
    pub fn controller_value(&self) -> Option<u8> {
        if self.is_controller() { self.p2() } else { None }
    }

    /// Program number of patch change messages
    pub fn patch(&self) -> Option<u8> {
        if self.is_patch_change() { self.p1() } else { None }
    }

    /// 14 bit value of a pitch bend message
    pub fn pitch_bend_amount(&self) -> Option<u16> {
        if !self.is_pitch_bend() {
            return None;
        }
        Some(((self.0[2] as u16) << 7) | self.0[1] as u16)
    }

    /// Change the status byte of a channel message, resizing it to the new command.
    ///
    /// Does nothing if either the old or the new status is not a channel status.
    pub fn set_status(&mut self, status: u8) {
        if self.command().is_none() || Command::from_status(status).is_none() {
            return;
        }
        self.0[0] = status;
        self.set_size_to_command();
    }

    /// Change the command of a channel message, keeping its channel
    pub fn set_command(&mut self, command: Command) {
        if let Some(channel) = self.channel() {
            self.set_status(u8::from(command) | channel);
        }
    }

    /// Change the channel of a channel message
    pub fn set_channel(&mut self, channel: u8) {
        if self.command().is_some() {
            self.0[0] = (self.0[0] & 0xF0) | (channel & 0x0F);
        }
    }

    /// Pads or truncates a channel message to the size its command requires.
    ///
    /// Returns the new length, or `None` for meta and system messages.
    pub fn set_size_to_command(&mut self) -> Option<usize> {
        let command = self.command()?;
        self.0.resize(command.parameter_count() + 1, 0);
        Some(self.len())
    }

    fn set_data_byte(&mut self, index: usize, value: u8) {
        if self.is_channel_message() && index < self.len() {
            self.0[index] = value & 0x7F;
        }
    }

    /// Change the key number of a note or aftertouch message
    pub fn set_key_number(&mut self, key: u8) {
        if self.is_note() || self.is_aftertouch() {
            self.set_data_byte(1, key);
        }
    }

    /// Change the velocity of a note message
    pub fn set_velocity(&mut self, velocity: u8) {
        if self.is_note() {
            self.set_data_byte(2, velocity);
        }
    }

    /// Change the first data byte of a channel message
    pub fn set_p1(&mut self, value: u8) {
        self.set_data_byte(1, value);
    }

    /// Change the second data byte of a channel message
    pub fn set_p2(&mut self, value: u8) {
        self.set_data_byte(2, value);
    }

    /// Turns the message into a tempo message with the given quarter notes per minute
    pub fn set_tempo(&mut self, bpm: f64) {
        let micros = if bpm > 0. {
            (60_000_000. / bpm + 0.5) as u32
        } else {
            DEFAULT_TEMPO_MICROS
        };
        self.set_tempo_micros(micros);
    }

    /// Turns the message into a tempo message with the given microseconds per quarter note
    pub fn set_tempo_micros(&mut self, micros: u32) {
        *self = Self::tempo_from_micros(micros);
    }

    /// Turns a note-on into a note-off with the same key and velocity zero
    pub fn make_note_off(&mut self) {
        if self.is_note() {
            self.set_command(Command::NoteOff);
            self.0[2] = 0;
        }
    }

    pub(crate) fn sort_rank(&self) -> u8 {
        if self.is_end_of_track() {
            4
        } else if self.is_meta() {
            0
        } else if self.is_note_on() {
            3
        } else if self.is_note_off() {
            2
        } else {
            1
        }
    }
}

impl From<MidiMessage> for Vec<u8> {
    fn from(value: MidiMessage) -> Self {
        value.0
    }
}

impl TryFrom<Vec<u8>> for MidiMessage {
    type Error = Vec<u8>;
    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let message = Self(value);
        if message.is_well_formed() {
            Ok(message)
        } else {
            Err(message.0)
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[test]
fn note_classification() {
    let on = MidiMessage::note_on(0, 60, 64);
    assert!(on.is_note_on());
    assert!(!on.is_note_off());

    let zero = MidiMessage::note_on(0, 60, 0);
    assert!(zero.is_note_off());
    assert!(!zero.is_note_on());

    let off = MidiMessage::note_off(15, 60, 64);
    assert!(off.is_note_off());
    assert_eq!(off.channel(), Some(15));
}

#[test]
fn tempo_accessors() {
    let tempo = MidiMessage::tempo(120.);
    assert_eq!(tempo.bytes(), [0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
    assert_eq!(tempo.tempo_micros(), Some(500_000));
    assert_eq!(tempo.tempo_bpm(), Some(120.));
    assert_eq!(tempo.tempo_seconds_per_tick(500), Some(0.001));
    assert!(MidiMessage::note_on(0, 1, 1).tempo_micros().is_none());
}

#[test]
fn meta_payload_and_text() {
    let name = MidiMessage::text(MetaType::TrackName, "Piano").unwrap();
    assert_eq!(name.bytes()[..3], [0xFF, 0x03, 0x05]);
    assert_eq!(name.meta_text().as_deref(), Some("Piano"));
    assert!(name.is_well_formed());
    assert!(MidiMessage::end_of_track().is_end_of_track());
}

#[test]
fn well_formedness() {
    assert!(MidiMessage::from_bytes(alloc::vec![0x90, 60]).is_none());
    assert!(MidiMessage::from_bytes(alloc::vec![0xC0, 5]).is_some());
    assert!(MidiMessage::from_bytes(alloc::vec![0xFF, 0x01, 0x03, b'a']).is_none());
    assert!(MidiMessage::from_bytes(alloc::vec![0xF3]).is_none());
}

#[test]
fn changing_command_resizes() {
    let mut message = MidiMessage::controller(3, 7, 100);
    message.set_command(Command::PatchChange);
    assert_eq!(message.bytes(), [0xC3, 7]);
    message.set_command(Command::PitchBend);
    assert_eq!(message.bytes(), [0xE3, 7, 0]);
}

#[test]
fn pitch_bend_range() {
    assert_eq!(MidiMessage::pitch_bend(0, 0.).pitch_bend_amount(), Some(8192));
    assert_eq!(MidiMessage::pitch_bend(0, -1.).pitch_bend_amount(), Some(0));
    assert_eq!(MidiMessage::pitch_bend(0, 4.).pitch_bend_amount(), Some(16383));
}

#[test]
fn display_is_hex() {
    use alloc::string::ToString;
    assert_eq!(MidiMessage::note_on(1, 0x3C, 0x7F).to_string(), "91 3c 7f");
}
