mod smpte;
pub use smpte::*;

use crate::FormatError;

/// Ticks per quarter note used by a freshly created file
pub const DEFAULT_TICKS_PER_QUARTER_NOTE: u16 = 120;

/// The header timing type.
///
/// This is either the number of ticks per quarter note or
/// the alternative SMPTE format, packed into the 16 bit division field of the
/// `MThd` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Timing {
    /// The midi file's delta times are defined using a tick rate per quarter note
    TicksPerQuarterNote(TicksPerQuarterNote),

    /// The midi file's delta times are defined using an SMPTE and MIDI Time Code
    Smpte(SmpteHeader),
}

impl Default for Timing {
    fn default() -> Self {
        Self::new_ticks_per_quarter_note(DEFAULT_TICKS_PER_QUARTER_NOTE)
    }
}

impl Timing {
    /// The tickrate per quarter note defines what a "quarter note" means.
    ///
    /// The leading bit of the u16 is disregarded, so 1-32767
    pub const fn new_ticks_per_quarter_note(tpqn: u16) -> Self {
        Self::TicksPerQuarterNote(TicksPerQuarterNote {
            inner: (tpqn & 0x7FFF).to_be_bytes(),
        })
    }

    /// Define the timing in terms of fps and ticks per frame
    pub const fn new_smpte(fps: SmpteFps, ticks_per_frame: u8) -> Self {
        Self::Smpte(SmpteHeader {
            fps,
            ticks_per_frame,
        })
    }

    /// 25 frames per second with 40 ticks per frame: one tick per millisecond
    pub const fn milliseconds() -> Self {
        Self::new_smpte(SmpteFps::TwentyFive, 40)
    }

    /// Decode the division field of the header chunk
    pub fn from_division(division: u16) -> Result<Self, FormatError> {
        let [msb, lsb] = division.to_be_bytes();
        if msb & 0x80 == 0 {
            return Ok(Self::TicksPerQuarterNote(TicksPerQuarterNote {
                inner: [msb, lsb],
            }));
        }
        // the high byte holds -24, -25, -29 or -30 as a two's complement value
        let code = msb as i8;
        let fps = SmpteFps::from_code(code).ok_or(FormatError::SmpteFps(code))?;
        Ok(Self::new_smpte(fps, lsb))
    }

    /// Encode the timing as the division field of the header chunk
    pub const fn to_division(&self) -> u16 {
        match self {
            Self::TicksPerQuarterNote(t) => t.ticks_per_quarter_note(),
            Self::Smpte(s) => u16::from_be_bytes([s.fps.code() as u8, s.ticks_per_frame]),
        }
    }

    /// Returns Some if the midi timing is defined
    /// as ticks per quarter note
    pub const fn ticks_per_quarter_note(&self) -> Option<u16> {
        match self {
            Self::TicksPerQuarterNote(t) => Some(t.ticks_per_quarter_note()),
            _ => None,
        }
    }

    /// Returns Some with the fixed tick rate of SMPTE timing
    pub const fn ticks_per_second(&self) -> Option<u32> {
        match self {
            Self::Smpte(s) => Some(s.ticks_per_second()),
            _ => None,
        }
    }

    /// True for SMPTE timing
    pub const fn is_smpte(&self) -> bool {
        matches!(self, Self::Smpte(_))
    }
}

/// A representation of the `tpqn` timing for a MIDI file
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TicksPerQuarterNote {
    pub(crate) inner: [u8; 2],
}
impl TicksPerQuarterNote {
    /// Returns the ticks per quarter note for the file.
    pub const fn ticks_per_quarter_note(&self) -> u16 {
        let v = u16::from_be_bytes(self.inner);
        v & 0x7FFF
    }
}

/// A representation of the `smpte` timing for a MIDI file
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmpteHeader {
    pub(crate) fps: SmpteFps,
    pub(crate) ticks_per_frame: u8,
}

impl SmpteHeader {
    /// Returns the frames per second
    pub const fn fps(&self) -> SmpteFps {
        self.fps
    }

    /// Returns the ticks per frame
    pub const fn ticks_per_frame(&self) -> u8 {
        self.ticks_per_frame
    }

    /// Nominal frames per second times ticks per frame.
    ///
    /// Drop frame timing counts as 30 frames per second here.
    pub const fn ticks_per_second(&self) -> u32 {
        self.fps.as_division() as u32 * self.ticks_per_frame as u32
    }
}

#[test]
fn division_field() {
    assert_eq!(
        Timing::from_division(0x01E0).unwrap().ticks_per_quarter_note(),
        Some(480)
    );

    let millis = Timing::from_division(0xE728).unwrap();
    assert_eq!(millis, Timing::milliseconds());
    assert_eq!(millis.ticks_per_second(), Some(1000));
    assert_eq!(millis.to_division(), 0xE728);

    assert_eq!(
        Timing::from_division(0xE028),
        Err(FormatError::SmpteFps(-32))
    );
}
