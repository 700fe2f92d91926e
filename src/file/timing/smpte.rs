#![doc = r#"
SMPTE frame rates

A file can count time in frames instead of quarter notes. The division field
then holds a negative frame code in its high byte and a tick count per frame
in its low byte, and tempo changes no longer affect the length of a tick.
Track level `FF 54` offsets use the same four rates, stored in two bits.
"#]

/// The four frame rates MIDI can express
///
/// `TwentyNine` is the NTSC drop frame rate, 30000/1001 frames per second.
/// Drop frame timecode skips frame labels; no frames are actually removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SmpteFps {
    /// Film
    TwentyFour,
    /// PAL/SECAM video
    TwentyFive,
    /// NTSC color video, 29.97 fps
    TwentyNine,
    /// NTSC black and white video
    Thirty,
}

impl SmpteFps {
    /// Reads the signed frame code stored in the high byte of the division field
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            -24 => Some(Self::TwentyFour),
            -25 => Some(Self::TwentyFive),
            -29 => Some(Self::TwentyNine),
            -30 => Some(Self::Thirty),
            _ => None,
        }
    }

    /// The signed frame code written to the division field
    pub const fn code(&self) -> i8 {
        -(self.nominal() as i8)
    }

    const fn nominal(&self) -> u8 {
        match self {
            Self::TwentyFour => 24,
            Self::TwentyFive => 25,
            Self::TwentyNine => 29,
            Self::Thirty => 30,
        }
    }

    /// Reads the two rate bits of an `FF 54` SMPTE offset
    pub const fn from_offset_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::TwentyFour),
            1 => Some(Self::TwentyFive),
            2 => Some(Self::TwentyNine),
            3 => Some(Self::Thirty),
            _ => None,
        }
    }

    /// The two rate bits of an `FF 54` SMPTE offset
    pub const fn offset_bits(&self) -> u8 {
        match self {
            Self::TwentyFour => 0,
            Self::TwentyFive => 1,
            Self::TwentyNine => 2,
            Self::Thirty => 3,
        }
    }

    /// Frames per second used to size a tick.
    ///
    /// Drop frame counts as 30 here, matching how the division field is read.
    ///
    /// ```rust
    /// # use smfkit::prelude::*;
    /// assert_eq!(SmpteFps::TwentyNine.as_division(), 30);
    /// ```
    pub const fn as_division(&self) -> u8 {
        match self {
            Self::TwentyNine => 30,
            other => other.nominal(),
        }
    }

    /// The exact frame rate, fractional for drop frame
    pub const fn as_f64(&self) -> f64 {
        match self {
            Self::TwentyNine => DROP_FRAME,
            other => other.nominal() as f64,
        }
    }
}

const DROP_FRAME: f64 = 30_000. / 1001.;

#[test]
fn codes_round_trip() {
    for fps in [
        SmpteFps::TwentyFour,
        SmpteFps::TwentyFive,
        SmpteFps::TwentyNine,
        SmpteFps::Thirty,
    ] {
        assert_eq!(SmpteFps::from_code(fps.code()), Some(fps));
        assert_eq!(SmpteFps::from_offset_bits(fps.offset_bits()), Some(fps));
    }
    assert_eq!(SmpteFps::from_code(-26), None);
}
