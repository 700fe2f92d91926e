use core::fmt;
use core::ops::{Add, Sub};

#[doc = r#"
A MIDI key number, `0..=127`, with its pitch name and octave.

Key number `0` is `C(-1)` and `127` is `G9`. Middle C (`60`) is `C4`.

# Example
```rust
# use smfkit::prelude::*;
let note = Note::from_key_number(63).unwrap();

assert_eq!(note.key(), Key::DSharp);
assert_eq!(note.octave(), Octave::new(4));
assert_eq!(note.to_string(), "D#/Eb4");
```
"#]
#[derive(Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note(u8);

impl Note {
    /// Create a note from a key number. `None` if the number has its high bit set.
    pub const fn from_key_number(number: u8) -> Option<Self> {
        if number > 127 {
            return None;
        }
        Some(Self(number))
    }

    /// Create a note from a pitch name and octave.
    ///
    /// Returns `None` for the pitches above `G9`, which MIDI cannot express.
    pub const fn new(key: Key, octave: Octave) -> Option<Self> {
        let number = (octave.value() as i16 + 1) * 12 + key.semitone() as i16;
        if number > 127 {
            return None;
        }
        Some(Self(number as u8))
    }

    /// The key number
    #[inline]
    pub const fn number(&self) -> u8 {
        self.0
    }

    /// The pitch name
    #[inline]
    pub const fn key(&self) -> Key {
        Key::from_semitone(self.0 % 12)
    }

    /// The octave, `-1..=9`
    #[inline]
    pub const fn octave(&self) -> Octave {
        Octave((self.0 / 12) as i8 - 1)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.key(), self.octave())
    }
}

impl Add<u8> for Note {
    type Output = Note;
    fn add(self, rhs: u8) -> Self::Output {
        Self(self.0.saturating_add(rhs).min(127))
    }
}

impl Sub<u8> for Note {
    type Output = Note;
    fn sub(self, rhs: u8) -> Self::Output {
        Self(self.0.saturating_sub(rhs))
    }
}

#[allow(missing_docs)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// The twelve pitch names of an octave
pub enum Key {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl Key {
    /// Returns an array beginning with [`Key::C`] to [`Key::B`]
    pub const fn all() -> [Key; 12] {
        use Key::*;
        [C, CSharp, D, DSharp, E, F, FSharp, G, GSharp, A, ASharp, B]
    }

    /// True for the black keys
    #[inline]
    pub const fn is_sharp(&self) -> bool {
        use Key::*;
        matches!(self, CSharp | DSharp | FSharp | GSharp | ASharp)
    }

    const fn from_semitone(semitone: u8) -> Self {
        Self::all()[(semitone % 12) as usize]
    }

    const fn semitone(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Key::*;
        let name = match self {
            C => "C",
            CSharp => "C#/Db",
            D => "D",
            DSharp => "D#/Eb",
            E => "E",
            F => "F",
            FSharp => "F#/Gb",
            G => "G",
            GSharp => "G#/Ab",
            A => "A",
            ASharp => "A#/Bb",
            B => "B",
        };
        f.write_str(name)
    }
}

/// An octave number, `-1..=9`
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Octave(i8);

impl Octave {
    /// Clamps to `-1..=9`.
    pub const fn new(octave: i8) -> Self {
        if octave < -1 {
            Self(-1)
        } else if octave > 9 {
            Self(9)
        } else {
            Self(octave)
        }
    }

    /// The octave number
    pub const fn value(&self) -> i8 {
        self.0
    }
}

impl fmt::Display for Octave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[test]
fn key_numbers_round_trip_through_names() {
    for number in 0..128 {
        let note = Note::from_key_number(number).unwrap();
        assert_eq!(Note::new(note.key(), note.octave()), Some(note));
    }
    assert_eq!(Note::new(Key::GSharp, Octave::new(9)), None);
}

#[test]
fn middle_c() {
    let c = Note::from_key_number(60).unwrap();
    assert_eq!(c.key(), Key::C);
    assert_eq!(c.octave().value(), 4);
}

#[test]
fn arithmetic_saturates() {
    let top = Note::from_key_number(120).unwrap();
    assert_eq!((top + 50).number(), 127);
    assert_eq!((top - 200).number(), 0);
}
