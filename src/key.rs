//! Key signatures: a table from key name to the accidental each letter carries.

use crate::error::AbcError;
use crate::model::{Accidental, NoteName};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Offsets are indexed A B C D E F G; +1 is a sharp, -1 a flat.
/// Every major key is followed by its relative minor.
const KEY_TABLE: &[(&str, [i8; 7])] = &[
    ("C", [0, 0, 0, 0, 0, 0, 0]),
    ("Am", [0, 0, 0, 0, 0, 0, 0]),
    ("G", [0, 0, 0, 0, 0, 1, 0]),
    ("Em", [0, 0, 0, 0, 0, 1, 0]),
    ("D", [0, 0, 1, 0, 0, 1, 0]),
    ("Bm", [0, 0, 1, 0, 0, 1, 0]),
    ("A", [0, 0, 1, 0, 0, 1, 1]),
    ("F#m", [0, 0, 1, 0, 0, 1, 1]),
    ("E", [0, 0, 1, 1, 0, 1, 1]),
    ("C#m", [0, 0, 1, 1, 0, 1, 1]),
    ("B", [1, 0, 1, 1, 0, 1, 1]),
    ("G#m", [1, 0, 1, 1, 0, 1, 1]),
    ("F#", [1, 0, 1, 1, 1, 1, 1]),
    ("D#m", [1, 0, 1, 1, 1, 1, 1]),
    ("C#", [1, 1, 1, 1, 1, 1, 1]),
    ("A#m", [1, 1, 1, 1, 1, 1, 1]),
    ("F", [0, -1, 0, 0, 0, 0, 0]),
    ("Dm", [0, -1, 0, 0, 0, 0, 0]),
    ("Bb", [0, -1, 0, 0, -1, 0, 0]),
    ("Gm", [0, -1, 0, 0, -1, 0, 0]),
    ("Eb", [-1, -1, 0, 0, -1, 0, 0]),
    ("Cm", [-1, -1, 0, 0, -1, 0, 0]),
    ("Ab", [-1, -1, 0, -1, -1, 0, 0]),
    ("Fm", [-1, -1, 0, -1, -1, 0, 0]),
    ("Db", [-1, -1, 0, -1, -1, 0, -1]),
    ("Bbm", [-1, -1, 0, -1, -1, 0, -1]),
    ("Gb", [-1, -1, -1, -1, -1, 0, -1]),
    ("Ebm", [-1, -1, -1, -1, -1, 0, -1]),
    ("Cb", [-1, -1, -1, -1, -1, -1, -1]),
    ("Abm", [-1, -1, -1, -1, -1, -1, -1]),
];

/// An immutable key signature. There is no default key: a name missing from the
/// table is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySignature {
    name: String,
    offsets: [i8; 7],
}

impl KeySignature {
    pub fn new(name: &str) -> Result<Self, AbcError> {
        let name = name.trim();
        KEY_TABLE
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(key, offsets)| Self {
                name: key.to_string(),
                offsets: *offsets,
            })
            .ok_or_else(|| AbcError::UnknownKey(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semitone offsets indexed A B C D E F G.
    pub fn offsets(&self) -> [i8; 7] {
        self.offsets
    }

    /// The accidental a bare `note` carries in this key.
    pub fn accidental_for(&self, note: NoteName) -> Accidental {
        match self.offsets[note.index()] {
            2 => Accidental::DoubleSharp,
            1 => Accidental::Sharp,
            -1 => Accidental::Flat,
            -2 => Accidental::DoubleFlat,
            _ => Accidental::None,
        }
    }
}

impl FromStr for KeySignature {
    type Err = AbcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for KeySignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}
