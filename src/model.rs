//! # Resolved Music Model
//!
//! The immutable result of transforming an ABC document.
//!
//! ## Type Hierarchy
//! ```text
//! Song
//!   ├── Header (index, title, composer, key, meter, bpm, tempo beat, default length)
//!   └── Body
//!         └── Vec<Voice>            (first-seen order)
//!               ├── name
//!               └── Vec<Music>      (repeats expanded, bars flattened)
//!
//! Music (enum)
//!   ├── Note      letter, accidental, octave, duration, syllable
//!   ├── Rest      duration
//!   ├── Chord     Vec<Note> sounding together, syllable
//!   └── Grouping  duplet | triplet | quadruplet of Note | Chord | Rest
//! ```
//!
//! ## Key Concepts
//!
//! ### Durations
//! A note's duration is a multiple of the header's default length, so `C` is
//! `1/1` and `C/2` is `1/2` regardless of `L:`.
//!
//! ### Accidentals
//! Accidentals are fully resolved: a bare `F` in D major is stored as
//! `Accidental::Sharp`. `Accidental::Natural` only appears when `=` was written.
//!
//! ### Octaves
//! `0` is the octave of uppercase `C`..`B`; lowercase letters are `+1`, every `'`
//! adds one more and every `,` takes one away.
//!
//! ### Value semantics
//! All variants are plain owned values; cloning is a deep copy and copies never
//! alias. A finished [`Song`] has no mutating API and can be shared freely.

use crate::fraction::Fraction;
use crate::key::KeySignature;
use serde::Serialize;

/// Name of the voice that collects music written before any `V:` field.
pub const DEFAULT_VOICE_NAME: &str = "default";

/// Note letters A through G.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NoteName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NoteName {
    /// Case-insensitive letter lookup.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            _ => None,
        }
    }

    /// Slot in a key signature's offset vector (A = 0 .. G = 6).
    pub fn index(&self) -> usize {
        match self {
            NoteName::A => 0,
            NoteName::B => 1,
            NoteName::C => 2,
            NoteName::D => 3,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 6,
        }
    }

    /// Semitones above C within the same octave.
    pub fn semitones_from_c(&self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }
}

/// Resolved accidental of a note occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accidental {
    #[default]
    None,
    Flat,
    DoubleFlat,
    Sharp,
    DoubleSharp,
    Natural,
}

impl Accidental {
    /// Inline marker as written before the letter: `_`, `__`, `^`, `^^`, `=`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "_" => Some(Accidental::Flat),
            "__" => Some(Accidental::DoubleFlat),
            "^" => Some(Accidental::Sharp),
            "^^" => Some(Accidental::DoubleSharp),
            "=" => Some(Accidental::Natural),
            _ => None,
        }
    }

    pub fn semitone_offset(&self) -> i32 {
        match self {
            Accidental::None | Accidental::Natural => 0,
            Accidental::Flat => -1,
            Accidental::DoubleFlat => -2,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }
}

/// A single pitched note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub name: NoteName,
    pub accidental: Accidental,
    pub octave: i32,
    pub duration: Fraction,
    #[serde(skip_serializing_if = "Option::is_none")]
    syllable: Option<String>,
}

impl Note {
    pub fn new(name: NoteName, accidental: Accidental, octave: i32, duration: Fraction) -> Self {
        Self {
            name,
            accidental,
            octave,
            duration,
            syllable: None,
        }
    }

    pub fn syllable(&self) -> Option<&str> {
        self.syllable.as_deref()
    }

    pub fn set_syllable(&mut self, syllable: Option<String>) {
        self.syllable = syllable;
    }

    /// Semitones relative to the uppercase C of octave 0.
    pub fn semitones(&self) -> i32 {
        (self.name.semitones_from_c() + self.accidental.semitone_offset())
            .saturating_add(self.octave.saturating_mul(12))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rest {
    pub duration: Fraction,
}

impl Rest {
    pub fn new(duration: Fraction) -> Self {
        Self { duration }
    }
}

/// Notes struck together. The chord lasts as long as its first note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chord {
    notes: Vec<Note>,
    #[serde(skip_serializing_if = "Option::is_none")]
    syllable: Option<String>,
}

impl Chord {
    /// `None` for an empty chord.
    pub fn new(notes: Vec<Note>) -> Option<Self> {
        if notes.is_empty() {
            return None;
        }
        Some(Self {
            notes,
            syllable: None,
        })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn duration(&self) -> Fraction {
        self.notes.first().map(|n| n.duration).unwrap_or_default()
    }

    pub fn syllable(&self) -> Option<&str> {
        self.syllable.as_deref()
    }

    pub fn set_syllable(&mut self, syllable: Option<String>) {
        self.syllable = syllable;
    }
}

/// Tuplet figure: how many notes are played in the time of how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingKind {
    Duplet,
    Triplet,
    Quadruplet,
}

impl GroupingKind {
    /// `(2`, `(3`, `(4`.
    pub fn from_count(count: u32) -> Option<Self> {
        match count {
            2 => Some(GroupingKind::Duplet),
            3 => Some(GroupingKind::Triplet),
            4 => Some(GroupingKind::Quadruplet),
            _ => None,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            GroupingKind::Duplet => 2,
            GroupingKind::Triplet => 3,
            GroupingKind::Quadruplet => 4,
        }
    }

    /// Factor applied to the written durations: 2 in the time of 3, 3 in the
    /// time of 2, 4 in the time of 3.
    pub fn time_ratio(&self) -> Fraction {
        match self {
            GroupingKind::Duplet => Fraction::raw(3, 2),
            GroupingKind::Triplet => Fraction::raw(2, 3),
            GroupingKind::Quadruplet => Fraction::raw(3, 4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouping {
    pub kind: GroupingKind,
    elements: Vec<Music>,
    #[serde(skip)]
    duration: Fraction,
}

impl Grouping {
    /// `None` if any element is itself a grouping, or if the total duration
    /// does not fit in a [`Fraction`].
    pub fn new(kind: GroupingKind, elements: Vec<Music>) -> Option<Self> {
        if elements.iter().any(|m| matches!(m, Music::Grouping(_))) {
            return None;
        }
        let duration = Fraction::checked_sum(elements.iter().map(Music::duration))?
            .checked_mul(kind.time_ratio())?;
        Some(Self {
            kind,
            elements,
            duration,
        })
    }

    pub fn elements(&self) -> &[Music] {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut [Music] {
        &mut self.elements
    }

    /// Sum of the written member durations times the kind's time ratio.
    pub fn duration(&self) -> Fraction {
        self.duration
    }
}

/// One event in a voice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Music {
    Note(Note),
    Rest(Rest),
    Chord(Chord),
    Grouping(Grouping),
}

impl Music {
    pub fn duration(&self) -> Fraction {
        match self {
            Music::Note(note) => note.duration,
            Music::Rest(rest) => rest.duration,
            Music::Chord(chord) => chord.duration(),
            Music::Grouping(grouping) => grouping.duration(),
        }
    }

    /// Lyric syllable of a note or chord; always `None` for rests and groupings.
    pub fn syllable(&self) -> Option<&str> {
        match self {
            Music::Note(note) => note.syllable(),
            Music::Chord(chord) => chord.syllable(),
            Music::Rest(_) | Music::Grouping(_) => None,
        }
    }

    /// Returns `false` when the variant cannot carry a syllable.
    pub fn set_syllable(&mut self, syllable: Option<String>) -> bool {
        match self {
            Music::Note(note) => note.set_syllable(syllable),
            Music::Chord(chord) => chord.set_syllable(syllable),
            Music::Rest(_) | Music::Grouping(_) => return false,
        }
        true
    }
}

/// Tune metadata with all defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub index: u32,
    pub title: String,
    pub composer: String,
    pub key: KeySignature,
    pub meter: Fraction,
    pub beats_per_minute: u32,
    pub tempo_beat: Fraction,
    pub default_length: Fraction,
}

/// A named, flattened line of music.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Voice {
    name: String,
    music: Vec<Music>,
}

impl Voice {
    pub fn new(name: impl Into<String>, music: &[Music]) -> Self {
        Self {
            name: name.into(),
            music: music.to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn music(&self) -> &[Music] {
        &self.music
    }
}

/// Voices in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Body {
    voices: Vec<Voice>,
}

impl Body {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    pub fn get(&self, name: &str) -> Option<&Voice> {
        self.voices.iter().find(|v| v.name == name)
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

/// A fully resolved tune.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Song {
    header: Header,
    body: Body,
}

impl Song {
    pub fn new(header: Header, body: Body) -> Self {
        Self { header, body }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}
