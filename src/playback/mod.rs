//! # Playback Module
//!
//! Generate MIDI playback data from resolved songs.
//!
//! ## Purpose
//! This module converts a parsed [`Song`](crate::Song) into timed MIDI notes and
//! lyric events that a synthesizer or karaoke-style display can consume directly.
//!
//! ## Sub-modules
//! - `types` - PlaybackData, PlaybackNote, LyricEvent type definitions
//! - `engine` - Playback data generation
//!
//! ## Entry Points
//! - [`generate_playback_data()`] - Convert a song to playback data
//! - [`playback_from_source()`] - Parse ABC text and convert it in one step
//!
//! ## Example
//! ```rust
//! use abcplay::playback::playback_from_source;
//! use abcplay::PlaybackConfig;
//!
//! let data = playback_from_source("X:1\nL:1/4\nQ:1/4=120\nK:C\nC D E F|\n", &PlaybackConfig::default()).unwrap();
//!
//! assert_eq!(data.beats_per_minute, 120);
//! assert_eq!(data.ticks_per_beat, 1);
//! assert_eq!(data.notes.len(), 4);
//! assert_eq!(data.notes[0].midi_note, 60); // C4
//! assert_eq!(data.notes[3].start_tick, 3);
//! ```
//!
//! ## Timing
//!
//! Durations in a song are multiples of the `L:` default length. The engine
//! converts them to beats of the `Q:` tempo beat, then picks the smallest tick
//! resolution (lcm of all beat denominators) so every start and length is an
//! exact integer number of ticks. Tuplet members share their tuplet's beats
//! equally.
//!
//! ## Pitch
//!
//! `midi_note = reference_pitch + letter + accidental + 12 * octave + transpose`,
//! clamped to the MIDI range. With the default reference pitch uppercase `C`
//! is MIDI 60 and lowercase `c` is 72.
//!
//! ## Related Modules
//! - `model` - Song, Voice and Music types
//! - `config` - Reference pitch, transposition, lyric switch

mod engine;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{generate_playback_data, playback_from_source};
pub use types::{LyricEvent, PlaybackData, PlaybackNote};
