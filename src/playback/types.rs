//! Playback data type definitions
//!
//! This module defines the types handed to a synthesizer or a lyric display.
//! All times are integer ticks; `ticks_per_beat` is chosen so that every note
//! of the song starts and ends exactly on a tick.

use serde::Serialize;

/// Playback data for a single sounding note
///
/// # Fields
/// - `voice`: Name of the voice the note belongs to
/// - `midi_note`: MIDI note number after reference pitch and transposition
/// - `start_tick`: Start time from the beginning of the song
/// - `duration_ticks`: Sounding length
///
/// Chords produce one `PlaybackNote` per chord member, all with the same start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackNote {
    pub voice: String,
    pub midi_note: u8,
    pub start_tick: u64,
    pub duration_ticks: u64,
}

/// A lyric syllable shown at `tick`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricEvent {
    pub voice: String,
    pub text: String,
    pub tick: u64,
}

/// Complete playback data for a song
///
/// Notes and lyrics are ordered by start tick; events that start together
/// keep voice order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackData {
    pub title: String,
    pub beats_per_minute: u32,
    pub ticks_per_beat: u64,
    /// End of the longest voice.
    pub total_ticks: u64,
    pub notes: Vec<PlaybackNote>,
    pub lyrics: Vec<LyricEvent>,
}

impl PlaybackData {
    /// Wall-clock length of one tick.
    pub fn seconds_per_tick(&self) -> f64 {
        60.0 / (self.beats_per_minute as f64 * self.ticks_per_beat as f64)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.total_ticks as f64 * self.seconds_per_tick()
    }
}
