//! Playback data generation engine
//!
//! Lays every voice of a resolved song out on one integer tick timeline.

use super::types::{LyricEvent, PlaybackData, PlaybackNote};
use crate::config::PlaybackConfig;
use crate::error::AbcError;
use crate::fraction::{lcm, Fraction};
use crate::model::{Grouping, Music, Note, Song};
use crate::parser::parse;
use log::debug;

fn overflow(what: &str) -> AbcError {
    AbcError::InvalidFraction(format!("{} overflows the tick timeline", what))
}

fn beats(music: &Music, scale: Fraction) -> Result<Fraction, AbcError> {
    music
        .duration()
        .checked_mul(scale)
        .ok_or_else(|| overflow("beat length"))
}

/// Beat length of each grouping member: the grouping's beats split evenly.
fn member_beats(grouping: &Grouping, scale: Fraction) -> Result<Fraction, AbcError> {
    grouping
        .duration()
        .checked_mul(scale)
        .and_then(|total| total.checked_mul(Fraction::raw(1, grouping.kind.count() as i64)))
        .ok_or_else(|| overflow("tuplet member length"))
}

/// Smallest tick resolution that represents every beat length in the song exactly.
fn ticks_per_beat(song: &Song, scale: Fraction) -> Result<u64, AbcError> {
    let resolve = |resolution: i64, length: Fraction| {
        lcm(resolution, length.denominator()).ok_or_else(|| overflow("tick resolution"))
    };
    let mut resolution: i64 = 1;
    for voice in song.body().voices() {
        for music in voice.music() {
            resolution = resolve(resolution, beats(music, scale)?)?;
            if let Music::Grouping(grouping) = music {
                resolution = resolve(resolution, member_beats(grouping, scale)?)?;
            }
        }
    }
    Ok(u64::try_from(resolution).unwrap_or(1).max(1))
}

struct Timeline<'a> {
    config: &'a PlaybackConfig,
    ticks_per_beat: u64,
    voice: &'a str,
    notes: Vec<PlaybackNote>,
    lyrics: Vec<LyricEvent>,
}

impl Timeline<'_> {
    fn ticks(&self, beats: Fraction) -> Result<u64, AbcError> {
        let denominator = beats.denominator() as u64;
        let numerator = u64::try_from(beats.numerator()).unwrap_or(0);
        numerator
            .checked_mul(self.ticks_per_beat / denominator)
            .ok_or_else(|| overflow("note length"))
    }

    fn midi_note(&self, note: &Note) -> u8 {
        let pitch = (self.config.reference_pitch as i32)
            .saturating_add(note.semitones())
            .saturating_add(self.config.transpose as i32);
        pitch.clamp(0, 127) as u8
    }

    fn sound(&mut self, note: &Note, start_tick: u64, duration_ticks: u64) {
        self.notes.push(PlaybackNote {
            voice: self.voice.to_string(),
            midi_note: self.midi_note(note),
            start_tick,
            duration_ticks,
        });
    }

    fn lyric(&mut self, syllable: Option<&str>, tick: u64) {
        match syllable {
            Some(text) if self.config.lyrics && !text.is_empty() => self.lyrics.push(LyricEvent {
                voice: self.voice.to_string(),
                text: text.to_string(),
                tick,
            }),
            _ => {}
        }
    }

    /// Emit one note, chord or rest. Groupings are unrolled by the caller.
    fn play(&mut self, music: &Music, start_tick: u64, duration_ticks: u64) {
        match music {
            Music::Note(note) => self.sound(note, start_tick, duration_ticks),
            Music::Chord(chord) => {
                for note in chord.notes() {
                    self.sound(note, start_tick, duration_ticks);
                }
            }
            Music::Rest(_) | Music::Grouping(_) => {}
        }
        self.lyric(music.syllable(), start_tick);
    }
}

/// Generate playback data from a resolved song.
///
/// A note's beat length is its duration times `L:` divided by the `Q:` beat.
/// Members of a tuplet share the tuplet's beats equally.
///
/// Fails with [`AbcError::InvalidFraction`] when the durations cannot share
/// one tick resolution or a tick position does not fit in a `u64`.
pub fn generate_playback_data(song: &Song, config: &PlaybackConfig) -> Result<PlaybackData, AbcError> {
    let header = song.header();
    let scale = header
        .default_length
        .checked_div(header.tempo_beat)
        .ok_or_else(|| overflow("tempo scale"))?;
    let ticks_per_beat = ticks_per_beat(song, scale)?;

    let mut notes = Vec::new();
    let mut lyrics = Vec::new();
    let mut total_ticks = 0;

    for voice in song.body().voices() {
        let mut timeline = Timeline {
            config,
            ticks_per_beat,
            voice: voice.name(),
            notes: Vec::new(),
            lyrics: Vec::new(),
        };
        let mut tick: u64 = 0;

        for music in voice.music() {
            let length = timeline.ticks(beats(music, scale)?)?;
            match music {
                Music::Grouping(grouping) => {
                    let member_ticks = timeline.ticks(member_beats(grouping, scale)?)?;
                    let mut start = tick;
                    for member in grouping.elements() {
                        timeline.play(member, start, member_ticks);
                        start = start.saturating_add(member_ticks);
                    }
                }
                _ => timeline.play(music, tick, length),
            }
            tick = tick
                .checked_add(length)
                .ok_or_else(|| overflow("voice length"))?;
        }

        debug!(
            "Voice {}: {} note(s) over {} tick(s)",
            voice.name(),
            timeline.notes.len(),
            tick
        );
        total_ticks = total_ticks.max(tick);
        notes.append(&mut timeline.notes);
        lyrics.append(&mut timeline.lyrics);
    }

    notes.sort_by_key(|n| n.start_tick);
    lyrics.sort_by_key(|l| l.tick);

    Ok(PlaybackData {
        title: header.title.clone(),
        beats_per_minute: header.beats_per_minute,
        ticks_per_beat,
        total_ticks,
        notes,
        lyrics,
    })
}

/// Parse ABC source and generate its playback data.
pub fn playback_from_source(source: &str, config: &PlaybackConfig) -> Result<PlaybackData, AbcError> {
    let song = parse(source)?;
    generate_playback_data(&song, config)
}
