use super::*;
use crate::config::PlaybackConfig;
use crate::{parse, AbcError};

fn playback(source: &str) -> PlaybackData {
    playback_from_source(source, &PlaybackConfig::default()).unwrap()
}

fn midi(data: &PlaybackData) -> Vec<u8> {
    data.notes.iter().map(|n| n.midi_note).collect()
}

fn starts(data: &PlaybackData) -> Vec<u64> {
    data.notes.iter().map(|n| n.start_tick).collect()
}

#[test]
fn test_playback_basic_timing() {
    let data = playback("X:1\nL:1/4\nK:C\nC D E F|\n");

    assert_eq!(data.beats_per_minute, 100);
    assert_eq!(data.ticks_per_beat, 1);
    assert_eq!(data.notes.len(), 4);
    assert_eq!(starts(&data), vec![0, 1, 2, 3]);
    assert!(data.notes.iter().all(|n| n.duration_ticks == 1));
    assert_eq!(data.total_ticks, 4);
}

#[test]
fn test_playback_midi_notes() {
    let data = playback("K:C\nC D E F G A B c C, c'|\n");

    // C4=60 .. B4=71, c=C5, C,=C3, c'=C6
    assert_eq!(midi(&data), vec![60, 62, 64, 65, 67, 69, 71, 72, 48, 84]);
}

#[test]
fn test_playback_key_signature_and_accidentals() {
    let data = playback("K:D\nF C =F ^^G __B|\n");

    assert_eq!(midi(&data), vec![66, 61, 65, 69, 69]);
}

#[test]
fn test_playback_tempo_beat_scaling() {
    // Eighth-note unit against a quarter-note beat: C is half a beat
    let data = playback("L:1/8\nQ:1/4=60\nK:C\nC C/ C/ C2|\n");

    assert_eq!(data.ticks_per_beat, 4);
    assert_eq!(starts(&data), vec![0, 2, 3, 4]);
    let lengths: Vec<u64> = data.notes.iter().map(|n| n.duration_ticks).collect();
    assert_eq!(lengths, vec![2, 1, 1, 4]);
    assert_eq!(data.total_ticks, 8);
    assert!((data.seconds_per_tick() - 0.25).abs() < 1e-9);
    assert!((data.duration_seconds() - 2.0).abs() < 1e-9);
}

#[test]
fn test_playback_triplet_timing() {
    // Three quarters in the time of two
    let data = playback("L:1/4\nK:C\n(3CDE F|\n");

    assert_eq!(data.ticks_per_beat, 3);
    assert_eq!(starts(&data), vec![0, 2, 4, 6]);
    assert_eq!(data.notes[0].duration_ticks, 2);
    assert_eq!(data.notes[3].duration_ticks, 3);
}

#[test]
fn test_playback_chords_and_rests() {
    let data = playback("L:1/4\nK:C\n[C2EG] z c|\n");

    assert_eq!(midi(&data), vec![60, 64, 67, 72]);
    assert_eq!(starts(&data), vec![0, 0, 0, 3]);
    assert!(data.notes[..3].iter().all(|n| n.duration_ticks == 2));
}

#[test]
fn test_playback_voices_share_timeline() {
    let data = playback("L:1/4\nK:C\nV:S\nc d|\nV:A\nC D|\n");

    let order: Vec<(&str, u64)> = data
        .notes
        .iter()
        .map(|n| (n.voice.as_str(), n.start_tick))
        .collect();
    assert_eq!(order, vec![("S", 0), ("A", 0), ("S", 1), ("A", 1)]);
    assert_eq!(data.total_ticks, 2);
}

#[test]
fn test_playback_repeats_are_played() {
    let data = playback("L:1/4\nK:C\n|: C D :| E|\n");

    assert_eq!(midi(&data), vec![60, 62, 60, 62, 64]);
    assert_eq!(starts(&data), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_playback_lyrics() {
    let source = "L:1/4\nK:C\nC D z E|\nw: one * two\n";
    let data = playback(source);

    let lyrics: Vec<(&str, u64)> = data
        .lyrics
        .iter()
        .map(|l| (l.text.as_str(), l.tick))
        .collect();
    assert_eq!(lyrics, vec![("one", 0), ("two", 3)]);

    let config = PlaybackConfig {
        lyrics: false,
        ..PlaybackConfig::default()
    };
    let silent = playback_from_source(source, &config).unwrap();
    assert!(silent.lyrics.is_empty());
    assert_eq!(silent.notes.len(), 3);
}

#[test]
fn test_playback_reference_pitch_and_transpose() {
    let song = parse("K:C\nC c''''|\n").unwrap();
    let config = PlaybackConfig {
        reference_pitch: 48,
        transpose: 2,
        lyrics: true,
    };
    let data = generate_playback_data(&song, &config).unwrap();
    assert_eq!(midi(&data), vec![50, 110]);

    let config = PlaybackConfig {
        transpose: 127,
        ..PlaybackConfig::default()
    };
    let data = generate_playback_data(&song, &config).unwrap();
    assert_eq!(midi(&data), vec![127, 127]);
}

#[test]
fn test_playback_errors_propagate() {
    let result = playback_from_source("K:H\nC|", &PlaybackConfig::default());
    assert!(matches!(result, Err(AbcError::UnknownKey(_))));
}

#[test]
fn test_playback_serializes_camel_case() {
    let data = playback("X:1\nT:Tune\nL:1/4\nK:C\nC|\n");
    let json = serde_json::to_value(&data).unwrap();

    assert_eq!(json["title"], "Tune");
    assert_eq!(json["ticksPerBeat"], 1);
    assert_eq!(json["notes"][0]["midiNote"], 60);
    assert_eq!(json["notes"][0]["durationTicks"], 1);
}

#[test]
fn test_playback_rejects_unrepresentable_tick_resolution() {
    // Pairwise coprime denominators: their product exceeds i64
    let primes = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];
    let notes: Vec<String> = primes.iter().map(|p| format!("C1/{}", p)).collect();
    let source = format!("X:1\nL:1/4\nQ:1/4=120\nK:C\n{}|\n", notes.join(" "));

    let song = parse(&source).unwrap();
    let result = generate_playback_data(&song, &PlaybackConfig::default());
    assert!(matches!(result, Err(AbcError::InvalidFraction(_))));

    // The first few primes still fit
    let data = playback("X:1\nL:1/4\nQ:1/4=120\nK:C\nC1/2 C1/3 C1/5 C1/7|\n");
    assert_eq!(data.ticks_per_beat, 210);
    assert_eq!(data.notes[3].start_tick, 105 + 70 + 42);
}

#[test]
fn test_playback_rejects_unrepresentable_note_length() {
    let song = parse("X:1\nL:1/4\nK:C\nC9223372036854775807 D/3|\n").unwrap();
    let result = generate_playback_data(&song, &PlaybackConfig::default());
    assert!(matches!(result, Err(AbcError::InvalidFraction(_))));
}
