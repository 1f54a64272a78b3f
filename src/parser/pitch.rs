//! Note and rest tokens resolved against the active key signature.

use crate::error::AbcError;
use crate::fraction::Fraction;
use crate::key::KeySignature;
use crate::model::{Accidental, Music, Note, NoteName, Rest};

/// Resolve a raw token such as `^c'3/4` or `z2` into a [`Music`] value.
///
/// An inline accidental overrides the key for this occurrence only. Lowercase
/// letters sit one octave above uppercase; `'` and `,` shift by one more each.
pub(crate) fn resolve_token(
    text: &str,
    key: &KeySignature,
    line: usize,
    column: usize,
) -> Result<Music, AbcError> {
    let token_error = |message: String| AbcError::ParseError {
        line,
        column,
        message,
    };

    let marker_len = text
        .find(|c: char| !matches!(c, '^' | '_' | '='))
        .unwrap_or(text.len());
    let (marker, rest) = text.split_at(marker_len);

    let mut chars = rest.chars();
    let letter = chars
        .next()
        .ok_or_else(|| token_error(format!("Note token '{}' has no letter", text)))?;
    let after_letter = chars.as_str();

    let marks_len = after_letter
        .find(|c: char| c != '\'' && c != ',')
        .unwrap_or(after_letter.len());
    let (marks, suffix) = after_letter.split_at(marks_len);

    let duration = Fraction::from_duration_suffix(suffix)
        .map_err(|e| token_error(format!("Bad duration in '{}': {}", text, e)))?;

    if letter == 'z' {
        return Ok(Music::Rest(Rest::new(duration)));
    }

    let name = NoteName::from_char(letter)
        .ok_or_else(|| token_error(format!("'{}' is not a note letter", letter)))?;

    let accidental = if marker.is_empty() {
        key.accidental_for(name)
    } else {
        Accidental::from_marker(marker)
            .ok_or_else(|| token_error(format!("Unknown accidental '{}'", marker)))?
    };

    let mut octave: i32 = if letter.is_ascii_lowercase() { 1 } else { 0 };
    for mark in marks.chars() {
        octave = octave.saturating_add(if mark == '\'' { 1 } else { -1 });
    }

    Ok(Music::Note(Note::new(name, accidental, octave, duration)))
}
