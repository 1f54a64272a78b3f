//! Lyric lines (`w:`): syllable tokens and their alignment to notes.
//!
//! | char  | effect                                                       |
//! |-------|--------------------------------------------------------------|
//! | `-`   | closes the syllable keeping the hyphen, or a break if none   |
//! | `_`   | closes the syllable keeping the underscore, then a hold      |
//! | `*`   | closes the syllable, then skips one note                     |
//! | `~`   | space inside a syllable                                      |
//! | `\-`  | literal hyphen inside a syllable                             |
//! | `\|`  | closes the syllable, then advances to the next bar           |
//! | space | closes the syllable                                          |

use super::bars::BarPosition;
use crate::model::Music;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LyricToken {
    Syllable(String),
    Break,
    Hold,
    Skip,
    BarAdvance,
}

impl LyricToken {
    /// Syllable stored on the note this token lands on.
    fn syllable(&self) -> Option<String> {
        match self {
            LyricToken::Syllable(text) => Some(text.clone()),
            LyricToken::Skip => Some(String::new()),
            LyricToken::Break | LyricToken::Hold | LyricToken::BarAdvance => None,
        }
    }
}

pub(crate) fn tokenize(line: &str) -> Vec<LyricToken> {
    let mut tokens = Vec::new();
    let mut current: Option<String> = None;
    let mut chars = line.chars().peekable();

    fn close(current: &mut Option<String>, tokens: &mut Vec<LyricToken>) {
        if let Some(text) = current.take() {
            tokens.push(LyricToken::Syllable(text));
        }
    }

    while let Some(c) = chars.next() {
        match c {
            '-' => match current.take() {
                Some(mut text) => {
                    text.push('-');
                    tokens.push(LyricToken::Syllable(text));
                }
                None => tokens.push(LyricToken::Break),
            },
            '_' => {
                if let Some(mut text) = current.take() {
                    text.push('_');
                    tokens.push(LyricToken::Syllable(text));
                }
                tokens.push(LyricToken::Hold);
            }
            '*' => {
                close(&mut current, &mut tokens);
                tokens.push(LyricToken::Skip);
            }
            '|' => {
                close(&mut current, &mut tokens);
                tokens.push(LyricToken::BarAdvance);
            }
            '~' => current.get_or_insert_with(String::new).push(' '),
            '\\' if chars.peek() == Some(&'-') => {
                chars.next();
                current.get_or_insert_with(String::new).push('-');
            }
            c if c.is_whitespace() => close(&mut current, &mut tokens),
            c => current.get_or_insert_with(String::new).push(c),
        }
    }
    close(&mut current, &mut tokens);

    tokens
}

/// Notes and chords of `bar`, with grouping members counted individually.
/// Rests take no syllable.
fn eligible(bar: &mut [Music]) -> Vec<&mut Music> {
    let mut slots = Vec::new();
    for music in bar.iter_mut() {
        if matches!(music, Music::Note(_) | Music::Chord(_)) {
            slots.push(music);
        } else if let Music::Grouping(grouping) = music {
            slots.extend(
                grouping
                    .elements_mut()
                    .iter_mut()
                    .filter(|m| matches!(m, Music::Note(_) | Music::Chord(_))),
            );
        }
    }
    slots
}

/// Assign `tokens` in order to the notes following `start`. Returns the number
/// of notes that received a token.
pub(crate) fn align(bars: &mut [Vec<Music>], start: BarPosition, tokens: &[LyricToken]) -> usize {
    let mut tokens = tokens.iter().peekable();
    let mut assigned = 0;

    for (index, bar) in bars.iter_mut().enumerate().skip(start.bar) {
        let first = if index == start.bar {
            start.element.min(bar.len())
        } else {
            0
        };
        let mut slots = eligible(&mut bar[first..]).into_iter();

        loop {
            let Some(token) = tokens.peek() else {
                return assigned;
            };
            if **token == LyricToken::BarAdvance {
                tokens.next();
                break;
            }
            let Some(slot) = slots.next() else {
                break;
            };
            slot.set_syllable(token.syllable());
            assigned += 1;
            tokens.next();
        }
    }

    assigned
}
