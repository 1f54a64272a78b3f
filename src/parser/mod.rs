//! # Transformer
//!
//! Folds the recognizer's event stream into an immutable [`Song`].
//!
//! ## Purpose
//! The transformer is the second stage of the pipeline. It takes the flat stream
//! of [`LocatedEvent`]s from the lexer and resolves it into voices of fully
//! timed, fully spelled music.
//!
//! ## Parse Context
//! All mutable state lives in one `ParseContext` owned by a single call to
//! [`transform`]:
//! - header fields collected until `HeaderEnd`
//! - per-voice bars, repeat ranges and line starts (first-seen order)
//! - the active voice
//! - a nesting stack of open chord/tuplet buffers
//!
//! ## Sinks
//! A note goes to the top of the nesting stack when one is open, otherwise to
//! the active voice's current bar. Closing a chord or tuplet builds the value
//! and hands it to the next sink down. Nesting is limited to a chord inside a
//! tuplet; chords never nest and tuplets never nest.
//!
//! ## Finalization
//! At `EndOfDocument` every voice expands its repeat ranges and flattens its
//! bars. No partial song is ever returned: the first error aborts the document.
//!
//! ## Example
//! ```rust
//! use abcplay::parse;
//!
//! let song = parse("X:1\nT:Test\nK:C\nCDEF|\n").unwrap();
//! assert_eq!(song.header().title, "Test");
//! assert_eq!(song.body().len(), 1);
//! assert_eq!(song.body().voices()[0].music().len(), 4);
//! ```
//!
//! ## Related Modules
//! - `lexer` - Provides the events
//! - `model` - Defines the resolved music types
//! - `error` - Structural errors carry the event's line/column

mod bars;
mod header;
mod lyrics;
mod pitch;

use crate::error::AbcError;
use crate::lexer::{Event, FieldKind, Lexer, LocatedEvent};
use crate::model::{
    Body, Chord, Grouping, GroupingKind, Header, Music, Song, Voice, DEFAULT_VOICE_NAME,
};
use bars::VoiceState;
use header::HeaderFields;
use log::{debug, trace, warn};

/// Parse ABC source text into a resolved song.
pub fn parse(source: &str) -> Result<Song, AbcError> {
    let events = Lexer::new(source).tokenize()?;
    transform(&events)
}

/// Resolve an event stream into a song. The stream must end with
/// [`Event::EndOfDocument`].
pub fn transform(events: &[LocatedEvent]) -> Result<Song, AbcError> {
    let mut context = ParseContext::default();
    for located in events {
        context.apply(located)?;
    }
    context.song.ok_or_else(|| {
        let (line, column) = events.last().map_or((1, 1), |e| (e.line, e.column));
        AbcError::StructureError {
            line,
            column,
            message: "Event stream ended without EndOfDocument".to_string(),
        }
    })
}

/// An open chord or tuplet collecting its members.
#[derive(Debug)]
enum Frame {
    Chord(Vec<Music>),
    Grouping(GroupingKind, Vec<Music>),
}

#[derive(Default)]
struct ParseContext {
    fields: HeaderFields,
    header: Option<Header>,
    voices: Vec<VoiceState>,
    active: Option<usize>,
    stack: Vec<Frame>,
    song: Option<Song>,
}

impl ParseContext {
    fn apply(&mut self, located: &LocatedEvent) -> Result<(), AbcError> {
        let (line, column) = (located.line, located.column);
        let structure = |message: &str| AbcError::StructureError {
            line,
            column,
            message: message.to_string(),
        };
        trace!("{}:{} {:?}", line, column, located.event);

        if self.song.is_some() {
            return Err(structure("Event after EndOfDocument"));
        }

        match &located.event {
            Event::Field { kind, value } => {
                if !self.stack.is_empty() {
                    return Err(structure("Field inside an open chord or tuplet"));
                }
                if *kind == FieldKind::Voice {
                    self.select_voice(value)?;
                } else if self.header.is_none() {
                    self.fields.apply(*kind, value)?;
                } else {
                    warn!(
                        "Ignoring {}: field in tune body at line {}",
                        kind.letter(),
                        line
                    );
                }
            }
            Event::HeaderEnd => {
                if self.header.is_some() {
                    return Err(structure("Header ended twice"));
                }
                self.finish_header()?;
            }
            Event::Note(text) => {
                let header = self
                    .header
                    .as_ref()
                    .ok_or_else(|| structure("Note before the header ended"))?;
                let music = pitch::resolve_token(text, &header.key, line, column)?;
                if matches!(music, Music::Rest(_)) && matches!(self.stack.last(), Some(Frame::Chord(_))) {
                    return Err(structure("Rests cannot be part of a chord"));
                }
                self.push_music(music);
            }
            Event::Barline(text) => {
                if !self.stack.is_empty() {
                    return Err(structure("Barline inside an open chord or tuplet"));
                }
                self.require_header(&structure)?;
                self.active_voice().apply_barline(text);
            }
            Event::ChordOpen => {
                self.require_header(&structure)?;
                if matches!(self.stack.last(), Some(Frame::Chord(_))) {
                    return Err(structure("Chords cannot nest"));
                }
                self.stack.push(Frame::Chord(Vec::new()));
            }
            Event::ChordClose => {
                let Some(Frame::Chord(members)) = self.stack.pop() else {
                    return Err(structure("Chord closed without being opened"));
                };
                let mut notes = Vec::with_capacity(members.len());
                for member in members {
                    match member {
                        Music::Note(note) => notes.push(note),
                        _ => return Err(structure("Chords may only contain notes")),
                    }
                }
                let chord = Chord::new(notes).ok_or_else(|| structure("Empty chord"))?;
                self.push_music(Music::Chord(chord));
            }
            Event::GroupingOpen(kind) => {
                self.require_header(&structure)?;
                if !self.stack.is_empty() {
                    return Err(structure("Tuplets cannot be nested or placed inside a chord"));
                }
                self.stack.push(Frame::Grouping(*kind, Vec::new()));
            }
            Event::GroupingClose => {
                let Some(Frame::Grouping(kind, members)) = self.stack.pop() else {
                    return Err(structure("Tuplet closed without being opened"));
                };
                if members.is_empty() {
                    return Err(structure("Empty tuplet"));
                }
                if members.iter().any(|m| matches!(m, Music::Grouping(_))) {
                    return Err(structure("Tuplets cannot contain tuplets"));
                }
                let grouping = Grouping::new(kind, members).ok_or_else(|| AbcError::ParseError {
                    line,
                    column,
                    message: "Tuplet duration is out of range".to_string(),
                })?;
                self.push_music(Music::Grouping(grouping));
            }
            Event::LyricLine(text) => {
                if !self.stack.is_empty() {
                    return Err(structure("Lyrics inside an open chord or tuplet"));
                }
                self.require_header(&structure)?;
                let tokens = lyrics::tokenize(text);
                let voice = self.active_voice();
                let assigned = lyrics::align(&mut voice.bars, voice.line_start, &tokens);
                trace!(
                    "Voice {}: {} lyric token(s), {} note(s) assigned",
                    voice.name,
                    tokens.len(),
                    assigned
                );
            }
            Event::EndOfLine => {
                if let Some(index) = self.active {
                    self.voices[index].mark_line_end();
                }
            }
            Event::EndOfDocument => {
                if !self.stack.is_empty() {
                    return Err(structure("Chord or tuplet left open at end of document"));
                }
                self.finish_document()?;
            }
        }
        Ok(())
    }

    fn require_header(&self, structure: &impl Fn(&str) -> AbcError) -> Result<(), AbcError> {
        match self.header {
            Some(_) => Ok(()),
            None => Err(structure("Music before the header ended")),
        }
    }

    fn finish_header(&mut self) -> Result<(), AbcError> {
        let fields = std::mem::take(&mut self.fields);
        self.header = Some(fields.finish()?);
        Ok(())
    }

    /// Switch to a named voice, creating it on first sight. `V:Alto clef=alto`
    /// names the voice `Alto`.
    fn select_voice(&mut self, value: &str) -> Result<(), AbcError> {
        let name = value
            .split_whitespace()
            .next()
            .ok_or_else(|| AbcError::FieldError {
                field: FieldKind::Voice.letter(),
                message: "missing voice name".to_string(),
            })?;
        let index = self.voice_index(name);
        debug!("Switching to voice {}", name);
        self.active = Some(index);
        Ok(())
    }

    fn voice_index(&mut self, name: &str) -> usize {
        match self.voices.iter().position(|v| v.name == name) {
            Some(index) => index,
            None => {
                debug!("New voice {}", name);
                self.voices.push(VoiceState::new(name));
                self.voices.len() - 1
            }
        }
    }

    /// The active voice, falling back to the implicit default voice.
    fn active_voice(&mut self) -> &mut VoiceState {
        let index = match self.active {
            Some(index) => index,
            None => {
                let index = self.voice_index(DEFAULT_VOICE_NAME);
                self.active = Some(index);
                index
            }
        };
        &mut self.voices[index]
    }

    fn push_music(&mut self, music: Music) {
        match self.stack.last_mut() {
            Some(Frame::Chord(members)) | Some(Frame::Grouping(_, members)) => members.push(music),
            None => self.active_voice().push(music),
        }
    }

    fn finish_document(&mut self) -> Result<(), AbcError> {
        let header = match self.header.take() {
            Some(header) => header,
            None => std::mem::take(&mut self.fields).finish()?,
        };
        let voices: Vec<Voice> = std::mem::take(&mut self.voices)
            .into_iter()
            .map(VoiceState::into_voice)
            .collect();
        debug!("Document complete: {} voice(s)", voices.len());
        self.song = Some(Song::new(header, Body::new(voices)));
        Ok(())
    }
}
