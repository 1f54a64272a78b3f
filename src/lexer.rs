//! # Recognizer
//!
//! Turns ABC text into a flat stream of [`LocatedEvent`]s for the transformer.
//!
//! The recognizer owns every lexical decision: which lines are header fields,
//! how barlines and note tokens are spelled, where tuplets end. The transformer
//! never re-checks token shape, only meaning.
//!
//! ## Line handling
//! - Header lines run up to and including the first `K:` field, which is
//!   followed by [`Event::HeaderEnd`].
//! - Blank lines and lines starting with `%` are skipped everywhere.
//! - In the body, `w:` lines become [`Event::LyricLine`], other `X:` style lines
//!   become [`Event::Field`], everything else is music.
//! - [`Event::EndOfLine`] for a music line is held back until the lyric lines
//!   below it have been emitted.

use crate::error::AbcError;
use crate::model::{GroupingKind, NoteName};

/// Header/body field letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Index,
    Title,
    Composer,
    DefaultLength,
    Meter,
    Tempo,
    Key,
    Voice,
    Other(char),
}

impl FieldKind {
    pub fn from_letter(letter: char) -> Self {
        match letter {
            'X' => FieldKind::Index,
            'T' => FieldKind::Title,
            'C' => FieldKind::Composer,
            'L' => FieldKind::DefaultLength,
            'M' => FieldKind::Meter,
            'Q' => FieldKind::Tempo,
            'K' => FieldKind::Key,
            'V' => FieldKind::Voice,
            other => FieldKind::Other(other),
        }
    }

    pub fn letter(&self) -> char {
        match self {
            FieldKind::Index => 'X',
            FieldKind::Title => 'T',
            FieldKind::Composer => 'C',
            FieldKind::DefaultLength => 'L',
            FieldKind::Meter => 'M',
            FieldKind::Tempo => 'Q',
            FieldKind::Key => 'K',
            FieldKind::Voice => 'V',
            FieldKind::Other(c) => *c,
        }
    }
}

/// Syntactic events consumed by the transformer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// `X:1`, `T:Title`, `V:Alto`, ... with the value trimmed.
    Field { kind: FieldKind, value: String },
    HeaderEnd,
    /// Raw note or rest token, e.g. `^c'3/4` or `z2`.
    Note(String),
    /// `|`, `||`, `[|`, `|]`, `|:`, `:|`, `[1`, `[2`
    Barline(String),
    ChordOpen,
    ChordClose,
    GroupingOpen(GroupingKind),
    GroupingClose,
    /// Lyric line content after the `w:` prefix.
    LyricLine(String),
    EndOfLine,
    EndOfDocument,
}

/// An event with the position of its first character (1-based).
#[derive(Debug, Clone)]
pub struct LocatedEvent {
    pub event: Event,
    pub line: usize,
    pub column: usize,
}

struct OpenTuplet {
    remaining: u32,
    line: usize,
    column: usize,
}

/// Character cursor over a single music line.
struct LineScanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    column: usize,
}

impl<'a> LineScanner<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            chars: line.chars().peekable(),
            column: 1,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.column += 1;
        Some(c)
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn next_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(&expected) {
            self.advance();
            true
        } else {
            false
        }
    }
}

/// Recognizer for ABC source text
pub struct Lexer<'a> {
    input: &'a str,
    events: Vec<LocatedEvent>,
    in_header: bool,
    in_chord: bool,
    pending_line_end: Option<(usize, usize)>,
    open_tuplet: Option<OpenTuplet>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            events: Vec::new(),
            in_header: true,
            in_chord: false,
            pending_line_end: None,
            open_tuplet: None,
        }
    }

    fn emit(&mut self, event: Event, line: usize, column: usize) {
        self.events.push(LocatedEvent {
            event,
            line,
            column,
        });
    }

    fn flush_line_end(&mut self) {
        if let Some((line, column)) = self.pending_line_end.take() {
            self.emit(Event::EndOfLine, line, column);
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<LocatedEvent>, AbcError> {
        let input = self.input;
        let mut last_line = 0;

        for (idx, raw_line) in input.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let line = raw_line.trim_end_matches('\r');
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('%') {
                continue;
            }

            if let Some((letter, value)) = split_field(trimmed) {
                let column = line.chars().count() - trimmed.chars().count() + 1;
                if self.in_header {
                    let kind = FieldKind::from_letter(letter);
                    self.emit(
                        Event::Field {
                            kind,
                            value: value.trim().to_string(),
                        },
                        line_no,
                        column,
                    );
                    if kind == FieldKind::Key {
                        self.in_header = false;
                        self.emit(Event::HeaderEnd, line_no, column);
                    }
                } else if letter == 'w' {
                    self.emit(Event::LyricLine(value.to_string()), line_no, column);
                } else {
                    self.flush_line_end();
                    self.emit(
                        Event::Field {
                            kind: FieldKind::from_letter(letter),
                            value: value.trim().to_string(),
                        },
                        line_no,
                        column,
                    );
                }
                continue;
            }

            if self.in_header {
                return Err(AbcError::ParseError {
                    line: line_no,
                    column: 1,
                    message: "Expected a header field; the header must end with a K: line"
                        .to_string(),
                });
            }

            self.flush_line_end();
            self.scan_music_line(line, line_no)?;
            self.pending_line_end = Some((line_no, line.chars().count() + 1));
        }

        self.flush_line_end();
        if let Some(tuplet) = self.open_tuplet.take() {
            return Err(AbcError::ParseError {
                line: tuplet.line,
                column: tuplet.column,
                message: format!("Tuplet is missing {} element(s)", tuplet.remaining),
            });
        }
        self.emit(Event::EndOfDocument, last_line + 1, 1);
        Ok(self.events)
    }

    fn scan_music_line(&mut self, line: &str, line_no: usize) -> Result<(), AbcError> {
        let mut scanner = LineScanner::new(line);

        while let Some(&c) = scanner.peek() {
            let column = scanner.column;
            match c {
                ' ' | '\t' => {
                    scanner.advance();
                }
                '%' => break,
                '|' => {
                    scanner.advance();
                    self.check_no_open_tuplet(line_no, column)?;
                    let text = match scanner.peek() {
                        Some('|') => "||",
                        Some(']') => "|]",
                        Some(':') => "|:",
                        _ => "|",
                    };
                    if text != "|" {
                        scanner.advance();
                    }
                    self.emit(Event::Barline(text.to_string()), line_no, column);
                    if text == "|" {
                        self.scan_ending(&mut scanner, line_no);
                    }
                }
                ':' => {
                    scanner.advance();
                    self.check_no_open_tuplet(line_no, column)?;
                    if scanner.next_if('|') {
                        self.emit(Event::Barline(":|".to_string()), line_no, column);
                        if scanner.next_if(':') {
                            self.emit(Event::Barline("|:".to_string()), line_no, column);
                        } else {
                            self.scan_ending(&mut scanner, line_no);
                        }
                    } else if scanner.next_if(':') {
                        self.emit(Event::Barline(":|".to_string()), line_no, column);
                        self.emit(Event::Barline("|:".to_string()), line_no, column);
                    } else {
                        return Err(AbcError::ParseError {
                            line: line_no,
                            column,
                            message: "Unexpected ':'. Did you mean ':|' for repeat end?"
                                .to_string(),
                        });
                    }
                }
                '[' => {
                    scanner.advance();
                    if scanner.next_if('|') {
                        self.check_no_open_tuplet(line_no, column)?;
                        self.emit(Event::Barline("[|".to_string()), line_no, column);
                    } else if scanner.next_if('1') {
                        self.emit(Event::Barline("[1".to_string()), line_no, column);
                    } else if scanner.next_if('2') {
                        self.emit(Event::Barline("[2".to_string()), line_no, column);
                    } else {
                        self.in_chord = true;
                        self.emit(Event::ChordOpen, line_no, column);
                    }
                }
                ']' => {
                    scanner.advance();
                    self.in_chord = false;
                    self.emit(Event::ChordClose, line_no, column);
                    self.count_tuplet_element(line_no, scanner.column);
                }
                '(' => {
                    scanner.advance();
                    let kind = scanner
                        .peek()
                        .and_then(|d| d.to_digit(10))
                        .and_then(GroupingKind::from_count);
                    let Some(kind) = kind else {
                        return Err(AbcError::ParseError {
                            line: line_no,
                            column,
                            message: "Unexpected '('. Only (2, (3 and (4 tuplets are supported"
                                .to_string(),
                        });
                    };
                    scanner.advance();
                    if self.open_tuplet.is_some() {
                        return Err(AbcError::ParseError {
                            line: line_no,
                            column,
                            message: "Nested tuplets are not supported".to_string(),
                        });
                    }
                    self.open_tuplet = Some(OpenTuplet {
                        remaining: kind.count(),
                        line: line_no,
                        column,
                    });
                    self.emit(Event::GroupingOpen(kind), line_no, column);
                }
                '^' | '_' | '=' | 'z' | 'A'..='G' | 'a'..='g' => {
                    let text = scan_note(&mut scanner, line_no)?;
                    self.emit(Event::Note(text), line_no, column);
                    if !self.in_chord {
                        self.count_tuplet_element(line_no, scanner.column);
                    }
                }
                _ => {
                    return Err(AbcError::ParseError {
                        line: line_no,
                        column,
                        message: format!("Unexpected character: '{}'", c),
                    });
                }
            }
        }

        Ok(())
    }

    /// `|1`, `|2` and `:|2` are shorthand for a barline followed by `[1` or `[2`.
    fn scan_ending(&mut self, scanner: &mut LineScanner<'_>, line: usize) {
        let column = scanner.column;
        if scanner.next_if('1') {
            self.emit(Event::Barline("[1".to_string()), line, column);
        } else if scanner.next_if('2') {
            self.emit(Event::Barline("[2".to_string()), line, column);
        }
    }

    fn check_no_open_tuplet(&self, line: usize, column: usize) -> Result<(), AbcError> {
        match &self.open_tuplet {
            Some(tuplet) => Err(AbcError::ParseError {
                line,
                column,
                message: format!(
                    "Barline inside a tuplet that still needs {} element(s)",
                    tuplet.remaining
                ),
            }),
            None => Ok(()),
        }
    }

    fn count_tuplet_element(&mut self, line: usize, column: usize) {
        let finished = match self.open_tuplet.as_mut() {
            Some(tuplet) => {
                tuplet.remaining = tuplet.remaining.saturating_sub(1);
                tuplet.remaining == 0
            }
            None => false,
        };
        if finished {
            self.open_tuplet = None;
            self.emit(Event::GroupingClose, line, column);
        }
    }
}

/// `X:value` style line: an ASCII letter followed by a colon.
fn split_field(line: &str) -> Option<(char, &str)> {
    let mut chars = line.chars();
    let letter = chars.next()?;
    if letter.is_ascii_alphabetic() && chars.next() == Some(':') {
        Some((letter, &line[2..]))
    } else {
        None
    }
}

/// Accidental, letter, octave marks and duration suffix of one note or rest.
fn scan_note(scanner: &mut LineScanner<'_>, line: usize) -> Result<String, AbcError> {
    let column = scanner.column;
    let mut text = String::new();

    match scanner.peek().copied() {
        Some(marker @ ('^' | '_')) => {
            scanner.advance();
            text.push(marker);
            if scanner.next_if(marker) {
                text.push(marker);
            }
        }
        Some('=') => {
            scanner.advance();
            text.push('=');
        }
        _ => {}
    }

    match scanner.peek().copied() {
        Some('z') if text.is_empty() => {
            scanner.advance();
            text.push('z');
        }
        Some(c) if c.is_ascii_alphabetic() && c != 'z' && NoteName::from_char(c).is_some() => {
            scanner.advance();
            text.push(c);
        }
        _ => {
            return Err(AbcError::ParseError {
                line,
                column,
                message: format!("Expected a note letter after '{}'", text),
            });
        }
    }

    while let Some(&c) = scanner.peek() {
        if c == '\'' || c == ',' {
            scanner.advance();
            text.push(c);
        } else {
            break;
        }
    }

    while let Some(&c) = scanner.peek() {
        if c.is_ascii_digit() {
            scanner.advance();
            text.push(c);
        } else {
            break;
        }
    }
    if scanner.next_if('/') {
        text.push('/');
        while let Some(&c) = scanner.peek() {
            if c.is_ascii_digit() {
                scanner.advance();
                text.push(c);
            } else {
                break;
            }
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_events(music: &str) -> Vec<Event> {
        let source = format!("X:1\nK:C\n{}", music);
        Lexer::new(&source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|e| e.event)
            .skip_while(|e| *e != Event::HeaderEnd)
            .skip(1)
            .collect()
    }

    fn barline(text: &str) -> Event {
        Event::Barline(text.to_string())
    }

    fn note(text: &str) -> Event {
        Event::Note(text.to_string())
    }

    #[test]
    fn test_header_fields() {
        let events = Lexer::new("X: 2\nT: Some Title\nM:C|\nK: Gm\n").tokenize().unwrap();
        let kinds: Vec<_> = events.iter().map(|e| e.event.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Event::Field { kind: FieldKind::Index, value: "2".to_string() },
                Event::Field { kind: FieldKind::Title, value: "Some Title".to_string() },
                Event::Field { kind: FieldKind::Meter, value: "C|".to_string() },
                Event::Field { kind: FieldKind::Key, value: "Gm".to_string() },
                Event::HeaderEnd,
                Event::EndOfDocument,
            ]
        );
    }

    #[test]
    fn test_music_line_in_header_is_an_error() {
        let result = Lexer::new("X:1\nCDEF|\nK:C").tokenize();
        assert!(matches!(result, Err(AbcError::ParseError { line: 2, .. })));
    }

    #[test]
    fn test_notes_with_accidentals_octaves_and_lengths() {
        assert_eq!(
            body_events("^B,1/2 __C'3 =f z/ c''"),
            vec![
                note("^B,1/2"),
                note("__C'3"),
                note("=f"),
                note("z/"),
                note("c''"),
                Event::EndOfLine,
                Event::EndOfDocument,
            ]
        );
    }

    #[test]
    fn test_barlines() {
        assert_eq!(
            body_events("| || [| |] |: :|"),
            vec![
                barline("|"),
                barline("||"),
                barline("[|"),
                barline("|]"),
                barline("|:"),
                barline(":|"),
                Event::EndOfLine,
                Event::EndOfDocument,
            ]
        );
    }

    #[test]
    fn test_endings_and_double_repeats() {
        assert_eq!(
            body_events("A|1 B:|2 C::D"),
            vec![
                note("A"),
                barline("|"),
                barline("[1"),
                note("B"),
                barline(":|"),
                barline("[2"),
                note("C"),
                barline(":|"),
                barline("|:"),
                note("D"),
                Event::EndOfLine,
                Event::EndOfDocument,
            ]
        );
    }

    #[test]
    fn test_chord_brackets() {
        assert_eq!(
            body_events("[B1/2 G] [1"),
            vec![
                Event::ChordOpen,
                note("B1/2"),
                note("G"),
                Event::ChordClose,
                barline("[1"),
                Event::EndOfLine,
                Event::EndOfDocument,
            ]
        );
    }

    #[test]
    fn test_tuplet_closes_after_its_element_count() {
        assert_eq!(
            body_events("(3A[CE]B C"),
            vec![
                Event::GroupingOpen(GroupingKind::Triplet),
                note("A"),
                Event::ChordOpen,
                note("C"),
                note("E"),
                Event::ChordClose,
                note("B"),
                Event::GroupingClose,
                note("C"),
                Event::EndOfLine,
                Event::EndOfDocument,
            ]
        );
    }

    #[test]
    fn test_tuplet_errors() {
        assert!(Lexer::new("K:C\n(3AB|C").tokenize().is_err());
        assert!(Lexer::new("K:C\n(3AB").tokenize().is_err());
        assert!(Lexer::new("K:C\n(2(3ABC").tokenize().is_err());
        assert!(Lexer::new("K:C\n(5ABCDE").tokenize().is_err());
    }

    #[test]
    fn test_line_end_waits_for_lyrics() {
        assert_eq!(
            body_events("A B|\nw: la la\nC|"),
            vec![
                note("A"),
                note("B"),
                barline("|"),
                Event::LyricLine(" la la".to_string()),
                Event::EndOfLine,
                note("C"),
                barline("|"),
                Event::EndOfLine,
                Event::EndOfDocument,
            ]
        );
    }

    #[test]
    fn test_indented_field_lines() {
        assert_eq!(
            body_events("A B|\n  w: la la\n\tV:Alto\nC|"),
            vec![
                note("A"),
                note("B"),
                barline("|"),
                Event::LyricLine(" la la".to_string()),
                Event::EndOfLine,
                Event::Field { kind: FieldKind::Voice, value: "Alto".to_string() },
                note("C"),
                barline("|"),
                Event::EndOfLine,
                Event::EndOfDocument,
            ]
        );

        let events = Lexer::new(" X:1\n   K:G\n").tokenize().unwrap();
        assert_eq!(
            events[0].event,
            Event::Field { kind: FieldKind::Index, value: "1".to_string() }
        );
        let key = &events[1];
        assert_eq!((key.line, key.column), (2, 4));
        assert_eq!(events[2].event, Event::HeaderEnd);
    }

    #[test]
    fn test_voice_field_in_body_flushes_line_end() {
        assert_eq!(
            body_events("A|\nV:Alto\nB|"),
            vec![
                note("A"),
                barline("|"),
                Event::EndOfLine,
                Event::Field { kind: FieldKind::Voice, value: "Alto".to_string() },
                note("B"),
                barline("|"),
                Event::EndOfLine,
                Event::EndOfDocument,
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        assert_eq!(
            body_events("% a comment\n\nA B % trailing\n"),
            vec![note("A"), note("B"), Event::EndOfLine, Event::EndOfDocument]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("K:C\nA & B").tokenize().unwrap_err();
        match err {
            AbcError::ParseError { line, column, message } => {
                assert_eq!(line, 2);
                assert_eq!(column, 3);
                assert!(message.contains("Unexpected character"));
            }
            _ => panic!("Expected ParseError"),
        }
    }

    #[test]
    fn test_accidental_without_letter() {
        assert!(Lexer::new("K:C\n^ A").tokenize().is_err());
        assert!(Lexer::new("K:C\n^z").tokenize().is_err());
    }

    #[test]
    fn test_event_positions() {
        let events = Lexer::new("K:C\nA  B").tokenize().unwrap();
        let b = events.iter().find(|e| e.event == note("B")).unwrap();
        assert_eq!((b.line, b.column), (2, 4));
    }
}
