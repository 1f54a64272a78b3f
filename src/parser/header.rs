//! Header field accumulation and defaulting.

use crate::error::AbcError;
use crate::fraction::Fraction;
use crate::key::KeySignature;
use crate::lexer::FieldKind;
use crate::model::Header;
use log::debug;

const DEFAULT_INDEX: u32 = 1;
const DEFAULT_BEATS_PER_MINUTE: u32 = 100;
/// `M:C` (4/4) and `M:C|` (2/2) both reduce to one whole note per bar.
const COMMON_TIME: Fraction = Fraction::ONE;
const CUT_TIME: Fraction = Fraction::ONE;
const SHORT_METER_LIMIT: Fraction = Fraction::raw(3, 4);
const SHORT_METER_LENGTH: Fraction = Fraction::raw(1, 16);
const LONG_METER_LENGTH: Fraction = Fraction::raw(1, 8);

/// Header values as written; unset fields get their defaults in [`HeaderFields::finish`].
#[derive(Debug, Default)]
pub(crate) struct HeaderFields {
    index: Option<u32>,
    title: Option<String>,
    composer: Option<String>,
    key: Option<KeySignature>,
    meter: Option<Fraction>,
    beats_per_minute: Option<u32>,
    tempo_beat: Option<Fraction>,
    default_length: Option<Fraction>,
}

fn field_error(kind: FieldKind, message: impl Into<String>) -> AbcError {
    AbcError::FieldError {
        field: kind.letter(),
        message: message.into(),
    }
}

fn parse_count(kind: FieldKind, text: &str) -> Result<u32, AbcError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| field_error(kind, format!("not a number: '{}'", text.trim())))
}

fn parse_positive(kind: FieldKind, text: &str) -> Result<Fraction, AbcError> {
    let value: Fraction = text
        .parse()
        .map_err(|e: AbcError| field_error(kind, e.to_string()))?;
    if !value.is_positive() {
        return Err(field_error(kind, format!("'{}' must be positive", text.trim())));
    }
    Ok(value)
}

impl HeaderFields {
    /// Record one header field. The first `T:` and `C:` win; other fields are
    /// overwritten by later occurrences. `V:` and unknown letters are not header data.
    pub fn apply(&mut self, kind: FieldKind, value: &str) -> Result<(), AbcError> {
        match kind {
            FieldKind::Index => self.index = Some(parse_count(kind, value)?),
            FieldKind::Title => {
                self.title.get_or_insert_with(|| value.to_string());
            }
            FieldKind::Composer => {
                self.composer.get_or_insert_with(|| value.to_string());
            }
            FieldKind::DefaultLength => self.default_length = Some(parse_positive(kind, value)?),
            FieldKind::Meter => {
                self.meter = Some(match value.trim() {
                    "C" => COMMON_TIME,
                    "C|" => CUT_TIME,
                    other => parse_positive(kind, other)?,
                })
            }
            FieldKind::Tempo => self.apply_tempo(value)?,
            FieldKind::Key => self.key = Some(KeySignature::new(value)?),
            FieldKind::Voice | FieldKind::Other(_) => {}
        }
        Ok(())
    }

    /// `Q:1/4=120` or `Q:120`.
    fn apply_tempo(&mut self, value: &str) -> Result<(), AbcError> {
        let kind = FieldKind::Tempo;
        let bpm = match value.split_once('=') {
            Some((beat, bpm)) => {
                self.tempo_beat = Some(parse_positive(kind, beat)?);
                bpm
            }
            None => value,
        };
        let bpm = parse_count(kind, bpm)?;
        if bpm == 0 {
            return Err(field_error(kind, "beats per minute must be positive"));
        }
        self.beats_per_minute = Some(bpm);
        Ok(())
    }

    /// Apply defaults and build the header. A key is required.
    pub fn finish(self) -> Result<Header, AbcError> {
        let key = self
            .key
            .ok_or_else(|| field_error(FieldKind::Key, "missing key signature"))?;
        let meter = self.meter.unwrap_or(COMMON_TIME);
        let default_length = self.default_length.unwrap_or(if meter < SHORT_METER_LIMIT {
            SHORT_METER_LENGTH
        } else {
            LONG_METER_LENGTH
        });

        let header = Header {
            index: self.index.unwrap_or(DEFAULT_INDEX),
            title: self.title.unwrap_or_default(),
            composer: self.composer.unwrap_or_default(),
            key,
            meter,
            beats_per_minute: self.beats_per_minute.unwrap_or(DEFAULT_BEATS_PER_MINUTE),
            tempo_beat: self.tempo_beat.unwrap_or(default_length),
            default_length,
        };
        debug!(
            "Header complete: X:{} T:{:?} K:{} M:{} L:{} Q:{}={}",
            header.index,
            header.title,
            header.key,
            header.meter,
            header.default_length,
            header.tempo_beat,
            header.beats_per_minute
        );
        Ok(header)
    }
}
