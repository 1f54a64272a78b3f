pub mod config;
pub mod error;
pub mod fraction;
pub mod key;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod playback;

pub use config::PlaybackConfig;
pub use error::*;
pub use fraction::{gcd, lcm, Fraction};
pub use key::KeySignature;
pub use model::*;
pub use parser::{parse, transform};
pub use playback::{generate_playback_data, PlaybackData};

/// Parse ABC source and render the resolved song as pretty JSON.
pub fn to_json(source: &str) -> Result<String, AbcError> {
    let song = parse(source)?;
    Ok(serde_json::to_string_pretty(&song)?)
}
