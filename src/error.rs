//! # Error Types
//!
//! This module defines all error types for the ABC transformer.
//!
//! Every failure aborts the whole document: no partial `Song` is ever produced.
//! Errors carry enough location information (line/column or field letter) to point
//! at the offending token.
//!
//! ## Error Types
//! - `ParseError` - Lexical errors and malformed note tokens, with line and column
//! - `FieldError` - Malformed header field values (index, tempo, meter, length)
//! - `UnknownKey` - A `K:` value that is not in the key-signature table
//! - `StructureError` - Event sequences that break the recognizer contract
//! - `InvalidFraction` - Zero denominators, unparsable fraction text and arithmetic overflow
//! - `ConfigError` - Invalid playback configuration
//! - `Io` - File access from the command line front end
//! - `Json` - JSON rendering of a song or its playback data
//!
//! ## Usage
//! ```rust
//! use abcplay::{parse, AbcError};
//!
//! match parse("X:1\nK:H\nC|") {
//!     Ok(song) => println!("{} voices", song.body().len()),
//!     Err(AbcError::UnknownKey(name)) => eprintln!("no such key: {}", name),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AbcError {
    /// Parse error with location information.
    ///
    /// # Example
    /// ```
    /// # use abcplay::AbcError;
    /// let err = AbcError::ParseError {
    ///     line: 5,
    ///     column: 10,
    ///     message: "Unexpected character: '&'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Parse error at line 5, column 10: Unexpected character: '&'");
    /// ```
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Invalid header field value.
    ///
    /// # Example
    /// ```
    /// # use abcplay::AbcError;
    /// let err = AbcError::FieldError { field: 'X', message: "not a number: 'one'".to_string() };
    /// assert_eq!(err.to_string(), "Invalid field X: not a number: 'one'");
    /// ```
    #[error("Invalid field {field}: {message}")]
    FieldError { field: char, message: String },

    #[error("Unknown key signature: {0}")]
    UnknownKey(String),

    /// The event stream violates the grammar contract, e.g. a chord closed
    /// without being opened.
    #[error("Structural error at line {line}, column {column}: {message}")]
    StructureError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid fraction: {0}")]
    InvalidFraction(String),

    #[error("Invalid config: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
