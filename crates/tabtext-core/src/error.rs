//! Error types for reading and writing delimited text.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::encoding::Encoding;

/// Which quote rule a malformed quoted field broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteFault {
    /// The stream ended before the quoted field was closed.
    Extraneous,
    /// A closing quote was followed by something other than a delimiter,
    /// a line break, or the end of the stream.
    Unexpected,
}

impl fmt::Display for QuoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteFault::Extraneous => f.write_str("extraneous"),
            QuoteFault::Unexpected => f.write_str("unexpected"),
        }
    }
}

/// Where an LTSV character was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterPlace {
    Label,
    FieldValue,
}

impl fmt::Display for CharacterPlace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterPlace::Label => f.write_str("label"),
            CharacterPlace::FieldValue => f.write_str("field-value"),
        }
    }
}

/// Errors that can occur while reading or writing delimited text.
///
/// Positions are 1-based lines and 0-based columns, exactly as counted by
/// the reader. The rendered messages are part of the public contract.
#[derive(Error, Debug)]
pub enum TextError {
    /// A quoted field was never closed, or its closing quote was followed
    /// by stray content.
    #[error("line {line}, column {column}: {kind} \" in field")]
    MalformedQuote {
        line: usize,
        column: usize,
        kind: QuoteFault,
    },

    /// A record's field count differs from the count fixed by the first
    /// record (or header) of the session.
    #[error("line {line}, column {column}: wrong number of fields in line")]
    FieldCountMismatch { line: usize, column: usize },

    /// An LTSV label or value contains a character outside its permitted set.
    #[error("unpermitted character in {place}: {}", code_point(.character))]
    UnsupportedCharacter {
        place: CharacterPlace,
        character: char,
    },

    /// An LTSV record does not have one value per header label.
    #[error("field length does not match")]
    FieldLengthMismatch,

    /// The stream could not be wrapped for the requested encoding.
    #[error("cannot set up {encoding} stream: {source}")]
    EncodingConstruction {
        encoding: Encoding,
        #[source]
        source: io::Error,
    },

    /// The input bytes are not valid in the requested encoding.
    #[error("input is not valid {encoding}")]
    Decode { encoding: Encoding },

    /// A character has no representation in the output encoding.
    #[error("character {} cannot be encoded in {encoding}", code_point(.character))]
    Unmappable { encoding: Encoding, character: char },

    /// An encoding or line-break name was not recognized.
    #[error("unknown {kind}: '{name}'")]
    UnknownName { kind: &'static str, name: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Render a code point as `U+XXXX`.
fn code_point(c: &char) -> String {
    format!("U+{:04X}", *c as u32)
}

/// Convenience alias used throughout tabtext-core.
pub type Result<T> = std::result::Result<T, TextError>;
