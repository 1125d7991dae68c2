//! # tabtext-core
//!
//! Reader and writer for delimiter-separated text (CSV, TSV, or any single
//! character delimiter) across character encodings and line-break
//! conventions, plus a writer for LTSV (`label:value` pairs joined by tabs).
//!
//! ## Quick start
//!
//! ```rust
//! use tabtext_core::{Encoding, Field, LineBreak, Reader, Writer};
//!
//! // Text → records
//! let mut reader = Reader::new("a,\"b,c\"\nd,".as_bytes(), Encoding::Utf8).unwrap();
//! let records = reader.read_all().unwrap();
//! assert_eq!(records[0], vec![Some("a".to_string()), Some("b,c".to_string())]);
//! assert_eq!(records[1], vec![Some("d".to_string()), None]);
//! assert_eq!(reader.detected_line_break(), Some(LineBreak::Lf));
//!
//! // Records → text
//! let mut writer = Writer::new(Vec::new(), LineBreak::Crlf, Encoding::Utf8).unwrap();
//! writer.write(&[Field::plain("a"), Field::plain("b,c")]).unwrap();
//! writer.write(&[Field::quoted("d"), Field::plain("")]).unwrap();
//! let out = writer.into_inner().unwrap();
//! assert_eq!(out, b"a,\"b,c\"\r\n\"d\",");
//! ```
//!
//! ## Modules
//!
//! - [`reader`] — quote-aware CSV state machine with position-accurate errors
//! - [`writer`] — CSV quoting and record serialization
//! - [`ltsv`] — LTSV writer with label/value character validation
//! - [`encoding`] — encoding adapter (whole-stream decode, transcoding sink, BOMs)
//! - [`line_break`] — line-break conventions and detection
//! - [`field`] — read-side and write-side cell types
//! - [`options`] — serde-friendly session options and one-call wrappers
//! - [`error`] — error types

pub mod encoding;
pub mod error;
pub mod field;
pub mod line_break;
pub mod ltsv;
pub mod options;
pub mod reader;
pub mod writer;

pub use encoding::Encoding;
pub use error::{CharacterPlace, QuoteFault, TextError};
pub use field::{Field, RawText, Record};
pub use line_break::LineBreak;
pub use ltsv::LtsvWriter;
pub use options::{
    read_all, read_with_header, to_string, write_all, ReadOptions, Table, WriteOptions,
};
pub use reader::Reader;
pub use writer::Writer;
