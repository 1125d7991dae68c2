//! Session options and one-call wrappers around [`Reader`] and [`Writer`].
//!
//! The option structs derive serde with field defaults, so callers can embed
//! them in their own configuration files and only spell out what differs.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::encoding::Encoding;
use crate::error::{Result, TextError};
use crate::field::{Field, Record};
use crate::line_break::LineBreak;
use crate::reader::Reader;
use crate::writer::Writer;

fn default_delimiter() -> char {
    ','
}

/// How to read a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    pub delimiter: char,
    /// Report absent cells as empty strings.
    pub without_null: bool,
    pub encoding: Encoding,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            without_null: false,
            encoding: Encoding::default(),
        }
    }
}

impl ReadOptions {
    /// Build a reader over `input` with these options.
    pub fn reader<R: Read>(&self, input: R) -> Result<Reader> {
        Ok(Reader::new(input, self.encoding)?
            .with_delimiter(self.delimiter)
            .with_without_null(self.without_null))
    }
}

/// How to write a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    pub delimiter: char,
    pub line_break: LineBreak,
    pub encoding: Encoding,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            line_break: LineBreak::default(),
            encoding: Encoding::default(),
        }
    }
}

impl WriteOptions {
    /// Build a writer over `sink` with these options.
    pub fn writer<W: Write>(&self, sink: W) -> Result<Writer<W>> {
        Ok(Writer::new(sink, self.line_break, self.encoding)?.with_delimiter(self.delimiter))
    }
}

/// A header plus the data records below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub records: Vec<Record>,
    /// First record terminator seen, `None` for single-line input.
    pub line_break: Option<LineBreak>,
}

/// Read every record of `input`, returning them with the detected line break.
pub fn read_all<R: Read>(
    input: R,
    options: &ReadOptions,
) -> Result<(Vec<Record>, Option<LineBreak>)> {
    let mut reader = options.reader(input)?;
    let records = reader.read_all()?;
    Ok((records, reader.detected_line_break()))
}

/// Read a header line followed by data records.
pub fn read_with_header<R: Read>(input: R, options: &ReadOptions) -> Result<Table> {
    let mut reader = options.reader(input)?;
    let header = reader.read_header()?;
    let records = reader.read_all()?;
    Ok(Table {
        header,
        records,
        line_break: reader.detected_line_break(),
    })
}

/// Write `records` to `sink` and flush it.
pub fn write_all<W: Write, R: AsRef<[Field]>>(
    sink: W,
    records: &[R],
    options: &WriteOptions,
) -> Result<W> {
    let mut writer = options.writer(sink)?;
    writer.write_all(records)?;
    writer.into_inner()
}

/// Write `records` to a string. The options' encoding is ignored; the
/// result is plain UTF-8 without a byte-order mark.
pub fn to_string<R: AsRef<[Field]>>(records: &[R], options: &WriteOptions) -> Result<String> {
    let options = WriteOptions {
        encoding: Encoding::Utf8,
        ..options.clone()
    };
    let bytes = write_all(Vec::new(), records, &options)?;
    String::from_utf8(bytes).map_err(|_| TextError::Decode {
        encoding: Encoding::Utf8,
    })
}
